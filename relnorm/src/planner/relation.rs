use crate::detector::{is_superkey, EncodedTable};
use crate::model::{
    AttributeSet, DependencySet, ForeignKey, NormalForm, TableProfile, TableSchema,
};

/// One table of the working forest, with its dependencies detected on its
/// own data.
#[derive(Debug, Clone)]
pub(crate) struct Relation {
    pub profile: TableProfile,
    pub table: EncodedTable,
    pub deps: DependencySet,
    pub primary_key: AttributeSet,
    pub foreign_keys: Vec<ForeignKey>,
    /// Highest level this relation is known to satisfy.
    pub normal_form: NormalForm,
    /// Nested splits that produced it within the current level.
    pub depth: usize,
    /// Set once the recursion guard stops this branch.
    pub frozen: bool,
}

impl Relation {
    pub fn name(&self) -> &str {
        self.profile.name()
    }

    pub fn arity(&self) -> usize {
        self.profile.column_count()
    }

    pub fn names(&self, set: &AttributeSet) -> Vec<String> {
        self.profile.names(set)
    }

    /// Attributes of any candidate key or of the primary key.
    pub fn prime_attributes(&self) -> AttributeSet {
        self.deps.prime_attributes().union(&self.primary_key)
    }

    pub fn is_superkey(&self, set: &AttributeSet) -> bool {
        is_superkey(&self.table, &self.deps, set)
    }

    pub fn is_null_free(&self, set: &AttributeSet) -> bool {
        set.iter().all(|i| !self.table.has_nulls(i))
    }

    /// Keys known for this relation: the detected ones, or the primary key
    /// alone when detection found none.
    pub fn keys(&self) -> Vec<AttributeSet> {
        if self.deps.candidate_keys.is_empty() {
            vec![self.primary_key.clone()]
        } else {
            self.deps
                .candidate_keys
                .iter()
                .map(|k| k.attributes.clone())
                .collect()
        }
    }

    /// Its only key is the whole attribute set.
    pub fn is_all_key(&self) -> bool {
        let full = self.profile.all_attributes();
        self.keys().iter().all(|k| *k == full)
    }

    /// Foreign keys whose columns all survive in a projection onto `columns`.
    pub fn foreign_keys_within(&self, columns: &[usize]) -> Vec<ForeignKey> {
        let kept: Vec<&str> = columns
            .iter()
            .map(|&i| self.profile.attributes()[i].name.as_str())
            .collect();
        self.foreign_keys
            .iter()
            .filter(|fk| fk.columns.iter().all(|c| kept.contains(&c.as_str())))
            .cloned()
            .collect()
    }

    pub fn to_schema(&self, with_rows: bool) -> TableSchema {
        let primary_key = self.names(&self.primary_key);
        let candidate_keys = self
            .deps
            .candidate_keys
            .iter()
            .map(|k| self.names(&k.attributes))
            .filter(|names| *names != primary_key)
            .collect();
        TableSchema {
            name: self.name().to_string(),
            columns: self.profile.attributes().to_vec(),
            primary_key,
            foreign_keys: self.foreign_keys.clone(),
            candidate_keys,
            normal_form: self.normal_form,
            row_count: self.profile.row_count(),
            rows: if with_rows {
                self.profile.rows().to_vec()
            } else {
                Vec::new()
            },
            diagnostics: Vec::new(),
        }
    }
}

/// Translates `set` into positions within a projection onto `columns`;
/// `None` if some attribute was projected away.
pub(crate) fn remap(set: &AttributeSet, columns: &[usize]) -> Option<AttributeSet> {
    set.iter()
        .map(|a| columns.iter().position(|&c| c == a))
        .collect()
}

/// Drops attributes, lowest index first, while the rest stays unique.
pub(crate) fn minimize_key(table: &EncodedTable, key: &AttributeSet) -> AttributeSet {
    let mut key = key.clone();
    for attribute in key.to_vec() {
        let smaller = key.without(attribute);
        if !smaller.is_empty() && table.is_unique(&smaller) {
            key = smaller;
        }
    }
    key
}
