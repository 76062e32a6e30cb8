//! Normalization planning from 1NF up to a target normal form.
//!
//! The planner walks the normal forms in order. At each level every table of
//! the working forest is checked by that level's rule; a violating table is
//! split and its pieces are checked again at the same level, one recursion
//! step deeper. Pieces always get their dependencies re-detected on their own
//! projected data.
//!
//! Splitting is bounded twice: `step_budget` caps the number of splits per
//! run, and `max_recursion_depth` caps nested BCNF and 4NF splits of one
//! branch within a level. A branch that hits the depth cap is frozen at the
//! level below. Splits at the other levels strictly shrink the table, so
//! sibling unnests and extractions never count towards the cap.
//!
//! ## Example
//!
//! ```rust
//! use relnorm::config::PlannerConfig;
//! use relnorm::detector::DependencyDetector;
//! use relnorm::model::{NormalForm, TableProfile};
//! use relnorm::planner::NormalizationPlanner;
//!
//! let profile = TableProfile::builder("OrderLine")
//!     .columns(["order_id", "product_id", "customer_name"])
//!     .row(["1", "P1", "Alice"])
//!     .row(["1", "P2", "Alice"])
//!     .row(["2", "P1", "Bob"])
//!     .row(["2", "P3", "Bob"])
//!     .row(["3", "P2", "Alice"])
//!     .row(["3", "P3", "Alice"])
//!     .build()
//!     .unwrap();
//!
//! let planner = NormalizationPlanner::new(PlannerConfig::default(), DependencyDetector::default());
//! let plan = planner.plan(&profile).unwrap();
//! assert_eq!(plan.original_nf, NormalForm::First);
//! assert!(plan.tables.iter().any(|t| t.name == "Order"));
//! ```

mod join;
mod naming;
mod relation;
mod repeating;
mod rules;

use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info, instrument, warn};

use crate::config::PlannerConfig;
use crate::detector::DependencyDetector;
use crate::error::Result;
use crate::logging::LogConfig;
use crate::model::{
    Attribute, AttributeSet, DecompositionStep, DependencySet, Diagnostic, ForeignKey, NormalForm,
    Row, TableProfile, TableSchema, Violation,
};
use naming::NameRegistry;
use relation::{minimize_key, remap, Relation};
use repeating::RepeatingColumns;
use rules::{standard_rules, NormalFormRule, Outcome, Split};

/// Everything one planning run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationPlan {
    /// Level the input satisfied before any split.
    pub original_nf: NormalForm,
    /// Lowest level reached by a final table.
    pub final_nf: NormalForm,
    pub steps: Vec<DecompositionStep>,
    /// Final tables, with their rows.
    pub tables: Vec<TableSchema>,
    /// The step budget ran out with violations left.
    pub truncated: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Dependencies detected on the input as given.
    pub dependencies: DependencySet,
}

impl NormalizationPlan {
    pub fn violations_count(&self) -> usize {
        self.steps.iter().map(|s| s.violations.len()).sum()
    }
}

/// Plans the decomposition of one table.
pub struct NormalizationPlanner {
    config: PlannerConfig,
    detector: DependencyDetector,
    log: LogConfig,
    rules: Vec<Box<dyn NormalFormRule>>,
}

impl NormalizationPlanner {
    pub fn new(config: PlannerConfig, detector: DependencyDetector) -> Self {
        Self {
            config,
            detector,
            log: LogConfig::default(),
            rules: standard_rules(),
        }
    }

    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Runs every level up to the configured target.
    ///
    /// Fails only when a derived table cannot be built, which indicates
    /// malformed input that slipped past validation.
    #[instrument(skip(self, profile), fields(table = %profile.name(), target = %self.config.target_nf))]
    pub fn plan(&self, profile: &TableProfile) -> Result<NormalizationPlan> {
        let mut run = Run::new(self, profile.name());

        let original = self.detector.detect(profile);
        let root = run.establish_detected(
            profile.clone(),
            original.clone(),
            None,
            Vec::new(),
            0,
            NormalForm::Unnormalized,
        );
        let original_nf = self.assess(&root);
        info!(table = %profile.name(), original_nf = %original_nf, "Assessed input table");

        let mut leaves = vec![root];
        let mut steps = Vec::new();
        for level in self.config.target_nf.levels_up_to() {
            let Some(rule) = self.rules.iter().find(|r| r.target() == level) else {
                continue;
            };
            debug!(rule = rule.name(), description = rule.description(), "Checking level");
            let (next, step) = run.level(rule.as_ref(), leaves)?;
            leaves = next;
            steps.extend(step);
        }

        let final_nf = leaves
            .iter()
            .map(|r| r.normal_form)
            .min()
            .unwrap_or(original_nf);
        let mut tables: Vec<TableSchema> = leaves.iter().map(|r| r.to_schema(true)).collect();
        validate_foreign_keys(&mut tables);
        for table in &mut tables {
            table.diagnostics = run
                .diagnostics
                .iter()
                .filter(|d| concerns(d, table))
                .cloned()
                .collect();
        }

        info!(
            table = %profile.name(),
            original_nf = %original_nf,
            final_nf = %final_nf,
            steps = steps.len(),
            tables = tables.len(),
            truncated = run.truncated,
            "Normalization planned"
        );

        Ok(NormalizationPlan {
            original_nf,
            final_nf,
            steps,
            tables,
            truncated: run.truncated,
            diagnostics: run.diagnostics,
            dependencies: original,
        })
    }

    /// Highest level the untouched relation passes. An inconclusive check
    /// counts as a failure of that level.
    fn assess(&self, root: &Relation) -> NormalForm {
        let mut reached = NormalForm::Unnormalized;
        for level in self.config.target_nf.levels_up_to() {
            let Some(rule) = self.rules.iter().find(|r| r.target() == level) else {
                break;
            };
            match rule.check(root, &self.config) {
                Outcome::Satisfied => reached = level,
                Outcome::Inconclusive(_) | Outcome::Violated { .. } => break,
            }
        }
        reached
    }
}

/// Mutable state of one planning run.
struct Run<'a> {
    planner: &'a NormalizationPlanner,
    names: NameRegistry,
    diagnostics: Vec<Diagnostic>,
    splits: usize,
    truncated: bool,
}

impl<'a> Run<'a> {
    fn new(planner: &'a NormalizationPlanner, table: &str) -> Self {
        let mut names = NameRegistry::default();
        names.reserve(table);
        Self {
            planner,
            names,
            diagnostics: Vec::new(),
            splits: 0,
            truncated: false,
        }
    }

    fn config(&self) -> &PlannerConfig {
        &self.planner.config
    }

    fn diagnose(&mut self, diagnostic: Diagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    /// Runs one level over the whole forest. Returns the new forest and a
    /// step when at least one split happened.
    fn level(
        &mut self,
        rule: &dyn NormalFormRule,
        leaves: Vec<Relation>,
    ) -> Result<(Vec<Relation>, Option<DecompositionStep>)> {
        let level = rule.target();
        let splits_before = self.splits;
        let mut queue: VecDeque<Relation> = leaves
            .into_iter()
            .map(|mut r| {
                r.depth = 0;
                r
            })
            .collect();
        let mut done = Vec::new();
        let mut acted: Vec<Violation> = Vec::new();
        let mut frozen: Vec<String> = Vec::new();

        while let Some(mut relation) = queue.pop_front() {
            if relation.frozen || relation.normal_form < level.previous() {
                done.push(relation);
                continue;
            }
            match rule.check(&relation, self.config()) {
                Outcome::Satisfied => {
                    relation.normal_form = level;
                    done.push(relation);
                }
                Outcome::Inconclusive(reason) => {
                    debug!(table = %relation.name(), %reason, "Level inconclusive");
                    self.diagnose(Diagnostic::JoinDependencyInconclusive {
                        table: relation.name().to_string(),
                        reason,
                    });
                    done.push(relation);
                }
                Outcome::Violated { violations, split } => {
                    if level.splits_nest() && relation.depth >= self.config().max_recursion_depth {
                        warn!(
                            table = %relation.name(),
                            level = %level,
                            depth = relation.depth,
                            "Recursion guard tripped; freezing branch"
                        );
                        self.diagnose(Diagnostic::DecompositionLoopGuardTripped {
                            table: relation.name().to_string(),
                            normal_form: level,
                            depth: relation.depth,
                        });
                        frozen.push(relation.name().to_string());
                        relation.frozen = true;
                        done.push(relation);
                        continue;
                    }
                    if self.splits >= self.config().step_budget {
                        if !self.truncated {
                            warn!(
                                budget = self.config().step_budget,
                                level = %level,
                                "Step budget exhausted"
                            );
                        }
                        self.truncated = true;
                        done.push(relation);
                        continue;
                    }
                    self.splits += 1;
                    let pieces = self.split(&relation, split, level)?;
                    crate::log_split!(
                        self.planner.log,
                        table = %relation.name(),
                        level = %level,
                        violations = violations.len(),
                        into = %pieces.iter().map(|p| p.name().to_string()).collect::<Vec<_>>().join(", "),
                        "Decomposed table"
                    );
                    acted.extend(violations);
                    for piece in pieces.into_iter().rev() {
                        queue.push_front(piece);
                    }
                }
            }
        }

        let splits = self.splits - splits_before;
        if splits == 0 {
            return Ok((done, None));
        }
        let mut tables: Vec<TableSchema> = done.iter().map(|r| r.to_schema(false)).collect();
        validate_foreign_keys(&mut tables);
        let mut explanation = format!(
            "{} requires that {}: resolved {} violation(s) with {} split(s); {} table(s) now",
            level.title(),
            level.requirement(),
            acted.len(),
            splits,
            tables.len()
        );
        if !frozen.is_empty() {
            explanation.push_str(&format!(
                "; frozen by the recursion guard: {}",
                frozen.join(", ")
            ));
        }
        let step = DecompositionStep {
            from_nf: level.previous(),
            to_nf: level,
            violations: acted,
            explanation,
            tables,
        };
        Ok((done, Some(step)))
    }

    fn split(&mut self, relation: &Relation, split: Split, level: NormalForm) -> Result<Vec<Relation>> {
        let depth = if level.splits_nest() {
            relation.depth + 1
        } else {
            relation.depth
        };
        let normal_form = level.previous();
        match split {
            Split::Unnest(group) => self.unnest(relation, &group, depth, normal_form),
            Split::Extract {
                determinant,
                dependents,
            } => Ok(self.extract(relation, &determinant, &dependents, depth, normal_form)),
            Split::Separate {
                determinant,
                dependents,
            } => Ok(self.separate(relation, &determinant, &dependents, depth, normal_form)),
            Split::Project { components } => {
                Ok(self.project(relation, &components, depth, normal_form))
            }
        }
    }

    /// 1NF: the parent keeps every other column; the child holds the parent
    /// key plus one atomic value per row.
    fn unnest(
        &mut self,
        relation: &Relation,
        group: &RepeatingColumns,
        depth: usize,
        normal_form: NormalForm,
    ) -> Result<Vec<Relation>> {
        let moved: AttributeSet = group.columns.iter().copied().collect();
        let parent_columns = relation.profile.all_attributes().difference(&moved).to_vec();
        let parent = self.establish(
            relation.profile.project(relation.name(), &parent_columns),
            remap(&relation.primary_key, &parent_columns),
            relation.foreign_keys_within(&parent_columns),
            depth,
            normal_form,
        );

        // A surrogate inserted into the parent sits in front of the
        // projected columns.
        let offset = parent.arity() - parent_columns.len();
        let key_of: HashMap<Row, Row> = parent
            .profile
            .rows()
            .iter()
            .map(|row| {
                let key = parent.primary_key.iter().map(|i| row[i].clone()).collect();
                (row[offset..].to_vec(), key)
            })
            .collect();

        let key_names = parent.names(&parent.primary_key);
        let mut seen: HashSet<Row> = HashSet::new();
        let mut rows: Vec<Row> = Vec::new();
        for row in relation.profile.rows() {
            let tuple: Row = parent_columns.iter().map(|&i| row[i].clone()).collect();
            let Some(key) = key_of.get(&tuple) else {
                continue;
            };
            for value in group.values(row) {
                let mut child_row = key.clone();
                child_row.push(Some(value));
                if seen.insert(child_row.clone()) {
                    rows.push(child_row);
                }
            }
        }

        let mut attributes: Vec<Attribute> = parent
            .primary_key
            .iter()
            .enumerate()
            .map(|(position, index)| {
                let values: Vec<Option<String>> = rows.iter().map(|r| r[position].clone()).collect();
                parent.profile.attributes()[index].reprofile(&values)
            })
            .collect();
        let values: Vec<Option<String>> = rows.iter().map(|r| r[key_names.len()].clone()).collect();
        let sources = relation.names(&moved);
        attributes.push(
            Attribute::profile(naming::value_column(&group.base, &key_names), &values)
                .with_derived_from(sources),
        );

        let name = self
            .names
            .claim(&naming::member_table(relation.name(), &[group.base.clone()]));
        let child_key = AttributeSet::full(attributes.len());
        let child = self.establish(
            TableProfile::new(name, attributes, rows)?,
            Some(child_key),
            vec![ForeignKey {
                columns: key_names.clone(),
                references_table: parent.name().to_string(),
                references_key: key_names,
            }],
            depth,
            normal_form,
        );
        Ok(vec![parent, child])
    }

    /// 2NF to BCNF: the child holds the determinant and its dependents keyed
    /// by the determinant; the parent loses the dependents and references
    /// the child.
    fn extract(
        &mut self,
        relation: &Relation,
        determinant: &AttributeSet,
        dependents: &AttributeSet,
        depth: usize,
        normal_form: NormalForm,
    ) -> Vec<Relation> {
        let determinant_names = relation.names(determinant);
        let name = self.names.claim(&naming::determinant_table(
            relation.name(),
            &determinant_names,
        ));

        let child_columns: Vec<usize> = determinant.iter().chain(dependents.iter()).collect();
        let child_key: AttributeSet = (0..determinant.len()).collect();
        let child_profile = relation.profile.project(&name, &child_columns);
        let child_foreign_keys = relation.foreign_keys_within(&child_columns);

        let parent_columns = relation.profile.all_attributes().difference(dependents).to_vec();
        let preferred = if relation.primary_key.intersects(dependents) {
            relation.primary_key.difference(dependents).union(determinant)
        } else {
            relation.primary_key.clone()
        };
        let mut parent_foreign_keys = relation.foreign_keys_within(&parent_columns);
        parent_foreign_keys.push(ForeignKey {
            columns: determinant_names.clone(),
            references_table: name,
            references_key: determinant_names,
        });

        let parent = self.establish(
            relation.profile.project(relation.name(), &parent_columns),
            remap(&preferred, &parent_columns),
            parent_foreign_keys,
            depth,
            normal_form,
        );
        let child = self.establish(
            child_profile,
            Some(child_key),
            child_foreign_keys,
            depth,
            normal_form,
        );
        vec![parent, child]
    }

    /// 4NF: `determinant ∪ dependents` becomes its own table; the rest keeps
    /// the parent name.
    fn separate(
        &mut self,
        relation: &Relation,
        determinant: &AttributeSet,
        dependents: &AttributeSet,
        depth: usize,
        normal_form: NormalForm,
    ) -> Vec<Relation> {
        let name = self.names.claim(&naming::member_table(
            relation.name(),
            &relation.names(dependents),
        ));
        let member_columns = determinant.union(dependents).to_vec();
        let rest_columns = relation.profile.all_attributes().difference(dependents).to_vec();

        let rest = self.establish(
            relation.profile.project(relation.name(), &rest_columns),
            None,
            relation.foreign_keys_within(&rest_columns),
            depth,
            normal_form,
        );
        let member = self.establish(
            relation.profile.project(&name, &member_columns),
            None,
            relation.foreign_keys_within(&member_columns),
            depth,
            normal_form,
        );
        vec![rest, member]
    }

    /// 5NF: one table per join component.
    fn project(
        &mut self,
        relation: &Relation,
        components: &[AttributeSet],
        depth: usize,
        normal_form: NormalForm,
    ) -> Vec<Relation> {
        components
            .iter()
            .map(|component| {
                let columns = component.to_vec();
                let name = self
                    .names
                    .claim(&naming::component_table(&relation.names(component)));
                self.establish(
                    relation.profile.project(&name, &columns),
                    None,
                    relation.foreign_keys_within(&columns),
                    depth,
                    normal_form,
                )
            })
            .collect()
    }

    fn establish(
        &mut self,
        profile: TableProfile,
        preferred: Option<AttributeSet>,
        foreign_keys: Vec<ForeignKey>,
        depth: usize,
        normal_form: NormalForm,
    ) -> Relation {
        let deps = self.planner.detector.detect(&profile);
        self.establish_detected(profile, deps, preferred, foreign_keys, depth, normal_form)
    }

    /// Wraps a profile into a relation and picks its primary key: the
    /// preferred key when it is null-free and unique (minimized), else the
    /// detected primary key, else a surrogate column inserted in front.
    fn establish_detected(
        &mut self,
        profile: TableProfile,
        deps: DependencySet,
        preferred: Option<AttributeSet>,
        foreign_keys: Vec<ForeignKey>,
        depth: usize,
        normal_form: NormalForm,
    ) -> Relation {
        self.note_truncation(profile.name(), &deps);
        let table = crate::detector::EncodedTable::encode(&profile);
        let usable = preferred.filter(|key| {
            !key.is_empty()
                && key.iter().all(|i| i < table.column_count() && !table.has_nulls(i))
                && table.is_unique(key)
        });
        let primary_key = usable
            .map(|key| minimize_key(&table, &key))
            .or_else(|| deps.primary_key().map(|k| k.attributes.clone()));

        if let Some(primary_key) = primary_key {
            return Relation {
                profile,
                table,
                deps,
                primary_key,
                foreign_keys,
                normal_form,
                depth,
                frozen: false,
            };
        }

        let existing: Vec<String> = profile.attributes().iter().map(|a| a.name.clone()).collect();
        let column = naming::surrogate_column(profile.name(), &existing);
        info!(table = %profile.name(), %column, "No natural key; inserting surrogate");
        self.diagnose(Diagnostic::SyntheticKeyInserted {
            table: profile.name().to_string(),
            column: column.clone(),
        });
        let profile = profile.with_surrogate_key(column);
        let deps = self.planner.detector.detect(&profile);
        self.note_truncation(profile.name(), &deps);
        Relation {
            table: crate::detector::EncodedTable::encode(&profile),
            profile,
            deps,
            primary_key: AttributeSet::single(0),
            foreign_keys,
            normal_form,
            depth,
            frozen: false,
        }
    }

    fn note_truncation(&mut self, table: &str, deps: &DependencySet) {
        for search in &deps.truncated {
            self.diagnose(Diagnostic::SearchTruncated {
                table: table.to_string(),
                search: *search,
            });
        }
    }
}

/// Drops foreign keys that reference no table of `tables` by one of its keys,
/// and self-references.
fn validate_foreign_keys(tables: &mut [TableSchema]) {
    let keys: HashMap<String, Vec<Vec<String>>> = tables
        .iter()
        .map(|t| {
            let mut keys = vec![t.primary_key.clone()];
            keys.extend(t.candidate_keys.iter().cloned());
            (t.name.clone(), keys)
        })
        .collect();
    for table in tables.iter_mut() {
        let name = table.name.clone();
        table.foreign_keys.retain(|fk| {
            fk.references_table != name
                && keys
                    .get(&fk.references_table)
                    .is_some_and(|k| k.contains(&fk.references_key))
        });
    }
}

/// Whether a run diagnostic belongs on `table`.
fn concerns(diagnostic: &Diagnostic, table: &TableSchema) -> bool {
    if diagnostic.table() != table.name {
        return false;
    }
    match diagnostic {
        Diagnostic::SyntheticKeyInserted { column, .. } => table.has_column(column),
        _ => true,
    }
}
