//! Names for tables and columns created by decomposition.

use inflector::Inflector;
use std::collections::HashSet;

/// Suffixes that mark a column as an identifier of some entity.
const KEY_SUFFIXES: [&str; 4] = ["_id", "_key", "_code", "_no"];

/// Entity a column stands for: `order_id` is `Order`, `courses` is `Course`.
pub(crate) fn entity_name(column: &str) -> String {
    let snake = column.to_snake_case();
    let stem = KEY_SUFFIXES
        .iter()
        .find_map(|suffix| snake.strip_suffix(suffix).filter(|rest| !rest.is_empty()))
        .unwrap_or(&snake);
    let name = stem.to_singular().to_pascal_case();
    if name.is_empty() {
        "Entity".to_string()
    } else {
        name
    }
}

/// Table keyed by `determinant`: named after a single column's entity,
/// otherwise the parent name followed by every column's entity.
pub(crate) fn determinant_table(parent: &str, determinant: &[String]) -> String {
    match determinant {
        [single] => entity_name(single),
        many => member_table(parent, many),
    }
}

/// `Student` + `course` gives `StudentCourse`.
pub(crate) fn member_table(parent: &str, columns: &[String]) -> String {
    let mut name = parent.to_pascal_case();
    for column in columns {
        name.push_str(&entity_name(column));
    }
    name
}

/// Concatenated entities of `columns`, for join components.
pub(crate) fn component_table(columns: &[String]) -> String {
    columns.iter().map(|c| entity_name(c)).collect()
}

/// `<snake_case(table)>_id`, extended until it collides with no column.
pub(crate) fn surrogate_column(table: &str, existing: &[String]) -> String {
    let mut column = format!("{}_id", table.to_snake_case());
    while existing.iter().any(|c| c.eq_ignore_ascii_case(&column)) {
        column.push_str("_sk");
    }
    column
}

/// `base`, or `base_value` when a key column already uses the name.
pub(crate) fn value_column(base: &str, existing: &[String]) -> String {
    let mut column = base.to_string();
    while existing.iter().any(|c| c.eq_ignore_ascii_case(&column)) {
        column.push_str("_value");
    }
    column
}

/// Table names issued during one run. Comparison ignores case.
#[derive(Debug, Default)]
pub(crate) struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_lowercase());
    }

    /// Claims `base`, or `base2`, `base3`, ... if it is taken.
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_lowercase()) {
            return base.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}{n}");
            if self.taken.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}
