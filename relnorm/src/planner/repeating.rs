//! Detection of first normal form violations.
//!
//! Two shapes are recognized: numbered column groups such as `phone1`,
//! `phone2`, and text columns whose cells mostly hold delimited lists.

use std::collections::BTreeMap;

use crate::config::PlannerConfig;
use crate::model::{Row, TableProfile};

/// Columns that together hold one repeating attribute.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RepeatingColumns {
    /// Name of the single-valued attribute they collapse into.
    pub base: String,
    /// Source columns, in index order.
    pub columns: Vec<usize>,
    /// Set when the values are lists split on this delimiter.
    pub delimiter: Option<char>,
}

impl RepeatingColumns {
    /// Atomic values one row contributes, empty values dropped.
    pub fn values(&self, row: &Row) -> Vec<String> {
        let mut values = Vec::new();
        for &column in &self.columns {
            let Some(cell) = row[column].as_deref() else {
                continue;
            };
            match self.delimiter {
                Some(delimiter) => values.extend(tokens(cell, delimiter).map(str::to_string)),
                None => {
                    let value = cell.trim();
                    if !value.is_empty() {
                        values.push(value.to_string());
                    }
                }
            }
        }
        values
    }
}

/// Every repeating group and delimited column, ordered by first column.
pub(crate) fn find(profile: &TableProfile, config: &PlannerConfig) -> Vec<RepeatingColumns> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, attribute) in profile.attributes().iter().enumerate() {
        if let Some(base) = repeating_base(&attribute.name) {
            groups.entry(base).or_default().push(index);
        }
    }

    let mut found: Vec<RepeatingColumns> = groups
        .into_iter()
        .filter(|(_, columns)| columns.len() >= 2)
        .filter(|(_, columns)| {
            profile
                .rows()
                .iter()
                .any(|row| columns.iter().any(|&c| row[c].is_some()))
        })
        .map(|(base, columns)| RepeatingColumns {
            base,
            columns,
            delimiter: None,
        })
        .collect();

    for (index, attribute) in profile.attributes().iter().enumerate() {
        if !attribute.data_type.is_textual() || found.iter().any(|g| g.columns.contains(&index)) {
            continue;
        }
        let values = profile.column_values(index);
        if let Some(delimiter) = list_delimiter(&values, config) {
            found.push(RepeatingColumns {
                base: attribute.name.clone(),
                columns: vec![index],
                delimiter: Some(delimiter),
            });
        }
    }

    found.sort_by_key(|g| g.columns.first().copied());
    found
}

/// `course1` and `course_2` share the base `course`. Names that do not
/// end in a digit have none.
pub(crate) fn repeating_base(column: &str) -> Option<String> {
    if !column.ends_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let base = column
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .trim_end_matches(&['_', '-', ' '][..]);
    (!base.is_empty()).then(|| base.to_string())
}

/// The first configured delimiter that splits more than
/// `repeating_value_ratio` of the non-null values into two or more tokens.
fn list_delimiter(values: &[Option<String>], config: &PlannerConfig) -> Option<char> {
    let present: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
    if present.is_empty() {
        return None;
    }
    config.delimiters.iter().copied().find(|&delimiter| {
        let lists = present
            .iter()
            .filter(|value| tokens(value, delimiter).count() >= 2)
            .count();
        lists as f64 / present.len() as f64 > config.repeating_value_ratio
    })
}

fn tokens(value: &str, delimiter: char) -> impl Iterator<Item = &str> {
    value.split(delimiter).map(str::trim).filter(|t| !t.is_empty())
}
