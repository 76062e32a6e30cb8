//! Candidate key search.

use std::time::Instant;

use super::encoding::EncodedTable;
use super::subsets::next_level;
use crate::config::DetectorConfig;
use crate::model::{AttributeSet, CandidateKey, DependencySet};

pub(crate) struct KeySearch {
    pub keys: Vec<CandidateKey>,
    pub needs_surrogate: bool,
    pub truncated: bool,
}

/// Whether `set` determines every attribute.
///
/// The closure under the exact FDs is taken first; a closure that is unique
/// in the data closes to the full attribute set.
pub(crate) fn is_superkey(table: &EncodedTable, deps: &DependencySet, set: &AttributeSet) -> bool {
    table.is_unique(&deps.closure(set))
}

/// Breadth-first search over null-free attribute subsets, smallest first.
///
/// Only non-keys are extended to the next size, so supersets of found keys
/// are never generated. The search ends early once the non-keys together no
/// longer form a superkey. Each evaluated subset counts against
/// `max_candidates`.
pub(crate) fn search(
    table: &EncodedTable,
    deps: &DependencySet,
    config: &DetectorConfig,
    deadline: Option<Instant>,
) -> KeySearch {
    let pool = table.null_free_columns();
    let pool_set: AttributeSet = pool.iter().copied().collect();
    if table.row_count() == 0 || pool.is_empty() || !table.is_unique(&pool_set) {
        return KeySearch {
            keys: Vec::new(),
            needs_surrogate: table.row_count() > 0,
            truncated: false,
        };
    }

    let max_size = config.max_key_size.unwrap_or(pool.len()).min(pool.len());
    let mut keys: Vec<AttributeSet> = Vec::new();
    let mut visited = 0usize;
    let mut truncated = false;
    let mut level: Vec<AttributeSet> = pool.iter().map(|&i| AttributeSet::single(i)).collect();
    let mut size = 1;

    'search: while !level.is_empty() && size <= max_size {
        let mut non_keys = Vec::new();
        for subset in level {
            if visited >= config.max_candidates || deadline.is_some_and(|d| Instant::now() >= d) {
                truncated = true;
                break 'search;
            }
            visited += 1;
            if is_superkey(table, deps, &subset) {
                keys.push(subset);
            } else {
                non_keys.push(subset);
            }
        }
        // every larger key would lie within the columns of the non-keys
        let reach: AttributeSet = non_keys.iter().flat_map(|s| s.iter()).collect();
        if non_keys.is_empty() || !is_superkey(table, deps, &reach) {
            break;
        }
        level = next_level(&non_keys);
        size += 1;
    }

    KeySearch {
        needs_surrogate: keys.is_empty(),
        keys: keys
            .into_iter()
            .enumerate()
            .map(|(position, attributes)| CandidateKey {
                attributes,
                primary: position == 0,
            })
            .collect(),
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FunctionalDependency, TableProfile};

    fn order_lines() -> TableProfile {
        TableProfile::builder("OrderLine")
            .columns(["order_id", "product_id", "customer_name"])
            .row(["1", "P1", "Alice"])
            .row(["1", "P2", "Alice"])
            .row(["2", "P1", "Bob"])
            .row(["2", "P3", "Bob"])
            .row(["3", "P2", "Alice"])
            .row(["3", "P3", "Alice"])
            .build()
            .unwrap()
    }

    fn order_deps() -> DependencySet {
        DependencySet {
            functional: vec![FunctionalDependency {
                lhs: AttributeSet::single(0),
                rhs: 2,
                confidence: 1.0,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_composite_key() {
        let table = EncodedTable::encode(&order_lines());
        let search = search(&table, &order_deps(), &DetectorConfig::default(), None);
        assert!(!search.needs_surrogate);
        assert_eq!(search.keys.len(), 1);
        assert_eq!(search.keys[0].attributes.to_vec(), vec![0, 1]);
        assert!(search.keys[0].primary);
    }

    #[test]
    fn test_keys_are_minimal() {
        let table = EncodedTable::encode(&order_lines());
        let deps = order_deps();
        let search = search(&table, &deps, &DetectorConfig::default(), None);
        for key in &search.keys {
            for attribute in key.attributes.iter() {
                assert!(!is_superkey(&table, &deps, &key.attributes.without(attribute)));
            }
        }
    }

    #[test]
    fn test_duplicate_rows_need_surrogate() {
        let profile = TableProfile::builder("Log")
            .columns(["level", "message"])
            .row(["INFO", "started"])
            .row(["INFO", "started"])
            .build()
            .unwrap();
        let table = EncodedTable::encode(&profile);
        let search = search(&table, &DependencySet::default(), &DetectorConfig::default(), None);
        assert!(search.keys.is_empty());
        assert!(search.needs_surrogate);
    }

    #[test]
    fn test_nullable_columns_excluded() {
        let profile = TableProfile::builder("T")
            .columns(["code", "label"])
            .row(["A", "x"])
            .row(["", "y"])
            .row(["B", "y"])
            .build()
            .unwrap();
        let table = EncodedTable::encode(&profile);
        let search = search(&table, &DependencySet::default(), &DetectorConfig::default(), None);
        // label alone repeats, code has a null: no key over null-free columns
        assert!(search.needs_surrogate);
    }

    /// `col_a` is unique; every other column alternates between a mod-2 and
    /// a mod-3 pattern, so only mixed pairs are keys.
    fn wide_table(columns: usize) -> TableProfile {
        let names: Vec<String> = (0..columns)
            .map(|i| format!("col_{}", (b'a' + i as u8) as char))
            .collect();
        let mut builder = TableProfile::builder("Wide").columns(names);
        for row in 0..6 {
            let mut cells = vec![format!("r{row}")];
            cells.extend((1..columns).map(|i| {
                if i % 2 == 0 {
                    format!("m{}", row % 2)
                } else {
                    format!("t{}", row % 3)
                }
            }));
            builder = builder.row(cells);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_wide_table_stays_within_budget() {
        let table = EncodedTable::encode(&wide_table(18));
        let config = DetectorConfig::default().with_max_candidates(5_000);
        let search = search(&table, &DependencySet::default(), &config, None);
        assert!(!search.truncated);
        assert_eq!(search.keys[0].attributes.to_vec(), vec![0]);
        assert!(search.keys[0].primary);
        // col_a plus 9 x 8 mixed pairs
        assert_eq!(search.keys.len(), 1 + 9 * 8);
        assert!(search.keys.iter().all(|k| k.attributes.len() <= 2));
    }

    #[test]
    fn test_only_evaluated_subsets_count() {
        // col_a, col_b, col_c are evaluated; {b, c} is the only pair left
        let table = EncodedTable::encode(&wide_table(3));
        let config = DetectorConfig::default().with_max_candidates(4);
        let search = search(&table, &DependencySet::default(), &config, None);
        assert!(!search.truncated);
        let keys: Vec<Vec<usize>> = search.keys.iter().map(|k| k.attributes.to_vec()).collect();
        assert_eq!(keys, vec![vec![0], vec![1, 2]]);
    }

    #[test]
    fn test_stops_when_non_keys_cannot_form_a_key() {
        let mut builder = TableProfile::builder("Wide")
            .columns((0..18).map(|i| format!("col_{}", (b'a' + i as u8) as char)));
        for row in 0..6 {
            let mut cells = vec![format!("r{row}")];
            cells.extend((1..18).map(|i| format!("v{}", (row + i) % 3)));
            builder = builder.row(cells);
        }
        let table = EncodedTable::encode(&builder.build().unwrap());
        let config = DetectorConfig::default().with_max_candidates(100);
        let search = search(&table, &DependencySet::default(), &config, None);
        assert!(!search.truncated);
        assert_eq!(search.keys.len(), 1);
        assert_eq!(search.keys[0].attributes.to_vec(), vec![0]);
    }

    #[test]
    fn test_alternate_keys_in_order() {
        let profile = TableProfile::builder("Student")
            .columns(["student_id", "email", "major"])
            .row(["1", "a@x", "Math"])
            .row(["2", "b@x", "Math"])
            .row(["3", "c@x", "Art"])
            .build()
            .unwrap();
        let table = EncodedTable::encode(&profile);
        let search = search(&table, &DependencySet::default(), &DetectorConfig::default(), None);
        let keys: Vec<Vec<usize>> = search.keys.iter().map(|k| k.attributes.to_vec()).collect();
        assert_eq!(keys, vec![vec![0], vec![1]]);
        assert!(search.keys[0].primary && !search.keys[1].primary);
    }
}
