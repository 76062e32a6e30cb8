//! Multi-valued dependency estimation.
//!
//! `X ->> Y` holds when, inside every `X` group, the `Y` values combine
//! freely with the values of the remaining attributes `Z`. Each group is
//! scored by how independent `Y` and `Z` look there: a full cartesian
//! product scores 1, otherwise `1 - I(Y;Z) / min(H(Y), H(Z))`. Groups with a
//! single `Y` or `Z` value say nothing and are ignored.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use super::encoding::EncodedTable;
use super::stats::pair_information;
use super::subsets::subsets_by_size;
use crate::config::DetectorConfig;
use crate::model::{AttributeSet, DependencySet, MultiValuedDependency};

pub(crate) struct MultiValuedSearch {
    pub dependencies: Vec<MultiValuedDependency>,
    pub truncated: bool,
}

pub(crate) fn discover(
    table: &EncodedTable,
    deps: &DependencySet,
    config: &DetectorConfig,
    deadline: Option<Instant>,
) -> MultiValuedSearch {
    let columns = table.column_count();
    let mut search = MultiValuedSearch {
        dependencies: Vec::new(),
        truncated: false,
    };
    if columns < 3 || table.row_count() < 2 {
        return search;
    }

    let rows = table.distinct_rows();
    let pool: Vec<usize> = (0..columns).collect();
    let all = AttributeSet::full(columns);
    let max_lhs = config.max_mvd_lhs_size.min(columns - 2);
    let mut visited = 0usize;

    for lhs in subsets_by_size(&pool, max_lhs) {
        if visited >= config.max_candidates || deadline.is_some_and(|d| Instant::now() >= d) {
            search.truncated = true;
            break;
        }
        visited += 1;
        if table.distinct_count(&lhs) == rows.len() {
            continue;
        }
        for rhs in 0..columns {
            if lhs.contains(rhs) {
                continue;
            }
            let rest = all.difference(&lhs).without(rhs);
            if explained(deps, &lhs, rhs) || rest.iter().all(|z| explained(deps, &lhs, z)) {
                continue;
            }
            if let Some(confidence) = independence(table, &rows, &lhs, rhs, &rest) {
                if confidence >= config.mvd_threshold {
                    search.dependencies.push(MultiValuedDependency {
                        lhs: lhs.clone(),
                        rhs: AttributeSet::single(rhs),
                        confidence,
                    });
                }
            }
        }
    }
    search
}

/// Some FD with a determinant inside `lhs` already fixes `attribute`.
fn explained(deps: &DependencySet, lhs: &AttributeSet, attribute: usize) -> bool {
    deps.functional
        .iter()
        .any(|fd| fd.rhs == attribute && fd.lhs.is_subset(lhs))
}

/// Row-weighted independence of `rhs` and `rest` within `lhs` groups, or
/// `None` when no group is informative.
fn independence(
    table: &EncodedTable,
    rows: &[usize],
    lhs: &AttributeSet,
    rhs: usize,
    rest: &AttributeSet,
) -> Option<f64> {
    let rhs_codes = table.column(rhs);
    let mut groups: BTreeMap<Vec<u32>, Vec<(u32, Vec<u32>)>> = BTreeMap::new();
    for &row in rows {
        groups
            .entry(table.key(row, lhs))
            .or_default()
            .push((rhs_codes[row], table.key(row, rest)));
    }

    let mut weighted = 0.0;
    let mut weight = 0usize;
    let mut all_cartesian = true;
    for pairs in groups.values() {
        let ys: HashSet<u32> = pairs.iter().map(|(y, _)| *y).collect();
        let zs: HashSet<&Vec<u32>> = pairs.iter().map(|(_, z)| z).collect();
        if ys.len() < 2 || zs.len() < 2 {
            continue;
        }
        let cartesian = pairs.len() == ys.len() * zs.len();
        let score = if cartesian {
            1.0
        } else {
            1.0 - pair_information(pairs).normalized()
        };
        all_cartesian &= cartesian;
        weighted += score * pairs.len() as f64;
        weight += pairs.len();
    }

    if weight == 0 {
        None
    } else if all_cartesian {
        Some(1.0)
    } else {
        Some(weighted / weight as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableProfile;

    fn offerings() -> TableProfile {
        let mut builder = TableProfile::builder("CourseOffering").columns(["course", "teacher", "book"]);
        for (course, teachers, books) in [
            ("Math", ["Smith", "Jones"], ["Algebra", "Calculus"]),
            ("Physics", ["Smith", "Brown"], ["Mechanics", "Optics"]),
            ("Chemistry", ["Jones", "Brown"], ["Algebra", "Optics"]),
        ] {
            for teacher in teachers {
                for book in books {
                    builder = builder.row([course, teacher, book]);
                }
            }
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_independent_sets_found() {
        let table = EncodedTable::encode(&offerings());
        let search = discover(&table, &DependencySet::default(), &DetectorConfig::default(), None);
        let found: Vec<(Vec<usize>, Vec<usize>, f64)> = search
            .dependencies
            .iter()
            .map(|m| (m.lhs.to_vec(), m.rhs.to_vec(), m.confidence))
            .collect();
        assert_eq!(
            found,
            vec![(vec![0], vec![1], 1.0), (vec![0], vec![2], 1.0)]
        );
    }

    #[test]
    fn test_cyclic_constraint_is_not_an_mvd() {
        let profile = TableProfile::builder("Supply")
            .columns(["supplier", "part", "project"])
            .row(["s1", "p1", "j2"])
            .row(["s1", "p2", "j1"])
            .row(["s2", "p1", "j1"])
            .row(["s1", "p1", "j1"])
            .build()
            .unwrap();
        let table = EncodedTable::encode(&profile);
        let search = discover(&table, &DependencySet::default(), &DetectorConfig::default(), None);
        assert!(search.dependencies.is_empty());
    }

    #[test]
    fn test_two_columns_have_no_mvds() {
        let profile = TableProfile::builder("T")
            .columns(["a", "b"])
            .row(["1", "x"])
            .row(["1", "y"])
            .build()
            .unwrap();
        let table = EncodedTable::encode(&profile);
        let search = discover(&table, &DependencySet::default(), &DetectorConfig::default(), None);
        assert!(search.dependencies.is_empty());
    }
}
