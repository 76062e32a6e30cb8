//! Join dependency test used for fifth normal form.
//!
//! A table satisfies the join dependency `*{R1, ..., Rk}` when the natural
//! join of its projections onto `R1..Rk` gives back exactly its rows. Any
//! non-trivial join dependency implies the one over the cover of
//! `(n - 1)`-attribute projections, so that cover is the only one tested.

use std::collections::{HashMap, HashSet};

use crate::detector::EncodedTable;
use crate::model::AttributeSet;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JoinTest {
    /// The projections onto these components join back to the table.
    Lossless(Vec<AttributeSet>),
    /// The join produced spurious rows: no non-trivial join dependency holds.
    Lossy,
    /// An intermediate join grew past the row limit.
    TooLarge,
}

/// Every attribute set missing exactly one attribute, in index order.
pub(crate) fn cover(arity: usize) -> Vec<AttributeSet> {
    let full = AttributeSet::full(arity);
    (0..arity).rev().map(|skip| full.without(skip)).collect()
}

/// Tests the `(n - 1)`-projection cover of a table whose rows are distinct.
pub(crate) fn cover_test(table: &EncodedTable, max_rows: usize) -> JoinTest {
    let components = cover(table.column_count());
    let Some((first, rest)) = components.split_first() else {
        return JoinTest::Lossy;
    };

    let mut attributes = first.clone();
    let mut joined: Vec<Vec<u32>> = project(table, first).into_iter().collect();
    for component in rest {
        let (next_attributes, next) = natural_join(table, &attributes, &joined, component, max_rows);
        match next {
            Some(rows) => {
                attributes = next_attributes;
                joined = rows;
            }
            None => return JoinTest::TooLarge,
        }
    }

    if joined.len() == table.row_count() {
        JoinTest::Lossless(components)
    } else {
        JoinTest::Lossy
    }
}

fn project(table: &EncodedTable, attributes: &AttributeSet) -> HashSet<Vec<u32>> {
    (0..table.row_count())
        .map(|row| table.key(row, attributes))
        .collect()
}

/// Joins partial tuples over `left` with the projection onto `right`.
/// Returns `None` once the result exceeds `max_rows`.
fn natural_join(
    table: &EncodedTable,
    left: &AttributeSet,
    rows: &[Vec<u32>],
    right: &AttributeSet,
    max_rows: usize,
) -> (AttributeSet, Option<Vec<Vec<u32>>>) {
    let combined = left.union(right);
    let common = left.intersection(right);
    let left_positions = positions(left);
    let right_positions = positions(right);

    let mut index: HashMap<Vec<u32>, Vec<Vec<u32>>> = HashMap::new();
    for tuple in project(table, right) {
        let key: Vec<u32> = common.iter().map(|a| tuple[right_positions[&a]]).collect();
        index.entry(key).or_default().push(tuple);
    }

    let mut result: Vec<Vec<u32>> = Vec::new();
    for tuple in rows {
        let key: Vec<u32> = common.iter().map(|a| tuple[left_positions[&a]]).collect();
        let Some(matches) = index.get(&key) else {
            continue;
        };
        for other in matches {
            let merged: Vec<u32> = combined
                .iter()
                .map(|a| match left_positions.get(&a) {
                    Some(&p) => tuple[p],
                    None => other[right_positions[&a]],
                })
                .collect();
            result.push(merged);
            if result.len() > max_rows {
                return (combined, None);
            }
        }
    }
    (combined, Some(result))
}

/// Attribute to its position within the set's index-ordered tuples.
fn positions(set: &AttributeSet) -> HashMap<usize, usize> {
    set.iter().enumerate().map(|(p, a)| (a, p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableProfile;

    fn encode(rows: &[[&str; 3]]) -> EncodedTable {
        let mut builder = TableProfile::builder("Supply").columns(["supplier", "part", "project"]);
        for row in rows {
            builder = builder.row(*row);
        }
        EncodedTable::encode(&builder.build().unwrap())
    }

    #[test]
    fn test_cover_order() {
        let components: Vec<Vec<usize>> = cover(3).iter().map(|c| c.to_vec()).collect();
        assert_eq!(components, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
    }

    #[test]
    fn test_cyclic_table_is_lossless() {
        let table = encode(&[
            ["s1", "p1", "j2"],
            ["s1", "p2", "j1"],
            ["s2", "p1", "j1"],
            ["s1", "p1", "j1"],
        ]);
        assert_eq!(cover_test(&table, 1000), JoinTest::Lossless(cover(3)));
    }

    #[test]
    fn test_missing_row_is_lossy() {
        let table = encode(&[["s1", "p1", "j2"], ["s1", "p2", "j1"], ["s2", "p1", "j1"]]);
        assert_eq!(cover_test(&table, 1000), JoinTest::Lossy);
    }

    #[test]
    fn test_row_limit() {
        let table = encode(&[
            ["s1", "p1", "j2"],
            ["s1", "p2", "j1"],
            ["s2", "p1", "j1"],
            ["s1", "p1", "j1"],
        ]);
        assert_eq!(cover_test(&table, 2), JoinTest::TooLarge);
    }
}
