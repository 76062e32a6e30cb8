//! Counting statistics behind the dependency searches.

use std::collections::HashMap;
use std::hash::Hash;

use super::encoding::EncodedTable;
use crate::model::AttributeSet;

/// Fraction of rows that agree with the most frequent `rhs` value of their
/// `lhs` group.
///
/// 1.0 means `lhs -> rhs` holds on every row. An empty table yields 1.0.
pub fn determination_coefficient(table: &EncodedTable, lhs: &AttributeSet, rhs: usize) -> f64 {
    let rows = table.row_count();
    if rows == 0 {
        return 1.0;
    }
    let rhs_codes = table.column(rhs);
    let mut groups: HashMap<Vec<u32>, HashMap<u32, usize>> = HashMap::new();
    for row in 0..rows {
        *groups
            .entry(table.key(row, lhs))
            .or_default()
            .entry(rhs_codes[row])
            .or_insert(0) += 1;
    }
    let agreeing: usize = groups
        .values()
        .map(|counts| counts.values().copied().max().unwrap_or(0))
        .sum();
    agreeing as f64 / rows as f64
}

/// Shannon entropy in bits of a frequency table.
pub fn entropy<I: IntoIterator<Item = usize>>(counts: I) -> f64 {
    let counts: Vec<usize> = counts.into_iter().filter(|&c| c > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .into_iter()
        .map(|c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Mutual information and marginal entropies of paired observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairInformation {
    pub mutual_information: f64,
    pub left_entropy: f64,
    pub right_entropy: f64,
}

impl PairInformation {
    /// MI scaled by the smaller marginal entropy, in [0, 1].
    pub fn normalized(&self) -> f64 {
        let denominator = self.left_entropy.min(self.right_entropy);
        if denominator <= f64::EPSILON {
            return 0.0;
        }
        (self.mutual_information / denominator).clamp(0.0, 1.0)
    }
}

/// Computes I(X;Y) = H(X) + H(Y) - H(X,Y) over observed pairs.
pub fn pair_information<A, B>(pairs: &[(A, B)]) -> PairInformation
where
    A: Eq + Hash + Clone,
    B: Eq + Hash + Clone,
{
    let mut joint: HashMap<(A, B), usize> = HashMap::new();
    let mut left: HashMap<A, usize> = HashMap::new();
    let mut right: HashMap<B, usize> = HashMap::new();
    for (a, b) in pairs {
        *joint.entry((a.clone(), b.clone())).or_insert(0) += 1;
        *left.entry(a.clone()).or_insert(0) += 1;
        *right.entry(b.clone()).or_insert(0) += 1;
    }
    let left_entropy = entropy(left.into_values());
    let right_entropy = entropy(right.into_values());
    let joint_entropy = entropy(joint.into_values());
    PairInformation {
        mutual_information: (left_entropy + right_entropy - joint_entropy).max(0.0),
        left_entropy,
        right_entropy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableProfile;

    fn encoded(rows: &[[&str; 2]]) -> EncodedTable {
        let mut builder = TableProfile::builder("T").columns(["x", "y"]);
        for row in rows {
            builder = builder.row(*row);
        }
        EncodedTable::encode(&builder.build().unwrap())
    }

    #[test]
    fn test_exact_dependency_has_coefficient_one() {
        let table = encoded(&[["a", "1"], ["a", "1"], ["b", "2"]]);
        assert_eq!(
            determination_coefficient(&table, &AttributeSet::single(0), 1),
            1.0
        );
    }

    #[test]
    fn test_partial_agreement() {
        let table = encoded(&[["a", "1"], ["a", "1"], ["a", "2"], ["b", "2"]]);
        let coefficient = determination_coefficient(&table, &AttributeSet::single(0), 1);
        assert!((coefficient - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_full_lhs_is_always_exact() {
        let table = encoded(&[["a", "1"], ["a", "2"], ["b", "2"], ["a", "1"]]);
        let all = AttributeSet::full(2);
        assert_eq!(determination_coefficient(&table, &all, 0), 1.0);
        assert_eq!(determination_coefficient(&table, &all, 1), 1.0);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(entropy([4]), 0.0);
        assert!((entropy([1, 1]) - 1.0).abs() < 1e-12);
        assert!((entropy([1, 1, 1, 1]) - 2.0).abs() < 1e-12);
        assert_eq!(entropy(Vec::<usize>::new()), 0.0);
    }

    #[test]
    fn test_pair_information_independent_and_dependent() {
        let independent = pair_information(&[(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert!(independent.mutual_information.abs() < 1e-12);
        assert!(independent.normalized() < 1e-12);

        let dependent = pair_information(&[(0, 0), (1, 1), (2, 2)]);
        assert!((dependent.normalized() - 1.0).abs() < 1e-12);

        let constant = pair_information(&[(0, 5), (0, 6)]);
        assert_eq!(constant.normalized(), 0.0);
    }
}
