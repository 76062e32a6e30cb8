use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::TableProfile;

/// Set of column indices of one table profile.
///
/// Iteration is always in ascending index order, which is the order used for
/// every tie-break in detection and planning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeSet<usize>);

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(index: usize) -> Self {
        Self(BTreeSet::from([index]))
    }

    /// `{0, 1, ..., n - 1}`
    pub fn full(n: usize) -> Self {
        Self((0..n).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn insert(&mut self, index: usize) -> bool {
        self.0.insert(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    pub fn is_subset(&self, other: &AttributeSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_proper_subset(&self, other: &AttributeSet) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }

    pub fn intersects(&self, other: &AttributeSet) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    pub fn union(&self, other: &AttributeSet) -> AttributeSet {
        Self(self.0.union(&other.0).copied().collect())
    }

    pub fn difference(&self, other: &AttributeSet) -> AttributeSet {
        Self(self.0.difference(&other.0).copied().collect())
    }

    pub fn intersection(&self, other: &AttributeSet) -> AttributeSet {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    pub fn without(&self, index: usize) -> AttributeSet {
        let mut set = self.clone();
        set.0.remove(&index);
        set
    }

    pub fn with(&self, index: usize) -> AttributeSet {
        let mut set = self.clone();
        set.0.insert(index);
        set
    }

    pub fn first(&self) -> Option<usize> {
        self.0.first().copied()
    }
}

impl FromIterator<usize> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|i| i.to_string()).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// `lhs -> rhs` with an empirical confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalDependency {
    pub lhs: AttributeSet,
    pub rhs: usize,
    pub confidence: f64,
}

impl FunctionalDependency {
    /// Holds on every row of the data it was measured on.
    pub fn is_exact(&self) -> bool {
        self.confidence >= 1.0
    }

    pub fn describe(&self, profile: &TableProfile) -> String {
        format!(
            "{} -> {}",
            profile.names(&self.lhs).join(", "),
            profile.names(&AttributeSet::single(self.rhs)).join(", ")
        )
    }
}

/// `lhs ->> rhs`; the remaining attributes vary independently of `rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiValuedDependency {
    pub lhs: AttributeSet,
    pub rhs: AttributeSet,
    pub confidence: f64,
}

impl MultiValuedDependency {
    pub fn is_exact(&self) -> bool {
        self.confidence >= 1.0
    }

    pub fn describe(&self, profile: &TableProfile) -> String {
        format!(
            "{} ->> {}",
            profile.names(&self.lhs).join(", "),
            profile.names(&self.rhs).join(", ")
        )
    }
}

/// A minimal key. The first key a search reports is the primary one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateKey {
    pub attributes: AttributeSet,
    pub primary: bool,
}

/// Everything the detector learned about one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencySet {
    pub functional: Vec<FunctionalDependency>,
    pub multivalued: Vec<MultiValuedDependency>,
    pub candidate_keys: Vec<CandidateKey>,
    /// No natural key exists; a surrogate must be inserted.
    pub needs_surrogate_key: bool,
    /// Searches that stopped at their budget.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub truncated: Vec<SearchKind>,
}

/// The three dependency searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    FunctionalDependencies,
    CandidateKeys,
    MultiValuedDependencies,
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FunctionalDependencies => "functional dependency",
            Self::CandidateKeys => "candidate key",
            Self::MultiValuedDependencies => "multi-valued dependency",
        })
    }
}

impl DependencySet {
    pub fn is_truncated(&self) -> bool {
        !self.truncated.is_empty()
    }

    pub fn primary_key(&self) -> Option<&CandidateKey> {
        self.candidate_keys.iter().find(|k| k.primary)
    }

    /// Attributes that belong to some candidate key.
    pub fn prime_attributes(&self) -> AttributeSet {
        self.candidate_keys
            .iter()
            .fold(AttributeSet::new(), |acc, key| acc.union(&key.attributes))
    }

    pub fn exact_functional(&self) -> impl Iterator<Item = &FunctionalDependency> {
        self.functional.iter().filter(|fd| fd.is_exact())
    }

    /// FDs at or above `min_confidence` whose LHS has no proper subset that
    /// determines the same RHS at that confidence.
    pub fn left_reduced(&self, min_confidence: f64) -> Vec<&FunctionalDependency> {
        let strong: Vec<&FunctionalDependency> = self
            .functional
            .iter()
            .filter(|fd| fd.confidence >= min_confidence)
            .collect();
        strong
            .iter()
            .filter(|fd| {
                !strong.iter().any(|other| {
                    other.rhs == fd.rhs && other.lhs.is_proper_subset(&fd.lhs)
                })
            })
            .copied()
            .collect()
    }

    /// Fixed point of `set` under the exact FDs.
    pub fn closure(&self, set: &AttributeSet) -> AttributeSet {
        let mut closure = set.clone();
        loop {
            let mut changed = false;
            for fd in self.exact_functional() {
                if !closure.contains(fd.rhs) && fd.lhs.is_subset(&closure) {
                    closure.insert(fd.rhs);
                    changed = true;
                }
            }
            if !changed {
                return closure;
            }
        }
    }
}
