//! Iterative subset enumeration.

use std::collections::HashSet;

use crate::model::AttributeSet;

/// k-combinations of `0..n` in lexicographic order.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
            exhausted: k == 0 || k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }
        let k = self.indices.len();
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.indices[i] < self.n - k + i {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                return Some(self.indices.clone());
            }
        }
        self.exhausted = true;
        None
    }
}

/// Non-empty subsets of `pool` with at most `max_size` members, smallest
/// first, then in index order.
pub fn subsets_by_size(pool: &[usize], max_size: usize) -> impl Iterator<Item = AttributeSet> {
    let pool = pool.to_vec();
    let max_size = max_size.min(pool.len());
    (1..=max_size).flat_map(move |k| {
        let pool = pool.clone();
        Combinations::new(pool.len(), k)
            .map(move |combo| combo.into_iter().map(|i| pool[i]).collect::<AttributeSet>())
    })
}

/// Sets of size k+1 whose every k-subset is in `level`, in lexicographic
/// order.
///
/// `level` holds sets of one size in lexicographic order. Two sets sharing
/// all but their last member are joined; a joined set survives only when
/// each of its k-subsets is in `level`, so no superset of a pruned set is
/// ever produced.
pub fn next_level(level: &[AttributeSet]) -> Vec<AttributeSet> {
    let members: HashSet<&AttributeSet> = level.iter().collect();
    let vectors: Vec<Vec<usize>> = level.iter().map(AttributeSet::to_vec).collect();
    let mut next = Vec::new();
    for (i, left) in vectors.iter().enumerate() {
        let Some((_, prefix)) = left.split_last() else {
            continue;
        };
        for right in &vectors[i + 1..] {
            if !right.starts_with(prefix) {
                break;
            }
            let joined = level[i].with(right[right.len() - 1]);
            if joined.iter().all(|m| members.contains(&joined.without(m))) {
                next.push(joined);
            }
        }
    }
    next
}
