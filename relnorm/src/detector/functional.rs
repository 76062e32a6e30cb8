//! Functional dependency discovery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use super::encoding::EncodedTable;
use super::stats::determination_coefficient;
use super::subsets::subsets_by_size;
use crate::config::DetectorConfig;
use crate::model::{AttributeSet, FunctionalDependency};

/// Below this many determinants the search stays on the calling thread.
pub(crate) const PARALLEL_MIN_CANDIDATES: usize = 64;

pub(crate) struct FunctionalSearch {
    pub dependencies: Vec<FunctionalDependency>,
    pub truncated: bool,
}

/// Evaluates every determinant up to `max_lhs_size` against every other
/// attribute, keeping pairs whose coefficient reaches `min_confidence`.
///
/// Determinants that are unique in the data are skipped: they determine
/// everything vacuously. Output follows enumeration order whatever the
/// number of workers.
pub(crate) fn discover(
    table: &EncodedTable,
    config: &DetectorConfig,
    deadline: Option<Instant>,
) -> FunctionalSearch {
    let columns = table.column_count();
    if table.row_count() < 2 || columns < 2 {
        return FunctionalSearch {
            dependencies: Vec::new(),
            truncated: false,
        };
    }

    let pool: Vec<usize> = (0..columns).collect();
    let max_lhs = config.max_lhs_size.min(columns - 1);
    let mut candidates: Vec<AttributeSet> = subsets_by_size(&pool, max_lhs)
        .take(config.max_candidates.saturating_add(1))
        .collect();
    let mut truncated = candidates.len() > config.max_candidates;
    candidates.truncate(config.max_candidates);

    let timed_out = AtomicBool::new(false);
    let workers = config.parallelism.max(1);
    let dependencies = if workers > 1 && candidates.len() >= PARALLEL_MIN_CANDIDATES {
        let chunk_size = candidates.len().div_ceil(workers);
        let timed_out = &timed_out;
        std::thread::scope(|scope| {
            let handles: Vec<_> = candidates
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || evaluate(table, chunk, config, deadline, timed_out))
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    } else {
        evaluate(table, &candidates, config, deadline, &timed_out)
    };

    truncated |= timed_out.load(Ordering::Relaxed);
    FunctionalSearch {
        dependencies,
        truncated,
    }
}

fn evaluate(
    table: &EncodedTable,
    determinants: &[AttributeSet],
    config: &DetectorConfig,
    deadline: Option<Instant>,
    timed_out: &AtomicBool,
) -> Vec<FunctionalDependency> {
    let mut found = Vec::new();
    for lhs in determinants {
        if timed_out.load(Ordering::Relaxed) {
            break;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            timed_out.store(true, Ordering::Relaxed);
            break;
        }
        if table.is_unique(lhs) {
            continue;
        }
        for rhs in 0..table.column_count() {
            if lhs.contains(rhs) {
                continue;
            }
            let confidence = determination_coefficient(table, lhs, rhs);
            if confidence >= config.min_confidence {
                found.push(FunctionalDependency {
                    lhs: lhs.clone(),
                    rhs,
                    confidence,
                });
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableProfile;

    fn employees() -> EncodedTable {
        let profile = TableProfile::builder("Employee")
            .columns(["emp_id", "dept_id", "dept_name"])
            .row(["1", "D1", "Sales"])
            .row(["2", "D1", "Sales"])
            .row(["3", "D2", "Ops"])
            .row(["4", "D2", "Ops"])
            .row(["5", "D3", "Sales"])
            .build()
            .unwrap();
        EncodedTable::encode(&profile)
    }

    #[test]
    fn test_finds_transitive_dependency() {
        let search = discover(&employees(), &DetectorConfig::sequential(), None);
        assert!(!search.truncated);
        let pairs: Vec<(Vec<usize>, usize)> = search
            .dependencies
            .iter()
            .map(|fd| (fd.lhs.to_vec(), fd.rhs))
            .collect();
        assert_eq!(pairs, vec![(vec![1], 2)]);
        assert_eq!(search.dependencies[0].confidence, 1.0);
    }

    #[test]
    fn test_unique_determinants_are_vacuous() {
        let search = discover(&employees(), &DetectorConfig::sequential(), None);
        assert!(search.dependencies.iter().all(|fd| !fd.lhs.contains(0)));
    }

    #[test]
    fn test_candidate_budget_truncates() {
        let config = DetectorConfig::sequential().with_max_candidates(2);
        let search = discover(&employees(), &config, None);
        assert!(search.truncated);
        // {emp_id} and {dept_id} were examined, {dept_name} was not
        assert_eq!(search.dependencies.len(), 1);
    }

    #[test]
    fn test_single_row_is_empty() {
        let profile = TableProfile::builder("T")
            .columns(["a", "b"])
            .row(["1", "2"])
            .build()
            .unwrap();
        let search = discover(&EncodedTable::encode(&profile), &DetectorConfig::default(), None);
        assert!(search.dependencies.is_empty());
    }
}
