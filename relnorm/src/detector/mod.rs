//! Statistical dependency detection over table data.
//!
//! The detector runs three searches on a [`TableProfile`]:
//!
//! - functional dependencies, scored by determination coefficient
//! - candidate keys, found breadth-first over null-free attributes
//! - multi-valued dependencies, scored by conditional independence
//!
//! Every search is bounded by [`DetectorConfig::max_candidates`] and the
//! optional time budget. A search that stops early leaves its partial results
//! in place and is listed in [`DependencySet::truncated`].
//!
//! ## Example
//!
//! ```rust
//! use relnorm::detector::DependencyDetector;
//! use relnorm::model::TableProfile;
//!
//! let profile = TableProfile::builder("Employee")
//!     .columns(["emp_id", "dept_id", "dept_name"])
//!     .row(["1", "D1", "Sales"])
//!     .row(["2", "D1", "Sales"])
//!     .row(["3", "D2", "Ops"])
//!     .build()
//!     .unwrap();
//!
//! let deps = DependencyDetector::default().detect(&profile);
//! let described: Vec<String> = deps.functional.iter().map(|fd| fd.describe(&profile)).collect();
//! assert!(described.contains(&"dept_id -> dept_name".to_string()));
//! assert_eq!(profile.names(&deps.primary_key().unwrap().attributes), vec!["emp_id"]);
//! ```

mod encoding;
mod functional;
mod keys;
mod multivalued;
mod stats;
mod subsets;

use std::time::Instant;
use tracing::{debug, instrument, warn};

pub(crate) use encoding::EncodedTable;
pub(crate) use keys::is_superkey;
pub use stats::{entropy, pair_information, PairInformation};

use crate::config::DetectorConfig;
use crate::logging::{truncate_field, LogConfig};
use crate::model::{
    AttributeSet, CandidateKey, DependencySet, FunctionalDependency, MultiValuedDependency,
    SearchKind, TableProfile,
};

/// Runs the dependency searches with one configuration.
#[derive(Debug, Clone, Default)]
pub struct DependencyDetector {
    config: DetectorConfig,
    log: LogConfig,
}

impl DependencyDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            log: LogConfig::default(),
        }
    }

    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Runs all three searches. Keys and MVDs are derived with the FDs found
    /// first, so the order is fixed.
    #[instrument(skip(self, profile), fields(table = %profile.name(), rows = profile.row_count()))]
    pub fn detect(&self, profile: &TableProfile) -> DependencySet {
        let start = Instant::now();
        let table = EncodedTable::encode(profile);
        let mut deps = DependencySet::default();

        let functional = functional::discover(&table, &self.config, self.deadline());
        deps.functional = functional.dependencies;
        if functional.truncated {
            deps.truncated.push(SearchKind::FunctionalDependencies);
        }

        let keys = keys::search(&table, &deps, &self.config, self.deadline());
        deps.candidate_keys = keys.keys;
        deps.needs_surrogate_key = keys.needs_surrogate;
        if keys.truncated {
            deps.truncated.push(SearchKind::CandidateKeys);
        }

        let multivalued = multivalued::discover(&table, &deps, &self.config, self.deadline());
        deps.multivalued = multivalued.dependencies;
        if multivalued.truncated {
            deps.truncated.push(SearchKind::MultiValuedDependencies);
        }

        self.log_findings(profile, &deps);
        for search in &deps.truncated {
            warn!(table = %profile.name(), %search, "Search stopped at its budget");
        }
        crate::search_debug!(
            self.log,
            table = %profile.name(),
            fds = deps.functional.len(),
            keys = deps.candidate_keys.len(),
            mvds = deps.multivalued.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Dependency detection finished"
        );
        deps
    }

    /// Functional dependencies only, with whether the search was cut short.
    pub fn functional_dependencies(&self, profile: &TableProfile) -> (Vec<FunctionalDependency>, bool) {
        let table = EncodedTable::encode(profile);
        let search = functional::discover(&table, &self.config, self.deadline());
        (search.dependencies, search.truncated)
    }

    /// Candidate keys given previously detected FDs.
    pub fn candidate_keys(&self, profile: &TableProfile, deps: &DependencySet) -> Vec<CandidateKey> {
        let table = EncodedTable::encode(profile);
        keys::search(&table, deps, &self.config, self.deadline()).keys
    }

    /// MVDs given previously detected FDs.
    pub fn multivalued_dependencies(
        &self,
        profile: &TableProfile,
        deps: &DependencySet,
    ) -> Vec<MultiValuedDependency> {
        let table = EncodedTable::encode(profile);
        multivalued::discover(&table, deps, &self.config, self.deadline()).dependencies
    }

    /// Whether `set` determines every attribute of `profile`.
    pub fn is_superkey(&self, profile: &TableProfile, deps: &DependencySet, set: &AttributeSet) -> bool {
        keys::is_superkey(&EncodedTable::encode(profile), deps, set)
    }

    /// Share of rows agreeing with the majority `rhs` value of their `lhs`
    /// group; 1.0 exactly when `lhs -> rhs` holds on every row.
    pub fn determination(&self, profile: &TableProfile, lhs: &AttributeSet, rhs: usize) -> f64 {
        stats::determination_coefficient(&EncodedTable::encode(profile), lhs, rhs)
    }

    fn deadline(&self) -> Option<Instant> {
        self.config.time_budget().map(|budget| Instant::now() + budget)
    }

    fn log_findings(&self, profile: &TableProfile, deps: &DependencySet) {
        for fd in &deps.functional {
            crate::log_dependency!(
                self.log,
                table = %profile.name(),
                dependency = %truncate_field(&fd.describe(profile), self.log.max_field_length),
                confidence = fd.confidence,
                "Functional dependency"
            );
        }
        for key in &deps.candidate_keys {
            crate::log_dependency!(
                self.log,
                table = %profile.name(),
                key = %profile.names(&key.attributes).join(", "),
                primary = key.primary,
                "Candidate key"
            );
        }
        for mvd in &deps.multivalued {
            crate::log_dependency!(
                self.log,
                table = %profile.name(),
                dependency = %truncate_field(&mvd.describe(profile), self.log.max_field_length),
                confidence = mvd.confidence,
                "Multi-valued dependency"
            );
        }
        if deps.needs_surrogate_key {
            debug!(table = %profile.name(), "No natural key over null-free columns");
        }
    }
}
