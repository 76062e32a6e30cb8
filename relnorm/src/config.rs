//! Configuration for detection and planning.
//!
//! Every knob has a default, and each struct deserializes with
//! `#[serde(default)]`, so a JSON document only needs the fields it changes:
//!
//! ```rust
//! use relnorm::config::EngineConfig;
//! use relnorm::model::NormalForm;
//!
//! let config = EngineConfig::from_json(r#"{"planner": {"target_nf": "3NF"}}"#).unwrap();
//! assert_eq!(config.planner.target_nf, NormalForm::Third);
//! assert_eq!(config.detector.max_lhs_size, 3);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{RelnormError, Result};
use crate::logging::LogConfig;
use crate::model::NormalForm;

/// Bounds and thresholds for the dependency searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Largest determinant considered for FDs (default: 3)
    pub max_lhs_size: usize,
    /// Minimum determination coefficient for an FD (default: 0.95)
    pub min_confidence: f64,
    /// Largest key searched; `None` searches up to all attributes
    pub max_key_size: Option<usize>,
    /// Largest determinant considered for MVDs (default: 2)
    pub max_mvd_lhs_size: usize,
    /// Minimum independence score for an MVD (default: 0.9)
    pub mvd_threshold: f64,
    /// Attribute subsets examined per search before it is truncated
    pub max_candidates: usize,
    /// Wall-clock budget per search in milliseconds
    pub time_budget_ms: Option<u64>,
    /// Worker threads for FD evaluation (default: number of CPUs)
    pub parallelism: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_lhs_size: 3,
            min_confidence: 0.95,
            max_key_size: None,
            max_mvd_lhs_size: 2,
            mvd_threshold: 0.9,
            max_candidates: 100_000,
            time_budget_ms: None,
            parallelism: num_cpus::get(),
        }
    }
}

impl DetectorConfig {
    /// Single-threaded searches.
    pub fn sequential() -> Self {
        Self {
            parallelism: 1,
            ..Self::default()
        }
    }

    pub fn with_max_lhs_size(mut self, size: usize) -> Self {
        self.max_lhs_size = size;
        self
    }

    /// Sets the FD confidence threshold, clamped to [0, 1].
    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_key_size(mut self, size: usize) -> Self {
        self.max_key_size = Some(size);
        self
    }

    pub fn with_mvd_threshold(mut self, threshold: f64) -> Self {
        self.mvd_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_candidates(mut self, budget: usize) -> Self {
        self.max_candidates = budget;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = Some(budget.as_millis() as u64);
        self
    }

    pub fn with_parallelism(mut self, workers: usize) -> Self {
        self.parallelism = workers.max(1);
        self
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_lhs_size == 0 {
            return Err(RelnormError::Configuration(
                "max_lhs_size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) || !(0.0..=1.0).contains(&self.mvd_threshold)
        {
            return Err(RelnormError::Configuration(
                "confidence thresholds must lie in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bounds and heuristics for the normalization planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Highest normal form attempted (default: 5NF)
    pub target_nf: NormalForm,
    /// Split actions allowed per run (default: 20)
    pub step_budget: usize,
    /// Nested BCNF and 4NF splits allowed per branch within one level (default: 8)
    pub max_recursion_depth: usize,
    /// Dependencies below this confidence never drive a split (default: 1.0)
    pub min_decomposition_confidence: f64,
    /// Share of non-null values that must be delimited lists for 1NF (default: 0.5)
    pub repeating_value_ratio: f64,
    /// Delimiters recognized in multi-valued cells
    pub delimiters: Vec<char>,
    /// Widest table tested for join dependencies (default: 6)
    pub max_join_attributes: usize,
    /// Fewest rows a join dependency test needs (default: 4)
    pub min_join_rows: usize,
    /// Intermediate join size at which the 5NF test gives up
    pub max_join_rows: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            target_nf: NormalForm::Fifth,
            step_budget: 20,
            max_recursion_depth: 8,
            min_decomposition_confidence: 1.0,
            repeating_value_ratio: 0.5,
            delimiters: vec![',', ';', '|'],
            max_join_attributes: 6,
            min_join_rows: 4,
            max_join_rows: 100_000,
        }
    }
}

impl PlannerConfig {
    pub fn with_target(mut self, target: NormalForm) -> Self {
        self.target_nf = target;
        self
    }

    pub fn with_step_budget(mut self, budget: usize) -> Self {
        self.step_budget = budget;
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn with_min_decomposition_confidence(mut self, confidence: f64) -> Self {
        self.min_decomposition_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_delimiters(mut self, delimiters: Vec<char>) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_nf == NormalForm::Unnormalized {
            return Err(RelnormError::Configuration(
                "target normal form must be at least 1NF".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.repeating_value_ratio) {
            return Err(RelnormError::Configuration(
                "repeating_value_ratio must lie in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete configuration of a [`NormalizationEngine`](crate::engine::NormalizationEngine).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub detector: DetectorConfig,
    pub planner: PlannerConfig,
    pub log: LogConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn with_target(mut self, target: NormalForm) -> Self {
        self.planner.target_nf = target;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.planner.validate()
    }
}
