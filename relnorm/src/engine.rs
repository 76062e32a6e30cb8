//! The public entry point: validate, detect, plan, assemble.
//!
//! ## Example
//!
//! ```rust
//! use relnorm::engine::NormalizationEngine;
//! use relnorm::model::{NormalForm, TableProfile};
//!
//! let profile = TableProfile::builder("Student")
//!     .columns(["student_id", "student_name", "course1", "course2"])
//!     .row(["1", "Ann", "Math", "Physics"])
//!     .row(["2", "Ben", "Math", "Chemistry"])
//!     .row(["3", "Cal", "Biology", ""])
//!     .build()
//!     .unwrap();
//!
//! let result = NormalizationEngine::default().analyze(&profile).unwrap();
//! assert_eq!(result.original_nf, NormalForm::Unnormalized);
//! assert!(result.table("StudentCourse").is_some());
//! ```

use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use crate::config::EngineConfig;
use crate::detector::DependencyDetector;
use crate::error::{RelnormError, Result};
use crate::model::{AnalysisResult, DependencySummary, TableProfile};
use crate::planner::NormalizationPlanner;
use crate::sources::ProfileSource;

/// Runs complete analyses under one immutable configuration.
#[derive(Debug, Clone, Default)]
pub struct NormalizationEngine {
    config: EngineConfig,
}

impl NormalizationEngine {
    /// Creates an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyzes one table.
    ///
    /// # Errors
    ///
    /// Returns [`RelnormError::InvalidInput`] when the table has no columns
    /// or no rows. Every other condition is reported as a diagnostic.
    #[instrument(skip(self, profile), fields(table = %profile.name(), columns = profile.column_count(), rows = profile.row_count()))]
    pub fn analyze(&self, profile: &TableProfile) -> Result<AnalysisResult> {
        if profile.column_count() == 0 {
            return Err(RelnormError::invalid_input(format!(
                "table '{}' has no columns",
                profile.name()
            )));
        }
        if profile.row_count() == 0 {
            return Err(RelnormError::invalid_input(format!(
                "table '{}' has no rows",
                profile.name()
            )));
        }

        let detector = DependencyDetector::new(self.config.detector.clone())
            .with_log_config(self.config.log.clone());
        let planner = NormalizationPlanner::new(self.config.planner.clone(), detector)
            .with_log_config(self.config.log.clone());
        let plan = planner.plan(profile)?;

        let result = AnalysisResult {
            analysis_id: analysis_id(profile),
            original_table: profile.name().to_string(),
            original_nf: plan.original_nf,
            final_nf: plan.final_nf,
            target_nf: self.config.planner.target_nf,
            steps_count: plan.steps.len(),
            tables_count: plan.tables.len(),
            violations_count: plan.violations_count(),
            truncated: plan.truncated,
            dependencies: DependencySummary::from_dependencies(profile, &plan.dependencies),
            steps: plan.steps,
            tables: plan.tables,
            diagnostics: plan.diagnostics,
        };

        info!(
            analysis_id = %result.analysis_id,
            original_nf = %result.original_nf,
            final_nf = %result.final_nf,
            steps = result.steps_count,
            tables = result.tables_count,
            violations = result.violations_count,
            "Analysis complete"
        );
        Ok(result)
    }

    /// Loads a table from `source` and analyzes it.
    pub async fn analyze_source(&self, source: &dyn ProfileSource) -> Result<AnalysisResult> {
        let profile = source.load().await?;
        self.analyze(&profile)
    }
}

/// First 16 hex characters of a SHA-256 digest over name, columns and cells.
fn analysis_id(profile: &TableProfile) -> String {
    let mut hasher = Sha256::new();
    hasher.update(profile.name().as_bytes());
    hasher.update([0u8]);
    for attribute in profile.attributes() {
        hasher.update(attribute.name.as_bytes());
        hasher.update([0u8]);
    }
    for row in profile.rows() {
        hasher.update([1u8]);
        for cell in row {
            match cell {
                Some(value) => {
                    hasher.update([2u8]);
                    hasher.update(value.as_bytes());
                }
                None => hasher.update([3u8]),
            }
            hasher.update([0u8]);
        }
    }
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}
