//! Prelude for commonly used types and traits in relnorm.

pub use crate::config::{DetectorConfig, EngineConfig, PlannerConfig};
pub use crate::detector::DependencyDetector;
pub use crate::engine::NormalizationEngine;
pub use crate::error::{RelnormError, Result};
pub use crate::formatters::{FormatterConfig, HumanFormatter, JsonFormatter, ResultFormatter};
pub use crate::logging::LogConfig;
pub use crate::model::{
    AnalysisResult, AttributeSet, DecompositionStep, Diagnostic, NormalForm, TableProfile,
    TableSchema, Violation, ViolationKind,
};
pub use crate::planner::{NormalizationPlan, NormalizationPlanner};
pub use crate::sources::{CsvOptions, CsvSource, ProfileSource};
