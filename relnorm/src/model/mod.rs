//! Data model shared by the detector, the planner and the result contract.

mod attribute;
mod dependency;
mod normal_form;
mod profile;
mod result;
mod schema;

pub use attribute::{Attribute, ScalarType, SAMPLE_VALUES};
pub use dependency::{
    AttributeSet, CandidateKey, DependencySet, FunctionalDependency, MultiValuedDependency,
    SearchKind,
};
pub use normal_form::NormalForm;
pub use profile::{Row, TableProfile, TableProfileBuilder};
pub use result::{
    AnalysisResult, DecompositionStep, DependencySummary, Diagnostic, NamedFunctionalDependency,
    NamedMultiValuedDependency, Violation, ViolationKind,
};
pub use schema::{ForeignKey, TableSchema};
