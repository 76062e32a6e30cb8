use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DependencySet, NormalForm, SearchKind, TableProfile, TableSchema};

/// What rule a table broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Numbered columns holding the same kind of value (`phone1`, `phone2`).
    RepeatingGroup,
    /// Cells holding delimited lists of values.
    MultiValuedColumn,
    /// A non-prime attribute depends on part of the primary key.
    PartialDependency,
    /// A non-prime attribute depends on a non-superkey.
    TransitiveDependency,
    /// Any attribute depends on a non-superkey.
    NonSuperkeyDeterminant,
    /// An independent set of values hangs off a non-superkey.
    MultiValuedDependency,
    /// The table is the join of three or more of its projections.
    JoinDependency,
}

impl ViolationKind {
    /// The level this kind of violation blocks.
    pub fn normal_form(&self) -> NormalForm {
        match self {
            Self::RepeatingGroup | Self::MultiValuedColumn => NormalForm::First,
            Self::PartialDependency => NormalForm::Second,
            Self::TransitiveDependency => NormalForm::Third,
            Self::NonSuperkeyDeterminant => NormalForm::BoyceCodd,
            Self::MultiValuedDependency => NormalForm::Fourth,
            Self::JoinDependency => NormalForm::Fifth,
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::RepeatingGroup => "repeating group",
            Self::MultiValuedColumn => "multi-valued column",
            Self::PartialDependency => "partial dependency",
            Self::TransitiveDependency => "transitive dependency",
            Self::NonSuperkeyDeterminant => "non-superkey determinant",
            Self::MultiValuedDependency => "multi-valued dependency",
            Self::JoinDependency => "join dependency",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Table the violation was found in.
    pub table: String,
    /// Every attribute involved.
    pub attributes: Vec<String>,
    pub determinant: Vec<String>,
    pub dependents: Vec<String>,
    pub explanation: String,
    /// The split that removes the violation.
    #[serde(default)]
    pub resolution: String,
}

/// Non-fatal conditions met during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A dependency search stopped at its budget; results are partial.
    SearchTruncated { table: String, search: SearchKind },
    /// No natural key existed, so `column` was added.
    SyntheticKeyInserted { table: String, column: String },
    /// A branch needed more nested splits than allowed and was frozen.
    DecompositionLoopGuardTripped {
        table: String,
        normal_form: NormalForm,
        depth: usize,
    },
    /// 5NF could be neither confirmed nor refuted; the table stays at 4NF.
    JoinDependencyInconclusive { table: String, reason: String },
}

impl Diagnostic {
    pub fn table(&self) -> &str {
        match self {
            Self::SearchTruncated { table, .. }
            | Self::SyntheticKeyInserted { table, .. }
            | Self::DecompositionLoopGuardTripped { table, .. }
            | Self::JoinDependencyInconclusive { table, .. } => table,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchTruncated { table, search } => {
                write!(f, "{search} search on '{table}' hit its budget; results are partial")
            }
            Self::SyntheticKeyInserted { table, column } => {
                write!(f, "'{table}' has no natural key; surrogate '{column}' inserted")
            }
            Self::DecompositionLoopGuardTripped {
                table,
                normal_form,
                depth,
            } => write!(
                f,
                "'{table}' still violates {normal_form} after {depth} nested splits; branch frozen"
            ),
            Self::JoinDependencyInconclusive { table, reason } => {
                write!(f, "5NF check on '{table}' inconclusive: {reason}")
            }
        }
    }
}

/// One executed normal-form transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionStep {
    pub from_nf: NormalForm,
    pub to_nf: NormalForm,
    pub violations: Vec<Violation>,
    pub explanation: String,
    /// Tables of the forest after this step, without row data.
    pub tables: Vec<TableSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedFunctionalDependency {
    pub lhs: Vec<String>,
    pub rhs: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedMultiValuedDependency {
    pub lhs: Vec<String>,
    pub rhs: Vec<String>,
    pub confidence: f64,
}

/// Dependencies of the input table, by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencySummary {
    pub functional: Vec<NamedFunctionalDependency>,
    pub multivalued: Vec<NamedMultiValuedDependency>,
    pub candidate_keys: Vec<Vec<String>>,
    pub primary_key: Vec<String>,
}

impl DependencySummary {
    pub fn from_dependencies(profile: &TableProfile, deps: &DependencySet) -> Self {
        let functional = deps
            .functional
            .iter()
            .map(|fd| NamedFunctionalDependency {
                lhs: profile.names(&fd.lhs),
                rhs: profile.attributes()[fd.rhs].name.clone(),
                confidence: fd.confidence,
            })
            .collect();
        let multivalued = deps
            .multivalued
            .iter()
            .map(|mvd| NamedMultiValuedDependency {
                lhs: profile.names(&mvd.lhs),
                rhs: profile.names(&mvd.rhs),
                confidence: mvd.confidence,
            })
            .collect();
        let candidate_keys = deps
            .candidate_keys
            .iter()
            .map(|key| profile.names(&key.attributes))
            .collect();
        let primary_key = deps
            .primary_key()
            .map(|key| profile.names(&key.attributes))
            .unwrap_or_default();
        Self {
            functional,
            multivalued,
            candidate_keys,
            primary_key,
        }
    }
}

/// Outcome of one analysis run. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub original_table: String,
    pub original_nf: NormalForm,
    pub final_nf: NormalForm,
    pub target_nf: NormalForm,
    pub steps_count: usize,
    pub tables_count: usize,
    pub violations_count: usize,
    /// The step budget ran out before the target was reached.
    pub truncated: bool,
    pub steps: Vec<DecompositionStep>,
    pub tables: Vec<TableSchema>,
    pub dependencies: DependencySummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    pub fn is_fully_normalized(&self) -> bool {
        !self.truncated && self.final_nf >= self.target_nf
    }

    pub fn all_violations(&self) -> impl Iterator<Item = &super::Violation> {
        self.steps.iter().flat_map(|step| step.violations.iter())
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
