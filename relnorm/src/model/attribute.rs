use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::inference::TypeInferenceEngine;

/// Number of sample values kept per attribute.
pub const SAMPLE_VALUES: usize = 5;

/// SQL-facing scalar type inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScalarType {
    #[serde(rename = "INT")]
    Integer,
    BigInt,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Varchar,
    Text,
}

impl ScalarType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            Self::Integer => "INT",
            Self::BigInt => "BIGINT",
            Self::Decimal => "DECIMAL",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::DateTime => "DATETIME",
            Self::Varchar => "VARCHAR",
            Self::Text => "TEXT",
        }
    }

    /// Whether values of this type are free text.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Varchar | Self::Text)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A profiled column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub data_type: ScalarType,
    pub nullable: bool,
    pub distinct_count: usize,
    pub sample_values: Vec<String>,
    /// Original columns this one replaces, e.g. `course` for `course1`, `course2`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived_from: Vec<String>,
    /// Set on surrogate keys the planner inserted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl Attribute {
    /// Profiles a column from its cells, inferring the scalar type.
    pub fn profile(name: impl Into<String>, values: &[Option<String>]) -> Self {
        let data_type = TypeInferenceEngine::shared().infer(values);
        Self::profile_as(name, data_type, values)
    }

    /// Profiles a column whose type is already known.
    pub fn profile_as(
        name: impl Into<String>,
        data_type: ScalarType,
        values: &[Option<String>],
    ) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut sample_values = Vec::new();
        let mut nullable = false;
        for value in values {
            match value {
                None => nullable = true,
                Some(v) => {
                    if seen.insert(v.as_str()) && sample_values.len() < SAMPLE_VALUES {
                        sample_values.push(v.clone());
                    }
                }
            }
        }
        Self {
            name: name.into(),
            data_type,
            nullable,
            distinct_count: seen.len(),
            sample_values,
            derived_from: Vec::new(),
            synthetic: false,
        }
    }

    /// Re-profiles this attribute over a new set of values, keeping its type and lineage.
    pub fn reprofile(&self, values: &[Option<String>]) -> Self {
        let mut attribute = Self::profile_as(self.name.clone(), self.data_type, values);
        attribute.derived_from = self.derived_from.clone();
        attribute.synthetic = self.synthetic;
        attribute
    }

    pub fn with_derived_from(mut self, columns: Vec<String>) -> Self {
        self.derived_from = columns;
        self
    }

    pub fn into_synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }
}
