use serde::{Deserialize, Serialize};

use super::{Attribute, Diagnostic, NormalForm, Row, TableProfile};
use crate::error::Result;

/// `columns` reference `references_key` of `references_table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub references_table: String,
    pub references_key: Vec<String>,
}

/// One table of the normalized schema forest. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Attribute>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    /// Alternate keys besides the primary one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidate_keys: Vec<Vec<String>>,
    pub normal_form: NormalForm,
    pub row_count: usize,
    /// Projected data; empty in step snapshots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn foreign_key_to(&self, table: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.references_table == table)
    }

    /// Copy without row data, as recorded in decomposition steps.
    pub fn without_rows(&self) -> TableSchema {
        TableSchema {
            rows: Vec::new(),
            ..self.clone()
        }
    }

    /// Rebuilds a profile from this table so it can be analyzed again.
    pub fn to_profile(&self) -> Result<TableProfile> {
        TableProfile::new(self.name.clone(), self.columns.clone(), self.rows.clone())
    }
}
