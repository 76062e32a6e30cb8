use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Attribute, AttributeSet, ScalarType};
use crate::error::{RelnormError, Result};

/// One row of cells; `None` is a null.
pub type Row = Vec<Option<String>>;

/// Immutable snapshot of a table: profiled columns plus row data.
///
/// Cells that are empty or whitespace-only are stored as nulls. Rows keep
/// their input order and may contain duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProfile {
    name: String,
    attributes: Vec<Attribute>,
    rows: Vec<Row>,
}

impl TableProfile {
    /// Builds a profile from pre-profiled attributes and rows.
    ///
    /// Fails when column names repeat or a row's width differs from the
    /// column count.
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>, rows: Vec<Row>) -> Result<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        for attribute in &attributes {
            if !seen.insert(attribute.name.as_str()) {
                return Err(RelnormError::invalid_input(format!(
                    "table '{name}' has duplicate column '{}'",
                    attribute.name
                )));
            }
        }
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != attributes.len())
        {
            return Err(RelnormError::invalid_input(format!(
                "row {index} of table '{name}' has {} cells, expected {}",
                row.len(),
                attributes.len()
            )));
        }
        let rows = rows.into_iter().map(normalize_row).collect();
        Ok(Self {
            name,
            attributes,
            rows,
        })
    }

    /// Profiles raw string rows, inferring every column's type.
    pub fn from_rows<S: Into<String>>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Row>,
    ) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let rows: Vec<Row> = rows.into_iter().map(normalize_row).collect();
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(RelnormError::invalid_input(format!(
                "row {index} has {} cells, expected {}",
                row.len(),
                columns.len()
            )));
        }
        let attributes = columns
            .into_iter()
            .enumerate()
            .map(|(index, column)| Attribute::profile(column, &column_values(&rows, index)))
            .collect();
        Self::new(name, attributes, rows)
    }

    /// Starts a builder for small in-memory tables.
    pub fn builder(name: impl Into<String>) -> TableProfileBuilder {
        TableProfileBuilder {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() || self.rows.is_empty()
    }

    /// Index of the column called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Resolves column names to an attribute set; unknown names yield `None`.
    pub fn attribute_set<S: AsRef<str>>(&self, names: &[S]) -> Option<AttributeSet> {
        names
            .iter()
            .map(|name| self.index_of(name.as_ref()))
            .collect::<Option<AttributeSet>>()
    }

    /// Column names of an attribute set, in index order.
    pub fn names(&self, set: &AttributeSet) -> Vec<String> {
        set.iter()
            .filter_map(|i| self.attributes.get(i).map(|a| a.name.clone()))
            .collect()
    }

    /// Every column's index.
    pub fn all_attributes(&self) -> AttributeSet {
        AttributeSet::full(self.attributes.len())
    }

    /// Cells of one column.
    pub fn column_values(&self, index: usize) -> Vec<Option<String>> {
        column_values(&self.rows, index)
    }

    /// Projects onto `columns` (in the given order) under a new name.
    ///
    /// Duplicate projected rows are removed, keeping the first occurrence.
    /// Attributes keep their type and lineage and are re-profiled.
    pub fn project(&self, name: impl Into<String>, columns: &[usize]) -> TableProfile {
        let mut seen: HashSet<Row> = HashSet::new();
        let mut rows = Vec::new();
        for row in &self.rows {
            let projected: Row = columns.iter().map(|&i| row[i].clone()).collect();
            if seen.insert(projected.clone()) {
                rows.push(projected);
            }
        }
        let attributes = columns
            .iter()
            .enumerate()
            .map(|(position, &i)| self.attributes[i].reprofile(&column_values(&rows, position)))
            .collect();
        TableProfile {
            name: name.into(),
            attributes,
            rows,
        }
    }

    /// Returns a copy with a surrogate integer key prepended, numbered from 1.
    pub fn with_surrogate_key(&self, column: impl Into<String>) -> TableProfile {
        let values: Vec<Option<String>> = (1..=self.rows.len()).map(|i| Some(i.to_string())).collect();
        let key = Attribute::profile_as(column, ScalarType::Integer, &values).into_synthetic();
        let mut attributes = Vec::with_capacity(self.attributes.len() + 1);
        attributes.push(key);
        attributes.extend(self.attributes.iter().cloned());
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, id)| {
                let mut out = Vec::with_capacity(row.len() + 1);
                out.push(id);
                out.extend(row.iter().cloned());
                out
            })
            .collect();
        TableProfile {
            name: self.name.clone(),
            attributes,
            rows,
        }
    }

    /// Same data under another name.
    pub fn renamed(&self, name: impl Into<String>) -> TableProfile {
        TableProfile {
            name: name.into(),
            attributes: self.attributes.clone(),
            rows: self.rows.clone(),
        }
    }
}

/// Builder for [`TableProfile`].
///
/// ```rust
/// use relnorm::model::TableProfile;
///
/// let profile = TableProfile::builder("Student")
///     .columns(["student_id", "student_name"])
///     .row(["1", "Ann"])
///     .row(["2", "Ben"])
///     .build()
///     .unwrap();
/// assert_eq!(profile.row_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TableProfileBuilder {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TableProfileBuilder {
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    pub fn columns<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.columns.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds a row of non-null cells; empty strings become nulls.
    pub fn row<S: AsRef<str>>(mut self, cells: impl IntoIterator<Item = S>) -> Self {
        self.rows
            .push(cells.into_iter().map(|c| Some(c.as_ref().to_string())).collect());
        self
    }

    /// Adds a row that may contain nulls.
    pub fn nullable_row(mut self, cells: Row) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn build(self) -> Result<TableProfile> {
        TableProfile::from_rows(self.name, self.columns, self.rows)
    }
}

fn normalize_row(row: Row) -> Row {
    row.into_iter()
        .map(|cell| cell.filter(|v| !v.trim().is_empty()))
        .collect()
}

fn column_values(rows: &[Row], index: usize) -> Vec<Option<String>> {
    rows.iter().map(|row| row[index].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn students() -> TableProfile {
        TableProfile::builder("Student")
            .columns(["student_id", "student_name", "major"])
            .row(["1", "Ann", "Math"])
            .row(["2", "Ben", "Math"])
            .row(["3", "Cal", ""])
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_profiles_columns() {
        let profile = students();
        assert_eq!(profile.column_count(), 3);
        assert_eq!(profile.row_count(), 3);
        assert_eq!(profile.attributes()[0].data_type, ScalarType::Integer);
        assert!(profile.attributes()[2].nullable);
        assert_eq!(profile.rows()[2][2], None);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = TableProfile::builder("T")
            .columns(["a", "b"])
            .row(["1"])
            .build()
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = TableProfile::builder("T")
            .columns(["a", "a"])
            .row(["1", "2"])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate column 'a'"));
    }

    #[test]
    fn test_project_deduplicates() {
        let profile = students();
        let majors = profile.project("Major", &[2]);
        assert_eq!(majors.row_count(), 2);
        assert_eq!(majors.attributes()[0].name, "major");
        assert_eq!(majors.attributes()[0].distinct_count, 1);
        assert!(majors.attributes()[0].nullable);
    }

    #[test]
    fn test_surrogate_key_prepended() {
        let profile = students().with_surrogate_key("student_sk");
        assert_eq!(profile.attributes()[0].name, "student_sk");
        assert!(profile.attributes()[0].synthetic);
        assert_eq!(profile.rows()[2][0].as_deref(), Some("3"));
        assert_eq!(profile.column_count(), 4);
    }

    #[test]
    fn test_name_resolution() {
        let profile = students();
        let set = profile.attribute_set(&["major", "student_id"]).unwrap();
        assert_eq!(profile.names(&set), vec!["student_id", "major"]);
        assert!(profile.attribute_set(&["missing"]).is_none());
    }
}
