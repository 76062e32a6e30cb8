//! CSV file source.

use async_trait::async_trait;
use datafusion::arrow::datatypes::{DataType, Field, Schema};
use datafusion::prelude::*;
use inflector::Inflector;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{profile_from_batches, ProfileSource};
use crate::error::{RelnormError, Result};
use crate::model::TableProfile;

/// How a CSV file is read.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// First line holds column names; otherwise DataFusion names them `column_1`..
    pub has_header: bool,
    /// Field separator byte
    pub delimiter: u8,
    pub quote: u8,
    /// Lines DataFusion samples before the text re-read
    pub schema_infer_max_records: usize,
    /// Rows to read at most; `None` reads the whole file
    pub max_rows: Option<usize>,
    /// Table name; defaults to the file stem in PascalCase
    pub table_name: Option<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            schema_infer_max_records: 1000,
            max_rows: None,
            table_name: None,
        }
    }
}

/// A CSV file read through DataFusion with every column as text.
///
/// # Examples
///
/// ```rust,ignore
/// use relnorm::sources::{CsvOptions, CsvSource};
///
/// let source = CsvSource::new("data/enrollment.csv")?;
///
/// let options = CsvOptions {
///     delimiter: b'\t',
///     table_name: Some("Enrollment".to_string()),
///     ..Default::default()
/// };
/// let source = CsvSource::with_options("data/enrollment.tsv", options)?;
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: String,
    options: CsvOptions,
}

impl CsvSource {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    /// Fails only on an empty path; the file is opened by `load`.
    pub fn with_options(path: impl Into<String>, options: CsvOptions) -> Result<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(RelnormError::Configuration(
                "CSV path must not be empty".to_string(),
            ));
        }
        Ok(Self { path, options })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    fn read_options(&self) -> CsvReadOptions<'_> {
        CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(self.extension())
    }

    fn extension(&self) -> &str {
        self.path
            .rfind('.')
            .filter(|&dot| !self.path[dot..].contains(['/', '\\']))
            .map(|dot| &self.path[dot..])
            .unwrap_or("")
    }
}

#[async_trait]
impl ProfileSource for CsvSource {
    #[instrument(skip(self), fields(
        source.type = "csv",
        source.path = %self.path,
        csv.delimiter = %(self.options.delimiter as char),
        csv.has_header = self.options.has_header
    ))]
    async fn load(&self) -> Result<TableProfile> {
        if !Path::new(&self.path).is_file() {
            return Err(RelnormError::data_source(
                "CSV",
                format!("file not found: {}", self.path),
            ));
        }
        let ctx = SessionContext::new();

        // Inference only fixes the column names; every column is re-read as
        // text so values keep their original spelling.
        let inferred = ctx.read_csv(self.path.as_str(), self.read_options()).await?;
        let text_schema = Schema::new(
            inferred
                .schema()
                .fields()
                .iter()
                .map(|field| Field::new(field.name(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        );

        let mut df = ctx
            .read_csv(self.path.as_str(), self.read_options().schema(&text_schema))
            .await?;
        if let Some(limit) = self.options.max_rows {
            df = df.limit(0, Some(limit))?;
        }
        let batches = df.collect().await?;

        let profile = profile_from_batches(self.table_name(), &Arc::new(text_schema), &batches)?;
        info!(
            table = %profile.name(),
            columns = profile.column_count(),
            rows = profile.row_count(),
            "Loaded CSV file"
        );
        Ok(profile)
    }

    fn table_name(&self) -> String {
        if let Some(name) = &self.options.table_name {
            return name.clone();
        }
        Path::new(&self.path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem.to_pascal_case())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Table".to_string())
    }

    fn description(&self) -> String {
        format!("CSV file: {}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "{content}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_csv_source_options() {
        let options = CsvOptions {
            delimiter: b'\t',
            has_header: false,
            ..Default::default()
        };
        let source = CsvSource::with_options("data/orders.tsv", options).unwrap();
        assert_eq!(source.options().delimiter, b'\t');
        assert!(!source.options().has_header);
        assert_eq!(source.extension(), ".tsv");
        assert!(source.description().contains("CSV file"));
        assert!(CsvSource::new("  ").is_err());
    }

    #[test]
    fn test_table_name_from_file_stem() {
        let source = CsvSource::new("data/order_lines.csv").unwrap();
        assert_eq!(source.table_name(), "OrderLines");

        let named = CsvSource::with_options(
            "data/order_lines.csv",
            CsvOptions {
                table_name: Some("OrderLine".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(named.table_name(), "OrderLine");
    }

    #[tokio::test]
    async fn test_load_keeps_text() {
        let file = create_test_csv("id,code,name\n1,007,Alice\n2,010,\n3,042,Charlie\n");
        let source = CsvSource::new(file.path().to_str().unwrap()).unwrap();
        let profile = source.load().await.unwrap();

        assert_eq!(profile.column_count(), 3);
        assert_eq!(profile.row_count(), 3);
        let codes: Vec<Option<String>> = profile.column_values(1);
        assert_eq!(codes[0].as_deref(), Some("007"));
        assert_eq!(profile.rows()[1][2], None);
    }

    #[tokio::test]
    async fn test_load_respects_row_limit() {
        let file = create_test_csv("id,name\n1,a\n2,b\n3,c\n4,d\n");
        let options = CsvOptions {
            max_rows: Some(2),
            ..Default::default()
        };
        let source = CsvSource::with_options(file.path().to_str().unwrap(), options).unwrap();
        assert_eq!(source.load().await.unwrap().row_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = CsvSource::new("/definitely/not/here.csv").unwrap();
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, RelnormError::DataSource { .. }));
    }
}
