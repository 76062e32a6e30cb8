//! Arrow record batches as a profile source.

use arrow::array::Array;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::ProfileSource;
use crate::error::{RelnormError, Result};
use crate::model::{Row, TableProfile};

/// Converts record batches into a profile, rendering every cell as text.
///
/// Arrow nulls become null cells. Every batch must match `schema`.
pub fn profile_from_batches(
    name: impl Into<String>,
    schema: &SchemaRef,
    batches: &[RecordBatch],
) -> Result<TableProfile> {
    let name = name.into();
    let columns: Vec<String> = schema
        .fields()
        .iter()
        .map(|field| field.name().trim().to_string())
        .collect();
    let options = FormatOptions::default();

    let mut rows: Vec<Row> = Vec::new();
    for (index, batch) in batches.iter().enumerate() {
        if batch.num_columns() != columns.len() {
            return Err(RelnormError::data_source(
                "RecordBatch",
                format!(
                    "batch {index} has {} columns, schema has {}",
                    batch.num_columns(),
                    columns.len()
                ),
            ));
        }
        let formatters = batch
            .columns()
            .iter()
            .map(|array| ArrayFormatter::try_new(array.as_ref(), &options))
            .collect::<std::result::Result<Vec<_>, ArrowError>>()?;
        for row in 0..batch.num_rows() {
            let cells: Row = batch
                .columns()
                .iter()
                .zip(&formatters)
                .map(|(array, formatter)| {
                    if array.is_null(row) {
                        None
                    } else {
                        Some(formatter.value(row).to_string())
                    }
                })
                .collect();
            rows.push(cells);
        }
    }

    debug!(table = %name, columns = columns.len(), rows = rows.len(), "Converted record batches");
    TableProfile::from_rows(name, columns, rows)
}

/// Record batches already in memory.
#[derive(Debug, Clone)]
pub struct BatchSource {
    name: String,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl BatchSource {
    pub fn new(name: impl Into<String>, schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self {
            name: name.into(),
            schema,
            batches,
        }
    }
}

#[async_trait]
impl ProfileSource for BatchSource {
    #[instrument(skip(self), fields(table = %self.name, batches = self.batches.len()))]
    async fn load(&self) -> Result<TableProfile> {
        profile_from_batches(self.name.clone(), &self.schema, &self.batches)
    }

    fn table_name(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("{} in-memory record batches", self.batches.len())
    }
}
