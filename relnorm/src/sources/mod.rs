//! Loading tables into [`TableProfile`]s.
//!
//! Sources read their data through DataFusion and Arrow and hand every cell
//! to the profiler as text, so the type inference of
//! [`crate::inference`] sees the raw values.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::Result;
use crate::model::TableProfile;

mod batches;
mod csv;

pub use batches::{profile_from_batches, BatchSource};
pub use csv::{CsvOptions, CsvSource};

/// Something a table profile can be loaded from.
///
/// # Examples
///
/// ```rust,ignore
/// use relnorm::sources::{CsvSource, ProfileSource};
///
/// # async fn example() -> relnorm::error::Result<()> {
/// let source = CsvSource::new("data/orders.csv")?;
/// let profile = source.load().await?;
/// println!("{} rows", profile.row_count());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ProfileSource: Debug + Send + Sync {
    /// Reads the data and profiles every column.
    async fn load(&self) -> Result<TableProfile>;

    /// Name the loaded table will carry.
    fn table_name(&self) -> String;

    /// Returns a human-readable description of this source.
    fn description(&self) -> String;
}
