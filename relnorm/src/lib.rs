//! # relnorm - dependency detection and normalization planning
//!
//! relnorm infers the relational structure hidden in a flat table and rewrites
//! it, one normal form at a time, into a multi-table schema from 1NF up to
//! 5NF. Everything it knows about the data is measured on the rows
//! themselves: functional dependencies by determination coefficient,
//! multi-valued dependencies by conditional independence, candidate keys by
//! closure over the exact dependencies.
//!
//! ## Quick Start
//!
//! ```rust
//! use relnorm::prelude::*;
//!
//! # fn example() -> Result<()> {
//! let profile = TableProfile::builder("OrderLine")
//!     .columns(["order_id", "product_id", "customer_name"])
//!     .row(["1", "P1", "Alice"])
//!     .row(["1", "P2", "Alice"])
//!     .row(["2", "P1", "Bob"])
//!     .row(["2", "P3", "Bob"])
//!     .row(["3", "P2", "Alice"])
//!     .row(["3", "P3", "Alice"])
//!     .build()?;
//!
//! let engine = NormalizationEngine::new(EngineConfig::default())?;
//! let result = engine.analyze(&profile)?;
//!
//! assert_eq!(result.original_nf, NormalForm::First);
//! let order = result.table("Order").expect("order table");
//! assert_eq!(order.primary_key, vec!["order_id"]);
//! println!("{}", HumanFormatter::new().format(&result)?);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Pipeline
//!
//! - [`sources`] load CSV files or Arrow batches into a [`model::TableProfile`]
//! - [`detector`] finds FDs, MVDs and candidate keys
//! - [`planner`] checks each normal form in turn and splits violating tables
//! - [`engine`] ties them together and assembles the [`model::AnalysisResult`]
//! - [`formatters`] render the result as JSON or text
//!
//! Budgets bound every search and the number of splits. Hitting one never
//! fails a run: the result carries [`model::Diagnostic`]s instead, and only
//! malformed input is an error.
//!
//! ## Logging
//!
//! All components log through `tracing`. Binaries install a subscriber with
//! [`logging::setup::init_logging`]; [`logging::LogConfig`] controls how much
//! dependency and decomposition detail is emitted.

pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod formatters;
pub mod inference;
pub mod logging;
pub mod model;
pub mod planner;
pub mod prelude;
pub mod sources;
