//! Rendering of analysis results.
//!
//! [`JsonFormatter`] emits the stable result contract; [`HumanFormatter`]
//! prints a summary for terminals.
//!
//! # Examples
//!
//! ```rust
//! use relnorm::engine::NormalizationEngine;
//! use relnorm::formatters::{HumanFormatter, JsonFormatter, ResultFormatter};
//! use relnorm::model::TableProfile;
//!
//! let profile = TableProfile::builder("Dept")
//!     .columns(["dept_id", "dept_name"])
//!     .row(["D1", "Sales"])
//!     .row(["D2", "Ops"])
//!     .build()
//!     .unwrap();
//! let result = NormalizationEngine::default().analyze(&profile).unwrap();
//!
//! let json = JsonFormatter::new().format(&result).unwrap();
//! assert!(json.contains("\"original_nf\""));
//! let text = HumanFormatter::new().format(&result).unwrap();
//! assert!(text.contains("Dept"));
//! ```

use std::fmt::Write;

use crate::error::{RelnormError, Result};
use crate::model::{AnalysisResult, TableSchema};

/// Configuration options for formatting analysis results.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include the decomposition steps and their violations
    pub include_steps: bool,
    /// Include the detected dependencies of the input table
    pub include_dependencies: bool,
    /// Include diagnostics
    pub include_diagnostics: bool,
    /// Rows printed per table (0 for none); JSON output drops rows when 0
    pub max_rows: usize,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_steps: true,
            include_dependencies: true,
            include_diagnostics: true,
            max_rows: 5,
            use_colors: false,
        }
    }
}

impl FormatterConfig {
    /// Summary and final tables only.
    pub fn minimal() -> Self {
        Self {
            include_steps: false,
            include_dependencies: false,
            include_diagnostics: false,
            max_rows: 0,
            use_colors: false,
        }
    }

    /// Everything, rows included.
    pub fn detailed() -> Self {
        Self {
            include_steps: true,
            include_dependencies: true,
            include_diagnostics: true,
            max_rows: usize::MAX,
            use_colors: true,
        }
    }

    pub fn with_steps(mut self, include: bool) -> Self {
        self.include_steps = include;
        self
    }

    pub fn with_max_rows(mut self, max: usize) -> Self {
        self.max_rows = max;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

/// Trait for formatting analysis results into different output formats.
pub trait ResultFormatter {
    /// Formats a result into a string representation.
    fn format(&self, result: &AnalysisResult) -> Result<String>;

    /// Formats a result with custom configuration.
    fn format_with_config(&self, result: &AnalysisResult, _config: &FormatterConfig) -> Result<String> {
        self.format(result)
    }
}

/// Formats results as contract JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Pretty-printed JSON with every field.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::detailed(),
            pretty: true,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for JsonFormatter {
    fn format(&self, result: &AnalysisResult) -> Result<String> {
        self.format_with_config(result, &self.config)
    }

    fn format_with_config(&self, result: &AnalysisResult, config: &FormatterConfig) -> Result<String> {
        let filtered = filter_result_for_config(result, config);
        if self.pretty {
            filtered.to_json_pretty()
        } else {
            filtered.to_json()
        }
    }
}

/// Drops optional sections; counts and the step list's shape stay intact.
fn filter_result_for_config(result: &AnalysisResult, config: &FormatterConfig) -> AnalysisResult {
    let mut filtered = result.clone();
    if !config.include_steps {
        for step in &mut filtered.steps {
            step.tables.clear();
        }
    }
    if !config.include_diagnostics {
        filtered.diagnostics.clear();
        for table in &mut filtered.tables {
            table.diagnostics.clear();
        }
    }
    for table in &mut filtered.tables {
        table.rows.truncate(config.max_rows);
    }
    filtered
}

/// Formats results for console output.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn render(&self, result: &AnalysisResult, config: &FormatterConfig, out: &mut String) -> std::fmt::Result {
        let paint = |text: &str, code: &str| {
            if config.use_colors {
                format!("\x1b[{code}m{text}\x1b[0m")
            } else {
                text.to_string()
            }
        };

        writeln!(out)?;
        let status = if result.is_fully_normalized() {
            paint(&format!("Reached {}", result.final_nf), "32")
        } else {
            paint(&format!("Stopped at {}", result.final_nf), "33")
        };
        writeln!(out, "{status} (target {})", result.target_nf)?;
        writeln!(out)?;
        writeln!(out, "Table: {}", result.original_table)?;
        writeln!(out, "Analysis: {}", result.analysis_id)?;
        writeln!(out, "   Original form: {}", result.original_nf)?;
        writeln!(out, "   Final form: {}", result.final_nf)?;
        writeln!(out, "   Steps: {}", result.steps_count)?;
        writeln!(out, "   Tables: {}", result.tables_count)?;
        writeln!(out, "   Violations: {}", result.violations_count)?;
        if result.truncated {
            writeln!(out, "   {}", paint("Step budget exhausted; result is partial", "33"))?;
        }

        if config.include_dependencies {
            let deps = &result.dependencies;
            writeln!(out)?;
            writeln!(out, "Dependencies:")?;
            if !deps.primary_key.is_empty() {
                writeln!(out, "   Primary key: ({})", deps.primary_key.join(", "))?;
            }
            for key in deps.candidate_keys.iter().filter(|k| **k != deps.primary_key) {
                writeln!(out, "   Candidate key: ({})", key.join(", "))?;
            }
            for fd in &deps.functional {
                writeln!(out, "   {} -> {} ({:.2})", fd.lhs.join(", "), fd.rhs, fd.confidence)?;
            }
            for mvd in &deps.multivalued {
                writeln!(
                    out,
                    "   {} ->> {} ({:.2})",
                    mvd.lhs.join(", "),
                    mvd.rhs.join(", "),
                    mvd.confidence
                )?;
            }
        }

        if config.include_steps && !result.steps.is_empty() {
            writeln!(out)?;
            writeln!(out, "Steps:")?;
            for (i, step) in result.steps.iter().enumerate() {
                writeln!(out, "   {}. {} -> {}: {}", i + 1, step.from_nf, step.to_nf, step.explanation)?;
                for violation in &step.violations {
                    writeln!(out, "      - [{}] {}", violation.table, violation.explanation)?;
                    if !violation.resolution.is_empty() {
                        writeln!(out, "        fix: {}", violation.resolution)?;
                    }
                }
            }
        }

        writeln!(out)?;
        writeln!(out, "Tables:")?;
        for table in &result.tables {
            self.render_table(table, config, out)?;
        }

        if config.include_diagnostics && !result.diagnostics.is_empty() {
            writeln!(out)?;
            writeln!(out, "Diagnostics:")?;
            for diagnostic in &result.diagnostics {
                writeln!(out, "   {}", paint(&diagnostic.to_string(), "33"))?;
            }
        }
        Ok(())
    }

    fn render_table(&self, table: &TableSchema, config: &FormatterConfig, out: &mut String) -> std::fmt::Result {
        writeln!(out)?;
        writeln!(out, "   {} [{}] ({} rows)", table.name, table.normal_form, table.row_count)?;
        for column in &table.columns {
            let mut notes = Vec::new();
            if table.primary_key.contains(&column.name) {
                notes.push("PK".to_string());
            }
            for fk in table.foreign_keys.iter().filter(|fk| fk.columns.contains(&column.name)) {
                notes.push(format!("FK -> {}", fk.references_table));
            }
            if column.synthetic {
                notes.push("surrogate".to_string());
            }
            if !column.derived_from.is_empty() {
                notes.push(format!("from {}", column.derived_from.join(", ")));
            }
            let notes = if notes.is_empty() {
                String::new()
            } else {
                format!("  [{}]", notes.join("; "))
            };
            writeln!(out, "      {} {}{}", column.name, column.data_type.sql_name(), notes)?;
        }
        let shown = table.rows.len().min(config.max_rows);
        for row in &table.rows[..shown] {
            let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("NULL")).collect();
            writeln!(out, "      | {} |", cells.join(" | "))?;
        }
        if shown < table.rows.len() {
            writeln!(out, "      ... {} more", table.rows.len() - shown)?;
        }
        Ok(())
    }
}

impl ResultFormatter for HumanFormatter {
    fn format(&self, result: &AnalysisResult) -> Result<String> {
        self.format_with_config(result, &self.config)
    }

    fn format_with_config(&self, result: &AnalysisResult, config: &FormatterConfig) -> Result<String> {
        let mut output = String::new();
        self.render(result, config, &mut output)
            .map_err(|e| RelnormError::Serialization(format!("Failed to render result: {e}")))?;
        Ok(output)
    }
}
