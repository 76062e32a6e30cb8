//! Scalar type inference for string cells.
//!
//! Spreadsheet and CSV cells arrive as text. The engine matches every
//! non-null cell against a fixed set of patterns and picks the narrowest
//! type that all of them satisfy:
//! - Boolean values in their common spellings
//! - Integers, promoted to `BIGINT` when they overflow 32 bits
//! - Decimals
//! - ISO, US and European dates, ISO date-times
//! - Everything else is `VARCHAR`, or `TEXT` past the length limit
//!
//! # Example
//!
//! ```rust
//! use relnorm::inference::TypeInferenceEngine;
//! use relnorm::model::ScalarType;
//!
//! let engine = TypeInferenceEngine::builder().varchar_limit(64).build();
//! let cells = vec![Some("1".to_string()), Some("42".to_string()), None];
//! assert_eq!(engine.infer(&cells), ScalarType::Integer);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::ScalarType;

/// Sampling and length limits for inference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Number of leading cells inspected (default: all)
    pub sample_size: Option<usize>,
    /// Longest string still typed as VARCHAR (default: 255)
    pub varchar_limit: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: None,
            varchar_limit: 255,
        }
    }
}

/// Per-pattern match counts over one column
#[derive(Debug, Default)]
pub struct PatternTally {
    pub sampled: usize,
    pub nulls: usize,
    pub booleans: usize,
    pub integers: usize,
    pub wide_integers: usize,
    pub decimals: usize,
    pub dates: usize,
    pub datetimes: usize,
    pub max_length: usize,
}

impl PatternTally {
    fn non_null(&self) -> usize {
        self.sampled - self.nulls
    }
}

/// Builder for [`TypeInferenceEngine`]
pub struct TypeInferenceEngineBuilder {
    config: InferenceConfig,
}

impl TypeInferenceEngineBuilder {
    /// Limit inference to the first `size` cells
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = Some(size);
        self
    }

    /// Set the VARCHAR/TEXT boundary
    pub fn varchar_limit(mut self, limit: usize) -> Self {
        self.config.varchar_limit = limit;
        self
    }

    pub fn build(self) -> TypeInferenceEngine {
        TypeInferenceEngine {
            config: self.config,
        }
    }
}

struct TypePatterns {
    integer: Regex,
    decimal: Regex,
    date_iso: Regex,
    date_us: Regex,
    date_eu: Regex,
    datetime_iso: Regex,
    boolean: Regex,
}

#[allow(clippy::expect_used)]
static PATTERNS: Lazy<TypePatterns> = Lazy::new(|| TypePatterns {
    integer: Regex::new(r"^[+-]?\d+$").expect("valid integer pattern"),
    decimal: Regex::new(r"^[+-]?(\d+\.\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid decimal pattern"),
    date_iso: Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"),
    date_us: Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("valid date pattern"),
    date_eu: Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$").expect("valid date pattern"),
    datetime_iso: Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?$")
        .expect("valid datetime pattern"),
    boolean: Regex::new(r"(?i)^(true|false|yes|no|y|n|t|f)$").expect("valid boolean pattern"),
});

static DEFAULT_ENGINE: Lazy<TypeInferenceEngine> = Lazy::new(TypeInferenceEngine::new);

/// Picks a [`ScalarType`] for a column of text cells.
#[derive(Debug, Clone)]
pub struct TypeInferenceEngine {
    config: InferenceConfig,
}

impl TypeInferenceEngine {
    pub fn builder() -> TypeInferenceEngineBuilder {
        TypeInferenceEngineBuilder {
            config: InferenceConfig::default(),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Process-wide engine with the default configuration.
    pub fn shared() -> &'static TypeInferenceEngine {
        &DEFAULT_ENGINE
    }

    /// Infers the scalar type of a column.
    pub fn infer(&self, values: &[Option<String>]) -> ScalarType {
        let stats = self.tally(values);
        self.determine_type(&stats)
    }

    /// Counts pattern matches over the sampled cells.
    pub fn tally(&self, values: &[Option<String>]) -> PatternTally {
        let limit = self.config.sample_size.unwrap_or(values.len());
        let mut stats = PatternTally::default();

        for value in values.iter().take(limit) {
            stats.sampled += 1;
            let trimmed = match value {
                Some(v) if !v.trim().is_empty() => v.trim(),
                _ => {
                    stats.nulls += 1;
                    continue;
                }
            };
            stats.max_length = stats.max_length.max(trimmed.chars().count());
            self.tally_value(trimmed, &mut stats);
        }

        stats
    }

    /// Adds the patterns `value` matches to `tally`.
    pub fn tally_value(&self, value: &str, tally: &mut PatternTally) {
        let patterns = &*PATTERNS;

        if patterns.boolean.is_match(value) {
            tally.booleans += 1;
        }

        if patterns.integer.is_match(value) {
            tally.integers += 1;
            if value.parse::<i32>().is_err() {
                tally.wide_integers += 1;
            }
        } else if patterns.decimal.is_match(value) {
            tally.decimals += 1;
        }

        if patterns.date_iso.is_match(value)
            || patterns.date_us.is_match(value)
            || patterns.date_eu.is_match(value)
        {
            tally.dates += 1;
        } else if patterns.datetime_iso.is_match(value) {
            tally.datetimes += 1;
        }
    }

    /// The narrowest type every non-null sample satisfies.
    pub fn determine_type(&self, stats: &PatternTally) -> ScalarType {
        let non_null = stats.non_null();
        if non_null == 0 {
            return ScalarType::Varchar;
        }

        if stats.booleans == non_null {
            ScalarType::Boolean
        } else if stats.integers == non_null {
            if stats.wide_integers > 0 {
                ScalarType::BigInt
            } else {
                ScalarType::Integer
            }
        } else if stats.integers + stats.decimals == non_null {
            ScalarType::Decimal
        } else if stats.dates == non_null {
            ScalarType::Date
        } else if stats.dates + stats.datetimes == non_null {
            ScalarType::DateTime
        } else if stats.max_length > self.config.varchar_limit {
            ScalarType::Text
        } else {
            ScalarType::Varchar
        }
    }
}

impl Default for TypeInferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}
