//! Logging for relnorm.
//!
//! The detector and planner emit structured `tracing` events. [`LogConfig`]
//! travels with the engine configuration and gates the noisy ones: one event
//! per accepted dependency, one per split, and timing summaries. [`setup`]
//! installs a subscriber for binaries.

use serde::{Deserialize, Serialize};
use tracing::Level;

/// What the detector and planner log while they run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Timing summaries are emitted at this level or more verbose
    #[serde(with = "level_serde")]
    pub base_level: Level,
    /// One event per accepted FD, MVD and candidate key
    pub log_dependency_details: bool,
    /// One event per split performed by the planner
    pub log_decompositions: bool,
    /// Attribute lists and dependency strings longer than this are cut
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_dependency_details: false,
            log_decompositions: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Every dependency, every split and search timings.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_dependency_details: true,
            log_decompositions: true,
            max_field_length: 1024,
        }
    }

    /// Warnings only; splits and dependencies stay silent.
    pub fn quiet() -> Self {
        Self {
            base_level: Level::WARN,
            log_dependency_details: false,
            log_decompositions: false,
            max_field_length: 128,
        }
    }

    pub fn with_dependency_details(mut self, enabled: bool) -> Self {
        self.log_dependency_details = enabled;
        self
    }

    pub fn with_decompositions(mut self, enabled: bool) -> Self {
        self.log_decompositions = enabled;
        self
    }
}

mod level_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(level.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Level::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// Debug event for search timings, skipped unless `base_level` allows debug.
#[macro_export]
macro_rules! search_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Debug event per accepted dependency or key.
#[macro_export]
macro_rules! log_dependency {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_dependency_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Info event per planner split.
#[macro_export]
macro_rules! log_split {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_decompositions {
            tracing::info!($($arg)*);
        }
    };
}

/// Cuts `value` to at most `max_length` bytes on a character boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut cut = max_length;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...(truncated)", &value[..cut])
}

/// Subscriber installation for the `relnorm` binary and embedding tools.
pub mod setup {
    use tracing::Level;

    /// Levels and output format of the installed subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Level for every crate other than relnorm
        pub default_level: Level,
        /// Level for `relnorm` targets
        pub relnorm_level: Level,
        /// One JSON object per event instead of text lines
        pub json_format: bool,
        /// Full filter directive replacing the two levels
        pub filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                default_level: Level::WARN,
                relnorm_level: Level::INFO,
                json_format: false,
                filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON lines for log collectors.
        pub fn structured() -> Self {
            Self {
                json_format: true,
                ..Self::default()
            }
        }

        pub fn with_relnorm_level(mut self, level: Level) -> Self {
            self.relnorm_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
            self.filter = Some(filter.into());
            self
        }

        /// The directive handed to `EnvFilter` when `RUST_LOG` is unset.
        pub fn directive(&self) -> String {
            match &self.filter {
                Some(filter) => filter.clone(),
                None => format!(
                    "{},relnorm={}",
                    self.default_level.as_str().to_lowercase(),
                    self.relnorm_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global subscriber writing to stderr.
    ///
    /// `RUST_LOG` overrides the configured directive. Fails if a global
    /// subscriber is already set.
    ///
    /// ```rust,no_run
    /// use relnorm::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::structured()).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.directive()));
        let output = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        let output = if config.json_format {
            output.json().boxed()
        } else {
            output.boxed()
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(output)
            .try_init()?;
        Ok(())
    }
}
