//! Logging configuration.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt};

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format: `"json"` or `"pretty"`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl LoggingConfig {
    /// Initialize the global tracing subscriber from this configuration.
    ///
    /// `RUST_LOG` takes precedence over the configured level when set.
    /// Calling this twice panics (the subscriber can only be installed
    /// once), so embedding applications should call it exactly once at
    /// startup.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_target(true)
                    .with_thread_ids(true)
                    .init();
            }
            _ => {
                fmt().pretty().with_env_filter(filter).with_target(true).init();
            }
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "json".to_string()
}
