//! TOML configuration for the concurrency primitives
//!
//! Every tunable has a default, so an empty document is a valid config. The
//! parsed [`ConcurrencyConfig`] is handed explicitly to the constructors that
//! need it; nothing here is global.
//!
//! ```toml
//! [pool]
//! capacity = 8
//!
//! [collector]
//! capacity = 1024
//! max_batch = 64
//!
//! [dispatcher]
//! thread_name = "orders-dispatch"
//!
//! [monitor]
//! interval_ms = 5000
//!
//! [logging]
//! level = "debug"
//! format = "ext"
//! ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_POOL_CAPACITY: usize = 4;
pub const DEFAULT_COLLECTOR_CAPACITY: usize = 1024;
/// Upper bound on items handed to one batch performer call
pub const DEFAULT_MAX_BATCH: usize = 256;
pub const DEFAULT_DISPATCHER_THREAD: &str = "concord-dispatch";
pub const DEFAULT_MONITOR_INTERVAL_MS: u64 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error reading configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { reason, .. } => Some(reason.as_str()),
            ConfigError::Read { .. } => Some("configuration file could not be read"),
            ConfigError::Parse(_) => Some("configuration file is not valid TOML"),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    pub capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectorConfig {
    pub capacity: usize,
    /// Only used by the batching collector
    pub max_batch: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_COLLECTOR_CAPACITY,
            max_batch: DEFAULT_MAX_BATCH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
    pub thread_name: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_DISPATCHER_THREAD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub interval_ms: u64,
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_MONITOR_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    /// Text plus `module/file.rs:line`
    Ext,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<String>,
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
            color: false,
        }
    }
}

/// Root of the configuration document
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConcurrencyConfig {
    pub pool: PoolConfig,
    pub collector: CollectorConfig,
    pub dispatcher: DispatcherConfig,
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

impl ConcurrencyConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded concurrency config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        validate_positive("pool.capacity", self.pool.capacity)?;
        validate_positive("collector.capacity", self.collector.capacity)?;
        validate_positive("collector.max_batch", self.collector.max_batch)?;
        if self.monitor.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "monitor.interval_ms",
                reason: "monitor interval must be greater than 0".to_string(),
            });
        }
        if self.dispatcher.thread_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "dispatcher.thread_name",
                reason: "dispatcher thread name cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn validate_positive(field: &'static str, value: usize) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{field} must be greater than 0"),
        });
    }
    Ok(())
}
