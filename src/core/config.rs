//! Session-wide configuration flags

use super::error::{LoggerError, Result};
use super::timestamp::TimestampFormat;
use super::value::FieldValue;
use serde::{Deserialize, Serialize};

/// Global configuration shared by every logger of a session
///
/// Deserializes from the same camelCase keys accepted by
/// [`GlobalConfig::set`]; missing keys keep their defaults.
///
/// # Example
///
/// ```
/// use context_event_logger::core::GlobalConfig;
///
/// let config = GlobalConfig::from_json(r#"{"autoTimeStamp": false}"#).unwrap();
/// assert!(!config.auto_timestamp);
/// assert!(!config.lazy_loading);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Stamp dispatched and source events with a `ts` field
    #[serde(rename = "autoTimeStamp", alias = "auto_timestamp")]
    pub auto_timestamp: bool,

    /// Defer context creation and parent resolution until first use
    #[serde(rename = "lazyLoading", alias = "lazy_loading")]
    pub lazy_loading: bool,

    /// Format of the `ts` field
    #[serde(rename = "timestampFormat", alias = "timestamp_format")]
    pub timestamp_format: TimestampFormat,

    /// Print absorbed adapter failures to stderr
    #[serde(rename = "reportFailures", alias = "report_failures")]
    pub report_failures: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            auto_timestamp: true,
            lazy_loading: false,
            timestamp_format: TimestampFormat::default(),
            report_failures: true,
        }
    }
}

impl GlobalConfig {
    pub fn builder() -> GlobalConfigBuilder {
        GlobalConfigBuilder::new()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set one flag by its configuration key
    pub fn set(&mut self, key: &str, value: FieldValue) -> Result<()> {
        match key {
            "autoTimeStamp" | "auto_timestamp" => self.auto_timestamp = expect_bool(key, &value)?,
            "lazyLoading" | "lazy_loading" => self.lazy_loading = expect_bool(key, &value)?,
            "reportFailures" | "report_failures" => {
                self.report_failures = expect_bool(key, &value)?
            }
            "timestampFormat" | "timestamp_format" => {
                let pattern = value
                    .as_str()
                    .ok_or_else(|| LoggerError::config(key, "expected a string"))?;
                self.timestamp_format = pattern
                    .parse()
                    .map_err(|e: String| LoggerError::config(key, e))?;
            }
            other => return Err(LoggerError::UnknownConfigKey(other.to_string())),
        }
        Ok(())
    }
}

fn expect_bool(key: &str, value: &FieldValue) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| LoggerError::config(key, "expected a boolean"))
}

/// Builder for [`GlobalConfig`]
///
/// # Example
/// ```
/// use context_event_logger::core::{GlobalConfig, TimestampFormat};
///
/// let config = GlobalConfig::builder()
///     .auto_timestamp(false)
///     .timestamp_format(TimestampFormat::Rfc3339)
///     .build();
/// assert_eq!(config.timestamp_format, TimestampFormat::Rfc3339);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GlobalConfigBuilder {
    config: GlobalConfig,
}

impl GlobalConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn auto_timestamp(mut self, enabled: bool) -> Self {
        self.config.auto_timestamp = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn lazy_loading(mut self, enabled: bool) -> Self {
        self.config.lazy_loading = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn report_failures(mut self, enabled: bool) -> Self {
        self.config.report_failures = enabled;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
