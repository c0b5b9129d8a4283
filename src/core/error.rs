//! Error types for the event logger
//!
//! None of these ever escape `log`/`log_event`; they surface from adapters,
//! configuration parsing and the JSON probe, and the dispatcher absorbs them.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A shared value refers back to itself
    #[error("Value contains a reference cycle")]
    CyclicValue,

    /// Value nesting exceeds the probe ceiling
    #[error("Value nesting exceeds {limit} levels")]
    ValueTooDeep { limit: usize },

    /// Adapter reported a failure while handling an event
    #[error("Adapter '{adapter}' failed: {message}")]
    AdapterFailed { adapter: String, message: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Configuration key not known to the global configuration
    #[error("Unknown configuration key '{0}'")]
    UnknownConfigKey(String),

}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a nesting-ceiling error
    pub fn value_too_deep(limit: usize) -> Self {
        LoggerError::ValueTooDeep { limit }
    }

    /// Create an adapter failure
    pub fn adapter(adapter: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::AdapterFailed {
            adapter: adapter.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }
}
