//! Core logger types and traits

pub mod adapter;
pub mod blacklist;
pub mod config;
pub mod context;
pub mod error;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod serializer;
pub mod session;
pub mod timestamp;
pub mod value;

pub use adapter::{Adapter, AdapterMatch, AdapterRegistration, AdapterRegistry, FilterFn, RawEvent};
pub use blacklist::{Blacklist, FILTERED, FILTER_MAX_DEPTH};
pub use config::{GlobalConfig, GlobalConfigBuilder};
pub use context::{Context, ResolvedContext};
pub use error::{LoggerError, Result};
pub use log_level::{LogLevel, LEVEL_KEY};
pub use logger::{DispatchState, EventLogger, ExternalLogger, ParentRef};
pub use metrics::LoggerMetrics;
pub use record::{format_record, LogRecord, MESSAGE_KEY};
pub use session::{Session, GLOBAL_LOGGER_NAME};
pub use timestamp::{TimestampFormat, TIMESTAMP_KEY};
pub use value::{Callback, ClassRef, FieldValue, Fields, SharedValue, Symbol, ValueKind, JSON_MAX_DEPTH};
