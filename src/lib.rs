//! # Context Event Logger
//!
//! In-process event logging with hierarchical context propagation.
//!
//! ## Features
//!
//! - **Nested Context**: every logger merges its own data over its ancestors'
//!   ("app" -> "dialog" -> "page") and stamps the result onto each event
//! - **Pluggable Adapters**: console, file, JSON and in-memory sinks, each
//!   with an optional filter predicate
//! - **Redaction**: blacklisted keys are replaced before any adapter sees them
//! - **Reentrant Safe**: adapters may log without nesting dispatch loops

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::appenders::ConsoleAdapter;
    #[cfg(feature = "file")]
    pub use crate::appenders::FileAdapter;
    pub use crate::appenders::{JsonAdapter, MemoryAdapter};
    pub use crate::core::{
        Adapter, Blacklist, Context, EventLogger, ExternalLogger, FieldValue, Fields, FilterFn,
        GlobalConfig, LogLevel, LoggerError, LoggerMetrics, ParentRef, RawEvent, Result, Session,
        TimestampFormat,
    };
}

#[cfg(feature = "console")]
pub use appenders::ConsoleAdapter;
#[cfg(feature = "file")]
pub use appenders::FileAdapter;
pub use appenders::{JsonAdapter, MemoryAdapter};
pub use self::core::{
    Adapter, Blacklist, Callback, ClassRef, Context, EventLogger, ExternalLogger, FieldValue,
    Fields, FilterFn, GlobalConfig, LogLevel, LoggerError, LoggerMetrics, ParentRef, RawEvent,
    Result, Session, SharedValue, Symbol, TimestampFormat,
};
