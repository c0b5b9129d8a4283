//! Logging macros for ergonomic message formatting and event building.
//!
//! The message macros format their arguments like `format!` and forward to
//! the matching [`EventLogger`](crate::EventLogger) method.
//!
//! # Examples
//!
//! ```
//! use context_event_logger::core::Session;
//! use context_event_logger::{event, fields, info, LogLevel};
//!
//! let session = Session::new();
//! let logger = session.create_logger("server");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // Structured events
//! event!(logger, { "message" => "request", "status" => 200 });
//! event!(logger, LogLevel::Error, { "message" => "request", "status" => 500 });
//!
//! let context = fields! { "region" => "eu", "replicas" => 3 };
//! assert_eq!(context.len(), 2);
//! ```

/// Build a [`Fields`](crate::Fields) map from `key => value` pairs.
///
/// Values go through `FieldValue::from`.
///
/// ```
/// use context_event_logger::{fields, FieldValue};
///
/// let data = fields! { "a" => 1, "b" => "two" };
/// assert_eq!(data.get("b"), Some(&FieldValue::from("two")));
/// assert!(fields! {}.is_empty());
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::core::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::core::Fields::new();
        $(
            map.insert(
                ::std::string::String::from($key),
                $crate::core::FieldValue::from($value),
            );
        )+
        map
    }};
}

/// Log an untagged message with automatic formatting.
///
/// ```
/// # use context_event_logger::core::Session;
/// # let logger = Session::new().create_logger("app");
/// use context_event_logger::log;
/// log!(logger, "Simple message");
/// log!(logger, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log(&format!($($arg)+), &[])
    };
}

/// Log a debug-level message.
///
/// ```
/// # use context_event_logger::core::Session;
/// # let logger = Session::new().create_logger("app");
/// use context_event_logger::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(&format!($($arg)+), &[])
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(&format!($($arg)+), &[])
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(&format!($($arg)+), &[])
    };
}

/// Log an error-level message.
///
/// ```
/// # use context_event_logger::core::Session;
/// # let logger = Session::new().create_logger("app");
/// use context_event_logger::error;
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(&format!($($arg)+), &[])
    };
}

/// Log a structured event, optionally with an explicit level.
#[macro_export]
macro_rules! event {
    ($logger:expr, { $($body:tt)* }) => {
        $logger.log_event($crate::fields! { $($body)* }, None)
    };
    ($logger:expr, $level:expr, { $($body:tt)* }) => {
        $logger.log_event($crate::fields! { $($body)* }, Some($level))
    };
}

#[cfg(test)]
mod tests {
    use crate::appenders::MemoryAdapter;
    use crate::core::{FieldValue, Fields, LogLevel, Session};
    use std::sync::Arc;

    fn capture() -> (Session, Arc<MemoryAdapter>) {
        let session = Session::new();
        session.set_global_config("autoTimeStamp", false).unwrap();
        let memory = Arc::new(MemoryAdapter::new());
        session.register_adapter(memory.clone(), None);
        (session, memory)
    }

    #[test]
    fn test_fields_macro() {
        let data = fields! { "a" => 1, "b" => "x", "c" => true, };
        assert_eq!(data.len(), 3);
        assert_eq!(data.get("a"), Some(&FieldValue::Int(1)));

        let empty: Fields = fields! {};
        assert!(empty.is_empty());
    }

    #[test]
    fn test_message_macros() {
        let (session, memory) = capture();
        let logger = session.create_logger("app");

        log!(logger, "plain {}", 1);
        debug!(logger, "debug {}", 2);
        info!(logger, "info");
        warn!(logger, "warn {}", "x");
        error!(logger, "error {:03}", 7);

        let levels: Vec<Option<FieldValue>> = memory
            .entries()
            .into_iter()
            .map(|(_, data)| data.get("level").cloned())
            .collect();
        assert_eq!(
            levels,
            vec![
                None,
                Some(FieldValue::from("debug")),
                Some(FieldValue::from("info")),
                Some(FieldValue::from("warn")),
                Some(FieldValue::from("error")),
            ]
        );
        assert_eq!(memory.entries()[4].1.get("message"), Some(&FieldValue::from("error 007")));
    }

    #[test]
    fn test_event_macro() {
        let (session, memory) = capture();
        let logger = session.create_logger("app");

        event!(logger, { "message" => "m", "n" => 1 });
        event!(logger, LogLevel::Warn, { "message" => "m", "level" => "debug" });

        let entries = memory.entries();
        assert_eq!(entries[0].1, fields! { "message" => "m", "n" => 1 });
        assert_eq!(entries[1].1, fields! { "level" => "warn", "message" => "m" });
    }
}
