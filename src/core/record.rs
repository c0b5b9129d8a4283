//! One-line textual record shared by the text adapters

use super::log_level::{LogLevel, LEVEL_KEY};
use super::serializer;
use super::timestamp::TIMESTAMP_KEY;
use super::value::{FieldValue, Fields};

/// Payload key holding the message text
pub const MESSAGE_KEY: &str = "message";

/// Rendered form of one event
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// `<ts>\t<context>\t<message>`, or `<context>\t<message>` without a timestamp
    pub line: String,
    /// `key:<rendered value>` for every key other than ts and message
    pub fields: Vec<String>,
    /// Parsed level tag, if the event carries a recognised one
    pub level: Option<LogLevel>,
}

impl LogRecord {
    /// Line and fields joined by single spaces
    pub fn to_text(&self) -> String {
        if self.fields.is_empty() {
            self.line.clone()
        } else {
            format!("{} {}", self.line, self.fields.join(" "))
        }
    }
}

/// Sanitize message text so a record cannot span several lines
///
/// Replaces newlines, carriage returns, and tabs with escape sequences
/// to prevent injected fake records.
pub fn sanitize_message(message: &str) -> String {
    message
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Build the textual record for an event
///
/// # Example
///
/// ```
/// use context_event_logger::core::record::format_record;
/// use context_event_logger::fields;
///
/// let record = format_record("app", &fields! { "message" => "hi", "user" => 7 });
/// assert_eq!(record.line, "app\thi");
/// assert_eq!(record.fields, vec!["user:7".to_string()]);
/// ```
pub fn format_record(context: &str, data: &Fields) -> LogRecord {
    let message = data
        .get(MESSAGE_KEY)
        .map(|m| sanitize_message(&m.to_string()))
        .unwrap_or_default();

    let line = match data.get(TIMESTAMP_KEY) {
        Some(ts) => format!("{}\t{}\t{}", ts, context, message),
        None => format!("{}\t{}", context, message),
    };

    let fields = data
        .iter()
        .filter(|(key, _)| key.as_str() != MESSAGE_KEY && key.as_str() != TIMESTAMP_KEY)
        .filter(|(_, value)| !serializer::is_plain_function(value))
        .map(|(key, value)| format!("{}:{}", key, sanitize_message(&serializer::to_str(value))))
        .collect();

    let level = data
        .get(LEVEL_KEY)
        .and_then(FieldValue::as_str)
        .and_then(|tag| tag.parse().ok());

    LogRecord {
        line,
        fields,
        level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Callback;
    use crate::fields;

    #[test]
    fn test_sanitize_message() {
        assert_eq!(sanitize_message("a\nb\rc\td"), "a\\nb\\rc\\td");
        assert_eq!(sanitize_message("plain"), "plain");
    }

    #[test]
    fn test_record_with_timestamp() {
        let record = format_record(
            "page",
            &fields! {
                "message" => "opened",
                "ts" => "2025-01-08T10:30:45.123Z",
                "level" => "warn",
                "id" => 3,
            },
        );
        assert_eq!(record.line, "2025-01-08T10:30:45.123Z\tpage\topened");
        assert_eq!(record.fields, vec!["id:3".to_string(), "level:'warn'".to_string()]);
        assert_eq!(record.level, Some(LogLevel::Warn));
        assert_eq!(record.to_text(), "2025-01-08T10:30:45.123Z\tpage\topened id:3 level:'warn'");
    }

    #[test]
    fn test_injected_newline_stays_on_one_line() {
        let record = format_record("app", &fields! { "message" => "line1\nFAKE ENTRY" });
        assert_eq!(record.line, "app\tline1\\nFAKE ENTRY");
        assert!(!record.to_text().contains('\n'));
    }

    #[test]
    fn test_missing_message_and_functions() {
        let record = format_record(
            "app",
            &fields! {
                "cb" => Callback::new("cb", |_| FieldValue::Null),
                "user" => fields! { "id" => 1 },
            },
        );
        assert_eq!(record.line, "app\t");
        assert_eq!(record.fields, vec!["user:{id:1}".to_string()]);
        assert_eq!(record.level, None);
    }
}
