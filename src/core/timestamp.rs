//! Timestamp formatting for the automatic `ts` field

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Payload key holding the automatic timestamp
pub const TIMESTAMP_KEY: &str = "ts";

/// Timestamp format used when stamping events
///
/// # Examples
///
/// ```
/// use context_event_logger::core::TimestampFormat;
///
/// let stamp = TimestampFormat::Iso8601.now();
/// assert!(stamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format: `2025-01-08T10:30:45.123+00:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }

    /// Format the current time
    #[must_use]
    pub fn now(&self) -> String {
        self.format(&Utc::now())
    }
}

impl FromStr for TimestampFormat {
    type Err = String;

    /// Accepts the variant names in any case; anything containing `%` is
    /// taken as a custom strftime pattern.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "iso8601" => Ok(TimestampFormat::Iso8601),
            "iso8601micros" => Ok(TimestampFormat::Iso8601Micros),
            "rfc3339" => Ok(TimestampFormat::Rfc3339),
            "unixmillis" => Ok(TimestampFormat::UnixMillis),
            _ if s.contains('%') => Ok(TimestampFormat::Custom(s.to_string())),
            _ => Err(format!("Invalid timestamp format: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_fixed_formats() {
        let at = fixed_datetime();
        assert_eq!(TimestampFormat::Iso8601.format(&at), "2025-01-08T10:30:45.123Z");
        assert_eq!(TimestampFormat::Iso8601Micros.format(&at), "2025-01-08T10:30:45.123456Z");
        assert_eq!(TimestampFormat::UnixMillis.format(&at), "1736332245123");
        assert_eq!(
            TimestampFormat::Custom("%Y/%m/%d %H:%M".to_string()).format(&at),
            "2025/01/08 10:30"
        );
    }

    #[test]
    fn test_parse_config_names() {
        assert_eq!("iso8601".parse::<TimestampFormat>(), Ok(TimestampFormat::Iso8601));
        assert_eq!("unix_millis".parse::<TimestampFormat>(), Ok(TimestampFormat::UnixMillis));
        assert_eq!(
            "%H:%M".parse::<TimestampFormat>(),
            Ok(TimestampFormat::Custom("%H:%M".to_string()))
        );
        assert!("sometime".parse::<TimestampFormat>().is_err());
    }

    #[test]
    fn test_now_is_a_key_value() {
        let stamp = TimestampFormat::default().now();
        assert_eq!(TIMESTAMP_KEY, "ts");
        assert_eq!(stamp.len(), "2025-01-08T10:30:45.123Z".len());
    }
}
