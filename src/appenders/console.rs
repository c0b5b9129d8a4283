//! Console adapter implementation

use crate::core::{
    adapter::{Adapter, RawEvent},
    record::format_record,
    Fields, LogLevel, Result,
};
use colored::Colorize;
use std::io::Write;

/// Prints one line per event: `<ts>\t<context>\t<message> key:value ...`
///
/// Error-level events go to stderr, everything else to stdout.
///
/// # Example
///
/// ```
/// use context_event_logger::appenders::ConsoleAdapter;
/// use context_event_logger::core::Session;
/// use std::sync::Arc;
///
/// let session = Session::new();
/// session.register_adapter(Arc::new(ConsoleAdapter::new().with_depth(1)), None);
/// session.create_logger("app").info("ready", &[]);
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleAdapter {
    use_colors: bool,
    depth: Option<usize>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            depth: None,
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// With a depth of 0 or 1 only the event's own keys are printed,
    /// leaving out everything inherited from the context chain
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Render the line this adapter prints for an event
    pub fn format_line(&self, context: &str, data: &Fields, raw: &RawEvent) -> (String, Option<LogLevel>) {
        let source = match self.depth {
            Some(depth) if depth <= 1 => &raw.event,
            _ => data,
        };
        let record = format_record(context, source);
        let level = record.level;

        let line = if self.use_colors {
            let head = match level {
                Some(level) => record.line.color(level.color_code()).to_string(),
                None => record.line.normal().to_string(),
            };
            if record.fields.is_empty() {
                head
            } else {
                format!("{} {}", head, record.fields.join(" ").dimmed())
            }
        } else {
            record.to_text()
        };
        (line, level)
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for ConsoleAdapter {
    fn log(&self, context: &str, data: &Fields, raw: &RawEvent) -> Result<()> {
        let (line, level) = self.format_line(context, data, raw);

        // Route Error level to stderr, others to stdout
        match level {
            Some(LogLevel::Error) => {
                let mut stderr = std::io::stderr().lock();
                writeln!(stderr, "{}", line)?;
                stderr.flush()?;
            }
            _ => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", line)?;
                stdout.flush()?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    fn raw(event: Fields) -> RawEvent {
        RawEvent {
            context: "page".to_string(),
            event,
        }
    }

    #[test]
    fn test_plain_line() {
        let adapter = ConsoleAdapter::new().with_colors(false);
        let data = fields! { "message" => "opened", "ts" => "T", "user" => "bob" };
        let (line, level) = adapter.format_line("page", &data, &raw(data.clone()));
        assert_eq!(line, "T\tpage\topened user:'bob'");
        assert_eq!(level, None);
    }

    #[test]
    fn test_depth_one_drops_inherited_fields() {
        let adapter = ConsoleAdapter::new().with_colors(false).with_depth(1);
        let data = fields! { "message" => "m", "app" => "demo", "level" => "error" };
        let event = fields! { "message" => "m", "level" => "error" };

        let (line, level) = adapter.format_line("page", &data, &raw(event));
        assert_eq!(line, "page\tm level:'error'");
        assert_eq!(level, Some(LogLevel::Error));

        let (line, _) = ConsoleAdapter::new()
            .with_colors(false)
            .with_depth(2)
            .format_line("page", &data, &raw(Fields::new()));
        assert_eq!(line, "page\tm app:'demo' level:'error'");
    }

    #[test]
    fn test_colored_line_keeps_text() {
        let adapter = ConsoleAdapter::new();
        let data = fields! { "message" => "hi", "level" => "info" };
        let (line, _) = adapter.format_line("app", &data, &raw(data.clone()));
        assert!(line.contains("app\thi"));
        assert!(line.contains("level:'info'"));
    }

    #[test]
    fn test_log_succeeds() {
        let adapter = ConsoleAdapter::new().with_colors(false);
        let data = fields! { "message" => "to stdout" };
        assert!(adapter.log("app", &data, &raw(data.clone())).is_ok());
        let data = fields! { "message" => "to stderr", "level" => "error" };
        assert!(adapter.log("app", &data, &raw(data.clone())).is_ok());
    }
}
