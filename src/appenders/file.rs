//! File adapter implementation

use crate::core::{
    adapter::{Adapter, RawEvent},
    record::sanitize_message,
    serializer, FieldValue, Fields, LoggerError, Result,
};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default output file
pub const DEFAULT_FILE_NAME: &str = "logfile.json";

/// Key naming the emitting context on every written line
const CONTEXT_KEY: &str = "context";

/// Appends one serialized line per event
///
/// Each line is the serializer rendering of the event with the context name
/// appended last: `{message:'test',ts:'...',context:'app'}`. The file is
/// opened per event and held under an exclusive lock while appending, so
/// several processes may share one log file.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    path: PathBuf,
    depth: Option<usize>,
}

impl FileAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            depth: None,
        }
    }

    /// With a depth of 0 or 1 only the event's own keys are written
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the line written for an event, without the trailing newline
    pub fn format_line(&self, context: &str, data: &Fields, raw: &RawEvent) -> String {
        let mut source = match self.depth {
            Some(depth) if depth <= 1 => raw.event.clone(),
            _ => data.clone(),
        };
        source.remove(CONTEXT_KEY);

        let body = serializer::to_str(&FieldValue::Object(source));
        let context_field = format!("{}:'{}'", CONTEXT_KEY, context);
        let line = match body.strip_suffix('}') {
            Some("{") => format!("{{{}}}", context_field),
            Some(open) => format!("{},{}}}", open, context_field),
            None => format!("{{{}}}", context_field),
        };
        sanitize_message(&line)
    }
}

impl Default for FileAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME)
    }
}

impl Adapter for FileAdapter {
    fn log(&self, context: &str, data: &Fields, raw: &RawEvent) -> Result<()> {
        let mut line = self.format_line(context, data, raw);
        line.push('\n');

        let target = self.path.display().to_string();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LoggerError::io_operation("opening log file", &target, e))?;
        file.lock_exclusive()
            .map_err(|e| LoggerError::io_operation("locking log file", &target, e))?;
        let written = file.write_all(line.as_bytes()).and_then(|()| file.flush());
        let unlocked = FileExt::unlock(&file);
        written.map_err(|e| LoggerError::io_operation("appending record", &target, e))?;
        unlocked.map_err(|e| LoggerError::io_operation("unlocking log file", &target, e))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use std::fs;
    use tempfile::tempdir;

    fn raw(event: Fields) -> RawEvent {
        RawEvent {
            context: "app".to_string(),
            event,
        }
    }

    #[test]
    fn test_format_appends_context_last() {
        let adapter = FileAdapter::default();
        let data = fields! { "message" => "test", "ts" => "T" };
        assert_eq!(
            adapter.format_line("app", &data, &raw(data.clone())),
            "{message:'test',ts:'T',context:'app'}"
        );
        assert_eq!(
            adapter.format_line("app", &Fields::new(), &raw(Fields::new())),
            "{context:'app'}"
        );
        assert_eq!(adapter.path(), Path::new(DEFAULT_FILE_NAME));
    }

    #[test]
    fn test_context_key_is_replaced() {
        let adapter = FileAdapter::default();
        let data = fields! { "context" => "spoofed", "message" => "m" };
        assert_eq!(
            adapter.format_line("app", &data, &raw(Fields::new())),
            "{message:'m',context:'app'}"
        );
    }

    #[test]
    fn test_depth_limits_to_event_keys() {
        let adapter = FileAdapter::default().with_depth(0);
        let data = fields! { "message" => "m", "inherited" => 1 };
        let event = fields! { "message" => "m" };
        assert_eq!(
            adapter.format_line("app", &data, &raw(event)),
            "{message:'m',context:'app'}"
        );
    }

    #[test]
    fn test_appends_lines() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("events.log");
        let adapter = FileAdapter::new(&path);

        let first = fields! { "message" => "one" };
        let second = fields! { "message" => "two\nlines" };
        adapter.log("app", &first, &raw(first.clone()))?;
        adapter.log("app", &second, &raw(second.clone()))?;

        let content = fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec!["{message:'one',context:'app'}", "{message:'two\\nlines',context:'app'}"]
        );
        Ok(())
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path().join("missing").join("events.log"));
        let data = fields! { "message" => "m" };
        let err = adapter
            .log("app", &data, &raw(data.clone()))
            .expect_err("parent directory does not exist");
        assert!(matches!(
            err,
            LoggerError::IoOperation { ref operation, .. } if operation == "opening log file"
        ));
        assert!(err.to_string().contains("events.log"));
    }
}
