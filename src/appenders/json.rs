//! JSON adapter for structured logging

use crate::core::{
    adapter::{Adapter, RawEvent},
    serializer, FieldValue, Fields, LoggerError, Result, ValueKind,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// JSON file adapter for structured logging
///
/// Writes each event as a single-line JSON object (JSONL format) with the
/// context name under `context`. Compatible with log aggregation tools like
/// ELK, Loki, etc.
pub struct JsonAdapter {
    writer: Mutex<BufWriter<File>>,
    pretty: bool,
}

impl JsonAdapter {
    /// Create a new JSON adapter appending to `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, false)
    }

    /// Create a new JSON adapter with pretty printing
    pub fn new_pretty<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, true)
    }

    fn open<P: AsRef<Path>>(path: P, pretty: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation("opening JSON log", path.display().to_string(), e)
            })?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            pretty,
        })
    }

    /// JSON object written for an event
    ///
    /// Functions, type references, symbols and `undefined` are left out.
    /// A value that cannot be represented as JSON (a reference cycle) is
    /// written as its serializer text instead.
    pub fn to_json(context: &str, data: &Fields) -> Value {
        let mut object = Map::new();
        for (key, value) in data {
            let omitted = matches!(
                value.dereference().map(|v| v.kind()),
                Some(ValueKind::PlainFunction | ValueKind::ConstructorLike | ValueKind::Symbol)
            ) || matches!(value, FieldValue::Undefined);
            if omitted {
                continue;
            }
            let json = value
                .to_json_value()
                .unwrap_or_else(|_| Value::String(serializer::to_str(value)));
            object.insert(key.clone(), json);
        }
        object.insert("context".to_string(), Value::String(context.to_string()));
        Value::Object(object)
    }
}

impl Adapter for JsonAdapter {
    fn log(&self, context: &str, data: &Fields, _raw: &RawEvent) -> Result<()> {
        let json = Self::to_json(context, data);
        let line = if self.pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)
            .and_then(|()| writer.flush())
            .map_err(|e| LoggerError::io_operation("appending JSON record", "buffered write failed", e))
    }

    fn name(&self) -> &str {
        "json"
    }
}
