//! In-memory capturing adapter

use crate::core::{
    adapter::{Adapter, RawEvent},
    Fields, Result,
};
use parking_lot::Mutex;

/// Keeps every delivered event in memory
///
/// Each entry is the context name plus the merged, redacted data the
/// adapter received. Raw events are kept alongside for callers that need
/// the event as it was logged.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    entries: Mutex<Vec<(String, Fields)>>,
    raw: Mutex<Vec<RawEvent>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every `(context, data)` pair, oldest first
    pub fn entries(&self) -> Vec<(String, Fields)> {
        self.entries.lock().clone()
    }

    pub fn raw_events(&self) -> Vec<RawEvent> {
        self.raw.lock().clone()
    }

    pub fn last(&self) -> Option<(String, Fields)> {
        self.entries.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        self.raw.lock().clear();
    }
}

impl Adapter for MemoryAdapter {
    fn log(&self, context: &str, data: &Fields, raw: &RawEvent) -> Result<()> {
        self.entries.lock().push((context.to_string(), data.clone()));
        self.raw.lock().push(raw.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    #[test]
    fn test_captures_in_order() {
        let adapter = MemoryAdapter::new();
        assert!(adapter.is_empty());

        for i in 0..3 {
            let data = fields! { "i" => i };
            let raw = RawEvent {
                context: "app".to_string(),
                event: data.clone(),
            };
            adapter.log("app", &data, &raw).unwrap();
        }

        assert_eq!(adapter.len(), 3);
        assert_eq!(adapter.last(), Some(("app".to_string(), fields! { "i" => 2 })));
        assert_eq!(adapter.raw_events()[0].event, fields! { "i" => 0 });

        adapter.clear();
        assert!(adapter.is_empty());
        assert!(adapter.raw_events().is_empty());
    }
}
