//! Adapter trait for event sinks and the ordered adapter registry

use super::{error::Result, value::Fields};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Event as the caller passed it, after level and timestamp stamping
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub context: String,
    pub event: Fields,
}

/// Output destination for resolved, redacted events
///
/// Adapters are shared for the lifetime of the session and may be invoked
/// re-entrantly (an adapter may itself log), so they take `&self` and keep
/// any mutable state behind their own locks.
pub trait Adapter: Send + Sync {
    fn log(&self, context: &str, data: &Fields, raw: &RawEvent) -> Result<()>;

    fn name(&self) -> &str {
        "adapter"
    }
}

/// Per-adapter selection predicate over the context name and merged data
pub type FilterFn = Arc<dyn Fn(&str, &Fields) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct AdapterRegistration {
    adapter: Arc<dyn Adapter>,
    filter: Option<FilterFn>,
}

impl AdapterRegistration {
    pub fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.adapter
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }
}

/// Adapters selected for one event
pub struct AdapterMatch {
    pub adapters: Vec<Arc<dyn Adapter>>,
    /// Predicates that panicked and were counted as non-match
    pub filter_failures: usize,
}

/// Ordered list of adapters; additive until cleared
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    entries: Vec<AdapterRegistration>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, adapter: Arc<dyn Adapter>, filter: Option<FilterFn>) {
        self.entries.push(AdapterRegistration { adapter, filter });
    }

    pub fn entries(&self) -> &[AdapterRegistration] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Select adapters for an event, in registration order
    ///
    /// An adapter is selected unless its predicate returns `false` or panics.
    pub fn matching(&self, context: &str, data: &Fields) -> AdapterMatch {
        let mut adapters = Vec::with_capacity(self.entries.len());
        let mut filter_failures = 0;

        for entry in &self.entries {
            let selected = match &entry.filter {
                None => true,
                Some(filter) => {
                    match catch_unwind(AssertUnwindSafe(|| filter(context, data))) {
                        Ok(selected) => selected,
                        Err(_) => {
                            filter_failures += 1;
                            false
                        }
                    }
                }
            };
            if selected {
                adapters.push(Arc::clone(&entry.adapter));
            }
        }

        AdapterMatch {
            adapters,
            filter_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    struct Named(&'static str);

    impl Adapter for Named {
        fn log(&self, _context: &str, _data: &Fields, _raw: &RawEvent) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    fn names(matched: &AdapterMatch) -> Vec<String> {
        matched.adapters.iter().map(|a| a.name().to_string()).collect()
    }

    #[test]
    fn test_unfiltered_adapters_always_match() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(Named("a")), None);
        registry.register(Arc::new(Named("b")), None);

        let matched = registry.matching("app", &Fields::new());
        assert_eq!(names(&matched), vec!["a", "b"]);
    }

    #[test]
    fn test_filter_selects_by_context() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(Named("debug")), None);
        registry.register(
            Arc::new(Named("info")),
            Some(Arc::new(|context: &str, _: &Fields| context == "info")),
        );

        assert_eq!(names(&registry.matching("debug", &Fields::new())), vec!["debug"]);
        assert_eq!(
            names(&registry.matching("info", &Fields::new())),
            vec!["debug", "info"]
        );
    }

    #[test]
    fn test_filter_sees_data() {
        let mut registry = AdapterRegistry::new();
        registry.register(
            Arc::new(Named("errors")),
            Some(Arc::new(|_: &str, data: &Fields| {
                data.get("level").and_then(|v| v.as_str()) == Some("error")
            })),
        );

        assert!(registry.matching("app", &fields! { "level" => "info" }).adapters.is_empty());
        assert_eq!(registry.matching("app", &fields! { "level" => "error" }).adapters.len(), 1);
    }

    #[test]
    fn test_panicking_filter_is_non_match() {
        let mut registry = AdapterRegistry::new();
        registry.register(
            Arc::new(Named("broken")),
            Some(Arc::new(|_: &str, _: &Fields| -> bool { panic!("filter exploded") })),
        );
        registry.register(Arc::new(Named("ok")), None);

        let matched = registry.matching("app", &Fields::new());
        assert_eq!(names(&matched), vec!["ok"]);
        assert_eq!(matched.filter_failures, 1);
    }
}
