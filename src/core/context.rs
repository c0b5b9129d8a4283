//! Hierarchical key-value context
//!
//! A `Context` holds its own data and a weak link to a parent. Its effective
//! view is its own data merged over the effective view of its ancestors,
//! with keys closer to the leaf winning. The view is re-walked on every read
//! because ancestors may change between reads.

use super::value::{FieldValue, Fields};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// Name plus merged data, as returned by [`Context::get`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContext {
    pub name: String,
    pub data: Fields,
}

/// Named context node
///
/// Thread-safe: data sits behind a lock so a context can be shared by every
/// logger of the same name.
///
/// # Example
///
/// ```
/// use context_event_logger::core::{Context, FieldValue};
/// use context_event_logger::fields;
/// use std::sync::Arc;
///
/// let app = Arc::new(Context::new("app").with_payload(fields! { "a" => 1 }));
/// let page = Context::new("page").with_payload(fields! { "b" => 2 }).with_parent(&app);
///
/// let view = page.get(None, None);
/// assert_eq!(view.name, "page");
/// assert_eq!(view.data, fields! { "a" => 1, "b" => 2 });
/// ```
#[derive(Debug)]
pub struct Context {
    name: String,
    data: RwLock<Fields>,
    parent: Option<Weak<Context>>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: RwLock::new(Fields::new()),
            parent: None,
        }
    }

    /// Seed the local data
    #[must_use]
    pub fn with_payload(mut self, payload: Fields) -> Self {
        self.data.get_mut().extend(payload);
        self
    }

    /// Link to a parent without taking ownership of it
    #[must_use]
    pub fn with_parent(mut self, parent: &Arc<Context>) -> Self {
        self.parent = Some(Arc::downgrade(parent));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent context, if one was linked and is still alive
    pub fn parent(&self) -> Option<Arc<Context>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Resolve the effective view
    ///
    /// Without a payload: local data merged over the ancestors reached within
    /// `depth` hops (`None` is unlimited, `Some(0)` and `Some(1)` stop at this
    /// node). With a payload: payload over local data over ancestors, where
    /// `Some(0)` returns the payload untouched.
    pub fn get(&self, payload: Option<&Fields>, depth: Option<usize>) -> ResolvedContext {
        let data = match payload {
            None => match self.parent() {
                Some(parent) if depth.map_or(true, |d| d >= 2) => {
                    let inherited = parent.get(None, depth.map(|d| d - 1)).data;
                    self.merge(&inherited, false, false, None)
                }
                _ => self.local(),
            },
            Some(payload) if depth == Some(0) => payload.clone(),
            Some(payload) => self.merge(payload, true, true, depth),
        };

        ResolvedContext {
            name: self.name.clone(),
            data,
        }
    }

    /// Effective view with no payload and unlimited depth
    pub fn effective(&self) -> Fields {
        self.get(None, None).data
    }

    /// Copy of the local data only
    pub fn local(&self) -> Fields {
        self.data.read().clone()
    }

    /// Patch local data in place; returns the resulting local mapping
    pub fn update(&self, payload: &Fields) -> Fields {
        let mut data = self.data.write();
        for (key, value) in payload {
            data.insert(key.clone(), value.clone());
        }
        data.clone()
    }

    /// Combine `payload` with this node's data into a new mapping
    ///
    /// `before = true` lets payload keys win, `before = false` lets the
    /// origin win. `with_parent` uses the ancestor-merged view (bounded by
    /// `depth`) as origin instead of the local data.
    pub fn merge(
        &self,
        payload: &Fields,
        before: bool,
        with_parent: bool,
        depth: Option<usize>,
    ) -> Fields {
        let origin = if with_parent {
            self.get(None, depth).data
        } else {
            self.local()
        };

        let (mut result, winner) = if before {
            (origin, payload.clone())
        } else {
            (payload.clone(), origin)
        };
        result.extend(winner);
        result
    }

    pub fn get_value(&self, key: &str) -> Option<FieldValue> {
        self.data.read().get(key).cloned()
    }

    pub fn set_value(&self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.data.write().insert(key.into(), value.into());
    }

    pub fn delete_value(&self, key: &str) -> Option<FieldValue> {
        self.data.write().remove(key)
    }

    /// Drop all local data
    pub fn clear(&self) {
        self.data.write().clear();
    }
}
