//! Redaction of sensitive keys from event payloads
//!
//! The filter walks a payload depth-first and builds a fresh structure; the
//! input is never touched. Fields whose key is blacklisted are replaced
//! wholesale by [`FILTERED`]. Functions and symbols are dropped, type
//! references and null-ish values pass through.
//!
//! Before descending into a container the filter probes it with
//! [`FieldValue::to_json_value`]. A container that fails the probe (it holds
//! a reference cycle, or is absurdly deep) is reduced to a shallow copy of
//! its primitive members.

use super::value::{FieldValue, Fields, ValueKind};
use serde::{Deserialize, Serialize};

/// Replacement written over blacklisted values
pub const FILTERED: &str = "**filtered**";

/// Containers nested deeper than this come back empty
pub const FILTER_MAX_DEPTH: usize = 16;

/// Ordered set of keys whose values never reach an adapter
///
/// # Example
///
/// ```
/// use context_event_logger::core::{Blacklist, FieldValue};
/// use context_event_logger::fields;
///
/// let blacklist = Blacklist::from_keys(["user"]);
/// let event = fields! { "message" => "m", "user" => fields! { "id" => 1 } };
///
/// let filtered = blacklist.filter_fields(&event);
/// assert_eq!(filtered["user"], FieldValue::from("**filtered**"));
/// assert_eq!(filtered["message"], FieldValue::from("m"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blacklist {
    keys: Vec<String>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Build from keys, keeping the first occurrence of duplicates
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut blacklist = Self::new();
        for key in keys {
            blacklist.insert(key);
        }
        blacklist
    }

    /// Add a key; returns `false` if it was already present
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k != key);
        self.keys.len() != before
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Redact a top-level mapping
    pub fn filter_fields(&self, fields: &Fields) -> Fields {
        self.filter_object(fields, 0)
    }

    /// Redact a single value; `None` means the value is dropped entirely
    pub fn filter_value(&self, value: &FieldValue) -> Option<FieldValue> {
        self.filter_entry(value, 0)
    }

    fn filter_object(&self, fields: &Fields, depth: usize) -> Fields {
        if depth > FILTER_MAX_DEPTH {
            return Fields::new();
        }

        let mut result = Fields::new();
        for (key, value) in fields {
            if self.contains(key) {
                result.insert(key.clone(), FieldValue::from(FILTERED));
                continue;
            }
            if let Some(filtered) = self.filter_entry(value, depth) {
                result.insert(key.clone(), filtered);
            }
        }
        result
    }

    fn filter_array(&self, items: &[FieldValue], depth: usize) -> Vec<FieldValue> {
        if depth > FILTER_MAX_DEPTH {
            return Vec::new();
        }

        items
            .iter()
            .filter_map(|item| self.filter_entry(item, depth))
            .collect()
    }

    fn filter_entry(&self, value: &FieldValue, depth: usize) -> Option<FieldValue> {
        match value.kind() {
            ValueKind::Null | ValueKind::ConstructorLike | ValueKind::Primitive => {
                Some(value.clone())
            }
            ValueKind::PlainFunction | ValueKind::Symbol => None,
            ValueKind::Array | ValueKind::Object | ValueKind::Reference => {
                if value.to_json_value().is_err() {
                    return Some(self.shallow_copy(value));
                }
                match value.dereference() {
                    Some(FieldValue::Object(fields)) => {
                        Some(FieldValue::Object(self.filter_object(&fields, depth + 1)))
                    }
                    Some(FieldValue::Array(items)) => {
                        Some(FieldValue::Array(self.filter_array(&items, depth + 1)))
                    }
                    Some(other) => self.filter_entry(&other, depth),
                    None => Some(FieldValue::Object(Fields::new())),
                }
            }
        }
    }

    /// Keep only the primitive members of a container that failed the probe
    fn shallow_copy(&self, value: &FieldValue) -> FieldValue {
        match value.dereference() {
            Some(FieldValue::Object(fields)) => FieldValue::Object(
                fields
                    .iter()
                    .filter(|(_, v)| v.kind() == ValueKind::Primitive || v.kind() == ValueKind::Null)
                    .map(|(k, v)| {
                        let v = if self.contains(k) {
                            FieldValue::from(FILTERED)
                        } else {
                            v.clone()
                        };
                        (k.clone(), v)
                    })
                    .collect(),
            ),
            Some(FieldValue::Array(items)) => FieldValue::Array(
                items
                    .iter()
                    .filter(|v| v.kind() == ValueKind::Primitive || v.kind() == ValueKind::Null)
                    .cloned()
                    .collect(),
            ),
            _ => FieldValue::Object(Fields::new()),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Blacklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_keys(iter)
    }
}
