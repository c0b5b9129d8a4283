//! Field values carried by events and contexts
//!
//! `FieldValue` is a closed set of value kinds: primitives, arrays, plain
//! objects, callables, type references, symbols and shared references.
//! Shared references are the only way to alias a value, and so the only way
//! to build a reference cycle.

use super::error::{LoggerError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Key-value mapping used for context data and event payloads
pub type Fields = BTreeMap<String, FieldValue>;

/// Nesting ceiling of the JSON probe
pub const JSON_MAX_DEPTH: usize = 128;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// Coarse classification used by the serializer and the blacklist filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    PlainFunction,
    ConstructorLike,
    Symbol,
    Array,
    Object,
    Primitive,
    Reference,
}

/// Named callable stored in a payload
#[derive(Clone)]
pub struct Callback {
    name: String,
    func: Arc<dyn Fn(&[FieldValue]) -> FieldValue + Send + Sync>,
}

impl Callback {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[FieldValue]) -> FieldValue + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[FieldValue]) -> FieldValue {
        (self.func)(args)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({})", self.name)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

/// Reference to a type, rendered as `class <Name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    name: String,
}

impl ClassRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Reference to `T`, named by the last path segment of its type name
    ///
    /// ```
    /// use context_event_logger::core::ClassRef;
    ///
    /// assert_eq!(ClassRef::of::<Vec<u8>>().name(), "Vec");
    /// ```
    pub fn of<T: ?Sized>() -> Self {
        let full = std::any::type_name::<T>();
        let base = full.split('<').next().unwrap_or(full);
        let name = base.rsplit("::").next().unwrap_or(base);
        Self::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Process-unique symbol with an optional description
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u64,
    description: Option<String>,
}

impl Symbol {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: Some(description.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description.as_deref().unwrap_or(""))
    }
}

/// Aliased, mutable value
///
/// Clones share the same slot. Equality is identity.
#[derive(Clone)]
pub struct SharedValue(Arc<RwLock<FieldValue>>);

impl SharedValue {
    pub fn new(value: impl Into<FieldValue>) -> Self {
        Self(Arc::new(RwLock::new(value.into())))
    }

    /// Snapshot of the current value
    pub fn get(&self) -> FieldValue {
        self.0.read().clone()
    }

    pub fn set(&self, value: impl Into<FieldValue>) {
        *self.0.write() = value.into();
    }

    /// Identity of the slot, stable for the lifetime of any clone
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &SharedValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedValue {
    // Never print the contents: they may contain this very slot.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedValue({:#x})", self.id())
    }
}

impl PartialEq for SharedValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// Value type for context data and event fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<FieldValue>),
    Object(Fields),
    Function(Callback),
    Class(ClassRef),
    Symbol(Symbol),
    Shared(SharedValue),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Null => ValueKind::Null,
            FieldValue::Undefined
            | FieldValue::Bool(_)
            | FieldValue::Int(_)
            | FieldValue::Float(_)
            | FieldValue::String(_) => ValueKind::Primitive,
            FieldValue::Array(_) => ValueKind::Array,
            FieldValue::Object(_) => ValueKind::Object,
            FieldValue::Function(_) => ValueKind::PlainFunction,
            FieldValue::Class(_) => ValueKind::ConstructorLike,
            FieldValue::Symbol(_) => ValueKind::Symbol,
            FieldValue::Shared(_) => ValueKind::Reference,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.kind() == ValueKind::Primitive
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Follow shared links to the first non-shared value
    ///
    /// Returns `None` if the chain of links is longer than [`JSON_MAX_DEPTH`],
    /// which only happens for a slot that (transitively) holds itself.
    pub fn dereference(&self) -> Option<FieldValue> {
        let mut current = self.clone();
        for _ in 0..JSON_MAX_DEPTH {
            let next = match &current {
                FieldValue::Shared(shared) => Some(shared.get()),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Some(current),
            }
        }
        None
    }

    /// Convert to `serde_json::Value` with JSON semantics
    ///
    /// Functions, type references, symbols and `Undefined` are dropped from
    /// objects and become `null` inside arrays. Fails on reference cycles and
    /// on nesting deeper than [`JSON_MAX_DEPTH`]; the blacklist filter uses
    /// this as its cycle probe.
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        let mut path = Vec::new();
        self.json_at(0, &mut path)
    }

    fn json_at(&self, depth: usize, path: &mut Vec<usize>) -> Result<serde_json::Value> {
        use serde_json::Value as Json;

        if depth > JSON_MAX_DEPTH {
            return Err(LoggerError::value_too_deep(JSON_MAX_DEPTH));
        }

        let json = match self {
            FieldValue::Undefined
            | FieldValue::Null
            | FieldValue::Function(_)
            | FieldValue::Class(_)
            | FieldValue::Symbol(_) => Json::Null,
            FieldValue::Bool(b) => Json::Bool(*b),
            FieldValue::Int(i) => Json::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            FieldValue::String(s) => Json::String(s.clone()),
            FieldValue::Array(items) => Json::Array(
                items
                    .iter()
                    .map(|item| item.json_at(depth + 1, path))
                    .collect::<Result<Vec<_>>>()?,
            ),
            FieldValue::Object(fields) => {
                let mut map = serde_json::Map::new();
                for (key, value) in fields {
                    if value.is_json_omitted() {
                        continue;
                    }
                    map.insert(key.clone(), value.json_at(depth + 1, path)?);
                }
                Json::Object(map)
            }
            FieldValue::Shared(shared) => {
                let id = shared.id();
                if path.contains(&id) {
                    return Err(LoggerError::CyclicValue);
                }
                path.push(id);
                let inner = shared.get().json_at(depth, path);
                path.pop();
                inner?
            }
        };
        Ok(json)
    }

    fn is_json_omitted(&self) -> bool {
        matches!(
            self,
            FieldValue::Undefined
                | FieldValue::Function(_)
                | FieldValue::Class(_)
                | FieldValue::Symbol(_)
        )
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", super::serializer::to_str(other)),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::Array(items)
    }
}

impl From<Fields> for FieldValue {
    fn from(fields: Fields) -> Self {
        FieldValue::Object(fields)
    }
}

impl From<Callback> for FieldValue {
    fn from(callback: Callback) -> Self {
        FieldValue::Function(callback)
    }
}

impl From<ClassRef> for FieldValue {
    fn from(class: ClassRef) -> Self {
        FieldValue::Class(class)
    }
}

impl From<Symbol> for FieldValue {
    fn from(symbol: Symbol) -> Self {
        FieldValue::Symbol(symbol)
    }
}

impl From<SharedValue> for FieldValue {
    fn from(shared: SharedValue) -> Self {
        FieldValue::Shared(shared)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => FieldValue::Null,
            Json::Bool(b) => FieldValue::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => FieldValue::String(s),
            Json::Array(items) => {
                FieldValue::Array(items.into_iter().map(FieldValue::from).collect())
            }
            Json::Object(map) => FieldValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    #[test]
    fn test_class_ref_short_name() {
        struct Dialog;
        assert_eq!(ClassRef::of::<Dialog>().name(), "Dialog");
        assert_eq!(ClassRef::of::<String>().name(), "String");
    }

    #[test]
    fn test_symbols_are_unique() {
        let a = Symbol::new("id");
        let b = Symbol::new("id");
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "Symbol(id)");
        assert_eq!(Symbol::anonymous().to_string(), "Symbol()");
    }

    #[test]
    fn test_callback_call() {
        let count = Callback::new("count", |args| FieldValue::from(args.len() as i64));
        assert_eq!(count.name(), "count");
        assert_eq!(
            count.call(&[FieldValue::from("a"), FieldValue::Null]),
            FieldValue::Int(2)
        );
    }

    #[test]
    fn test_json_drops_non_data_fields() {
        let value = FieldValue::Object(fields! {
            "a" => 1,
            "fn" => Callback::new("noop", |_| FieldValue::Undefined),
            "u" => FieldValue::Undefined,
            "list" => vec![FieldValue::from("x"), FieldValue::Symbol(Symbol::anonymous())],
        });

        let json = value.to_json_value().expect("acyclic value");
        assert_eq!(json, serde_json::json!({"a": 1, "list": ["x", null]}));
    }

    #[test]
    fn test_json_detects_cycle() {
        let node = SharedValue::new(Fields::new());
        node.set(fields! { "name" => "node", "me" => node.clone() });

        let result = FieldValue::Shared(node.clone()).to_json_value();
        assert!(matches!(result, Err(LoggerError::CyclicValue)));

        // break the cycle so the slot is freed
        node.set(FieldValue::Null);
    }

    #[test]
    fn test_json_allows_repeated_acyclic_alias() {
        let shared = SharedValue::new(fields! { "id" => 7 });
        let value = FieldValue::Array(vec![shared.clone().into(), shared.into()]);

        let json = value.to_json_value().expect("aliasing is not a cycle");
        assert_eq!(json, serde_json::json!([{"id": 7}, {"id": 7}]));
    }

    #[test]
    fn test_from_json() {
        let value = FieldValue::from(serde_json::json!({"n": 1, "f": 1.5, "s": "x"}));
        let expected = FieldValue::Object(fields! { "n" => 1, "f" => 1.5, "s" => "x" });
        assert_eq!(value, expected);
    }

    #[test]
    fn test_dereference_self_loop() {
        let slot = SharedValue::new(FieldValue::Null);
        slot.set(slot.clone());
        assert!(FieldValue::Shared(slot.clone()).dereference().is_none());
        slot.set(FieldValue::Null);
    }
}
