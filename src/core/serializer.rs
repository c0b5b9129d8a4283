//! Depth-bounded single-line rendering of field values
//!
//! Used by adapters for textual records and by `EventLogger::log` to fold
//! non-string arguments into the message. Containers nested [`MAX_DEPTH`]
//! levels below the starting value render as [`TOO_DEEP`], which bounds the
//! cost and also terminates on reference cycles.

use super::value::{FieldValue, ValueKind};

/// Recursion ceiling for containers
pub const MAX_DEPTH: usize = 3;

/// Placeholder for containers past the ceiling
pub const TOO_DEEP: &str = "{...}";

/// Render a value starting at depth 0
///
/// # Example
///
/// ```
/// use context_event_logger::core::{serializer, FieldValue};
/// use context_event_logger::fields;
///
/// let value = FieldValue::from(fields! { "a" => 1, "b" => vec![FieldValue::from("x")] });
/// assert_eq!(serializer::to_str(&value), "{a:1,b:['x']}");
/// ```
pub fn to_str(value: &FieldValue) -> String {
    render(value, 0)
}

/// Render a value that already sits `depth` levels deep
pub fn render(value: &FieldValue, depth: usize) -> String {
    match value {
        FieldValue::Null => "null".to_string(),
        FieldValue::Undefined => "undefined".to_string(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Int(i) => i.to_string(),
        FieldValue::Float(f) => format_float(*f),
        FieldValue::String(s) => format!("'{}'", s),
        FieldValue::Class(class) => format!("class {}", class.name()),
        FieldValue::Function(_) => String::new(),
        FieldValue::Symbol(symbol) => symbol.to_string(),
        FieldValue::Array(items) => {
            if depth >= MAX_DEPTH {
                return TOO_DEEP.to_string();
            }
            let parts: Vec<String> = items
                .iter()
                .filter(|item| !is_plain_function(item))
                .map(|item| render(item, depth + 1))
                .collect();
            format!("[{}]", parts.join(","))
        }
        FieldValue::Object(fields) => {
            if depth >= MAX_DEPTH {
                return TOO_DEEP.to_string();
            }
            let parts: Vec<String> = fields
                .iter()
                .filter(|(_, v)| !is_plain_function(v))
                .map(|(k, v)| format!("{}:{}", k, render(v, depth + 1)))
                .collect();
            format!("{{{}}}", parts.join(","))
        }
        FieldValue::Shared(_) => match value.dereference() {
            Some(inner) => render(&inner, depth),
            None => TOO_DEEP.to_string(),
        },
    }
}

/// Plain functions are left out of containers entirely
pub(crate) fn is_plain_function(value: &FieldValue) -> bool {
    match value.kind() {
        ValueKind::PlainFunction => true,
        ValueKind::Reference => value
            .dereference()
            .is_some_and(|inner| inner.kind() == ValueKind::PlainFunction),
        _ => false,
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{Callback, ClassRef, Fields, SharedValue, Symbol};
    use crate::fields;

    struct BaseAdapter;

    fn noop() -> Callback {
        Callback::new("noop", |_| FieldValue::Undefined)
    }

    #[test]
    fn test_primitives() {
        assert_eq!(to_str(&FieldValue::Null), "null");
        assert_eq!(to_str(&FieldValue::Undefined), "undefined");
        assert_eq!(to_str(&FieldValue::from(true)), "true");
        assert_eq!(to_str(&FieldValue::from(42)), "42");
        assert_eq!(to_str(&FieldValue::from(1.5)), "1.5");
        assert_eq!(to_str(&FieldValue::from(f64::NAN)), "NaN");
        assert_eq!(to_str(&FieldValue::from("x")), "'x'");
    }

    #[test]
    fn test_class() {
        let class = FieldValue::from(ClassRef::of::<BaseAdapter>());
        assert_eq!(to_str(&class), "class BaseAdapter");

        let object = FieldValue::from(fields! { "a" => 1, "z" => ClassRef::of::<BaseAdapter>() });
        assert_eq!(to_str(&object), "{a:1,z:class BaseAdapter}");
    }

    #[test]
    fn test_function_is_blank() {
        assert_eq!(to_str(&FieldValue::from(noop())), "");
    }

    #[test]
    fn test_function_field_is_dropped() {
        let object = FieldValue::from(fields! { "fn" => noop(), "a" => 1 });
        assert_eq!(to_str(&object), "{a:1}");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(to_str(&FieldValue::from(Symbol::new("xxx"))), "Symbol(xxx)");

        let object = FieldValue::from(fields! {
            "a" => 1,
            "y" => Symbol::anonymous(),
            "z" => Symbol::new("some prop"),
        });
        assert_eq!(to_str(&object), "{a:1,y:Symbol(),z:Symbol(some prop)}");
    }

    #[test]
    fn test_nested_containers() {
        let array = FieldValue::from(vec![FieldValue::from("1"), FieldValue::from("2")]);
        assert_eq!(to_str(&array), "['1','2']");

        let complex = FieldValue::from(vec![
            FieldValue::from(fields! { "y" => vec![FieldValue::from(1), FieldValue::from(2)], "z" => 1 }),
            FieldValue::from(fields! { "x" => "10" }),
        ]);
        assert_eq!(to_str(&complex), "[{y:[1,2],z:1},{x:'10'}]");
    }

    #[test]
    fn test_nested_array_under_object_hits_ceiling() {
        let value = FieldValue::from(fields! {
            "y" => fields! { "deep" => vec![FieldValue::from(fields! { "z" => fields! { "i" => 1 } })] },
        });
        assert_eq!(to_str(&value), "{y:{deep:[{...}]}}");
    }

    #[test]
    fn test_depth_ceiling() {
        let a = fields! {
            "i" => 1,
            "b" => fields! {
                "i" => 2,
                "c" => fields! { "i" => 3, "d" => fields! { "i" => 4, "e" => fields! { "i" => 5 } } },
            },
        };
        assert_eq!(
            to_str(&FieldValue::from(a)),
            "{b:{c:{d:{...},i:3},i:2},i:1}"
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let node = SharedValue::new(Fields::new());
        node.set(fields! { "next" => node.clone(), "v" => 1 });

        let rendered = to_str(&FieldValue::from(node.clone()));
        assert_eq!(rendered, "{next:{next:{next:{...},v:1},v:1},v:1}");

        node.set(FieldValue::Null);
    }
}
