//! `serde_json::Value` adapters.
//!
//! JSON values convert into [`Dynamic`] containers holding plain Rust values: `null`
//! is nil, numbers become `i64`, `u64` or `f64`, arrays `Vec<Dynamic>` and objects
//! `HashMap<String, Dynamic>`. The reverse direction encodes through
//! [`Serializable`]; values that cannot be encoded leave the destination untouched.
//!
//! # Examples
//!
//! ```rust
//! use conv::extend::json::to_dynamic;
//!
//! let value = to_dynamic(&serde_json::json!({"a": [1, "x"]}));
//! assert!(!value.is_nil());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Number, Value};

use crate::convert::custom::{CustomConverter, TypedConverter};
use crate::reflect::Serializable;
use crate::Dynamic;

/// Converts a JSON value into a dynamic value.
pub fn to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::nil(),
        Value::Bool(b) => Dynamic::new(*b),
        Value::Number(n) => number(n),
        Value::String(s) => Dynamic::new(s.clone()),
        Value::Array(items) => Dynamic::new(to_list(items)),
        Value::Object(map) => Dynamic::new(to_object(map)),
    }
}

fn number(n: &Number) -> Dynamic {
    if let Some(i) = n.as_i64() {
        Dynamic::new(i)
    } else if let Some(u) = n.as_u64() {
        Dynamic::new(u)
    } else {
        Dynamic::new(n.as_f64().unwrap_or_default())
    }
}

fn to_list(items: &[Value]) -> Vec<Dynamic> {
    items.iter().map(to_dynamic).collect()
}

fn to_object(map: &serde_json::Map<String, Value>) -> HashMap<String, Dynamic> {
    map.iter().map(|(k, v)| (k.clone(), to_dynamic(v))).collect()
}

fn encode(value: &dyn crate::reflect::Reflect) -> Option<Value> {
    serde_json::to_value(Serializable(value)).ok()
}

pub(crate) fn adapters() -> Vec<Arc<dyn CustomConverter>> {
    vec![
        Arc::new(TypedConverter::new("[json2Dynamic]", |dst: &mut Dynamic, src: &Value| {
            *dst = to_dynamic(src);
        })),
        Arc::new(TypedConverter::new("[dynamic2Json]", |dst: &mut Value, src: &Dynamic| {
            if let Some(value) = encode(src) {
                *dst = value;
            }
        })),
        Arc::new(TypedConverter::new("[json2List]", |dst: &mut Vec<Dynamic>, src: &Value| {
            if let Value::Array(items) = src {
                *dst = to_list(items);
            }
        })),
        Arc::new(TypedConverter::new("[list2Json]", |dst: &mut Value, src: &Vec<Dynamic>| {
            if let Some(value) = encode(src) {
                *dst = value;
            }
        })),
        Arc::new(TypedConverter::new(
            "[json2Object]",
            |dst: &mut HashMap<String, Dynamic>, src: &Value| {
                if let Value::Object(map) = src {
                    *dst = to_object(map);
                }
            },
        )),
        Arc::new(TypedConverter::new(
            "[object2Json]",
            |dst: &mut Value, src: &HashMap<String, Dynamic>| {
                if let Some(value) = encode(src) {
                    *dst = value;
                }
            },
        )),
    ]
}
