//! String destinations driven by options.
//!
//! Three opt-in ways of turning any value into a `String`: JSON encoding of the whole
//! value ([`crate::options::serialize_to_string`]), the type's `Display` capability
//! ([`crate::options::use_strings`]) and its JSON marshal capability
//! ([`crate::options::use_marshal`]). Encoding failures leave the destination
//! untouched.

use std::any::Any;

use crate::options::NilValuePolicy;
use crate::reflect::{Reflect, ReflectRef, Serializable};

/// A compiled string conversion.
pub(crate) enum TextProcedure {
    /// `serde_json` encoding of the source.
    Serialize(NilValuePolicy),
    /// The `Display` capability.
    Display(fn(&dyn Any) -> Option<String>),
    /// The JSON marshal capability.
    Marshal(fn(&dyn Any) -> Option<serde_json::Value>),
}

impl TextProcedure {
    pub(crate) fn run(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        let Some(dst) = dst.downcast_mut::<String>() else {
            return;
        };
        let text = match self {
            TextProcedure::Serialize(policy) => match src.reflect_ref() {
                ReflectRef::Dynamic(dynamic) if dynamic.is_nil() => match policy {
                    NilValuePolicy::Ignore => return,
                    NilValuePolicy::Zero => "null".to_string(),
                },
                _ => match serde_json::to_string(&Serializable(src)) {
                    Ok(text) => text,
                    Err(_) => return,
                },
            },
            TextProcedure::Display(display) => match display(src.as_any()) {
                Some(text) => text,
                None => return,
            },
            TextProcedure::Marshal(marshal) => match marshal(src.as_any()) {
                Some(json) => json.to_string(),
                None => return,
            },
        };
        *dst = text;
    }
}
