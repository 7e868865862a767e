//! Generic textual rendering of reflected values.
//!
//! Scalars render as their plain text, pointers as their pointee (`<nil>` when
//! nil), sequences as `[a b c]`, maps as `map[k:v ...]` with sorted keys and
//! structures as `{v1 v2 ...}`. A type's stringification capability takes
//! precedence over all of these.

use std::fmt::Write;

use crate::reflect::{Reflect, ReflectRef, ScalarRef, Shape};

/// Renders any reflected value as text.
pub fn render(value: &dyn Reflect) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &dyn Reflect) {
    let info = value.info();
    if let Some(display) = info.capabilities().display {
        if let Some(text) = display(value.as_any()) {
            out.push_str(&text);
            return;
        }
    }

    match value.reflect_ref() {
        ReflectRef::Scalar(scalar) => out.push_str(&scalar_text(scalar)),
        ReflectRef::Pointer(pointer) => match pointer.pointee() {
            Some(inner) => write_value(out, inner),
            None => out.push_str("<nil>"),
        },
        ReflectRef::Dynamic(dynamic) => match dynamic.value() {
            Some(inner) => write_value(out, inner),
            None => out.push_str("<nil>"),
        },
        ReflectRef::List(list) => {
            out.push('[');
            for index in 0..list.len() {
                if index > 0 {
                    out.push(' ');
                }
                if let Some(item) = list.get(index) {
                    write_value(out, item);
                }
            }
            out.push(']');
        }
        ReflectRef::Map(map) => {
            let mut entries: Vec<(String, String)> = map
                .entries()
                .map(|(k, v)| (render(k), render(v)))
                .collect();
            entries.sort();
            out.push_str("map[");
            for (index, (k, v)) in entries.iter().enumerate() {
                if index > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{k}:{v}");
            }
            out.push(']');
        }
        ReflectRef::Other => match info.shape() {
            Shape::Struct(layout) => {
                out.push('{');
                for (index, field) in layout.fields.iter().enumerate() {
                    if index > 0 {
                        out.push(' ');
                    }
                    if let Some(member) = (field.get)(value.as_any()) {
                        write_value(out, member);
                    }
                }
                out.push('}');
            }
            Shape::Time(time) => {
                if let Some(t) = (time.get)(value.as_any()) {
                    let _ = write!(out, "{}", t.format("%Y-%m-%d %H:%M:%S%.f %z"));
                }
            }
            _ => match info.capabilities().marshal {
                Some(marshal) => match marshal(value.as_any()) {
                    Some(json) => out.push_str(&json.to_string()),
                    None => out.push_str(info.name()),
                },
                None => out.push_str(info.name()),
            },
        },
    }
}

/// Plain text of a scalar; floats use the shortest `%g`-style rendering.
pub(crate) fn scalar_text(scalar: ScalarRef<'_>) -> String {
    match scalar {
        ScalarRef::Bool(v) => v.to_string(),
        ScalarRef::Int(v) => v.to_string(),
        ScalarRef::Int8(v) => v.to_string(),
        ScalarRef::Int16(v) => v.to_string(),
        ScalarRef::Int32(v) => v.to_string(),
        ScalarRef::Int64(v) => v.to_string(),
        ScalarRef::Uint(v) => v.to_string(),
        ScalarRef::Uint8(v) => v.to_string(),
        ScalarRef::Uint16(v) => v.to_string(),
        ScalarRef::Uint32(v) => v.to_string(),
        ScalarRef::Uint64(v) => v.to_string(),
        ScalarRef::Float32(v) => format_float32(*v),
        ScalarRef::Float64(v) => format_float64(*v),
        ScalarRef::Char(v) => v.to_string(),
        ScalarRef::String(v) => v.clone(),
    }
}

/// Shortest `%g` rendering of an `f64`: exponent form below `1e-4` and from `1e6` on.
pub(crate) fn format_float64(v: f64) -> String {
    if !v.is_finite() {
        return non_finite(v.is_nan(), v.is_sign_positive());
    }
    shortest_g(&format!("{v:e}"), || v.to_string())
}

/// Shortest `%g` rendering of an `f32`.
pub(crate) fn format_float32(v: f32) -> String {
    if !v.is_finite() {
        return non_finite(v.is_nan(), v.is_sign_positive());
    }
    shortest_g(&format!("{v:e}"), || v.to_string())
}

fn non_finite(nan: bool, positive: bool) -> String {
    match (nan, positive) {
        (true, _) => "NaN".to_string(),
        (false, true) => "+Inf".to_string(),
        (false, false) => "-Inf".to_string(),
    }
}

fn shortest_g(scientific: &str, plain: impl FnOnce() -> String) -> String {
    let Some((mantissa, exp)) = scientific.split_once('e') else {
        return plain();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return plain();
    };
    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        plain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float64(3.25), "3.25");
        assert_eq!(format_float64(100.0), "100");
        assert_eq!(format_float64(1_000_000.0), "1e+06");
        assert_eq!(format_float64(123_456_789.0), "1.23456789e+08");
        assert_eq!(format_float64(0.0001), "0.0001");
        assert_eq!(format_float64(0.00001), "1e-05");
        assert_eq!(format_float64(-2.5e-7), "-2.5e-07");
        assert_eq!(format_float64(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_float32(0.1), "0.1");
    }

    #[test]
    fn test_render_composites() {
        assert_eq!(render(&vec![1u8, 2, 3]), "[1 2 3]");
        let mut m = BTreeMap::new();
        m.insert("b".to_string(), 2i32);
        m.insert("a".to_string(), 1i32);
        assert_eq!(render(&m), "map[a:1 b:2]");
        assert_eq!(render(&None::<i32>), "<nil>");
        assert_eq!(render(&Some(Box::new(true))), "true");
    }
}
