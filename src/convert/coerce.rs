//! Widening helpers.
//!
//! Loose coercions of any reflected value to `i64`, `f64` and `String`. They follow
//! pointer layers and [`crate::Dynamic`] values; nil yields the zero value. The
//! primitive table uses them for every `Dynamic` source.
//!
//! # Examples
//!
//! ```rust
//! use conv::convert::coerce::{as_f64, as_i64, as_string};
//! use conv::Dynamic;
//!
//! assert_eq!(as_i64(&"12".to_string()), 12);
//! assert_eq!(as_i64(&"2.9".to_string()), 2);
//! assert_eq!(as_f64(&Some(Box::new(true))), 1.0);
//! assert_eq!(as_string(&Dynamic::new(1.5f64)), "1.5");
//! assert_eq!(as_string(&Dynamic::nil()), "");
//! ```

use crate::reflect::{render, scalar_text, Reflect, ReflectRef, ScalarRef};

/// Follows pointers and `Dynamic` values down to a concrete value.
fn resolve(mut value: &dyn Reflect) -> Option<&dyn Reflect> {
    loop {
        value = match value.reflect_ref() {
            ReflectRef::Pointer(pointer) => pointer.pointee()?,
            ReflectRef::Dynamic(dynamic) => dynamic.value()?,
            _ => return Some(value),
        };
    }
}

/// Coerces to `i64`: integers widen or wrap, floats truncate, booleans are `0`/`1`
/// and strings parse as an integer, then as a float.
pub fn as_i64(value: &dyn Reflect) -> i64 {
    let Some(value) = resolve(value) else {
        return 0;
    };
    match value.reflect_ref() {
        ReflectRef::Scalar(scalar) => match scalar {
            ScalarRef::Bool(v) => i64::from(*v),
            ScalarRef::Int(v) => *v as i64,
            ScalarRef::Int8(v) => i64::from(*v),
            ScalarRef::Int16(v) => i64::from(*v),
            ScalarRef::Int32(v) => i64::from(*v),
            ScalarRef::Int64(v) => *v,
            ScalarRef::Uint(v) => *v as i64,
            ScalarRef::Uint8(v) => i64::from(*v),
            ScalarRef::Uint16(v) => i64::from(*v),
            ScalarRef::Uint32(v) => i64::from(*v),
            ScalarRef::Uint64(v) => *v as i64,
            ScalarRef::Float32(v) => *v as i64,
            ScalarRef::Float64(v) => *v as i64,
            ScalarRef::Char(v) => i64::from(u32::from(*v)),
            ScalarRef::String(s) => s
                .parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0),
        },
        _ => 0,
    }
}

/// Coerces to `f64`: numbers widen, booleans are `0.0`/`1.0` and strings parse as a
/// float.
pub fn as_f64(value: &dyn Reflect) -> f64 {
    let Some(value) = resolve(value) else {
        return 0.0;
    };
    match value.reflect_ref() {
        ReflectRef::Scalar(scalar) => match scalar {
            ScalarRef::Bool(v) => f64::from(u8::from(*v)),
            ScalarRef::Int(v) => *v as f64,
            ScalarRef::Int8(v) => f64::from(*v),
            ScalarRef::Int16(v) => f64::from(*v),
            ScalarRef::Int32(v) => f64::from(*v),
            ScalarRef::Int64(v) => *v as f64,
            ScalarRef::Uint(v) => *v as f64,
            ScalarRef::Uint8(v) => f64::from(*v),
            ScalarRef::Uint16(v) => f64::from(*v),
            ScalarRef::Uint32(v) => f64::from(*v),
            ScalarRef::Uint64(v) => *v as f64,
            ScalarRef::Float32(v) => f64::from(*v),
            ScalarRef::Float64(v) => *v,
            ScalarRef::Char(v) => f64::from(u32::from(*v)),
            ScalarRef::String(s) => s.parse::<f64>().unwrap_or(0.0),
        },
        _ => 0.0,
    }
}

/// Coerces to `String`.
///
/// Scalars use their plain text (floats without exponent), byte vectors decode
/// lossily, char vectors are collected, types with a stringification capability use
/// it, and everything else goes through [`render`].
pub fn as_string(value: &dyn Reflect) -> String {
    let Some(value) = resolve(value) else {
        return String::new();
    };
    match value.reflect_ref() {
        ReflectRef::Scalar(ScalarRef::Float32(v)) => v.to_string(),
        ReflectRef::Scalar(ScalarRef::Float64(v)) => v.to_string(),
        ReflectRef::Scalar(scalar) => scalar_text(scalar),
        _ => {
            if let Some(bytes) = value.downcast_ref::<Vec<u8>>() {
                return String::from_utf8_lossy(bytes).into_owned();
            }
            if let Some(chars) = value.downcast_ref::<Vec<char>>() {
                return chars.iter().collect();
            }
            render(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dynamic;

    #[test]
    fn test_as_i64() {
        assert_eq!(as_i64(&-3i8), -3);
        assert_eq!(as_i64(&u64::MAX), -1);
        assert_eq!(as_i64(&7.9f32), 7);
        assert_eq!(as_i64(&true), 1);
        assert_eq!(as_i64(&"x".to_string()), 0);
        assert_eq!(as_i64(&Dynamic::new(Some(5u16))), 5);
        assert_eq!(as_i64(&None::<i32>), 0);
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(as_f64(&"0.25".to_string()), 0.25);
        assert_eq!(as_f64(&9u32), 9.0);
        assert_eq!(as_f64(&Dynamic::nil()), 0.0);
        assert_eq!(as_f64(&vec![1u8]), 0.0);
    }

    #[test]
    fn test_as_string() {
        assert_eq!(as_string(&1e21f64), "1000000000000000000000");
        assert_eq!(as_string(&false), "false");
        assert_eq!(as_string(&vec![104u8, 105]), "hi");
        assert_eq!(as_string(&vec!['o', 'k']), "ok");
        assert_eq!(as_string(&vec![1i32, 2]), "[1 2]");
        assert_eq!(as_string(&Dynamic::new("s".to_string())), "s");
    }
}
