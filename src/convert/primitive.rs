//! Primitive dispatch table.
//!
//! Fixed coercion rules between the scalar kinds, keyed by (destination kind, source
//! kind). The table is built once; resolution looks a pair up and stores the plain
//! function pointer in the converter.
//!
//! # Key Components
//!
//! - Numeric families: every integer and float kind plus `char` through its code point,
//!   using Rust `as` semantics (`300` into `u8` is `44`, floats saturate)
//! - `bool`: `true` writes `1` into numbers, `false` leaves them untouched; numbers are
//!   `true` when non-zero
//! - `String`: scalars render as text; parsing happens at the destination width, a
//!   malformed string writes zero (`false` for `bool`) and an out-of-range one the
//!   nearest bound
//! - [`crate::Dynamic`] sources coerce through [`crate::convert::coerce`]
//! - `Vec<u8>` / `Vec<char>` to and from `String`, buffer-reusing or copying

use std::collections::HashMap;
use std::num::IntErrorKind;
use std::sync::LazyLock;

use crate::convert::coerce::{as_f64, as_i64, as_string};
use crate::reflect::{scalar_text, Kind, Reflect, ReflectMut, ReflectRef, ScalarMut, ScalarRef, TypeInfo};

/// Entry of the dispatch table.
pub(crate) type PrimitiveFn = fn(&mut dyn Reflect, &dyn Reflect);

const INTEGERS: [Kind; 10] = [
    Kind::Int,
    Kind::Int8,
    Kind::Int16,
    Kind::Int32,
    Kind::Int64,
    Kind::Uint,
    Kind::Uint8,
    Kind::Uint16,
    Kind::Uint32,
    Kind::Uint64,
];

const FLOATS: [Kind; 2] = [Kind::Float32, Kind::Float64];

static TABLE: LazyLock<HashMap<(Kind, Kind), PrimitiveFn>> = LazyLock::new(build_table);

fn build_table() -> HashMap<(Kind, Kind), PrimitiveFn> {
    let numbers: Vec<Kind> = INTEGERS
        .iter()
        .chain(FLOATS.iter())
        .copied()
        .chain([Kind::Char])
        .collect();

    let mut table: HashMap<(Kind, Kind), PrimitiveFn> = HashMap::new();
    for &dst in &numbers {
        for &src in &numbers {
            table.insert((dst, src), number_to_number);
        }
        table.insert((dst, Kind::Bool), bool_to_number);
        table.insert((Kind::Bool, dst), number_to_bool);
        table.insert((Kind::String, dst), scalar_to_string);
        table.insert((dst, Kind::String), string_to_number);
        table.insert((dst, Kind::Dynamic), dynamic_to_number);
    }
    table.insert((Kind::Char, Kind::Char), copy);
    table.insert((Kind::Char, Kind::String), string_to_char);
    table.insert((Kind::Bool, Kind::Bool), copy);
    table.insert((Kind::String, Kind::String), copy);
    table.insert((Kind::String, Kind::Bool), scalar_to_string);
    table.insert((Kind::Bool, Kind::String), string_to_bool);
    table.insert((Kind::Bool, Kind::Dynamic), dynamic_to_bool);
    table.insert((Kind::String, Kind::Dynamic), dynamic_to_string);
    table
}

/// Looks up the primitive rule for a dereferenced type pair.
///
/// # Arguments
///
/// * `dst` - The destination base type
/// * `src` - The source base type
/// * `zero_copy` - Reuse the destination buffer for string and vector conversions
pub(crate) fn lookup(dst: &TypeInfo, src: &TypeInfo, zero_copy: bool) -> Option<PrimitiveFn> {
    if let Some(rule) = text_rule(dst, src, zero_copy) {
        return Some(rule);
    }
    if !dst.kind().is_scalar() {
        return None;
    }
    TABLE.get(&(dst.kind(), src.kind())).copied()
}

fn text_rule(dst: &TypeInfo, src: &TypeInfo, zero_copy: bool) -> Option<PrimitiveFn> {
    let rule: PrimitiveFn = match (dst.kind(), src.kind()) {
        (Kind::String, Kind::Slice) if src.is_byte_slice() => {
            if zero_copy {
                bytes_to_string_reuse
            } else {
                bytes_to_string_copy
            }
        }
        (Kind::String, Kind::Slice) if src.is_rune_slice() => {
            if zero_copy {
                chars_to_string_reuse
            } else {
                chars_to_string_copy
            }
        }
        (Kind::Slice, Kind::String) if dst.is_byte_slice() => {
            if zero_copy {
                string_to_bytes_reuse
            } else {
                string_to_bytes_copy
            }
        }
        (Kind::Slice, Kind::String) if dst.is_rune_slice() => {
            if zero_copy {
                string_to_chars_reuse
            } else {
                string_to_chars_copy
            }
        }
        _ => return None,
    };
    Some(rule)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    fn is_nonzero(self) -> bool {
        match self {
            Number::Int(i) => i != 0,
            Number::Float(f) => f != 0.0,
        }
    }
}

fn read_number(src: &dyn Reflect) -> Option<Number> {
    let ReflectRef::Scalar(scalar) = src.reflect_ref() else {
        return None;
    };
    let number = match scalar {
        ScalarRef::Int(v) => Number::Int(*v as i128),
        ScalarRef::Int8(v) => Number::Int(i128::from(*v)),
        ScalarRef::Int16(v) => Number::Int(i128::from(*v)),
        ScalarRef::Int32(v) => Number::Int(i128::from(*v)),
        ScalarRef::Int64(v) => Number::Int(i128::from(*v)),
        ScalarRef::Uint(v) => Number::Int(*v as i128),
        ScalarRef::Uint8(v) => Number::Int(i128::from(*v)),
        ScalarRef::Uint16(v) => Number::Int(i128::from(*v)),
        ScalarRef::Uint32(v) => Number::Int(i128::from(*v)),
        ScalarRef::Uint64(v) => Number::Int(i128::from(*v)),
        ScalarRef::Float32(v) => Number::Float(f64::from(*v)),
        ScalarRef::Float64(v) => Number::Float(*v),
        ScalarRef::Char(v) => Number::Int(i128::from(u32::from(*v))),
        ScalarRef::Bool(_) | ScalarRef::String(_) => return None,
    };
    Some(number)
}

fn write_number(dst: &mut dyn Reflect, number: Number) {
    macro_rules! cast {
        ($dst:expr, $ty:ty) => {
            *$dst = match number {
                Number::Int(i) => i as $ty,
                Number::Float(f) => f as $ty,
            }
        };
    }

    let ReflectMut::Scalar(scalar) = dst.reflect_mut() else {
        return;
    };
    match scalar {
        ScalarMut::Int(d) => cast!(d, isize),
        ScalarMut::Int8(d) => cast!(d, i8),
        ScalarMut::Int16(d) => cast!(d, i16),
        ScalarMut::Int32(d) => cast!(d, i32),
        ScalarMut::Int64(d) => cast!(d, i64),
        ScalarMut::Uint(d) => cast!(d, usize),
        ScalarMut::Uint8(d) => cast!(d, u8),
        ScalarMut::Uint16(d) => cast!(d, u16),
        ScalarMut::Uint32(d) => cast!(d, u32),
        ScalarMut::Uint64(d) => cast!(d, u64),
        ScalarMut::Float32(d) => cast!(d, f32),
        ScalarMut::Float64(d) => cast!(d, f64),
        ScalarMut::Char(d) => {
            let code = match number {
                Number::Int(i) => u32::try_from(i).ok(),
                Number::Float(f) => Some(f as u32),
            };
            if let Some(c) = code.and_then(char::from_u32) {
                *d = c;
            }
        }
        ScalarMut::Bool(_) | ScalarMut::String(_) => {}
    }
}

fn copy(dst: &mut dyn Reflect, src: &dyn Reflect) {
    dst.assign(src);
}

fn number_to_number(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let Some(number) = read_number(src) {
        write_number(dst, number);
    }
}

fn bool_to_number(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if src.downcast_ref::<bool>() == Some(&true) {
        write_number(dst, Number::Int(1));
    }
}

fn number_to_bool(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), Some(number)) = (dst.downcast_mut::<bool>(), read_number(src)) {
        *dst = number.is_nonzero();
    }
}

fn scalar_to_string(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), ReflectRef::Scalar(scalar)) = (dst.downcast_mut::<String>(), src.reflect_ref()) {
        *dst = scalar_text(scalar);
    }
}

fn string_to_number(dst: &mut dyn Reflect, src: &dyn Reflect) {
    // Syntax errors write zero, out-of-range values the nearest bound.
    macro_rules! parse_int {
        ($dst:expr, $ty:ty, $text:expr) => {
            *$dst = match $text.parse::<$ty>() {
                Ok(v) => v,
                Err(e) => match e.kind() {
                    IntErrorKind::PosOverflow => <$ty>::MAX,
                    IntErrorKind::NegOverflow => <$ty>::MIN,
                    _ => 0,
                },
            }
        };
    }

    let Some(text) = src.downcast_ref::<String>() else {
        return;
    };
    let ReflectMut::Scalar(scalar) = dst.reflect_mut() else {
        return;
    };
    match scalar {
        ScalarMut::Int(d) => parse_int!(d, isize, text),
        ScalarMut::Int8(d) => parse_int!(d, i8, text),
        ScalarMut::Int16(d) => parse_int!(d, i16, text),
        ScalarMut::Int32(d) => parse_int!(d, i32, text),
        ScalarMut::Int64(d) => parse_int!(d, i64, text),
        ScalarMut::Uint(d) => parse_int!(d, usize, text),
        ScalarMut::Uint8(d) => parse_int!(d, u8, text),
        ScalarMut::Uint16(d) => parse_int!(d, u16, text),
        ScalarMut::Uint32(d) => parse_int!(d, u32, text),
        ScalarMut::Uint64(d) => parse_int!(d, u64, text),
        ScalarMut::Float32(d) => *d = text.parse::<f32>().unwrap_or(0.0),
        ScalarMut::Float64(d) => *d = text.parse::<f64>().unwrap_or(0.0),
        ScalarMut::Char(d) => {
            if let Some(c) = single_char(text) {
                *d = c;
            }
        }
        ScalarMut::Bool(_) | ScalarMut::String(_) => {}
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn string_to_char(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), Some(text)) = (dst.downcast_mut::<char>(), src.downcast_ref::<String>()) {
        if let Some(c) = single_char(text) {
            *dst = c;
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn string_to_bool(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), Some(text)) = (dst.downcast_mut::<bool>(), src.downcast_ref::<String>()) {
        *dst = parse_bool(text).unwrap_or(false);
    }
}

fn dynamic_to_number(dst: &mut dyn Reflect, src: &dyn Reflect) {
    let number = if dst.info().kind().is_float() {
        Number::Float(as_f64(src))
    } else {
        Number::Int(i128::from(as_i64(src)))
    };
    write_number(dst, number);
}

fn dynamic_to_bool(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let Some(dst) = dst.downcast_mut::<bool>() {
        *dst = as_i64(src) == 1;
    }
}

fn dynamic_to_string(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let Some(dst) = dst.downcast_mut::<String>() {
        *dst = as_string(src);
    }
}

fn bytes_to_string_reuse(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), Some(bytes)) = (dst.downcast_mut::<String>(), src.downcast_ref::<Vec<u8>>()) {
        dst.clear();
        match std::str::from_utf8(bytes) {
            Ok(text) => dst.push_str(text),
            Err(_) => dst.push_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

fn bytes_to_string_copy(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), Some(bytes)) = (dst.downcast_mut::<String>(), src.downcast_ref::<Vec<u8>>()) {
        *dst = String::from_utf8_lossy(bytes).into_owned();
    }
}

fn chars_to_string_reuse(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), Some(chars)) = (dst.downcast_mut::<String>(), src.downcast_ref::<Vec<char>>()) {
        dst.clear();
        dst.extend(chars.iter());
    }
}

fn chars_to_string_copy(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), Some(chars)) = (dst.downcast_mut::<String>(), src.downcast_ref::<Vec<char>>()) {
        *dst = chars.iter().collect();
    }
}

fn string_to_bytes_reuse(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), Some(text)) = (dst.downcast_mut::<Vec<u8>>(), src.downcast_ref::<String>()) {
        dst.clear();
        dst.extend_from_slice(text.as_bytes());
    }
}

fn string_to_bytes_copy(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), Some(text)) = (dst.downcast_mut::<Vec<u8>>(), src.downcast_ref::<String>()) {
        *dst = text.as_bytes().to_vec();
    }
}

fn string_to_chars_reuse(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), Some(text)) = (dst.downcast_mut::<Vec<char>>(), src.downcast_ref::<String>()) {
        dst.clear();
        dst.extend(text.chars());
    }
}

fn string_to_chars_copy(dst: &mut dyn Reflect, src: &dyn Reflect) {
    if let (Some(dst), Some(text)) = (dst.downcast_mut::<Vec<char>>(), src.downcast_ref::<String>()) {
        *dst = text.chars().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Typed;
    use crate::Dynamic;

    fn apply(dst: &mut dyn Reflect, src: &dyn Reflect) {
        let rule = lookup(dst.info(), src.info(), true).expect("primitive rule");
        rule(dst, src);
    }

    #[test]
    fn test_numeric_truncation() {
        let mut d = 0u8;
        apply(&mut d, &300i32);
        assert_eq!(d, 44);

        let mut d = 0i32;
        apply(&mut d, &3.7f64);
        assert_eq!(d, 3);

        let mut d = 9u8;
        apply(&mut d, &-1.5f64);
        assert_eq!(d, 0);

        let mut d = 0.0f32;
        apply(&mut d, &u64::MAX);
        assert_eq!(d, u64::MAX as f32);
    }

    #[test]
    fn test_bool_asymmetry() {
        let mut d = 7i64;
        apply(&mut d, &false);
        assert_eq!(d, 7);
        apply(&mut d, &true);
        assert_eq!(d, 1);

        let mut b = true;
        apply(&mut b, &0.0f64);
        assert!(!b);
        apply(&mut b, &-2i8);
        assert!(b);
    }

    #[test]
    fn test_string_parsing_failures() {
        let mut d = 5u8;
        apply(&mut d, &"12".to_string());
        assert_eq!(d, 12);
        apply(&mut d, &"300".to_string());
        assert_eq!(d, 255);
        apply(&mut d, &"abc".to_string());
        assert_eq!(d, 0);

        let mut d = 5u8;
        apply(&mut d, &"-1".to_string());
        assert_eq!(d, 0);

        let mut n = 5i32;
        apply(&mut n, &"abc".to_string());
        assert_eq!(n, 0);
        apply(&mut n, &"-9999999999".to_string());
        assert_eq!(n, i32::MIN);
        apply(&mut n, &"+17".to_string());
        assert_eq!(n, 17);

        let mut f = 0.0f64;
        apply(&mut f, &"2.5".to_string());
        assert_eq!(f, 2.5);
        apply(&mut f, &"x".to_string());
        assert_eq!(f, 0.0);

        let mut f = 0.0f32;
        apply(&mut f, &"0.1".to_string());
        assert_eq!(f, 0.1f32);
        apply(&mut f, &"1e40".to_string());
        assert_eq!(f, f32::INFINITY);

        let mut b = false;
        apply(&mut b, &"T".to_string());
        assert!(b);
        apply(&mut b, &"yes".to_string());
        assert!(!b);
        b = true;
        apply(&mut b, &"False".to_string());
        assert!(!b);
    }

    #[test]
    fn test_scalar_to_string() {
        let mut s = String::new();
        apply(&mut s, &-42i16);
        assert_eq!(s, "-42");
        apply(&mut s, &1_000_000.0f64);
        assert_eq!(s, "1e+06");
        apply(&mut s, &true);
        assert_eq!(s, "true");
        apply(&mut s, &'x');
        assert_eq!(s, "x");
    }

    #[test]
    fn test_char_code_points() {
        let mut n = 0u32;
        apply(&mut n, &'A');
        assert_eq!(n, 65);

        let mut c = 'z';
        apply(&mut c, &0x110000u32);
        assert_eq!(c, 'z');
        apply(&mut c, &97i64);
        assert_eq!(c, 'a');
        apply(&mut c, &"bc".to_string());
        assert_eq!(c, 'a');
        apply(&mut c, &"é".to_string());
        assert_eq!(c, 'é');
    }

    #[test]
    fn test_dynamic_sources() {
        let mut n = 3i32;
        apply(&mut n, &Dynamic::new("7".to_string()));
        assert_eq!(n, 7);
        apply(&mut n, &Dynamic::nil());
        assert_eq!(n, 0);

        let mut b = false;
        apply(&mut b, &Dynamic::new(1u8));
        assert!(b);
        apply(&mut b, &Dynamic::new(2u8));
        assert!(!b);

        let mut s = String::from("old");
        apply(&mut s, &Dynamic::new(0.5f32));
        assert_eq!(s, "0.5");
    }

    #[test]
    fn test_bytes_and_chars() {
        let mut s = String::with_capacity(64);
        let capacity = s.capacity();
        apply(&mut s, &b"hello".to_vec());
        assert_eq!(s, "hello");
        assert_eq!(s.capacity(), capacity);

        let rule = lookup(String::type_info(), <Vec<u8>>::type_info(), false).unwrap();
        let mut s = String::new();
        rule(&mut s, &vec![0x66u8, 0xff]);
        assert_eq!(s, "f\u{fffd}");

        let mut chars: Vec<char> = Vec::new();
        apply(&mut chars, &"ab".to_string());
        assert_eq!(chars, vec!['a', 'b']);
    }

    #[test]
    fn test_no_rule_for_composites() {
        assert!(lookup(<Vec<i32>>::type_info(), bool::type_info(), true).is_none());
        assert!(lookup(i32::type_info(), <Vec<i32>>::type_info(), true).is_none());
    }
}
