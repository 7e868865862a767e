//! Conversion entry points.
//!
//! This module turns a value of one reflected type into a value of another. The first
//! request for a (destination, source, options) triple compiles a converter; every
//! later request with an equal triple reuses it.
//!
//! # Key Components
//!
//! - [`convert_to`] / [`convert`] / [`ostrich_convert`] - one-shot conversions
//! - [`two_phase_convert_to`] / [`two_phase_convert`] / [`ostrich_two_phase_convert`] -
//!   conversions through an intermediate type, each leg with its own options
//! - [`new_converter`] / [`Converter`] - an eagerly resolved converter for repeated use
//! - [`custom`] - user-supplied conversion rules
//! - [`coerce`] - the widening helpers used for [`crate::Dynamic`] sources
//!
//! # Semantics
//!
//! Conversion is best-effort. Members without a converter and values below a time
//! floor leave the destination as it was; unparsable numeric strings write zero. A nil source is a
//! no-op; nil pointer layers on the destination are allocated. A [`crate::Dynamic`]
//! source is converted as the value it holds.
//!
//! # Examples
//!
//! ```rust
//! use conv::{convert, options, Reflect};
//!
//! #[derive(Reflect, Default, Clone)]
//! pub struct User {
//!     pub name: String,
//!     pub age: isize,
//!     pub tag: Option<String>,
//! }
//!
//! #[derive(Reflect, Default, Clone, Debug, PartialEq)]
//! pub struct UserView {
//!     pub name: String,
//!     pub age: i32,
//!     pub tag: Option<String>,
//! }
//!
//! let user = User { name: "ada".into(), age: 36, tag: None };
//! let view: UserView = convert(&user, &[]).unwrap();
//! assert_eq!(view, UserView { name: "ada".into(), age: 36, tag: None });
//!
//! let view: UserView = convert(&user, &[options::banned(["age"])]).unwrap();
//! assert_eq!(view.age, 0);
//! ```
//!
//! # Thread Safety
//!
//! All functions may be called from any thread. Building converters is serialized by
//! one process-wide lock; running them takes no lock.

pub mod coerce;
pub mod custom;

mod collections;
mod dynamic;
mod element;
mod fields;
mod primitive;
mod registry;
mod structs;
mod text;
mod time;

use tracing::warn;

use crate::options::{ConvOption, Options};
use crate::reflect::{deref_value, deref_value_or_zero, Kind, Reflect, ReflectRef, TypeInfo, Typed};
use crate::{Error, Result};

/// Converts `src` into `dst`.
///
/// # Arguments
///
/// * `src` - The source value
/// * `dst` - The destination, updated in place
/// * `opts` - Conversion options
///
/// # Errors
///
/// Returns [`Error::Unsupported`] when the types cannot be converted and
/// [`Error::BadType`] for a [`crate::Dynamic`] source that holds no value.
///
/// # Examples
///
/// ```rust
/// use conv::convert_to;
///
/// let mut out = 7u8;
/// convert_to(&300i32, &mut out, &[]).unwrap();
/// assert_eq!(out, 44);
/// ```
pub fn convert_to<D: Reflect, S: Reflect>(src: &S, dst: &mut D, opts: &[ConvOption]) -> Result<()> {
    convert_phase(src, dst, 0, opts)
}

/// Converts `src` into a new `D`, starting from `D::default()`.
///
/// # Errors
///
/// See [`convert_to`].
///
/// # Examples
///
/// ```rust
/// use conv::convert;
///
/// let n: Option<Box<i64>> = convert(&"12".to_string(), &[]).unwrap();
/// assert_eq!(n, Some(Box::new(12)));
/// ```
pub fn convert<D: Typed, S: Reflect>(src: &S, opts: &[ConvOption]) -> Result<D> {
    let mut dst = D::default();
    convert_to(src, &mut dst, opts)?;
    Ok(dst)
}

/// Like [`convert`], returning `D::default()` on error.
pub fn ostrich_convert<D: Typed, S: Reflect>(src: &S, opts: &[ConvOption]) -> D {
    convert(src, opts).unwrap_or_default()
}

/// Converts `src` into `dst` through an intermediate `T`.
///
/// The first leg uses the options of phase 1, the second those of phase 2 (see
/// [`crate::options::phase`]).
///
/// # Errors
///
/// Returns the first error of either leg.
///
/// # Examples
///
/// ```rust
/// use conv::two_phase_convert_to;
///
/// let mut out = String::new();
/// two_phase_convert_to::<f64, _, _>(&"2.50".to_string(), &mut out, &[]).unwrap();
/// assert_eq!(out, "2.5");
/// ```
pub fn two_phase_convert_to<T: Typed, D: Reflect, S: Reflect>(
    src: &S,
    dst: &mut D,
    opts: &[ConvOption],
) -> Result<()> {
    let mut temp = T::default();
    convert_phase(src, &mut temp, 1, opts)?;
    convert_phase(&temp, dst, 2, opts)
}

/// Converts `src` into a new `D` through an intermediate `T`.
///
/// # Errors
///
/// Returns the first error of either leg.
pub fn two_phase_convert<T: Typed, D: Typed, S: Reflect>(src: &S, opts: &[ConvOption]) -> Result<D> {
    let mut dst = D::default();
    two_phase_convert_to::<T, D, S>(src, &mut dst, opts)?;
    Ok(dst)
}

/// Like [`two_phase_convert`], returning `D::default()` on error.
pub fn ostrich_two_phase_convert<T: Typed, D: Typed, S: Reflect>(src: &S, opts: &[ConvOption]) -> D {
    two_phase_convert::<T, D, S>(src, opts).unwrap_or_default()
}

/// Resolves the converter from `S` to `D` up front.
///
/// # Errors
///
/// Returns [`Error::Unsupported`] when the types cannot be converted.
///
/// # Examples
///
/// ```rust
/// use conv::new_converter;
///
/// let c = new_converter::<Vec<i64>, Vec<String>>(&[]).unwrap();
/// let mut out: Vec<i64> = Vec::new();
/// c.convert(&mut out, &vec!["1".to_string(), "x".to_string()]).unwrap();
/// assert_eq!(out, vec![1, 0]);
/// ```
pub fn new_converter<D: Typed, S: Typed>(opts: &[ConvOption]) -> Result<Converter> {
    let options = Options::build(0, opts);
    let id = registry::global().resolve(D::type_info(), S::type_info(), &options)?;
    let (dst, _) = D::type_info().deref_type();
    let (src, _) = S::type_info().deref_type();
    Ok(Converter { id, dst, src })
}

/// A resolved converter between two base types.
///
/// Values may carry any number of pointer layers around the base types. Converters
/// built from equal types and options compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Converter {
    id: usize,
    dst: &'static TypeInfo,
    src: &'static TypeInfo,
}

impl Converter {
    /// The dereferenced destination type.
    pub fn dst(&self) -> &'static TypeInfo {
        self.dst
    }

    /// The dereferenced source type.
    pub fn src(&self) -> &'static TypeInfo {
        self.src
    }

    /// Converts `src` into `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when either value has another base type than
    /// the converter was built for.
    pub fn convert<D: Reflect, S: Reflect>(&self, dst: &mut D, src: &S) -> Result<()> {
        self.convert_dyn(dst, src)
    }

    /// Type-erased form of [`Converter::convert`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when either value has another base type than
    /// the converter was built for.
    pub fn convert_dyn(&self, dst: &mut dyn Reflect, src: &dyn Reflect) -> Result<()> {
        let src = if self.src.kind() == Kind::Dynamic {
            src
        } else {
            match runtime_source(src) {
                Ok(src) => src,
                Err(_) => return Ok(()),
            }
        };
        check("destination", self.dst, dst.info())?;
        check("source", self.src, src.info())?;
        execute(self.id, dst, src);
        Ok(())
    }
}

fn check(role: &'static str, expected: &'static TypeInfo, actual: &'static TypeInfo) -> Result<()> {
    let (actual, _) = actual.deref_type();
    if actual == expected {
        return Ok(());
    }
    warn!(role, expected = expected.name(), actual = actual.name(), "converter applied to another type");
    Err(Error::TypeMismatch {
        role,
        expected: expected.name(),
        actual: actual.name(),
    })
}

fn convert_phase(src: &dyn Reflect, dst: &mut dyn Reflect, phase: usize, opts: &[ConvOption]) -> Result<()> {
    let src = runtime_source(src)?;
    let options = Options::build(phase, opts);
    let id = registry::global().resolve(dst.info(), src.info(), &options)?;
    execute(id, dst, src);
    Ok(())
}

/// Unwraps [`crate::Dynamic`] values down to the value they hold.
fn runtime_source(mut src: &dyn Reflect) -> Result<&dyn Reflect> {
    while let ReflectRef::Dynamic(dynamic) = src.reflect_ref() {
        src = dynamic
            .value()
            .ok_or_else(|| Error::BadType("dynamic source holds no value".to_string()))?;
    }
    Ok(src)
}

fn execute(id: usize, dst: &mut dyn Reflect, src: &dyn Reflect) {
    let layers = src.info().pointer_layers();
    let Some(src) = deref_value(src) else {
        return;
    };
    let Some(dst) = deref_value_or_zero(dst) else {
        return;
    };
    registry::global().run_layered(id, dst, src, &layers);
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::options::{self, NilValuePolicy};
    use crate::Dynamic;

    #[derive(crate::Reflect, Default, Clone)]
    struct Inner {
        pub code: u16,
    }

    #[derive(crate::Reflect, Default, Clone, Debug, PartialEq)]
    struct InnerView {
        pub code: String,
    }

    #[derive(crate::Reflect, Default, Clone)]
    struct Outer {
        pub inner: Option<Box<Inner>>,
        pub count: i64,
    }

    #[derive(crate::Reflect, Default, Clone, Debug, PartialEq)]
    struct OuterView {
        pub inner: InnerView,
        pub count: u8,
    }

    #[derive(crate::Reflect, Default, Clone, Debug, PartialEq)]
    struct OuterPtrView {
        pub inner: Option<InnerView>,
    }

    #[test]
    fn test_primitive_round_trip() {
        let mut out = String::new();
        convert_to(&-12i32, &mut out, &[]).unwrap();
        let back: i32 = convert(&out, &[]).unwrap();
        assert_eq!(back, -12);
    }

    #[test]
    fn test_bool_asymmetry() {
        let mut n = 5i32;
        convert_to(&true, &mut n, &[]).unwrap();
        assert_eq!(n, 1);
        let mut n = 5i32;
        convert_to(&false, &mut n, &[]).unwrap();
        assert_eq!(n, 5);
    }

    #[test]
    fn test_nil_source_is_noop() {
        let mut out = "keep".to_string();
        convert_to(&None::<Box<i32>>, &mut out, &[]).unwrap();
        assert_eq!(out, "keep");
    }

    #[test]
    fn test_nil_dynamic_is_bad_type() {
        let mut out = 0i32;
        let err = convert_to(&Dynamic::nil(), &mut out, &[]);
        assert!(matches!(err, Err(Error::BadType(_))));
    }

    #[test]
    fn test_dynamic_source_unwrapped() {
        let src = Dynamic::new(Outer {
            inner: Some(Box::new(Inner { code: 7 })),
            count: 3,
        });
        let out: OuterView = convert(&src, &[]).unwrap();
        assert_eq!(out.inner.code, "7");
        assert_eq!(out.count, 3);
    }

    #[test]
    fn test_nil_struct_pointer_policies() {
        let src = Outer::default();

        let out: OuterPtrView = convert(&src, &[]).unwrap();
        assert_eq!(out.inner, None);

        let mut out = OuterView {
            inner: InnerView { code: "x".into() },
            count: 9,
        };
        convert_to(&src, &mut out, &[]).unwrap();
        assert_eq!(out.inner.code, "0");

        let mut out = OuterView {
            inner: InnerView { code: "x".into() },
            count: 9,
        };
        convert_to(&src, &mut out, &[options::nil_value_policy(NilValuePolicy::Ignore)]).unwrap();
        assert_eq!(out.inner.code, "x");
        assert_eq!(out.count, 0);
    }

    #[test]
    fn test_converter_identity_and_mismatch() {
        let a = new_converter::<OuterView, Outer>(&[]).unwrap();
        let b = new_converter::<Option<OuterView>, Box<Outer>>(&[]).unwrap();
        assert_eq!(a, b);

        let mut out = OuterView::default();
        let err = a.convert(&mut out, &Inner::default());
        assert!(matches!(err, Err(Error::TypeMismatch { role: "source", .. })));
        let err = a.convert(&mut 0u8, &Outer::default());
        assert!(matches!(err, Err(Error::TypeMismatch { role: "destination", .. })));

        a.convert(&mut out, &Some(Box::new(Outer { inner: None, count: 2 }))).unwrap();
        assert_eq!(out.count, 2);
    }

    #[test]
    fn test_dynamic_destination_keeps_layers() {
        let out: Dynamic = convert(&Some(5i32), &[]).unwrap();
        assert_eq!(out.downcast_ref::<Option<i32>>(), Some(&Some(5)));
    }

    #[test]
    fn test_two_phase_options() {
        let src = Outer {
            inner: Some(Box::new(Inner { code: 1 })),
            count: 4,
        };
        let opts = [options::phase([options::banned(["count"])])];
        let out: OuterView = two_phase_convert::<OuterView, OuterView, Outer>(&src, &opts).unwrap();
        assert_eq!(out.count, 0);
        assert_eq!(out.inner.code, "1");

        let opts = [options::phase([]), options::phase([options::banned(["count"])])];
        let out: HashMap<String, Dynamic> =
            two_phase_convert::<OuterView, HashMap<String, Dynamic>, Outer>(&src, &opts).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out.contains_key("inner"));
    }

    #[test]
    fn test_ostrich_defaults_on_error() {
        let out: Vec<i32> = ostrich_convert(&true, &[]);
        assert!(out.is_empty());
        let out: Vec<i32> = ostrich_two_phase_convert::<String, Vec<i32>, bool>(&true, &[]);
        assert!(out.is_empty());
    }
}
