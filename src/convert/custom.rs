//! Custom converters.
//!
//! A [`CustomConverter`] is a predicate over a (destination, source) type pair and a
//! transform. Resolution consults the converters of a call before any built-in rule:
//! first the ones passed through [`crate::options::custom_converter`], then the
//! process-wide set installed by [`crate::extend::install`]. The first predicate that
//! matches wins.
//!
//! Both the predicate and the transform see dereferenced types: pointer layers on
//! either side are handled by the surrounding element converter.
//!
//! # Thread Safety
//!
//! Converters are shared as `Arc<dyn CustomConverter>` across threads and must be
//! `Send + Sync`. The predicate runs while the resolution lock is held, so it must not
//! start another conversion.
//!
//! # Examples
//!
//! ```rust
//! use conv::convert::custom::TypedConverter;
//! use conv::{convert, options};
//!
//! let upper = TypedConverter::new("upper", |dst: &mut String, src: &String| {
//!     *dst = src.to_uppercase();
//! });
//! let out: String = convert(&"abc".to_string(), &[options::custom_converter(upper)]).unwrap();
//! assert_eq!(out, "ABC");
//! ```

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use crate::reflect::{Reflect, TypeInfo, Typed};

/// A user-supplied conversion rule.
pub trait CustomConverter: Send + Sync {
    /// Returns `true` when this converter handles the pair.
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool;

    /// Converts `src` into `dst`. Both values have the types accepted by [`Self::is`].
    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect);

    /// Stable identity, part of the option fingerprint.
    fn key(&self) -> String;
}

type Predicate = Box<dyn Fn(&'static TypeInfo, &'static TypeInfo) -> bool + Send + Sync>;
type Transform = Box<dyn Fn(&mut dyn Reflect, &dyn Reflect) + Send + Sync>;

/// A [`CustomConverter`] made of two closures.
pub struct FnConverter {
    key: String,
    is: Predicate,
    convert: Transform,
}

impl FnConverter {
    /// Creates a converter from a predicate and a transform.
    ///
    /// # Arguments
    ///
    /// * `key` - Stable identity of the converter
    /// * `is` - Predicate over (destination, source) descriptors
    /// * `convert` - Transform applied to matching values
    pub fn new(
        key: impl Into<String>,
        is: impl Fn(&'static TypeInfo, &'static TypeInfo) -> bool + Send + Sync + 'static,
        convert: impl Fn(&mut dyn Reflect, &dyn Reflect) + Send + Sync + 'static,
    ) -> Self {
        FnConverter {
            key: key.into(),
            is: Box::new(is),
            convert: Box::new(convert),
        }
    }
}

impl CustomConverter for FnConverter {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        (self.is)(dst, src)
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        (self.convert)(dst, src)
    }

    fn key(&self) -> String {
        self.key.clone()
    }
}

impl fmt::Debug for FnConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConverter").field("key", &self.key).finish()
    }
}

/// A [`CustomConverter`] for exactly one concrete type pair.
pub struct TypedConverter<D, S> {
    key: String,
    convert: Box<dyn Fn(&mut D, &S) + Send + Sync>,
    _types: PhantomData<fn(D, S)>,
}

impl<D: Typed, S: Typed> TypedConverter<D, S> {
    /// Creates a converter applying `convert` to `S -> D` conversions.
    pub fn new(key: impl Into<String>, convert: impl Fn(&mut D, &S) + Send + Sync + 'static) -> Self {
        TypedConverter {
            key: key.into(),
            convert: Box::new(convert),
            _types: PhantomData,
        }
    }
}

impl<D: Typed, S: Typed> CustomConverter for TypedConverter<D, S> {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        dst.id() == TypeId::of::<D>() && src.id() == TypeId::of::<S>()
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        if let (Some(dst), Some(src)) = (dst.downcast_mut::<D>(), src.downcast_ref::<S>()) {
            (self.convert)(dst, src);
        }
    }

    fn key(&self) -> String {
        self.key.clone()
    }
}

static INSTALLED: OnceLock<Vec<Arc<dyn CustomConverter>>> = OnceLock::new();

/// The process-wide converters, empty until [`crate::extend::install`] runs.
pub(crate) fn installed_converters() -> &'static [Arc<dyn CustomConverter>] {
    INSTALLED.get().map(Vec::as_slice).unwrap_or_default()
}

/// Sets the process-wide converters; `false` when already set.
pub(crate) fn install_converters(converters: Vec<Arc<dyn CustomConverter>>) -> bool {
    INSTALLED.set(converters).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_converter_matches_exact_pair() {
        let c = TypedConverter::new("len", |dst: &mut usize, src: &String| *dst = src.len());
        assert!(c.is(usize::type_info(), String::type_info()));
        assert!(!c.is(u64::type_info(), String::type_info()));

        let mut out = 0usize;
        c.convert(&mut out, &"four".to_string());
        assert_eq!(out, 4);
        c.convert(&mut out, &1u8);
        assert_eq!(out, 4);
        assert_eq!(c.key(), "len");
    }

    #[test]
    fn test_fn_converter() {
        let c = FnConverter::new(
            "zero-int",
            |dst, _| dst.kind().is_integer(),
            |dst, _| {
                if let Some(v) = dst.downcast_mut::<i32>() {
                    *v = 0;
                }
            },
        );
        assert!(c.is(i32::type_info(), bool::type_info()));
        let mut v = 5i32;
        c.convert(&mut v, &true);
        assert_eq!(v, 0);
    }
}
