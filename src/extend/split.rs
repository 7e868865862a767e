//! Delimited list adapters.
//!
//! [`SplitStrings`] and [`JoinStrings`] convert between `String` and `Vec<String>`;
//! [`SplitIntegers`] and [`JoinIntegers`] between `String` and `Vec<i64>` or
//! `Vec<isize>`. The separator defaults to `","`. Parts that do not parse as
//! integers are dropped.
//!
//! # Examples
//!
//! ```rust
//! use conv::extend::split::{EmptyStringSplit, SplitStrings};
//! use conv::{convert, options};
//!
//! let split = SplitStrings::new().sep(";").strategy(EmptyStringSplit::Empty);
//! let parts: Vec<String> = convert(&"a;b".to_string(), &[options::custom_converter(split)]).unwrap();
//! assert_eq!(parts, vec!["a", "b"]);
//! ```

use std::any::TypeId;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::convert::custom::CustomConverter;
use crate::reflect::{Reflect, TypeInfo, Typed};

const DEFAULT_SEPARATOR: &str = ",";

/// What splitting an empty string produces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EmptyStringSplit {
    /// `""` becomes `[""]`.
    #[default]
    Default,
    /// `""` becomes `[]`.
    Empty,
    /// `""` leaves the destination untouched.
    Nil,
}

fn is<D: 'static, S: 'static>(dst: &TypeInfo, src: &TypeInfo) -> bool {
    dst.id() == TypeId::of::<D>() && src.id() == TypeId::of::<S>()
}

/// `String` into `Vec<String>`.
#[derive(Debug, Clone)]
pub struct SplitStrings {
    sep: String,
    strategy: EmptyStringSplit,
}

impl SplitStrings {
    /// Splits on `","` with the default empty-string strategy.
    pub fn new() -> Self {
        SplitStrings {
            sep: DEFAULT_SEPARATOR.to_string(),
            strategy: EmptyStringSplit::Default,
        }
    }

    /// Sets the separator.
    pub fn sep(mut self, sep: impl Into<String>) -> Self {
        self.sep = sep.into();
        self
    }

    /// Sets the empty-string strategy.
    pub fn strategy(mut self, strategy: EmptyStringSplit) -> Self {
        self.strategy = strategy;
        self
    }
}

impl Default for SplitStrings {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomConverter for SplitStrings {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        is::<Vec<String>, String>(dst, src)
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        let (Some(dst), Some(src)) = (dst.downcast_mut::<Vec<String>>(), src.downcast_ref::<String>()) else {
            return;
        };
        if !src.is_empty() {
            *dst = src.split(self.sep.as_str()).map(str::to_string).collect();
            return;
        }
        match self.strategy {
            EmptyStringSplit::Default => *dst = vec![String::new()],
            EmptyStringSplit::Empty => dst.clear(),
            EmptyStringSplit::Nil => {}
        }
    }

    fn key(&self) -> String {
        format!("[string2Strings::sep:{},split:{:?}]", self.sep, self.strategy)
    }
}

/// `Vec<String>` into `String`.
#[derive(Debug, Clone)]
pub struct JoinStrings {
    sep: String,
}

impl JoinStrings {
    /// Joins with `","`.
    pub fn new() -> Self {
        JoinStrings {
            sep: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Sets the separator.
    pub fn sep(mut self, sep: impl Into<String>) -> Self {
        self.sep = sep.into();
        self
    }
}

impl Default for JoinStrings {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomConverter for JoinStrings {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        is::<String, Vec<String>>(dst, src)
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        if let (Some(dst), Some(src)) = (dst.downcast_mut::<String>(), src.downcast_ref::<Vec<String>>()) {
            *dst = src.join(&self.sep);
        }
    }

    fn key(&self) -> String {
        format!("[strings2String::sep:{}]", self.sep)
    }
}

/// `String` into a list of integers, dropping parts that fail to parse.
///
/// Intended for `i64` and `isize`.
pub struct SplitIntegers<T> {
    sep: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> SplitIntegers<T> {
    /// Splits on `","`.
    pub fn new() -> Self {
        SplitIntegers {
            sep: DEFAULT_SEPARATOR.to_string(),
            _item: PhantomData,
        }
    }

    /// Sets the separator.
    pub fn sep(mut self, sep: impl Into<String>) -> Self {
        self.sep = sep.into();
        self
    }
}

impl<T> Default for SplitIntegers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Typed + FromStr> CustomConverter for SplitIntegers<T> {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        is::<Vec<T>, String>(dst, src)
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        if let (Some(dst), Some(src)) = (dst.downcast_mut::<Vec<T>>(), src.downcast_ref::<String>()) {
            *dst = src
                .split(self.sep.as_str())
                .filter_map(|part| part.parse().ok())
                .collect();
        }
    }

    fn key(&self) -> String {
        format!("[string2{}s::sep:{}]", T::type_info().kind(), self.sep)
    }
}

/// A list of integers into `String`.
///
/// Intended for `i64` and `isize`.
pub struct JoinIntegers<T> {
    sep: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> JoinIntegers<T> {
    /// Joins with `","`.
    pub fn new() -> Self {
        JoinIntegers {
            sep: DEFAULT_SEPARATOR.to_string(),
            _item: PhantomData,
        }
    }

    /// Sets the separator.
    pub fn sep(mut self, sep: impl Into<String>) -> Self {
        self.sep = sep.into();
        self
    }
}

impl<T> Default for JoinIntegers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Typed + Display> CustomConverter for JoinIntegers<T> {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        is::<String, Vec<T>>(dst, src)
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        if let (Some(dst), Some(src)) = (dst.downcast_mut::<String>(), src.downcast_ref::<Vec<T>>()) {
            *dst = src
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(&self.sep);
        }
    }

    fn key(&self) -> String {
        format!("[{}s2String::sep:{}]", T::type_info().kind(), self.sep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{convert, convert_to, options};

    #[test]
    fn test_empty_string_strategies() {
        let run = |strategy| {
            let mut out = vec!["old".to_string()];
            let split = SplitStrings::new().strategy(strategy);
            convert_to(&String::new(), &mut out, &[options::custom_converter(split)]).unwrap();
            out
        };
        assert_eq!(run(EmptyStringSplit::Default), vec![""]);
        assert!(run(EmptyStringSplit::Empty).is_empty());
        assert_eq!(run(EmptyStringSplit::Nil), vec!["old"]);
    }

    #[test]
    fn test_integers() {
        let split = options::custom_converter(SplitIntegers::<i64>::new().sep("|"));
        let out: Vec<i64> = convert(&"1|x|-3".to_string(), &[split]).unwrap();
        assert_eq!(out, vec![1, -3]);

        let join = options::custom_converter(JoinIntegers::<isize>::new());
        let out: String = convert(&vec![4isize, 5], &[join]).unwrap();
        assert_eq!(out, "4,5");
    }

    #[test]
    fn test_join_strings() {
        let join = options::custom_converter(JoinStrings::new().sep("-"));
        let out: String = convert(&vec!["a".to_string(), "b".to_string()], &[join]).unwrap();
        assert_eq!(out, "a-b");
    }

    #[test]
    fn test_keys_carry_parameters() {
        assert_ne!(SplitStrings::new().key(), SplitStrings::new().sep(";").key());
        assert_ne!(SplitIntegers::<i64>::new().key(), SplitIntegers::<isize>::new().key());
    }
}
