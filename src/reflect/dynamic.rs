use std::fmt;
use std::sync::OnceLock;

use crate::reflect::{Kind, Reflect, ReflectMut, ReflectRef, Shape, TypeInfo, Typed};

/// A type-erased, nullable value: the conversion engine's "any" type.
///
/// Converting into a `Dynamic` boxes a clone of the source; converting from one
/// coerces through the widening helpers in [`crate::convert::coerce`].
///
/// ```rust
/// use conv::Dynamic;
///
/// let value = Dynamic::new(42i64);
/// assert_eq!(value.downcast_ref::<i64>(), Some(&42));
/// assert!(Dynamic::default().is_nil());
/// ```
#[derive(Default)]
pub struct Dynamic(Option<Box<dyn Reflect>>);

impl Dynamic {
    /// Wraps a value.
    pub fn new<T: Reflect>(value: T) -> Self {
        Dynamic(Some(Box::new(value)))
    }

    /// Wraps an already boxed value.
    pub fn from_boxed(value: Box<dyn Reflect>) -> Self {
        Dynamic(Some(value))
    }

    /// The nil value.
    pub fn nil() -> Self {
        Dynamic(None)
    }

    /// Returns `true` when no value is held.
    pub fn is_nil(&self) -> bool {
        self.0.is_none()
    }

    /// The held value.
    pub fn value(&self) -> Option<&dyn Reflect> {
        self.0.as_deref()
    }

    /// The held value.
    pub fn value_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.0.as_deref_mut()
    }

    /// Replaces the held value.
    pub fn set(&mut self, value: Option<Box<dyn Reflect>>) {
        self.0 = value;
    }

    /// Takes the held value out, leaving nil.
    pub fn take(&mut self) -> Option<Box<dyn Reflect>> {
        self.0.take()
    }

    /// Descriptor of the held value's type.
    pub fn value_info(&self) -> Option<&'static TypeInfo> {
        self.value().map(Reflect::info)
    }

    /// Downcasts the held value.
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.value()?.downcast_ref::<T>()
    }

    /// Downcasts the held value.
    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.value_mut()?.downcast_mut::<T>()
    }
}

impl Clone for Dynamic {
    fn clone(&self) -> Self {
        Dynamic(self.0.as_ref().map(|v| v.clone_boxed()))
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "Dynamic({})", crate::reflect::render(value)),
            None => f.write_str("Dynamic(<nil>)"),
        }
    }
}

impl Reflect for Dynamic {
    fn info(&self) -> &'static TypeInfo {
        Self::type_info()
    }

    fn is_zero(&self) -> bool {
        self.is_nil()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Dynamic(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Dynamic(self)
    }
}

impl Typed for Dynamic {
    fn type_info() -> &'static TypeInfo {
        static INFO: OnceLock<TypeInfo> = OnceLock::new();
        INFO.get_or_init(|| TypeInfo::new::<Dynamic>(Kind::Dynamic, Shape::Dynamic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_clone_is_deep() {
        let mut a = Dynamic::new(vec![1u8, 2]);
        let b = a.clone();
        a.downcast_mut::<Vec<u8>>().unwrap().push(3);
        assert_eq!(b.downcast_ref::<Vec<u8>>(), Some(&vec![1, 2]));
        assert_eq!(a.value_info().map(|i| i.kind()), Some(Kind::Slice));
    }

    #[test]
    fn test_dynamic_nil() {
        let mut d = Dynamic::new("x".to_string());
        assert!(!d.is_zero());
        assert!(d.take().is_some());
        assert!(d.is_nil());
        assert_eq!(format!("{d:?}"), "Dynamic(<nil>)");
    }
}
