//! Runtime type model.
//!
//! Rust has no runtime reflection, so every value the conversion engine touches
//! describes itself through the traits of this module:
//!
//! - [`Reflect`] - object-safe access to a value: its [`TypeInfo`], a zero check and
//!   structural views ([`ReflectRef`] / [`ReflectMut`])
//! - [`Typed`] - the static side, `T::type_info()` without a value at hand
//! - [`DynReflect`] - blanket-implemented helpers (`as_any`, `clone_boxed`, ...)
//!
//! Implementations exist for the primitive types, `String`, `Vec<T>`, `HashMap<K, V>`,
//! `BTreeMap<K, V>`, `Option<T>`, `Box<T>`, `[T; N]`, the `chrono` date-time types,
//! `std::time::Duration`, `serde_json::Value` and [`Dynamic`]. Structures derive
//! them:
//!
//! ```rust
//! use conv::Reflect;
//!
//! #[derive(Reflect, Default, Clone)]
//! pub struct User {
//!     #[tag(json = "user_name")]
//!     pub name: String,
//!     pub age: i32,
//! }
//! ```
//!
//! # Thread Safety
//!
//! Descriptors are immutable once built and shared as `&'static TypeInfo`. The
//! per-type cache behind [`type_info_of`] is a `DashMap`, so descriptors may be
//! requested concurrently from any thread.

mod accessor;
mod cell;
mod dynamic;
mod impls;
mod info;
mod kind;
mod render;
mod serialize;
mod time;

use std::any::Any;

pub use accessor::{FallibleGetter, Getter, TryGetter};
pub use cell::type_info_of;
pub use dynamic::Dynamic;
pub use info::{
    returns, returns_err, returns_ok, CallFn, Capabilities, FieldGetter, FieldGetterMut,
    FieldInfo, FuncInfo, Guard, ListInfo, MapInfo, MethodInfo, PointerInfo, Shape,
    StructInfo, TimeInfo, TypeInfo, TypeThunk,
};
pub use kind::Kind;
pub use render::render;
pub(crate) use render::scalar_text;
pub use serialize::Serializable;
pub use time::{time_info, TimeLike};

/// A value that can describe itself to the conversion engine.
///
/// Implemented by `#[derive(Reflect)]` for structures and by the crate for the
/// standard types. The trait is object safe; converters work on `&dyn Reflect`.
pub trait Reflect: DynReflect + Send + Sync + 'static {
    /// The runtime descriptor of this value's type.
    fn info(&self) -> &'static TypeInfo;

    /// Returns `true` when the value equals its type's zero value.
    fn is_zero(&self) -> bool;

    /// Structural read view.
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Other
    }

    /// Structural write view.
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Other
    }
}

/// Static access to a type's descriptor.
pub trait Typed: Reflect + Default + Clone {
    /// The runtime descriptor of `Self`.
    fn type_info() -> &'static TypeInfo;
}

/// Type-erasure helpers, implemented for every [`Typed`] type.
pub trait DynReflect: Any {
    /// Upcasts to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Upcasts to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Upcasts a box to `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    /// Upcasts to `&dyn Reflect`.
    fn as_reflect(&self) -> &dyn Reflect;
    /// Upcasts to `&mut dyn Reflect`.
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect;
    /// Clones into a new box.
    fn clone_boxed(&self) -> Box<dyn Reflect>;
    /// Replaces `self` by a clone of `other` when both have the same type.
    fn assign(&mut self, other: &dyn Reflect) -> bool;
}

impl<T: Typed> DynReflect for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn as_reflect(&self) -> &dyn Reflect {
        self
    }

    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn assign(&mut self, other: &dyn Reflect) -> bool {
        match other.as_any().downcast_ref::<T>() {
            Some(other) => {
                self.clone_from(other);
                true
            }
            None => false,
        }
    }
}

impl dyn Reflect {
    /// Downcasts to a concrete type.
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts to a concrete type.
    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Returns `true` when the value has type `T`.
    pub fn is<T: Reflect>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Read view of a scalar.
#[derive(Debug, Clone, Copy)]
#[allow(missing_docs)]
pub enum ScalarRef<'a> {
    Bool(&'a bool),
    Int(&'a isize),
    Int8(&'a i8),
    Int16(&'a i16),
    Int32(&'a i32),
    Int64(&'a i64),
    Uint(&'a usize),
    Uint8(&'a u8),
    Uint16(&'a u16),
    Uint32(&'a u32),
    Uint64(&'a u64),
    Float32(&'a f32),
    Float64(&'a f64),
    Char(&'a char),
    String(&'a String),
}

/// Write view of a scalar.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum ScalarMut<'a> {
    Bool(&'a mut bool),
    Int(&'a mut isize),
    Int8(&'a mut i8),
    Int16(&'a mut i16),
    Int32(&'a mut i32),
    Int64(&'a mut i64),
    Uint(&'a mut usize),
    Uint8(&'a mut u8),
    Uint16(&'a mut u16),
    Uint32(&'a mut u32),
    Uint64(&'a mut u64),
    Float32(&'a mut f32),
    Float64(&'a mut f64),
    Char(&'a mut char),
    String(&'a mut String),
}

/// Structural read view of a value.
pub enum ReflectRef<'a> {
    /// A primitive.
    Scalar(ScalarRef<'a>),
    /// A pointer layer.
    Pointer(&'a dyn PointerValue),
    /// A slice or array.
    List(&'a dyn ListValue),
    /// A map.
    Map(&'a dyn MapValue),
    /// A [`Dynamic`] value.
    Dynamic(&'a Dynamic),
    /// Structures, times, accessors and opaque values.
    Other,
}

/// Structural write view of a value.
pub enum ReflectMut<'a> {
    /// A primitive.
    Scalar(ScalarMut<'a>),
    /// A pointer layer.
    Pointer(&'a mut dyn PointerValue),
    /// A slice or array.
    List(&'a mut dyn ListValue),
    /// A map.
    Map(&'a mut dyn MapValue),
    /// A [`Dynamic`] value.
    Dynamic(&'a mut Dynamic),
    /// Structures, times, accessors and opaque values.
    Other,
}

/// One layer of indirection, `Option<T>` or `Box<T>`.
pub trait PointerValue {
    /// The pointee, `None` when nil.
    fn pointee(&self) -> Option<&dyn Reflect>;
    /// The pointee, `None` when nil.
    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect>;
    /// The pointee, allocating a zero value first when nil.
    fn pointee_or_zero(&mut self) -> &mut dyn Reflect;
    /// Clears the pointer; non-nullable pointers reset their pointee to zero.
    fn set_nil(&mut self);
}

/// A slice or fixed-size array.
pub trait ListValue {
    /// Number of elements.
    fn len(&self) -> usize;
    /// Element access.
    fn get(&self, index: usize) -> Option<&dyn Reflect>;
    /// Element access.
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
    /// Truncates or extends with zero values; `false` for fixed-size arrays.
    fn resize_zeroed(&mut self, len: usize) -> bool;

    /// Returns `true` when there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Iterator over the entries of a [`MapValue`].
pub type MapEntries<'a> = Box<dyn Iterator<Item = (&'a dyn Reflect, &'a dyn Reflect)> + 'a>;

/// A key/value container.
pub trait MapValue {
    /// Number of entries.
    fn len(&self) -> usize;
    /// Entries in the container's iteration order.
    fn entries(&self) -> MapEntries<'_>;
    /// Replaces the container by a new, empty one with room for `capacity` entries.
    fn reset(&mut self, capacity: usize);
    /// Inserts an entry; `false` when key or value have the wrong type.
    fn insert_boxed(&mut self, key: Box<dyn Reflect>, value: Box<dyn Reflect>) -> bool;

    /// Returns `true` when there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Follows pointer layers until a non-pointer value or a nil layer is reached.
///
/// Returns `None` on nil. [`Dynamic`] values are not unwrapped.
pub fn deref_value(mut value: &dyn Reflect) -> Option<&dyn Reflect> {
    loop {
        match value.reflect_ref() {
            ReflectRef::Pointer(pointer) => value = pointer.pointee()?,
            _ => return Some(value),
        }
    }
}

/// Mutable counterpart of [`deref_value`].
pub fn deref_value_mut(mut value: &mut dyn Reflect) -> Option<&mut dyn Reflect> {
    loop {
        if !matches!(value.info().shape(), Shape::Pointer(_)) {
            return Some(value);
        }
        value = match value.reflect_mut() {
            ReflectMut::Pointer(pointer) => pointer.pointee_mut()?,
            _ => return None,
        };
    }
}

/// Follows pointer layers, allocating zero values at nil layers.
pub fn deref_value_or_zero(mut value: &mut dyn Reflect) -> Option<&mut dyn Reflect> {
    loop {
        if !matches!(value.info().shape(), Shape::Pointer(_)) {
            return Some(value);
        }
        value = match value.reflect_mut() {
            ReflectMut::Pointer(pointer) => pointer.pointee_or_zero(),
            _ => return None,
        };
    }
}
