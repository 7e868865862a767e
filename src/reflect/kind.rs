//! Coarse classification of reflected types.
//!
//! [`Kind`] is the key of the primitive dispatch table and the first thing every
//! resolution step looks at. Composite kinds carry their member types in the
//! [`crate::reflect::Shape`] of the owning [`crate::reflect::TypeInfo`].

use strum::{Display, EnumIter, IntoStaticStr};

/// The kind of a reflected type.
///
/// Scalar kinds map one to one onto Rust's primitive types (`Int` is `isize`, `Uint`
/// is `usize`). `Pointer` covers `Option<T>` and `Box<T>`, `Dynamic` is the crate's
/// type-erased [`crate::Dynamic`] value and `Func` is one of the accessor field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Kind {
    /// `bool`
    Bool,
    /// `isize`
    Int,
    /// `i8`
    Int8,
    /// `i16`
    Int16,
    /// `i32`
    Int32,
    /// `i64`
    Int64,
    /// `usize`
    Uint,
    /// `u8`
    Uint8,
    /// `u16`
    Uint16,
    /// `u32`
    Uint32,
    /// `u64`
    Uint64,
    /// `f32`
    Float32,
    /// `f64`
    Float64,
    /// `char`
    Char,
    /// `String`
    String,
    /// `Option<T>` or `Box<T>`
    Pointer,
    /// `Vec<T>`
    Slice,
    /// `[T; N]`
    Array,
    /// `HashMap<K, V>` or `BTreeMap<K, V>`
    Map,
    /// A derived structure
    Struct,
    /// A date-time value or a registered time wrapper
    Time,
    /// A zero-argument accessor value
    Func,
    /// [`crate::Dynamic`]
    Dynamic,
    /// A type that only custom converters know how to handle
    Opaque,
}

impl Kind {
    /// Returns `true` for the signed integer kinds.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Kind::Int | Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64
        )
    }

    /// Returns `true` for the unsigned integer kinds.
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Kind::Uint | Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64
        )
    }

    /// Returns `true` for every integer kind.
    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    /// Returns `true` for `f32` and `f64`.
    pub fn is_float(self) -> bool {
        matches!(self, Kind::Float32 | Kind::Float64)
    }

    /// Returns `true` for integers and floats.
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Returns `true` when the kind has an entry family in the primitive table.
    pub fn is_scalar(self) -> bool {
        self.is_numeric() || matches!(self, Kind::Bool | Kind::Char | Kind::String)
    }

    /// Returns `true` when the serialize converter may encode values of this kind.
    pub fn is_serializable(self) -> bool {
        !matches!(self, Kind::Func)
    }
}
