//! Runtime type descriptors.
//!
//! A [`TypeInfo`] is created once per Rust type and leaked for the lifetime of the
//! process (see [`crate::reflect::type_info_of`]). Descriptors of member types are
//! referenced through `fn() -> &'static TypeInfo` thunks, so a structure may point
//! back at itself through an `Option<Box<Self>>` without the descriptor ever being
//! built recursively.
//!
//! # Key Components
//!
//! - [`TypeInfo`] - identity, [`Kind`], [`Shape`], zero constructor and capabilities
//! - [`StructInfo`] / [`FieldInfo`] / [`MethodInfo`] - structure layout as seen by the
//!   field extractor
//! - [`Capabilities`] - the optional stringification, marshal and schema-message probes

use std::any::{Any, TypeId};
use std::fmt;

use chrono::{DateTime, FixedOffset};

use crate::reflect::{Kind, Reflect, Typed};

/// Lazily resolved reference to another type's descriptor.
pub type TypeThunk = fn() -> &'static TypeInfo;

/// Shared read access to a structure member.
pub type FieldGetter = fn(&dyn Any) -> Option<&dyn Reflect>;

/// Exclusive access to a structure member.
pub type FieldGetterMut = fn(&mut dyn Any) -> Option<&mut dyn Reflect>;

/// Invokes a zero-argument accessor, `None` when the guard rejects the result.
pub type CallFn = fn(&dyn Any) -> Option<Box<dyn Reflect>>;

/// Complete runtime description of one Rust type.
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    kind: Kind,
    shape: Shape,
    zero: fn() -> Box<dyn Reflect>,
    capabilities: Capabilities,
}

impl TypeInfo {
    /// Creates the descriptor of `T` with the given kind and shape.
    pub fn new<T: Typed>(kind: Kind, shape: Shape) -> Self {
        TypeInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind,
            shape,
            zero: || Box::new(T::default()),
            capabilities: Capabilities::default(),
        }
    }

    /// Descriptor of a scalar type.
    pub fn scalar<T: Typed>(kind: Kind) -> Self {
        Self::new::<T>(kind, Shape::Scalar)
    }

    /// Descriptor of a derived structure.
    pub fn structure<T: Typed>(info: StructInfo) -> Self {
        Self::new::<T>(Kind::Struct, Shape::Struct(info))
    }

    /// Descriptor of a type that only custom converters handle.
    pub fn opaque<T: Typed>() -> Self {
        Self::new::<T>(Kind::Opaque, Shape::Opaque)
    }

    /// Registers `Display` as the stringification capability.
    pub fn with_display<T: Typed + fmt::Display>(mut self) -> Self {
        self.capabilities.display =
            Some(|value| value.downcast_ref::<T>().map(ToString::to_string));
        self
    }

    /// Registers `serde::Serialize` as the JSON marshal capability.
    pub fn with_marshal<T: Typed + serde::Serialize>(mut self) -> Self {
        self.capabilities.marshal = Some(|value| {
            value
                .downcast_ref::<T>()
                .and_then(|v| serde_json::to_value(v).ok())
        });
        self
    }

    /// Registers a hand-written JSON marshal capability.
    pub fn with_marshal_fn(mut self, marshal: fn(&dyn Any) -> Option<serde_json::Value>) -> Self {
        self.capabilities.marshal = Some(marshal);
        self
    }

    /// Marks the type as a schema message whose bookkeeping fields are not convertible.
    pub fn schema_message(mut self) -> Self {
        self.capabilities.schema_message = true;
        self
    }

    /// The `TypeId` of the described type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified Rust type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The kind of the described type.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The shape of the described type.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The optional capabilities of the described type.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Creates a boxed default value of the described type.
    pub fn zero(&self) -> Box<dyn Reflect> {
        (self.zero)()
    }

    /// Strips pointer layers and returns the base type with the number of stripped layers.
    ///
    /// [`Kind::Dynamic`] is never stripped.
    pub fn deref_type(&'static self) -> (&'static TypeInfo, usize) {
        let mut info = self;
        let mut depth = 0;
        while let Shape::Pointer(pointer) = info.shape() {
            info = (pointer.elem)();
            depth += 1;
        }
        (info, depth)
    }

    /// Pointer layer descriptors from the outermost layer inwards.
    pub fn pointer_layers(&'static self) -> Vec<&'static TypeInfo> {
        let mut layers = Vec::new();
        let mut info = self;
        while let Shape::Pointer(pointer) = info.shape() {
            layers.push(info);
            info = (pointer.elem)();
        }
        layers
    }

    /// Returns the structure layout, if this is a structure.
    pub fn as_struct(&self) -> Option<&StructInfo> {
        match &self.shape {
            Shape::Struct(info) => Some(info),
            _ => None,
        }
    }

    /// Returns the time vtable, if this is a time-like type.
    pub fn as_time(&self) -> Option<&TimeInfo> {
        match &self.shape {
            Shape::Time(info) => Some(info),
            _ => None,
        }
    }

    /// Returns the element type of a slice or array.
    pub fn elem(&self) -> Option<&'static TypeInfo> {
        match &self.shape {
            Shape::Slice(list) | Shape::Array(list) => Some((list.elem)()),
            Shape::Pointer(pointer) => Some((pointer.elem)()),
            _ => None,
        }
    }

    /// Returns `true` for `Vec<u8>`.
    pub fn is_byte_slice(&self) -> bool {
        self.id == TypeId::of::<Vec<u8>>()
    }

    /// Returns `true` for `Vec<char>`.
    pub fn is_rune_slice(&self) -> bool {
        self.id == TypeId::of::<Vec<char>>()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Structural description attached to a [`TypeInfo`].
pub enum Shape {
    /// A primitive value accessed through [`crate::reflect::ScalarRef`].
    Scalar,
    /// One layer of indirection.
    Pointer(PointerInfo),
    /// A growable sequence.
    Slice(ListInfo),
    /// A fixed-size sequence.
    Array(ListInfo),
    /// A key/value container.
    Map(MapInfo),
    /// A derived structure.
    Struct(StructInfo),
    /// A date-time value.
    Time(TimeInfo),
    /// A zero-argument accessor.
    Func(FuncInfo),
    /// The type-erased [`crate::Dynamic`] value.
    Dynamic,
    /// Anything else.
    Opaque,
}

/// One pointer layer.
pub struct PointerInfo {
    /// The pointee type.
    pub elem: TypeThunk,
    /// `true` for `Option<T>`, `false` for `Box<T>`.
    pub nullable: bool,
    /// Wraps a boxed pointee into a boxed value of the pointer type.
    pub wrap: fn(Box<dyn Reflect>) -> Option<Box<dyn Reflect>>,
}

/// Element type of a slice or array.
pub struct ListInfo {
    /// The element type.
    pub elem: TypeThunk,
    /// Fixed length for arrays.
    pub len: Option<usize>,
}

/// Key and value types of a map.
pub struct MapInfo {
    /// The key type.
    pub key: TypeThunk,
    /// The value type.
    pub value: TypeThunk,
}

/// Read and write access to a time-like value through a canonical offset date-time.
pub struct TimeInfo {
    /// Reads the value.
    pub get: fn(&dyn Any) -> Option<DateTime<FixedOffset>>,
    /// Replaces the value.
    pub set: fn(&mut dyn Any, DateTime<FixedOffset>),
    /// Format used when neither the call nor the field names one.
    pub format: Option<&'static str>,
}

/// How the second return value of an accessor gates the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Single return value, always used.
    None,
    /// `Option<T>` return, skipped on `None`.
    Ok,
    /// `Result<T, E>` return, skipped on `Err`.
    Err,
}

/// Descriptor of an accessor field type.
pub struct FuncInfo {
    /// Type of the produced value.
    pub output: TypeThunk,
    /// Guard applied to the call.
    pub guard: Guard,
    /// Calls the accessor stored in the given value.
    pub call: CallFn,
}

/// Layout of a derived structure.
pub struct StructInfo {
    /// Fields in declaration order.
    pub fields: Vec<FieldInfo>,
    /// Zero-argument methods exposed as virtual fields.
    pub methods: Vec<MethodInfo>,
}

impl StructInfo {
    /// Creates a structure layout.
    pub fn new(fields: Vec<FieldInfo>, methods: Vec<MethodInfo>) -> Self {
        StructInfo { fields, methods }
    }
}

/// One declared structure field.
pub struct FieldInfo {
    /// The Rust identifier.
    pub ident: &'static str,
    /// The declared type.
    pub ty: TypeThunk,
    /// Key/value tags from `#[tag(...)]`.
    pub tags: &'static [(&'static str, &'static str)],
    /// `true` for `pub` fields.
    pub exported: bool,
    /// `true` for `#[reflect(embed)]` members whose fields are promoted.
    pub embedded: bool,
    /// Shared access.
    pub get: FieldGetter,
    /// Exclusive access.
    pub get_mut: FieldGetterMut,
}

impl FieldInfo {
    /// Looks up a tag value by key.
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| *value)
    }
}

/// A zero-argument method exposed as a virtual field.
pub struct MethodInfo {
    /// The external name.
    pub name: &'static str,
    /// Type of the produced value.
    pub output: TypeThunk,
    /// Guard applied to the call.
    pub guard: Guard,
    /// Calls the method on the owning structure.
    pub call: CallFn,
}

/// Optional behaviors probed during resolution.
#[derive(Default)]
pub struct Capabilities {
    /// Stringification through `Display`.
    pub display: Option<fn(&dyn Any) -> Option<String>>,
    /// JSON marshal through `serde::Serialize`.
    pub marshal: Option<fn(&dyn Any) -> Option<serde_json::Value>>,
    /// The type is a schema message.
    pub schema_message: bool,
}

/// Output type of a single-value method, inferred from the method itself.
pub fn returns<S, R: Typed>(_method: fn(&S) -> R) -> &'static TypeInfo {
    R::type_info()
}

/// Output type of an `Option`-guarded method.
pub fn returns_ok<S, R: Typed>(_method: fn(&S) -> Option<R>) -> &'static TypeInfo {
    R::type_info()
}

/// Output type of a `Result`-guarded method.
pub fn returns_err<S, R: Typed, E>(_method: fn(&S) -> Result<R, E>) -> &'static TypeInfo {
    R::type_info()
}
