//! [`Reflect`] and [`Typed`] for the standard library types.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::OnceLock;
use std::time::Duration;

use crate::reflect::{
    type_info_of, Kind, ListInfo, ListValue, MapEntries, MapInfo, MapValue, PointerInfo,
    PointerValue, Reflect, ReflectMut, ReflectRef, ScalarMut, ScalarRef, Shape, TypeInfo, Typed,
};

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl Reflect for $ty {
            fn info(&self) -> &'static TypeInfo {
                <$ty as Typed>::type_info()
            }

            fn is_zero(&self) -> bool {
                *self == <$ty>::default()
            }

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Scalar(ScalarRef::$kind(self))
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Scalar(ScalarMut::$kind(self))
            }
        }

        impl Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static INFO: OnceLock<TypeInfo> = OnceLock::new();
                INFO.get_or_init(|| TypeInfo::scalar::<$ty>(Kind::$kind))
            }
        }
    )*};
}

impl_scalar! {
    bool => Bool,
    isize => Int,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    usize => Uint,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    char => Char,
    String => String,
}

impl<T: Typed> Reflect for Vec<T> {
    fn info(&self) -> &'static TypeInfo {
        Self::type_info()
    }

    fn is_zero(&self) -> bool {
        self.as_slice().is_empty()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::List(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::List(self)
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn type_info() -> &'static TypeInfo {
        type_info_of::<Self>(|| {
            TypeInfo::new::<Self>(
                Kind::Slice,
                Shape::Slice(ListInfo {
                    elem: T::type_info,
                    len: None,
                }),
            )
        })
    }
}

impl<T: Typed> ListValue for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|v| v as &mut dyn Reflect)
    }

    fn resize_zeroed(&mut self, len: usize) -> bool {
        self.resize_with(len, T::default);
        true
    }
}

impl<T: Typed, const N: usize> Reflect for [T; N]
where
    [T; N]: Default,
{
    fn info(&self) -> &'static TypeInfo {
        Self::type_info()
    }

    fn is_zero(&self) -> bool {
        self.iter().all(Reflect::is_zero)
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::List(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::List(self)
    }
}

impl<T: Typed, const N: usize> Typed for [T; N]
where
    [T; N]: Default,
{
    fn type_info() -> &'static TypeInfo {
        type_info_of::<Self>(|| {
            TypeInfo::new::<Self>(
                Kind::Array,
                Shape::Array(ListInfo {
                    elem: T::type_info,
                    len: Some(N),
                }),
            )
        })
    }
}

impl<T: Typed, const N: usize> ListValue for [T; N]
where
    [T; N]: Default,
{
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|v| v as &mut dyn Reflect)
    }

    fn resize_zeroed(&mut self, len: usize) -> bool {
        len == N
    }
}

macro_rules! impl_map {
    ($map:ident, $($bound:path),+; $reset:expr) => {
        impl<K: Typed $(+ $bound)+, V: Typed> Reflect for $map<K, V> {
            fn info(&self) -> &'static TypeInfo {
                Self::type_info()
            }

            fn is_zero(&self) -> bool {
                $map::is_empty(self)
            }

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Map(self)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Map(self)
            }
        }

        impl<K: Typed $(+ $bound)+, V: Typed> Typed for $map<K, V> {
            fn type_info() -> &'static TypeInfo {
                type_info_of::<Self>(|| {
                    TypeInfo::new::<Self>(
                        Kind::Map,
                        Shape::Map(MapInfo {
                            key: K::type_info,
                            value: V::type_info,
                        }),
                    )
                })
            }
        }

        impl<K: Typed $(+ $bound)+, V: Typed> MapValue for $map<K, V> {
            fn len(&self) -> usize {
                $map::len(self)
            }

            fn entries(&self) -> MapEntries<'_> {
                Box::new(
                    self.iter()
                        .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect)),
                )
            }

            fn reset(&mut self, capacity: usize) {
                let reset: fn(usize) -> $map<K, V> = $reset;
                *self = reset(capacity);
            }

            fn insert_boxed(&mut self, key: Box<dyn Reflect>, value: Box<dyn Reflect>) -> bool {
                let (Ok(key), Ok(value)) =
                    (key.into_any().downcast::<K>(), value.into_any().downcast::<V>())
                else {
                    return false;
                };
                self.insert(*key, *value);
                true
            }
        }
    };
}

impl_map!(HashMap, Eq, Hash; HashMap::with_capacity);
impl_map!(BTreeMap, Ord; |_| BTreeMap::new());

impl<T: Typed> Reflect for Option<T> {
    fn info(&self) -> &'static TypeInfo {
        Self::type_info()
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }
}

impl<T: Typed> Typed for Option<T> {
    fn type_info() -> &'static TypeInfo {
        type_info_of::<Self>(|| {
            TypeInfo::new::<Self>(
                Kind::Pointer,
                Shape::Pointer(PointerInfo {
                    elem: T::type_info,
                    nullable: true,
                    wrap: |value| {
                        value
                            .into_any()
                            .downcast::<T>()
                            .ok()
                            .map(|v| Box::new(Some(*v)) as Box<dyn Reflect>)
                    },
                }),
            )
        })
    }
}

impl<T: Typed> PointerValue for Option<T> {
    fn pointee(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|v| v as &mut dyn Reflect)
    }

    fn pointee_or_zero(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }

    fn set_nil(&mut self) {
        *self = None;
    }
}

impl<T: Typed> Reflect for Box<T> {
    fn info(&self) -> &'static TypeInfo {
        Self::type_info()
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }
}

impl<T: Typed> Typed for Box<T> {
    fn type_info() -> &'static TypeInfo {
        type_info_of::<Self>(|| {
            TypeInfo::new::<Self>(
                Kind::Pointer,
                Shape::Pointer(PointerInfo {
                    elem: T::type_info,
                    nullable: false,
                    wrap: |value| {
                        value
                            .into_any()
                            .downcast::<T>()
                            .ok()
                            .map(|v| Box::new(v) as Box<dyn Reflect>)
                    },
                }),
            )
        })
    }
}

impl<T: Typed> PointerValue for Box<T> {
    fn pointee(&self) -> Option<&dyn Reflect> {
        Some(&**self)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(&mut **self)
    }

    fn pointee_or_zero(&mut self) -> &mut dyn Reflect {
        &mut **self
    }

    fn set_nil(&mut self) {
        **self = T::default();
    }
}

impl Reflect for Duration {
    fn info(&self) -> &'static TypeInfo {
        Self::type_info()
    }

    fn is_zero(&self) -> bool {
        Duration::is_zero(self)
    }
}

impl Typed for Duration {
    fn type_info() -> &'static TypeInfo {
        static INFO: OnceLock<TypeInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            TypeInfo::opaque::<Duration>().with_marshal_fn(|value| {
                value
                    .downcast_ref::<Duration>()
                    .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX).into())
            })
        })
    }
}

impl Reflect for serde_json::Value {
    fn info(&self) -> &'static TypeInfo {
        Self::type_info()
    }

    fn is_zero(&self) -> bool {
        self.is_null()
    }
}

impl Typed for serde_json::Value {
    fn type_info() -> &'static TypeInfo {
        static INFO: OnceLock<TypeInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            TypeInfo::opaque::<serde_json::Value>().with_marshal_fn(|value| {
                value.downcast_ref::<serde_json::Value>().cloned()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_views() {
        let mut v = 41u16;
        match v.reflect_mut() {
            ReflectMut::Scalar(ScalarMut::Uint16(x)) => *x += 1,
            _ => panic!("expected a u16 view"),
        }
        assert_eq!(v, 42);
        assert_eq!(v.info().kind(), Kind::Uint16);
        assert!(0.0f64.is_zero());
        assert!(!"x".to_string().is_zero());
    }

    #[test]
    fn test_pointer_depth() {
        let info = <Option<Box<Option<i32>>>>::type_info();
        let (base, depth) = info.deref_type();
        assert_eq!(depth, 3);
        assert_eq!(base.kind(), Kind::Int32);
        assert_eq!(info.pointer_layers().len(), 3);
    }

    #[test]
    fn test_pointer_wrap() {
        let info = <Option<String>>::type_info();
        let Shape::Pointer(pointer) = info.shape() else {
            panic!("expected pointer shape");
        };
        let wrapped = (pointer.wrap)(Box::new("a".to_string())).unwrap();
        assert_eq!(
            wrapped.downcast_ref::<Option<String>>(),
            Some(&Some("a".to_string()))
        );
        assert!((pointer.wrap)(Box::new(1u8)).is_none());
    }

    #[test]
    fn test_list_resize_keeps_prefix() {
        let mut v = vec![1i32, 2, 3];
        assert!(ListValue::resize_zeroed(&mut v, 5));
        assert_eq!(v, vec![1, 2, 3, 0, 0]);
        let mut a = [1u8; 4];
        assert!(!ListValue::resize_zeroed(&mut a, 5));
        assert_eq!(<[u8; 4]>::type_info().kind(), Kind::Array);
    }

    #[test]
    fn test_map_insert_boxed() {
        let mut m: HashMap<String, i64> = HashMap::new();
        assert!(m.insert_boxed(Box::new("k".to_string()), Box::new(3i64)));
        assert!(!m.insert_boxed(Box::new(1u8), Box::new(3i64)));
        assert_eq!(m.get("k"), Some(&3));
        MapValue::reset(&mut m, 8);
        assert!(m.is_empty());
    }

    #[test]
    fn test_box_set_nil_resets() {
        let mut b = Box::new(9i32);
        b.set_nil();
        assert_eq!(*b, 0);
    }
}
