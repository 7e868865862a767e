use std::sync::Arc;

use crate::convert::custom::{CustomConverter, TypedConverter};
use crate::reflect::Typed;
use crate::Reflect;

/// A scalar wrapped in a one-field message type.
///
/// Message schemas use such wrappers so that an unset field (`None`) differs from a
/// zero one. The adapters unwrap and wrap the value, so `Option<ValueBox<i64>>` and
/// `Option<i64>` fields convert into each other.
#[derive(Reflect, Default, Clone, Debug, PartialEq)]
pub struct ValueBox<T: Typed> {
    /// The wrapped value.
    pub value: T,
}

impl<T: Typed> ValueBox<T> {
    /// Wraps a value.
    pub fn new(value: T) -> Self {
        ValueBox { value }
    }
}

/// Converts `T` into `ValueBox<T>`.
pub fn box_adapter<T: Typed>() -> TypedConverter<ValueBox<T>, T> {
    TypedConverter::new(
        format!("[{}2ValueBox]", T::type_info().name()),
        |dst: &mut ValueBox<T>, src: &T| dst.value.clone_from(src),
    )
}

/// Converts `ValueBox<T>` into `T`.
pub fn unbox_adapter<T: Typed>() -> TypedConverter<T, ValueBox<T>> {
    TypedConverter::new(
        format!("[ValueBox2{}]", T::type_info().name()),
        |dst: &mut T, src: &ValueBox<T>| dst.clone_from(&src.value),
    )
}

fn pair<T: Typed>() -> [Arc<dyn CustomConverter>; 2] {
    [Arc::new(box_adapter::<T>()), Arc::new(unbox_adapter::<T>())]
}

pub(crate) fn adapters() -> Vec<Arc<dyn CustomConverter>> {
    [
        pair::<bool>(),
        pair::<Vec<u8>>(),
        pair::<f64>(),
        pair::<f32>(),
        pair::<i32>(),
        pair::<i64>(),
        pair::<String>(),
        pair::<u32>(),
        pair::<u64>(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{convert, options, Reflect};

    #[derive(Reflect, Default, Clone)]
    struct Message {
        pub id: Option<ValueBox<i64>>,
        pub name: Option<ValueBox<String>>,
    }

    #[derive(Reflect, Default, Clone, Debug, PartialEq)]
    struct Record {
        pub id: Option<i64>,
        pub name: String,
    }

    #[test]
    fn test_box_and_unbox() {
        let c = box_adapter::<i32>();
        let mut dst = ValueBox::default();
        c.convert(&mut dst, &7i32);
        assert_eq!(dst, ValueBox::new(7));

        let c = unbox_adapter::<i32>();
        let mut out = 0i32;
        c.convert(&mut out, &ValueBox::new(9i32));
        assert_eq!(out, 9);
    }

    #[test]
    fn test_message_fields() {
        let msg = Message {
            id: Some(ValueBox::new(3)),
            name: None,
        };
        let record: Record = convert(&msg, &[options::builtin_adapters()]).unwrap();
        assert_eq!(
            record,
            Record {
                id: Some(3),
                name: String::new()
            }
        );

        let back: Message = convert(&record, &[options::builtin_adapters()]).unwrap();
        assert_eq!(back.id, Some(ValueBox::new(3)));
        assert_eq!(back.name, Some(ValueBox::new(String::new())));
    }
}
