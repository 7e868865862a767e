use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::reflect::{FieldInfo, Reflect, ReflectRef, ScalarRef, Shape, StructInfo};

/// `serde::Serialize` adapter for any reflected value.
///
/// Structures serialize as objects keyed by their `json` tag name (falling back to
/// the identifier), with `"-"` fields and private fields left out, `omitempty`
/// honored and embedded members flattened. Times serialize as RFC 3339 strings,
/// nil pointers and nil [`crate::Dynamic`] values as `null`. Accessor fields make
/// the whole encoding fail.
///
/// ```rust
/// use conv::reflect::Serializable;
///
/// let json = serde_json::to_string(&Serializable(&vec![Some(1u8), None])).unwrap();
/// assert_eq!(json, "[1,null]");
/// ```
pub struct Serializable<'a>(pub &'a dyn Reflect);

impl Serialize for Serializable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        let info = value.info();
        if let Some(marshal) = info.capabilities().marshal {
            if let Some(json) = marshal(value.as_any()) {
                return json.serialize(serializer);
            }
        }

        match value.reflect_ref() {
            ReflectRef::Scalar(scalar) => serialize_scalar(scalar, serializer),
            ReflectRef::Pointer(pointer) => match pointer.pointee() {
                Some(inner) => Serializable(inner).serialize(serializer),
                None => serializer.serialize_none(),
            },
            ReflectRef::Dynamic(dynamic) => match dynamic.value() {
                Some(inner) => Serializable(inner).serialize(serializer),
                None => serializer.serialize_none(),
            },
            ReflectRef::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for index in 0..list.len() {
                    if let Some(item) = list.get(index) {
                        seq.serialize_element(&Serializable(item))?;
                    }
                }
                seq.end()
            }
            ReflectRef::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.entries() {
                    out.serialize_entry(&Serializable(k), &Serializable(v))?;
                }
                out.end()
            }
            ReflectRef::Other => match info.shape() {
                Shape::Struct(layout) => {
                    let mut out = serializer.serialize_map(None)?;
                    write_struct(&mut out, layout, value)?;
                    out.end()
                }
                Shape::Time(time) => match (time.get)(value.as_any()) {
                    Some(t) => serializer.serialize_str(&t.to_rfc3339()),
                    None => serializer.serialize_none(),
                },
                Shape::Func(_) => Err(S::Error::custom(format!(
                    "json: unsupported type: {}",
                    info.name()
                ))),
                _ => serializer.serialize_unit(),
            },
        }
    }
}

fn serialize_scalar<S: Serializer>(scalar: ScalarRef<'_>, serializer: S) -> Result<S::Ok, S::Error> {
    match scalar {
        ScalarRef::Bool(v) => serializer.serialize_bool(*v),
        ScalarRef::Int(v) => serializer.serialize_i64(*v as i64),
        ScalarRef::Int8(v) => serializer.serialize_i8(*v),
        ScalarRef::Int16(v) => serializer.serialize_i16(*v),
        ScalarRef::Int32(v) => serializer.serialize_i32(*v),
        ScalarRef::Int64(v) => serializer.serialize_i64(*v),
        ScalarRef::Uint(v) => serializer.serialize_u64(*v as u64),
        ScalarRef::Uint8(v) => serializer.serialize_u8(*v),
        ScalarRef::Uint16(v) => serializer.serialize_u16(*v),
        ScalarRef::Uint32(v) => serializer.serialize_u32(*v),
        ScalarRef::Uint64(v) => serializer.serialize_u64(*v),
        ScalarRef::Float32(v) => serializer.serialize_f32(*v),
        ScalarRef::Float64(v) => serializer.serialize_f64(*v),
        ScalarRef::Char(v) => serializer.serialize_char(*v),
        ScalarRef::String(v) => serializer.serialize_str(v),
    }
}

fn write_struct<M: SerializeMap>(
    out: &mut M,
    layout: &StructInfo,
    owner: &dyn Reflect,
) -> Result<(), M::Error> {
    for field in &layout.fields {
        let Some(member) = (field.get)(owner.as_any()) else {
            continue;
        };
        if field.embedded && json_tag(field).is_none() {
            if let Some(inner) = crate::reflect::deref_value(member) {
                if let Some(inner_layout) = inner.info().as_struct() {
                    write_struct(out, inner_layout, inner)?;
                    continue;
                }
            }
        }
        if !field.exported {
            continue;
        }

        let (name, omit_empty) = match json_tag(field) {
            Some((name, _)) if name == "-" => continue,
            Some((name, omit_empty)) if !name.is_empty() => (name, omit_empty),
            Some((_, omit_empty)) => (field.ident, omit_empty),
            None => (field.ident, false),
        };
        if omit_empty && member.is_zero() {
            continue;
        }
        out.serialize_entry(name, &Serializable(member))?;
    }
    Ok(())
}

fn json_tag(field: &FieldInfo) -> Option<(&'static str, bool)> {
    let tag = field.tag("json")?;
    let mut parts = tag.split(',');
    let name = parts.next().unwrap_or_default();
    let omit_empty = parts.any(|option| option == "omitempty");
    Some((name, omit_empty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::Dynamic;

    #[test]
    fn test_serialize_collections() {
        let mut m = BTreeMap::new();
        m.insert(1i32, vec!["a".to_string()]);
        let json = serde_json::to_string(&Serializable(&m)).unwrap();
        assert_eq!(json, r#"{"1":["a"]}"#);
    }

    #[test]
    fn test_serialize_dynamic() {
        let json = serde_json::to_string(&Serializable(&Dynamic::new(2.5f64))).unwrap();
        assert_eq!(json, "2.5");
        let json = serde_json::to_string(&Serializable(&Dynamic::nil())).unwrap();
        assert_eq!(json, "null");
    }
}
