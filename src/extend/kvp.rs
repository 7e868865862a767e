//! Map and key/value list adapters.
//!
//! Message schemas without a map type carry maps as lists of pair messages. The
//! adapters convert `HashMap<K, V>` into `Vec<P>` and back for any pair type `P`
//! implementing [`KeyValue`]; [`KeyValuePair`] is the stock one.
//!
//! # Examples
//!
//! ```rust
//! use std::collections::HashMap;
//! use conv::extend::kvp::{map_to_pairs, KeyValuePair};
//! use conv::{convert, options};
//!
//! let map = HashMap::from([("a".to_string(), 1i64)]);
//! let pairs: Vec<KeyValuePair<String, i64>> =
//!     convert(&map, &[options::custom_converter(map_to_pairs::<KeyValuePair<String, i64>>())]).unwrap();
//! assert_eq!(pairs, vec![KeyValuePair::new("a".to_string(), 1)]);
//! ```

use std::any::type_name;
use std::collections::HashMap;
use std::hash::Hash;

use crate::convert::custom::TypedConverter;
use crate::reflect::Typed;
use crate::Reflect;

/// A message type holding one map entry.
pub trait KeyValue: Typed {
    /// The map key type.
    type Key: Typed + Eq + Hash;
    /// The map value type.
    type Value: Typed;

    /// Builds a pair from an entry.
    fn from_entry(key: Self::Key, value: Self::Value) -> Self;

    /// Returns the entry held by the pair.
    fn entry(&self) -> (&Self::Key, &Self::Value);
}

/// The stock [`KeyValue`] message.
#[derive(Reflect, Default, Clone, Debug, PartialEq)]
pub struct KeyValuePair<K: Typed, V: Typed> {
    /// The entry key.
    pub key: K,
    /// The entry value.
    pub value: V,
}

impl<K: Typed, V: Typed> KeyValuePair<K, V> {
    /// Creates a pair.
    pub fn new(key: K, value: V) -> Self {
        KeyValuePair { key, value }
    }
}

impl<K: Typed + Eq + Hash, V: Typed> KeyValue for KeyValuePair<K, V> {
    type Key = K;
    type Value = V;

    fn from_entry(key: K, value: V) -> Self {
        KeyValuePair { key, value }
    }

    fn entry(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }
}

/// Converts `HashMap<P::Key, P::Value>` into `Vec<P>`.
///
/// The list order follows the map's iteration order.
pub fn map_to_pairs<P: KeyValue>() -> TypedConverter<Vec<P>, HashMap<P::Key, P::Value>> {
    TypedConverter::new(
        format!("[map2KVP-{}]", type_name::<P>()),
        |dst: &mut Vec<P>, src: &HashMap<P::Key, P::Value>| {
            *dst = src
                .iter()
                .map(|(k, v)| P::from_entry(k.clone(), v.clone()))
                .collect();
        },
    )
}

/// Converts `Vec<P>` into `HashMap<P::Key, P::Value>`; later duplicates win.
pub fn pairs_to_map<P: KeyValue>() -> TypedConverter<HashMap<P::Key, P::Value>, Vec<P>> {
    TypedConverter::new(
        format!("[kvp2Map-{}]", type_name::<P>()),
        |dst: &mut HashMap<P::Key, P::Value>, src: &Vec<P>| {
            *dst = src
                .iter()
                .map(|pair| {
                    let (k, v) = pair.entry();
                    (k.clone(), v.clone())
                })
                .collect();
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::custom::CustomConverter;
    use crate::{convert, options};

    type Pair = KeyValuePair<String, i64>;

    #[derive(Reflect, Default, Clone, Debug, PartialEq)]
    struct Labels {
        pub labels: HashMap<String, i64>,
    }

    #[derive(Reflect, Default, Clone, Debug, PartialEq)]
    struct LabelsMessage {
        pub labels: Vec<Pair>,
    }

    #[test]
    fn test_pairs_to_map_later_wins() {
        let pairs = vec![Pair::new("a".into(), 1), Pair::new("a".into(), 2), Pair::new("b".into(), 3)];
        let map: HashMap<String, i64> =
            convert(&pairs, &[options::custom_converter(pairs_to_map::<Pair>())]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 2);
    }

    #[test]
    fn test_struct_fields() {
        let labels = Labels {
            labels: HashMap::from([("x".to_string(), 7)]),
        };
        let opts = [
            options::custom_converter(map_to_pairs::<Pair>()),
            options::custom_converter(pairs_to_map::<Pair>()),
        ];
        let message: LabelsMessage = convert(&labels, &opts).unwrap();
        assert_eq!(message.labels, vec![Pair::new("x".into(), 7)]);

        let back: Labels = convert(&message, &opts).unwrap();
        assert_eq!(back, labels);
    }

    #[test]
    fn test_keys_name_pair_type() {
        assert!(map_to_pairs::<Pair>().key().starts_with("[map2KVP-"));
        assert_ne!(map_to_pairs::<Pair>().key(), pairs_to_map::<Pair>().key());
    }
}
