use bitflags::bitflags;
use serde::{Serialize, Serializer};
use strum::{Display, EnumString};

bitflags! {
    /// Selects the time conversions a minimum-timestamp floor applies to.
    ///
    /// A time value whose Unix seconds fall below the floor is not converted in the
    /// selected directions; the destination keeps its prior value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conv::MinUnixScene;
    ///
    /// let scene = MinUnixScene::TIME_STRING | MinUnixScene::TIME_ANY;
    /// assert!(scene.contains(MinUnixScene::TIME_ANY));
    /// assert!(!scene.contains(MinUnixScene::STRING_TIME));
    /// assert_eq!(MinUnixScene::default(), MinUnixScene::TIME_STRING | MinUnixScene::STRING_TIME);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MinUnixScene: u32 {
        /// Time to string.
        const TIME_STRING = 1;
        /// String to time.
        const STRING_TIME = 1 << 1;
        /// Time into a [`crate::Dynamic`] destination.
        const TIME_ANY = 1 << 2;
    }
}

impl Default for MinUnixScene {
    fn default() -> Self {
        MinUnixScene::TIME_STRING | MinUnixScene::STRING_TIME
    }
}

impl Serialize for MinUnixScene {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

/// What the element converter does when it reaches a nil source pointer and the
/// destination has no pointer layer to clear.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum NilValuePolicy {
    /// Leave the destination untouched.
    Ignore,
    /// Convert from the zero value of the source's base type.
    #[default]
    Zero,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_scene_serializes_as_bits() {
        let json = serde_json::to_string(&MinUnixScene::all()).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_nil_policy_names() {
        assert_eq!(NilValuePolicy::default(), NilValuePolicy::Zero);
        assert_eq!(NilValuePolicy::Ignore.to_string(), "ignore");
        assert_eq!(NilValuePolicy::from_str("zero").unwrap(), NilValuePolicy::Zero);
    }
}
