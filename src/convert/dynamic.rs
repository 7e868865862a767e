//! Conversion into [`Dynamic`].
//!
//! The value is cloned into a box. When the member was declared behind pointer
//! layers, the clone is wrapped back into the same layers so the dynamic value holds
//! the declared type. A `Dynamic` source is unwrapped rather than nested.

use crate::options::{MinUnixScene, Options};
use crate::reflect::{Dynamic, Reflect, ReflectRef, Shape, TypeInfo};

#[derive(Clone, Copy)]
struct TimeFloor {
    get: fn(&dyn std::any::Any) -> Option<chrono::DateTime<chrono::FixedOffset>>,
    min_unix: i64,
}

/// Boxes any value into a [`Dynamic`] destination.
#[derive(Clone, Copy)]
pub(crate) struct AnyProcedure {
    floor: Option<TimeFloor>,
}

impl AnyProcedure {
    /// Creates the procedure for a source base type.
    pub(crate) fn new(src: &'static TypeInfo, options: &Options) -> Self {
        let floor = options
            .min_unix_for(MinUnixScene::TIME_ANY)
            .zip(src.as_time())
            .map(|(min_unix, time)| TimeFloor {
                get: time.get,
                min_unix,
            });
        AnyProcedure { floor }
    }

    /// Stores a clone of `src`, wrapped in `layers` from the innermost outwards.
    pub(crate) fn run(&self, dst: &mut dyn Reflect, src: &dyn Reflect, layers: &[&'static TypeInfo]) {
        let Some(dst) = dst.downcast_mut::<Dynamic>() else {
            return;
        };
        if let ReflectRef::Dynamic(inner) = src.reflect_ref() {
            dst.set(inner.value().map(|v| v.clone_boxed()));
            return;
        }
        if let Some(floor) = self.floor {
            if let Some(time) = (floor.get)(src.as_any()) {
                if time.timestamp() < floor.min_unix {
                    return;
                }
            }
        }

        let mut value = src.clone_boxed();
        for layer in layers.iter().rev() {
            let Shape::Pointer(pointer) = layer.shape() else {
                return;
            };
            match (pointer.wrap)(value) {
                Some(wrapped) => value = wrapped,
                None => return,
            }
        }
        dst.set(Some(value));
    }
}
