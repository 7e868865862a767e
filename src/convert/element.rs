//! Pointer-depth adapter.
//!
//! Converters are resolved between dereferenced base types. An [`Element`] sits
//! between a member of a composite (a structure field, a slice element, a map key or
//! value) and the base converter: it walks the source's pointer layers, applies the
//! nil rules, materializes missing destination layers and hands the base values on.

use crate::convert::dynamic::AnyProcedure;
use crate::convert::registry;
use crate::options::NilValuePolicy;
use crate::reflect::{deref_value, deref_value_or_zero, Reflect, ReflectMut, TypeInfo};

/// What an element runs once both sides are dereferenced.
pub(crate) enum Target {
    /// A converter in the registry arena.
    Slot(usize),
    /// The dynamic converter, re-wrapping the source's pointer layers.
    Any {
        any: AnyProcedure,
        layers: Vec<&'static TypeInfo>,
    },
}

impl Target {
    fn run(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        match self {
            Target::Slot(id) => registry::global().run(*id, dst, src),
            Target::Any { any, layers } => any.run(dst, src, layers),
        }
    }
}

/// Converter between two possibly pointer-typed member types.
pub(crate) struct Element {
    target: Target,
    dst_depth: usize,
    nil_policy: NilValuePolicy,
    src_zero: Box<dyn Reflect>,
}

impl Element {
    /// Creates an element.
    ///
    /// # Arguments
    ///
    /// * `target` - The base converter
    /// * `dst_depth` - Pointer layers on the destination member type
    /// * `src_base` - Dereferenced source type, whose zero value stands in for nil
    /// * `nil_policy` - What a nil source does when the destination has no pointer layer
    pub(crate) fn new(
        target: Target,
        dst_depth: usize,
        src_base: &'static TypeInfo,
        nil_policy: NilValuePolicy,
    ) -> Self {
        Element {
            target,
            dst_depth,
            nil_policy,
            src_zero: src_base.zero(),
        }
    }

    /// Converts `src` into `dst`, both as declared on the member.
    pub(crate) fn run(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        match deref_value(src) {
            Some(src) => self.run_base(dst, src),
            None if self.dst_depth > 0 => {
                if let ReflectMut::Pointer(pointer) = dst.reflect_mut() {
                    pointer.set_nil();
                }
            }
            None => match self.nil_policy {
                NilValuePolicy::Ignore => {}
                NilValuePolicy::Zero => self.run_zero(dst),
            },
        }
    }

    /// Converts the zero value of the source base type into `dst`.
    pub(crate) fn run_zero(&self, dst: &mut dyn Reflect) {
        self.run_base(dst, self.src_zero.as_ref());
    }

    fn run_base(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        if let Some(dst) = deref_value_or_zero(dst) {
            self.target.run(dst, src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::reflect::Typed;

    fn element<D: Typed, S: Typed>(policy: NilValuePolicy) -> Element {
        let options = Options::default();
        registry::global()
            .element(D::type_info(), S::type_info(), &options)
            .map(|mut e| {
                e.nil_policy = policy;
                e
            })
            .expect("element")
    }

    #[test]
    fn test_pointer_source_into_value() {
        let e = element::<i64, Option<Box<i32>>>(NilValuePolicy::Zero);
        let mut dst = 9i64;
        e.run(&mut dst, &Some(Box::new(4i32)));
        assert_eq!(dst, 4);
        e.run(&mut dst, &None::<Box<i32>>);
        assert_eq!(dst, 0);
    }

    #[test]
    fn test_nil_source_ignored() {
        let e = element::<String, Option<u8>>(NilValuePolicy::Ignore);
        let mut dst = "keep".to_string();
        e.run(&mut dst, &None::<u8>);
        assert_eq!(dst, "keep");
    }

    #[test]
    fn test_nil_source_clears_pointer_destination() {
        let e = element::<Option<String>, Option<String>>(NilValuePolicy::Zero);
        let mut dst = Some("old".to_string());
        e.run(&mut dst, &None::<String>);
        assert_eq!(dst, None);
    }

    #[test]
    fn test_destination_layers_materialized() {
        let e = element::<Option<Option<u16>>, u8>(NilValuePolicy::Zero);
        let mut dst: Option<Option<u16>> = None;
        e.run(&mut dst, &7u8);
        assert_eq!(dst, Some(Some(7)));
    }
}
