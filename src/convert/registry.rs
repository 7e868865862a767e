//! Process-wide converter cache.
//!
//! Every resolved converter lives in an append-only arena and is published under its
//! [`ConvertKey`], the pair of dereferenced types plus the fingerprint of the options
//! it was built with. Later requests for the same key return the same arena slot.
//!
//! # Resolution order
//!
//! For a pair of base types the first matching rule wins:
//!
//! 1. custom converters of the options, in order
//! 2. `String` destinations: serialize mode, then the `Display` capability, then the
//!    marshal capability, each only when enabled
//! 3. the primitive table
//! 4. a [`crate::Dynamic`] destination
//! 5. the composite shapes: structure to structure, slice to slice, map to map and
//!    structure to string-keyed map
//! 6. identical types, then the time conversions
//!
//! # Cycles
//!
//! Structure converters are reserved in the arena before their fields are resolved,
//! so a field whose type leads back to a structure under construction points at the
//! reserved slot. A structure converter that ends up without any field is withdrawn
//! and the pair resolves as unsupported.
//!
//! # Thread Safety
//!
//! Building is serialized by a single mutex; a build publishes its converters only
//! after all of them are complete. Published converters are found through a lock-free
//! skip list and run without taking any lock.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, OnceLock};

use crossbeam_skiplist::SkipMap;
use tracing::{debug, trace};

use crate::convert::collections::{MapProcedure, SliceProcedure};
use crate::convert::custom::CustomConverter;
use crate::convert::dynamic::AnyProcedure;
use crate::convert::element::{Element, Target};
use crate::convert::primitive::{self, PrimitiveFn};
use crate::convert::structs::{StructMapProcedure, StructProcedure};
use crate::convert::text::TextProcedure;
use crate::convert::time::TimeProcedure;
use crate::options::Options;
use crate::reflect::{Kind, Reflect, Shape, TypeInfo};
use crate::{Error, Result};

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The process-wide registry.
pub(crate) fn global() -> &'static Registry {
    &REGISTRY
}

/// Identity of a converter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ConvertKey {
    dst: TypeId,
    src: TypeId,
    options: Arc<str>,
}

impl ConvertKey {
    fn new(dst: &TypeInfo, src: &TypeInfo, options: &Options) -> Self {
        ConvertKey {
            dst: dst.id(),
            src: src.id(),
            options: options.fingerprint().clone(),
        }
    }
}

/// A compiled conversion between two base types.
pub(crate) enum Procedure {
    Custom(Arc<dyn CustomConverter>),
    Primitive(PrimitiveFn),
    Copy,
    Struct(StructProcedure),
    StructMap(StructMapProcedure),
    Slice(SliceProcedure),
    Map(MapProcedure),
    Any(AnyProcedure),
    Time(TimeProcedure),
    Text(TextProcedure),
}

impl Procedure {
    fn run(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        match self {
            Procedure::Custom(custom) => custom.convert(dst, src),
            Procedure::Primitive(primitive) => primitive(dst, src),
            Procedure::Copy => {
                dst.assign(src);
            }
            Procedure::Struct(procedure) => procedure.run(dst, src),
            Procedure::StructMap(procedure) => procedure.run(dst, src),
            Procedure::Slice(procedure) => procedure.run(dst, src),
            Procedure::Map(procedure) => procedure.run(dst, src),
            Procedure::Any(any) => any.run(dst, src, &[]),
            Procedure::Time(procedure) => procedure.run(dst, src),
            Procedure::Text(procedure) => procedure.run(dst, src),
        }
    }
}

struct Slot {
    dst: &'static TypeInfo,
    src: &'static TypeInfo,
    procedure: OnceLock<Procedure>,
}

/// Arena and index of resolved converters.
pub(crate) struct Registry {
    slots: boxcar::Vec<Slot>,
    published: SkipMap<ConvertKey, usize>,
    building: Mutex<()>,
}

impl Registry {
    fn new() -> Self {
        Registry {
            slots: boxcar::Vec::new(),
            published: SkipMap::new(),
            building: Mutex::new(()),
        }
    }

    /// Returns the slot converting `src` into `dst`, building it when needed.
    ///
    /// Both types are dereferenced first; the slot converts base values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] when no converter exists for the pair.
    pub(crate) fn resolve(
        &self,
        dst: &'static TypeInfo,
        src: &'static TypeInfo,
        options: &Options,
    ) -> Result<usize> {
        let (dst, _) = dst.deref_type();
        let (src, _) = src.deref_type();
        let key = ConvertKey::new(dst, src, options);
        if let Some(id) = self.lookup(&key) {
            trace!(dst = dst.name(), src = src.name(), id, "converter cache hit");
            return Ok(id);
        }

        let _guard = lock!(self.building);
        if let Some(id) = self.lookup(&key) {
            return Ok(id);
        }
        let mut builder = Builder::new(self);
        let result = builder.converter(dst, src, options);
        builder.publish();
        result
    }

    /// Builds an element converter between two member types.
    #[cfg(test)]
    pub(crate) fn element(
        &self,
        dst: &'static TypeInfo,
        src: &'static TypeInfo,
        options: &Options,
    ) -> Result<Element> {
        let id = self.resolve(dst, src, options)?;
        Ok(self.element_for(id, dst, src, options))
    }

    /// Runs a slot on two base values; unfinished slots do nothing.
    pub(crate) fn run(&self, id: usize, dst: &mut dyn Reflect, src: &dyn Reflect) {
        if let Some(procedure) = self.procedure(id) {
            procedure.run(dst, src);
        }
    }

    /// Runs a slot on two base values, re-wrapping `layers` for dynamic destinations.
    pub(crate) fn run_layered(
        &self,
        id: usize,
        dst: &mut dyn Reflect,
        src: &dyn Reflect,
        layers: &[&'static TypeInfo],
    ) {
        match self.procedure(id) {
            Some(Procedure::Any(any)) => any.run(dst, src, layers),
            Some(procedure) => procedure.run(dst, src),
            None => {}
        }
    }

    fn procedure(&self, id: usize) -> Option<&Procedure> {
        self.slots.get(id).and_then(|slot| slot.procedure.get())
    }

    fn lookup(&self, key: &ConvertKey) -> Option<usize> {
        self.published.get(key).map(|entry| *entry.value())
    }

    fn element_for(
        &self,
        id: usize,
        dst: &'static TypeInfo,
        src: &'static TypeInfo,
        options: &Options,
    ) -> Element {
        let (_, dst_depth) = dst.deref_type();
        let (src_base, _) = src.deref_type();
        let target = match self.procedure(id) {
            Some(Procedure::Any(any)) => Target::Any {
                any: *any,
                layers: src.pointer_layers(),
            },
            _ => Target::Slot(id),
        };
        Element::new(target, dst_depth, src_base, options.nil_value_policy())
    }
}

/// One build under the registry lock.
///
/// Slots created during the build are indexed in `pending` and only published once
/// the outermost request returns.
pub(crate) struct Builder<'a> {
    registry: &'a Registry,
    pending: HashMap<ConvertKey, usize>,
}

impl<'a> Builder<'a> {
    fn new(registry: &'a Registry) -> Self {
        Builder {
            registry,
            pending: HashMap::new(),
        }
    }

    /// Builds an element converter for two member types.
    pub(crate) fn element(
        &mut self,
        dst: &'static TypeInfo,
        src: &'static TypeInfo,
        options: &Options,
    ) -> Result<Element> {
        let (dst_base, _) = dst.deref_type();
        let (src_base, _) = src.deref_type();
        let id = self.converter(dst_base, src_base, options)?;
        Ok(self.registry.element_for(id, dst, src, options))
    }

    /// Resolves two base types.
    pub(crate) fn converter(
        &mut self,
        dst: &'static TypeInfo,
        src: &'static TypeInfo,
        options: &Options,
    ) -> Result<usize> {
        let key = ConvertKey::new(dst, src, options);
        if let Some(id) = self.pending.get(&key).copied().or_else(|| self.registry.lookup(&key)) {
            return Ok(id);
        }
        if let Some(procedure) = direct(dst, src, options) {
            return Ok(self.insert(key, dst, src, procedure));
        }

        match (dst.shape(), src.shape()) {
            (Shape::Struct(_), Shape::Struct(_)) if dst != src => {
                return self.composite(key, dst, src, |builder| {
                    builder
                        .struct_procedure(dst, src, options)
                        .map(Procedure::Struct)
                });
            }
            (Shape::Slice(_), Shape::Slice(_)) if dst != src => {
                let procedure = self.slice_procedure(dst, src, options)?;
                return Ok(self.insert(key, dst, src, Procedure::Slice(procedure)));
            }
            (Shape::Map(_), Shape::Map(_)) => {
                let procedure = self.map_procedure(dst, src, options)?;
                return Ok(self.insert(key, dst, src, Procedure::Map(procedure)));
            }
            (Shape::Map(map), Shape::Struct(_))
                if (map.key)().kind() == Kind::String
                    && matches!((map.value)().kind(), Kind::Dynamic | Kind::String) =>
            {
                let value = (map.value)();
                return self.composite(key, dst, src, |builder| {
                    builder
                        .struct_map_procedure(value, src, options)
                        .map(Procedure::StructMap)
                });
            }
            _ => {}
        }

        if dst == src {
            return Ok(self.insert(key, dst, src, Procedure::Copy));
        }
        if let Some(procedure) = TimeProcedure::new(dst, src, options) {
            return Ok(self.insert(key, dst, src, Procedure::Time(procedure)));
        }

        debug!(dst = dst.name(), src = src.name(), "no converter for type pair");
        Err(Error::Unsupported {
            dst: dst.name(),
            src: src.name(),
        })
    }

    /// Adds a finished slot.
    fn insert(
        &mut self,
        key: ConvertKey,
        dst: &'static TypeInfo,
        src: &'static TypeInfo,
        procedure: Procedure,
    ) -> usize {
        let id = self.registry.slots.push(Slot {
            dst,
            src,
            procedure: OnceLock::from(procedure),
        });
        self.pending.insert(key, id);
        id
    }

    /// Reserves a slot, builds its members and completes or withdraws it.
    fn composite(
        &mut self,
        key: ConvertKey,
        dst: &'static TypeInfo,
        src: &'static TypeInfo,
        build: impl FnOnce(&mut Self) -> Option<Procedure>,
    ) -> Result<usize> {
        let id = self.registry.slots.push(Slot {
            dst,
            src,
            procedure: OnceLock::new(),
        });
        self.pending.insert(key.clone(), id);

        match build(self) {
            Some(procedure) => {
                if let Some(slot) = self.registry.slots.get(id) {
                    let _ = slot.procedure.set(procedure);
                }
                Ok(id)
            }
            None => {
                self.pending.remove(&key);
                debug!(dst = dst.name(), src = src.name(), "no convertible members, converter withdrawn");
                Err(Error::Unsupported {
                    dst: dst.name(),
                    src: src.name(),
                })
            }
        }
    }

    /// Publishes every completed slot of this build.
    fn publish(self) {
        for (key, id) in self.pending {
            let Some(slot) = self.registry.slots.get(id) else {
                continue;
            };
            if slot.procedure.get().is_none() {
                continue;
            }
            debug!(dst = slot.dst.name(), src = slot.src.name(), id, "converter published");
            self.registry.published.get_or_insert(key, id);
        }
    }
}

/// The rules that need no member resolution: custom converters, string options,
/// the primitive table and dynamic destinations.
fn direct(dst: &'static TypeInfo, src: &'static TypeInfo, options: &Options) -> Option<Procedure> {
    if let Some(custom) = options.custom().iter().find(|c| c.is(dst, src)) {
        return Some(Procedure::Custom(custom.clone()));
    }

    if dst.kind() == Kind::String {
        let capabilities = src.capabilities();
        if options.serialize_to_string() && src.kind().is_serializable() {
            return Some(Procedure::Text(TextProcedure::Serialize(
                options.nil_value_policy(),
            )));
        }
        if options.use_strings() {
            if let Some(display) = capabilities.display {
                return Some(Procedure::Text(TextProcedure::Display(display)));
            }
        }
        if options.use_marshal() {
            if let Some(marshal) = capabilities.marshal {
                return Some(Procedure::Text(TextProcedure::Marshal(marshal)));
            }
        }
    }

    if let Some(primitive) = primitive::lookup(dst, src, options.str_bytes_zero_copy()) {
        return Some(Procedure::Primitive(primitive));
    }

    if dst.kind() == Kind::Dynamic {
        return Some(Procedure::Any(AnyProcedure::new(src, options)));
    }
    None
}
