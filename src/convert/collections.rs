//! Slice and map conversions.
//!
//! A slice destination is resized to the source length, keeping existing elements
//! and zero-filling new ones, then converted element by element. A map destination is
//! always replaced by a fresh map sized to the source; keys and values convert
//! independently and entries the destination rejects are dropped.

use crate::convert::element::Element;
use crate::convert::registry::Builder;
use crate::options::Options;
use crate::reflect::{Reflect, ReflectMut, ReflectRef, Shape, TypeInfo};
use crate::{Error, Result};

/// Element-wise slice conversion.
pub(crate) struct SliceProcedure {
    element: Element,
}

impl SliceProcedure {
    pub(crate) fn run(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        let (ReflectMut::List(dst), ReflectRef::List(src)) = (dst.reflect_mut(), src.reflect_ref()) else {
            return;
        };
        if !dst.resize_zeroed(src.len()) {
            return;
        }
        for index in 0..src.len() {
            if let (Some(d), Some(s)) = (dst.get_mut(index), src.get(index)) {
                self.element.run(d, s);
            }
        }
    }
}

/// Entry-wise map conversion into a fresh map.
pub(crate) struct MapProcedure {
    key: Element,
    value: Element,
    key_info: &'static TypeInfo,
    value_info: &'static TypeInfo,
}

impl MapProcedure {
    pub(crate) fn run(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        let (ReflectMut::Map(dst), ReflectRef::Map(src)) = (dst.reflect_mut(), src.reflect_ref()) else {
            return;
        };
        dst.reset(src.len());
        for (k, v) in src.entries() {
            let mut key = self.key_info.zero();
            let mut value = self.value_info.zero();
            self.key.run(key.as_mut(), k);
            self.value.run(value.as_mut(), v);
            dst.insert_boxed(key, value);
        }
    }
}

fn unsupported(dst: &'static TypeInfo, src: &'static TypeInfo) -> Error {
    Error::Unsupported {
        dst: dst.name(),
        src: src.name(),
    }
}

impl Builder<'_> {
    /// Resolves the element converter of two slice types.
    pub(crate) fn slice_procedure(
        &mut self,
        dst: &'static TypeInfo,
        src: &'static TypeInfo,
        options: &Options,
    ) -> Result<SliceProcedure> {
        let (Shape::Slice(d), Shape::Slice(s)) = (dst.shape(), src.shape()) else {
            return Err(unsupported(dst, src));
        };
        let element = self.element((d.elem)(), (s.elem)(), options)?;
        Ok(SliceProcedure { element })
    }

    /// Resolves the key and value converters of two map types.
    pub(crate) fn map_procedure(
        &mut self,
        dst: &'static TypeInfo,
        src: &'static TypeInfo,
        options: &Options,
    ) -> Result<MapProcedure> {
        let (Shape::Map(d), Shape::Map(s)) = (dst.shape(), src.shape()) else {
            return Err(unsupported(dst, src));
        };
        let key_info = (d.key)();
        let value_info = (d.value)();
        let key = self.element(key_info, (s.key)(), options)?;
        let value = self.element(value_info, (s.value)(), options)?;
        Ok(MapProcedure {
            key,
            value,
            key_info,
            value_info,
        })
    }
}
