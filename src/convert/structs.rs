//! Structure conversions.
//!
//! A structure-to-structure converter pairs destination fields with source fields by
//! external name and runs one [`Element`] per pair. A structure-to-map converter turns
//! each source field into one entry of a fresh string-keyed map.
//!
//! # Field matching
//!
//! For structure targets, banned names are removed from the destination fields first,
//! then aliases rename them; a pair exists when the source has the resulting name and
//! the allow-list (when set) contains it. For map targets the same three filters
//! apply to the source fields, and the resulting name becomes the map key.
//!
//! Each pair is built with the nested options of its field (see
//! [`crate::options::Options::nested`]) and, when either side carries a `format` tag,
//! with that time format.

use std::collections::HashMap;

use crate::convert::element::Element;
use crate::convert::fields::{struct_fields, FieldDescriptor, Role};
use crate::convert::registry::Builder;
use crate::options::{NilValuePolicy, Options};
use crate::reflect::{deref_value, Reflect, ReflectMut, TypeInfo};

struct FieldPair {
    dst: FieldDescriptor,
    src: FieldDescriptor,
    element: Element,
}

/// Field-by-field structure conversion.
pub(crate) struct StructProcedure {
    pairs: Vec<FieldPair>,
    nil_policy: NilValuePolicy,
}

impl StructProcedure {
    pub(crate) fn run(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        for pair in &self.pairs {
            let Some(owner) = pair.src.owner(src) else {
                self.nil_owner(pair, dst);
                continue;
            };
            let Some(value) = pair.src.read(owner) else {
                continue;
            };
            let Some(member) = pair
                .dst
                .owner_mut(dst)
                .and_then(|owner| pair.dst.member_mut(owner))
            else {
                continue;
            };
            pair.element.run(member, value.get());
        }
    }

    /// A nil embedded pointer on the source side.
    ///
    /// Under [`NilValuePolicy::Ignore`] the member is skipped rather than converted
    /// from the zero embedded structure, so the policy applies uniformly to every nil
    /// the element converter or a hop reaches.
    fn nil_owner(&self, pair: &FieldPair, dst: &mut dyn Reflect) {
        if pair.dst.has_pointer_hop() {
            pair.dst.clear_pointer_hop(dst);
            return;
        }
        if self.nil_policy == NilValuePolicy::Ignore || !pair.src.is_field() {
            return;
        }
        if let Some(member) = pair
            .dst
            .owner_mut(dst)
            .and_then(|owner| pair.dst.member_mut(owner))
        {
            pair.element.run_zero(member);
        }
    }
}

struct MapField {
    src: FieldDescriptor,
    key: String,
    value: &'static TypeInfo,
    element: Element,
}

/// Structure to string-keyed map conversion.
pub(crate) struct StructMapProcedure {
    fields: Vec<MapField>,
    ignore_empty: bool,
}

impl StructMapProcedure {
    pub(crate) fn run(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        let ReflectMut::Map(map) = dst.reflect_mut() else {
            return;
        };
        map.reset(self.fields.len());
        for field in &self.fields {
            let mut value = field.value.zero();
            match field.src.owner(src) {
                Some(owner) => {
                    let Some(member) = field.src.read(owner) else {
                        continue;
                    };
                    if self.ignore_empty && deref_value(member.get()).map_or(true, |v| v.is_zero()) {
                        continue;
                    }
                    field.element.run(value.as_mut(), member.get());
                }
                None if self.ignore_empty => continue,
                None => field.element.run_zero(value.as_mut()),
            }
            map.insert_boxed(Box::new(field.key.clone()), value);
        }
    }
}

/// The options a field pair is built with.
fn field_options(options: &Options, name: &str, format: Option<&'static str>) -> Options {
    let nested = options.nested(name).unwrap_or(options);
    match format {
        Some(format) => nested.with_field_format(format),
        None => nested.clone(),
    }
}

impl Builder<'_> {
    /// Pairs the fields of two different structure types.
    ///
    /// Returns `None` when no pair could be built.
    pub(crate) fn struct_procedure(
        &mut self,
        dst: &'static TypeInfo,
        src: &'static TypeInfo,
        options: &Options,
    ) -> Option<StructProcedure> {
        let src_fields = struct_fields(src, Role::Source, options);
        let dst_fields = struct_fields(dst, Role::Destination, options);
        let by_name: HashMap<&str, &FieldDescriptor> =
            src_fields.iter().map(|f| (f.name.as_str(), f)).collect();

        let mut pairs = Vec::new();
        for df in dst_fields.iter() {
            if options.is_banned(&df.name) {
                continue;
            }
            let name = options.alias_of(&df.name).unwrap_or(&df.name);
            let Some(sf) = by_name.get(name) else {
                continue;
            };
            if !options.is_allowed(&sf.name) {
                continue;
            }
            let field_opts = field_options(options, name, df.format.or(sf.format));
            if let Ok(element) = self.element(df.ty, sf.ty, &field_opts) {
                pairs.push(FieldPair {
                    dst: df.clone(),
                    src: (*sf).clone(),
                    element,
                });
            }
        }

        if pairs.is_empty() {
            return None;
        }
        Some(StructProcedure {
            pairs,
            nil_policy: options.nil_value_policy(),
        })
    }

    /// Maps the fields of a structure onto entries of a string-keyed map.
    ///
    /// Returns `None` when no field could be mapped.
    pub(crate) fn struct_map_procedure(
        &mut self,
        value: &'static TypeInfo,
        src: &'static TypeInfo,
        options: &Options,
    ) -> Option<StructMapProcedure> {
        let src_fields = struct_fields(src, Role::MapSource, options);

        let mut fields = Vec::new();
        for sf in src_fields.iter() {
            if options.is_banned(&sf.name) {
                continue;
            }
            let key = options.alias_of(&sf.name).unwrap_or(&sf.name);
            if !options.is_allowed(key) {
                continue;
            }
            let field_opts = field_options(options, key, sf.format);
            if let Ok(element) = self.element(value, sf.ty, &field_opts) {
                fields.push(MapField {
                    src: sf.clone(),
                    key: key.to_string(),
                    value,
                    element,
                });
            }
        }

        if fields.is_empty() {
            return None;
        }
        Some(StructMapProcedure {
            fields,
            ignore_empty: options.ignore_empty_fields(),
        })
    }
}
