//! Field and method extraction.
//!
//! Turns a structure's [`crate::reflect::StructInfo`] into the flat list of named
//! members a structure converter pairs up: declared fields in order, accessor fields,
//! members of embedded structures (flattened recursively, outer names win) and, for
//! sources, methods exposed through `#[reflect(method(...))]`.
//!
//! Every descriptor carries its hop path: the chain of embedded members leading from
//! the outer structure to the structure that owns the field. A hop through a pointer
//! may be nil at runtime, which the structure converters handle per their nil rules.
//!
//! # Thread Safety
//!
//! Results are cached per (type, extraction settings) in a `DashMap` and shared as
//! `Arc<[FieldDescriptor]>`.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::options::Options;
use crate::reflect::{
    deref_value, deref_value_or_zero, CallFn, FieldGetter, FieldGetterMut, FieldInfo, Reflect,
    ReflectMut, Shape, TypeInfo,
};

/// Bookkeeping members of schema-message types that never take part in conversion.
const SCHEMA_FIELDS: [&str; 3] = ["state", "size_cache", "unknown_fields"];

/// Which side of a conversion the structure is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Role {
    /// Source of a structure-to-structure conversion.
    Source,
    /// Destination of a structure-to-structure conversion.
    Destination,
    /// Source of a structure-to-map conversion.
    MapSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ExtractConfig {
    role: Role,
    tag_name: String,
    priority_tag_name: String,
    ignore_tag: bool,
    private: bool,
    ignore_func: bool,
}

impl ExtractConfig {
    fn new(role: Role, options: &Options) -> Self {
        let private = match role {
            Role::MapSource => options.include_private_fields(),
            Role::Source | Role::Destination => options.ignore_private_fields(),
        };
        ExtractConfig {
            role,
            tag_name: options.tag_name().to_string(),
            priority_tag_name: options.priority_tag_name().to_string(),
            ignore_tag: options.ignore_tag(),
            private,
            ignore_func: options.ignore_func(),
        }
    }

    fn visible(&self, field: &FieldInfo) -> bool {
        match self.role {
            Role::MapSource => self.private || field.exported,
            Role::Source | Role::Destination => !self.private || field.exported,
        }
    }
}

/// One embedded member on the way to a field.
#[derive(Clone, Copy)]
pub(crate) struct Hop {
    get: FieldGetter,
    get_mut: FieldGetterMut,
    pointer: bool,
}

/// How a member's value is obtained.
#[derive(Clone, Copy)]
pub(crate) enum Access {
    /// A declared field.
    Field {
        get: FieldGetter,
        get_mut: FieldGetterMut,
    },
    /// A field holding an accessor; `call` receives the accessor value.
    Accessor { get: FieldGetter, call: CallFn },
    /// A method; `call` receives the owning structure.
    Method(CallFn),
}

/// A member value, borrowed from its owner or produced by a call.
pub(crate) enum FieldValue<'a> {
    Borrowed(&'a dyn Reflect),
    Owned(Box<dyn Reflect>),
}

impl FieldValue<'_> {
    pub(crate) fn get(&self) -> &dyn Reflect {
        match self {
            FieldValue::Borrowed(value) => *value,
            FieldValue::Owned(value) => value.as_ref(),
        }
    }
}

/// A named, convertible member of a structure.
#[derive(Clone)]
pub(crate) struct FieldDescriptor {
    /// External name after tag resolution.
    pub(crate) name: String,
    /// Per-field time format from the `format` tag.
    pub(crate) format: Option<&'static str>,
    /// Type of the member value; the output type for accessors and methods.
    pub(crate) ty: &'static TypeInfo,
    pub(crate) access: Access,
    hops: Arc<[Hop]>,
}

impl FieldDescriptor {
    /// Returns `true` when the field is a declared field rather than a call.
    pub(crate) fn is_field(&self) -> bool {
        matches!(self.access, Access::Field { .. })
    }

    /// Returns `true` when any embedded hop goes through a pointer.
    pub(crate) fn has_pointer_hop(&self) -> bool {
        self.hops.iter().any(|hop| hop.pointer)
    }

    /// The structure owning the field, `None` at a nil embedded pointer.
    pub(crate) fn owner<'a>(&self, root: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
        let mut current = root;
        for hop in self.hops.iter() {
            current = deref_value((hop.get)(current.as_any())?)?;
        }
        Some(current)
    }

    /// The structure owning the field, allocating nil embedded pointers.
    pub(crate) fn owner_mut<'a>(&self, root: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
        let mut current = root;
        for hop in self.hops.iter() {
            current = deref_value_or_zero((hop.get_mut)(current.as_any_mut())?)?;
        }
        Some(current)
    }

    /// Clears the outermost embedded pointer on the way to the field.
    pub(crate) fn clear_pointer_hop(&self, root: &mut dyn Reflect) {
        let mut current = root;
        for hop in self.hops.iter() {
            let Some(member) = (hop.get_mut)(current.as_any_mut()) else {
                return;
            };
            if hop.pointer {
                if let ReflectMut::Pointer(pointer) = member.reflect_mut() {
                    pointer.set_nil();
                }
                return;
            }
            current = member;
        }
    }

    /// Reads the member from its owning structure.
    pub(crate) fn read<'a>(&self, owner: &'a dyn Reflect) -> Option<FieldValue<'a>> {
        match self.access {
            Access::Field { get, .. } => get(owner.as_any()).map(FieldValue::Borrowed),
            Access::Accessor { get, call } => {
                let accessor = get(owner.as_any())?;
                call(accessor.as_any()).map(FieldValue::Owned)
            }
            Access::Method(call) => call(owner.as_any()).map(FieldValue::Owned),
        }
    }

    /// Exclusive access to a declared field of its owning structure.
    pub(crate) fn member_mut<'a>(&self, owner: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
        match self.access {
            Access::Field { get_mut, .. } => get_mut(owner.as_any_mut()),
            Access::Accessor { .. } | Access::Method(_) => None,
        }
    }
}

static CACHE: LazyLock<DashMap<(TypeId, ExtractConfig), Arc<[FieldDescriptor]>>> =
    LazyLock::new(DashMap::new);

/// Extracts the members of a structure type for the given role.
///
/// # Arguments
///
/// * `info` - The dereferenced structure type
/// * `role` - Source, destination or map source
/// * `options` - Supplies tag names and the private, tag and accessor toggles
pub(crate) fn struct_fields(info: &'static TypeInfo, role: Role, options: &Options) -> Arc<[FieldDescriptor]> {
    let config = ExtractConfig::new(role, options);
    let key = (info.id(), config);
    if let Some(fields) = CACHE.get(&key) {
        return Arc::clone(&fields);
    }

    let config = &key.1;
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    collect_fields(info, config, &[], &mut seen, &mut out);
    if role == Role::Source && !config.ignore_func && !info.capabilities().schema_message {
        collect_methods(info, &[], &mut seen, &mut out);
    }

    let fields: Arc<[FieldDescriptor]> = out.into();
    CACHE.insert(key.clone(), Arc::clone(&fields));
    fields
}

/// The external name of a field, `None` when its tag is `"-"`.
fn field_name(field: &FieldInfo, config: &ExtractConfig) -> Option<String> {
    if config.ignore_tag {
        return Some(field.ident.to_string());
    }
    let (tag, name) = match field.tag(&config.priority_tag_name) {
        Some(name) if !name.is_empty() => (config.priority_tag_name.as_str(), name),
        _ => match field.tag(&config.tag_name) {
            Some(name) if !name.is_empty() => (config.tag_name.as_str(), name),
            _ => return Some(field.ident.to_string()),
        },
    };
    let name = if tag == "json" {
        name.split(',').next().unwrap_or(name)
    } else {
        name
    };
    match name {
        "-" => None,
        "" => Some(field.ident.to_string()),
        name => Some(name.to_string()),
    }
}

fn collect_fields(
    info: &'static TypeInfo,
    config: &ExtractConfig,
    hops: &[Hop],
    seen: &mut HashSet<String>,
    out: &mut Vec<FieldDescriptor>,
) {
    let Some(layout) = info.as_struct() else {
        return;
    };
    let schema = info.capabilities().schema_message;
    let path: Arc<[Hop]> = hops.into();
    let mut embedded = Vec::new();

    for field in &layout.fields {
        if schema && SCHEMA_FIELDS.contains(&field.ident) {
            continue;
        }
        let field_ty = (field.ty)();
        let func = match field_ty.shape() {
            Shape::Func(func) => Some(func),
            _ => None,
        };
        if func.is_some() && config.role == Role::MapSource {
            continue;
        }
        let Some(name) = field_name(field, config) else {
            continue;
        };
        let format = if config.ignore_tag {
            None
        } else {
            field.tag("format")
        };

        let (access, ty) = match func {
            Some(func) if !config.ignore_func => {
                if config.role == Role::Destination {
                    continue;
                }
                (
                    Access::Accessor {
                        get: field.get,
                        call: func.call,
                    },
                    (func.output)(),
                )
            }
            _ => (
                Access::Field {
                    get: field.get,
                    get_mut: field.get_mut,
                },
                field_ty,
            ),
        };

        if config.visible(field) {
            if !seen.insert(name.clone()) {
                continue;
            }
            out.push(FieldDescriptor {
                name,
                format,
                ty,
                access,
                hops: Arc::clone(&path),
            });
        }
        if field.embedded {
            embedded.push(field);
        }
    }

    for field in embedded {
        let (base, depth) = (field.ty)().deref_type();
        let mut nested = hops.to_vec();
        nested.push(Hop {
            get: field.get,
            get_mut: field.get_mut,
            pointer: depth > 0,
        });
        collect_fields(base, config, &nested, seen, out);
    }
}

fn collect_methods(
    info: &'static TypeInfo,
    hops: &[Hop],
    seen: &mut HashSet<String>,
    out: &mut Vec<FieldDescriptor>,
) {
    let Some(layout) = info.as_struct() else {
        return;
    };
    if info.capabilities().schema_message {
        return;
    }
    let path: Arc<[Hop]> = hops.into();
    for method in &layout.methods {
        if !seen.insert(method.name.to_string()) {
            continue;
        }
        out.push(FieldDescriptor {
            name: method.name.to_string(),
            format: None,
            ty: (method.output)(),
            access: Access::Method(method.call),
            hops: Arc::clone(&path),
        });
    }
    for field in layout.fields.iter().filter(|f| f.embedded) {
        let (base, depth) = (field.ty)().deref_type();
        let mut nested = hops.to_vec();
        nested.push(Hop {
            get: field.get,
            get_mut: field.get_mut,
            pointer: depth > 0,
        });
        collect_methods(base, &nested, seen, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{self, Options};
    use crate::reflect::{Getter, Typed};
    use crate::Reflect;

    #[derive(Reflect, Default, Clone)]
    pub struct Audit {
        pub created_by: String,
        pub name: String,
    }

    #[derive(Reflect, Default, Clone)]
    #[reflect(method(call = label, name = "Label"))]
    pub struct Account {
        #[tag(json = "account_id,omitempty")]
        pub id: i64,
        #[tag(conv = "title", json = "ignored")]
        pub name: String,
        #[tag(json = "-")]
        pub secret: String,
        hidden: u8,
        pub total: Getter<i32>,
        #[reflect(embed)]
        pub audit: Option<Box<Audit>>,
    }

    impl Account {
        fn label(&self) -> String {
            format!("#{}", self.id)
        }
    }

    fn names(fields: &[FieldDescriptor]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_source_fields() {
        let opts = Options::default();
        let fields = struct_fields(Account::type_info(), Role::Source, &opts);
        assert_eq!(
            names(&fields),
            vec!["account_id", "title", "hidden", "total", "audit", "created_by", "name", "Label"]
        );
        let embedded = fields.iter().find(|f| f.name == "created_by").unwrap();
        assert!(embedded.has_pointer_hop());
        assert!(fields.iter().filter(|f| f.name == "name").count() == 1);
    }

    #[test]
    fn test_destination_and_map_roles() {
        let opts = Options::build(0, &[options::ignore_private_fields()]);
        let fields = struct_fields(Account::type_info(), Role::Destination, &opts);
        assert_eq!(
            names(&fields),
            vec!["account_id", "title", "audit", "created_by", "name"]
        );

        let fields = struct_fields(Account::type_info(), Role::MapSource, &Options::default());
        assert!(!names(&fields).contains(&"hidden"));
        assert!(!names(&fields).contains(&"total"));
        assert!(!names(&fields).contains(&"Label"));
    }

    #[test]
    fn test_ignore_tag_and_func() {
        let opts = Options::build(0, &[options::ignore_tag(), options::ignore_func()]);
        let fields = struct_fields(Account::type_info(), Role::Source, &opts);
        let names = names(&fields);
        assert!(names.contains(&"id"));
        assert!(names.contains(&"secret"));
        assert!(!names.contains(&"Label"));
        let total = fields.iter().find(|f| f.name == "total").unwrap();
        assert!(total.is_field());
    }

    #[test]
    fn test_read_through_hops() {
        let account = Account {
            id: 7,
            total: Getter::new(|| 3),
            ..Default::default()
        };
        let fields = struct_fields(Account::type_info(), Role::Source, &Options::default());

        let created_by = fields.iter().find(|f| f.name == "created_by").unwrap();
        assert!(created_by.owner(&account).is_none());

        let label = fields.iter().find(|f| f.name == "Label").unwrap();
        let owner = label.owner(&account).unwrap();
        let value = label.read(owner).unwrap();
        assert_eq!(value.get().downcast_ref::<String>(), Some(&"#7".to_string()));

        let total = fields.iter().find(|f| f.name == "total").unwrap();
        let value = total.read(&account).unwrap();
        assert_eq!(value.get().downcast_ref::<i32>(), Some(&3));
    }

    #[test]
    fn test_owner_mut_allocates() {
        let mut account = Account::default();
        let fields = struct_fields(Account::type_info(), Role::Destination, &Options::default());
        let created_by = fields.iter().find(|f| f.name == "created_by").unwrap();
        let owner = created_by.owner_mut(&mut account).unwrap();
        if let Some(member) = created_by.member_mut(owner) {
            member.assign(&"root".to_string());
        }
        assert_eq!(account.audit.as_ref().unwrap().created_by, "root");

        created_by.clear_pointer_hop(&mut account);
        assert!(account.audit.is_none());
    }
}
