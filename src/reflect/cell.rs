use std::any::TypeId;
use std::sync::LazyLock;

use dashmap::DashMap;

use crate::reflect::TypeInfo;

static TYPE_INFOS: LazyLock<DashMap<TypeId, &'static TypeInfo>> = LazyLock::new(DashMap::new);

/// Returns the process-wide descriptor of `T`, building it with `build` on first use.
///
/// Generic impls cannot hold a `static` per instantiation, so every descriptor lives
/// in one `TypeId`-keyed map. The builder runs outside the map's shard lock: member
/// types are referenced lazily and may resolve their own descriptors at any time.
/// Should two threads race on the same type, the first insert wins and the other
/// descriptor is simply never handed out.
pub fn type_info_of<T: 'static>(build: impl FnOnce() -> TypeInfo) -> &'static TypeInfo {
    let id = TypeId::of::<T>();
    if let Some(info) = TYPE_INFOS.get(&id) {
        return *info;
    }

    let built: &'static TypeInfo = Box::leak(Box::new(build()));
    *TYPE_INFOS.entry(id).or_insert(built)
}

#[cfg(test)]
mod tests {
    use crate::reflect::{Kind, Typed};

    #[test]
    fn test_descriptor_is_cached() {
        let a = <Vec<Option<u8>>>::type_info();
        let b = <Vec<Option<u8>>>::type_info();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.kind(), Kind::Slice);
    }
}
