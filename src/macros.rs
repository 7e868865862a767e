#![allow(unused_macros)]

/// Helper macro for locking items
///
/// A poisoned lock is recovered.
///
/// ```rust, ignore
///  let mut data = lock!(my_mutex);
///  data.some_field = 42;
/// ```
macro_rules! lock {
    ($lock:expr) => {
        $lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}

/// Helper macro for reading locked items
///
/// ```rust, ignore
///  let data = read_lock!(my_rwlock);
///  println!("{}", data.some_field);
/// ```
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}

/// Helper macro for writing to locked items
///
/// ```rust, ignore
///  let mut data = write_lock!(my_rwlock);
///  data.some_field = 42;
/// ```
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}

/// Implements [`Reflect`](crate::reflect::Reflect) and [`Typed`](crate::reflect::Typed)
/// for types implementing [`TimeLike`](crate::reflect::TimeLike).
///
/// The types must also implement `Default`, `Clone` and `PartialEq`; the zero check
/// compares against the default value.
///
/// ```rust, ignore
/// conv::reflect_time!(MyTime, OtherTime);
/// ```
#[macro_export]
macro_rules! reflect_time {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::reflect::Reflect for $ty {
            fn info(&self) -> &'static $crate::reflect::TypeInfo {
                <$ty as $crate::reflect::Typed>::type_info()
            }

            fn is_zero(&self) -> bool {
                *self == <$ty as ::core::default::Default>::default()
            }
        }

        impl $crate::reflect::Typed for $ty {
            fn type_info() -> &'static $crate::reflect::TypeInfo {
                $crate::reflect::type_info_of::<$ty>($crate::reflect::time_info::<$ty>)
            }
        }
    )*};
}
