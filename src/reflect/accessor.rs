//! Field types holding zero-argument accessors.
//!
//! A structure field of one of these types is read by calling the stored closure,
//! which makes it a virtual field for the extractor. The three flavors mirror the
//! accepted accessor signatures: a plain value, a value gated by `Option`, and a
//! value gated by `Result`.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::reflect::{type_info_of, FuncInfo, Guard, Kind, Reflect, Shape, TypeInfo, Typed};

type BoxError = Box<dyn StdError + Send + Sync>;

macro_rules! accessor {
    ($(#[$doc:meta])* $name:ident, $ret:ty, $guard:expr, |$f:ident| $call:expr) => {
        $(#[$doc])*
        pub struct $name<T>(Option<Arc<dyn Fn() -> $ret + Send + Sync>>);

        impl<T> $name<T> {
            /// Wraps an accessor closure.
            pub fn new(f: impl Fn() -> $ret + Send + Sync + 'static) -> Self {
                $name(Some(Arc::new(f)))
            }

            /// Calls the accessor, `None` when no closure is set.
            pub fn call(&self) -> Option<$ret> {
                self.0.as_ref().map(|f| f())
            }

            /// Returns `true` when no closure is set.
            pub fn is_unset(&self) -> bool {
                self.0.is_none()
            }
        }

        impl<T> Default for $name<T> {
            fn default() -> Self {
                $name(None)
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                $name(self.0.clone())
            }
        }

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("set", &self.0.is_some())
                    .finish()
            }
        }

        impl<T: Typed> Reflect for $name<T> {
            fn info(&self) -> &'static TypeInfo {
                Self::type_info()
            }

            fn is_zero(&self) -> bool {
                self.is_unset()
            }
        }

        impl<T: Typed> Typed for $name<T> {
            fn type_info() -> &'static TypeInfo {
                type_info_of::<Self>(|| {
                    TypeInfo::new::<Self>(
                        Kind::Func,
                        Shape::Func(FuncInfo {
                            output: T::type_info,
                            guard: $guard,
                            call: |value| {
                                let $f = value.downcast_ref::<Self>()?.0.as_ref()?;
                                $call.map(|v| Box::new(v) as Box<dyn Reflect>)
                            },
                        }),
                    )
                })
            }
        }
    };
}

accessor!(
    /// An accessor returning a value.
    Getter, T, Guard::None, |f| Some(f())
);

accessor!(
    /// An accessor whose value is skipped on `None`.
    TryGetter, Option<T>, Guard::Ok, |f| f()
);

accessor!(
    /// An accessor whose value is skipped on `Err`.
    FallibleGetter, Result<T, BoxError>, Guard::Err, |f| f().ok()
);
