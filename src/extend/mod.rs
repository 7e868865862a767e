//! Prebuilt custom converters.
//!
//! Every adapter in this module is an ordinary [`CustomConverter`] with a stable key,
//! usable per call through [`crate::options::custom_converter`] or for the whole
//! process through [`install`].
//!
//! # Key Components
//!
//! - [`ValueBox`] - scalars wrapped in a one-field message type
//! - [`DurationValue`] - seconds and nanoseconds, from `std::time::Duration` or
//!   nanosecond counts
//! - [`Timestamp`] - seconds and nanoseconds since the Unix epoch, from any time-like
//!   type
//! - [`json`] - `serde_json::Value` to and from [`crate::Dynamic`] containers
//! - [`split`] - `String` to and from lists with a separator
//! - [`kvp`] - maps to and from lists of [`KeyValuePair`]
//!
//! The default set, returned by [`default_adapters`], holds the boxes, the duration
//! and timestamp adapters and the JSON adapters. Splitting and key/value adapters
//! need parameters and are always registered explicitly.
//!
//! # Examples
//!
//! ```rust
//! use conv::extend::ValueBox;
//! use conv::{convert, options};
//!
//! let boxed: ValueBox<i64> = convert(&42i64, &[options::builtin_adapters()]).unwrap();
//! assert_eq!(boxed.value, 42);
//! ```

mod duration;
pub mod json;
pub mod kvp;
pub mod split;
mod timestamp;
mod wrappers;

use std::sync::Arc;

use crate::convert::custom::{install_converters, CustomConverter};

pub use duration::{DurationValue, DurationToValue, NanosToValue, ValueToDuration, ValueToNanos};
pub use kvp::{KeyValue, KeyValuePair};
pub use split::EmptyStringSplit;
pub use timestamp::{TimeToTimestamp, Timestamp, TimestampToTime};
pub use wrappers::{box_adapter, unbox_adapter, ValueBox};

/// The default adapter set.
pub fn default_adapters() -> Vec<Arc<dyn CustomConverter>> {
    let mut adapters = wrappers::adapters();
    adapters.extend(duration::adapters());
    adapters.extend(timestamp::adapters());
    adapters.extend(json::adapters());
    adapters
}

/// Installs `extra` followed by the default adapter set for every conversion built
/// afterwards.
///
/// Only the first call has an effect; it returns `false` for every later call.
/// Converters already cached keep the options they were built with.
///
/// # Examples
///
/// ```rust,no_run
/// conv::extend::install(Vec::new());
/// ```
pub fn install(extra: Vec<Arc<dyn CustomConverter>>) -> bool {
    let mut converters = extra;
    converters.extend(default_adapters());
    install_converters(converters)
}
