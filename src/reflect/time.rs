//! Time-like types.
//!
//! Every time-like type converts through a canonical `DateTime<FixedOffset>`.
//! Wrapper types join by implementing [`TimeLike`] and invoking
//! [`reflect_time!`](crate::reflect_time):
//!
//! ```rust
//! use chrono::{DateTime, FixedOffset};
//! use conv::reflect::TimeLike;
//!
//! #[derive(Clone, Default, PartialEq)]
//! pub struct Birthday(DateTime<FixedOffset>);
//!
//! impl TimeLike for Birthday {
//!     fn to_time(&self) -> DateTime<FixedOffset> {
//!         self.0
//!     }
//!     fn from_time(time: DateTime<FixedOffset>) -> Self {
//!         Birthday(time)
//!     }
//!     fn default_format() -> Option<&'static str> {
//!         Some("%Y-%m-%d")
//!     }
//! }
//!
//! conv::reflect_time!(Birthday);
//! ```

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};

use crate::reflect::{Kind, Shape, TimeInfo, TypeInfo, Typed};

/// A type that converts to and from a canonical offset date-time.
pub trait TimeLike: Typed {
    /// The value as an offset date-time.
    fn to_time(&self) -> DateTime<FixedOffset>;

    /// Builds a value from an offset date-time.
    fn from_time(time: DateTime<FixedOffset>) -> Self;

    /// Format used when neither the call nor the field names one.
    fn default_format() -> Option<&'static str> {
        None
    }
}

/// Builds the descriptor of a [`TimeLike`] type.
pub fn time_info<T: TimeLike>() -> TypeInfo {
    TypeInfo::new::<T>(
        Kind::Time,
        Shape::Time(TimeInfo {
            get: |value| value.downcast_ref::<T>().map(T::to_time),
            set: |value, time| {
                if let Some(value) = value.downcast_mut::<T>() {
                    *value = T::from_time(time);
                }
            },
            format: T::default_format(),
        }),
    )
}

impl TimeLike for DateTime<Utc> {
    fn to_time(&self) -> DateTime<FixedOffset> {
        self.fixed_offset()
    }

    fn from_time(time: DateTime<FixedOffset>) -> Self {
        time.with_timezone(&Utc)
    }
}

impl TimeLike for DateTime<Local> {
    fn to_time(&self) -> DateTime<FixedOffset> {
        self.fixed_offset()
    }

    fn from_time(time: DateTime<FixedOffset>) -> Self {
        time.with_timezone(&Local)
    }
}

impl TimeLike for DateTime<FixedOffset> {
    fn to_time(&self) -> DateTime<FixedOffset> {
        *self
    }

    fn from_time(time: DateTime<FixedOffset>) -> Self {
        time
    }
}

/// Naive date-times are read as local wall-clock time.
impl TimeLike for NaiveDateTime {
    fn to_time(&self) -> DateTime<FixedOffset> {
        Local
            .from_local_datetime(self)
            .earliest()
            .map(|t| t.fixed_offset())
            .unwrap_or_else(|| self.and_utc().fixed_offset())
    }

    fn from_time(time: DateTime<FixedOffset>) -> Self {
        time.with_timezone(&Local).naive_local()
    }
}

crate::reflect_time!(
    DateTime<Utc>,
    DateTime<Local>,
    DateTime<FixedOffset>,
    NaiveDateTime,
);
