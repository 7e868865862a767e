use std::any::TypeId;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};

use crate::convert::custom::CustomConverter;
use crate::reflect::TypeInfo;
use crate::Reflect;

/// A point in time as seconds and nanoseconds since the Unix epoch.
#[derive(Reflect, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timestamp {
    /// Seconds since `1970-01-01T00:00:00Z`.
    pub seconds: i64,
    /// Non-negative nanoseconds within the second.
    pub nanos: i32,
}

impl Timestamp {
    /// Converts from any date-time.
    pub fn from_time<Tz: chrono::TimeZone>(time: &DateTime<Tz>) -> Self {
        Timestamp {
            seconds: time.timestamp(),
            nanos: time.timestamp_subsec_nanos() as i32,
        }
    }

    /// Converts into a local date-time, `None` when out of range.
    pub fn to_time(&self) -> Option<DateTime<FixedOffset>> {
        let nanos = u32::try_from(self.nanos).ok()?;
        DateTime::from_timestamp(self.seconds, nanos).map(|utc| utc.with_timezone(&Local).fixed_offset())
    }
}

fn is_timestamp(info: &TypeInfo) -> bool {
    info.id() == TypeId::of::<Timestamp>()
}

/// Any time-like type into [`Timestamp`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeToTimestamp;

impl CustomConverter for TimeToTimestamp {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        is_timestamp(dst) && src.as_time().is_some()
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        let Some(time) = src.info().as_time().and_then(|time| (time.get)(src.as_any())) else {
            return;
        };
        if let Some(dst) = dst.downcast_mut::<Timestamp>() {
            *dst = Timestamp::from_time(&time);
        }
    }

    fn key(&self) -> String {
        "[time2Timestamp]".to_string()
    }
}

/// [`Timestamp`] into any time-like type, in local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampToTime;

impl CustomConverter for TimestampToTime {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        is_timestamp(src) && dst.as_time().is_some()
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        let Some(time) = src.downcast_ref::<Timestamp>().and_then(Timestamp::to_time) else {
            return;
        };
        if let Some(set) = dst.info().as_time().map(|time| time.set) {
            set(dst.as_any_mut(), time);
        }
    }

    fn key(&self) -> String {
        "[timestamp2Time]".to_string()
    }
}

pub(crate) fn adapters() -> Vec<Arc<dyn CustomConverter>> {
    vec![Arc::new(TimeToTimestamp), Arc::new(TimestampToTime)]
}
