use std::any::TypeId;
use std::sync::Arc;
use std::time::Duration;

use crate::convert::custom::CustomConverter;
use crate::reflect::TypeInfo;
use crate::Reflect;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A signed span of time as whole seconds plus nanoseconds of the same sign.
#[derive(Reflect, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationValue {
    /// Whole seconds.
    pub seconds: i64,
    /// Nanoseconds in `-999_999_999..=999_999_999`.
    pub nanos: i32,
}

impl DurationValue {
    /// Splits a nanosecond count.
    pub fn from_nanos(nanos: i64) -> Self {
        DurationValue {
            seconds: nanos / NANOS_PER_SECOND,
            nanos: (nanos % NANOS_PER_SECOND) as i32,
        }
    }

    /// Total nanoseconds, saturating at the `i64` bounds.
    pub fn as_nanos(&self) -> i64 {
        self.seconds
            .saturating_mul(NANOS_PER_SECOND)
            .saturating_add(i64::from(self.nanos))
    }

    /// Converts from `std::time::Duration`, saturating at `i64::MAX` seconds.
    pub fn from_duration(duration: Duration) -> Self {
        DurationValue {
            seconds: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
            nanos: duration.subsec_nanos() as i32,
        }
    }

    /// Converts into `std::time::Duration`; negative spans become zero.
    pub fn to_duration(&self) -> Duration {
        let (Ok(seconds), Ok(nanos)) = (u64::try_from(self.seconds), u64::try_from(self.nanos)) else {
            return Duration::ZERO;
        };
        Duration::from_secs(seconds)
            .checked_add(Duration::from_nanos(nanos))
            .unwrap_or(Duration::MAX)
    }
}

fn is<D: 'static, S: 'static>(dst: &TypeInfo, src: &TypeInfo) -> bool {
    dst.id() == TypeId::of::<D>() && src.id() == TypeId::of::<S>()
}

/// `std::time::Duration` into [`DurationValue`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DurationToValue;

impl CustomConverter for DurationToValue {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        is::<DurationValue, Duration>(dst, src)
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        if let (Some(dst), Some(src)) = (dst.downcast_mut::<DurationValue>(), src.downcast_ref::<Duration>()) {
            *dst = DurationValue::from_duration(*src);
        }
    }

    fn key(&self) -> String {
        "[duration2DurationValue]".to_string()
    }
}

/// [`DurationValue`] into `std::time::Duration`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueToDuration;

impl CustomConverter for ValueToDuration {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        is::<Duration, DurationValue>(dst, src)
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        if let (Some(dst), Some(src)) = (dst.downcast_mut::<Duration>(), src.downcast_ref::<DurationValue>()) {
            *dst = src.to_duration();
        }
    }

    fn key(&self) -> String {
        "[durationValue2Duration]".to_string()
    }
}

/// An `i64` nanosecond count into [`DurationValue`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NanosToValue;

impl CustomConverter for NanosToValue {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        is::<DurationValue, i64>(dst, src)
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        if let (Some(dst), Some(src)) = (dst.downcast_mut::<DurationValue>(), src.downcast_ref::<i64>()) {
            *dst = DurationValue::from_nanos(*src);
        }
    }

    fn key(&self) -> String {
        "[nanos2DurationValue]".to_string()
    }
}

/// [`DurationValue`] into an `i64` nanosecond count.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueToNanos;

impl CustomConverter for ValueToNanos {
    fn is(&self, dst: &'static TypeInfo, src: &'static TypeInfo) -> bool {
        is::<i64, DurationValue>(dst, src)
    }

    fn convert(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        if let (Some(dst), Some(src)) = (dst.downcast_mut::<i64>(), src.downcast_ref::<DurationValue>()) {
            *dst = src.as_nanos();
        }
    }

    fn key(&self) -> String {
        "[durationValue2Nanos]".to_string()
    }
}

pub(crate) fn adapters() -> Vec<Arc<dyn CustomConverter>> {
    vec![
        Arc::new(DurationToValue),
        Arc::new(ValueToDuration),
        Arc::new(NanosToValue),
        Arc::new(ValueToNanos),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Typed;

    #[test]
    fn test_nanos_split() {
        let v = DurationValue::from_nanos(-1_500_000_000);
        assert_eq!(v, DurationValue { seconds: -1, nanos: -500_000_000 });
        assert_eq!(v.as_nanos(), -1_500_000_000);
        assert_eq!(v.to_duration(), Duration::ZERO);
    }

    #[test]
    fn test_std_duration() {
        let d = Duration::new(3, 250);
        let v = DurationValue::from_duration(d);
        assert_eq!(v, DurationValue { seconds: 3, nanos: 250 });
        assert_eq!(v.to_duration(), d);
    }

    #[test]
    fn test_adapters() {
        let mut v = DurationValue::default();
        NanosToValue.convert(&mut v, &2_000_000_001i64);
        assert_eq!(v, DurationValue { seconds: 2, nanos: 1 });

        let mut n = 0i64;
        ValueToNanos.convert(&mut n, &v);
        assert_eq!(n, 2_000_000_001);

        let mut d = Duration::ZERO;
        ValueToDuration.convert(&mut d, &v);
        assert_eq!(d, Duration::new(2, 1));
        assert!(DurationToValue.is(DurationValue::type_info(), Duration::type_info()));
    }
}
