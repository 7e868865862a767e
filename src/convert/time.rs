//! Time conversions.
//!
//! Time-like types convert to and from `String` with a strftime format and between
//! each other through their canonical offset date-time. Strings are parsed in local
//! time unless the format carries an offset. Each direction may be guarded by a
//! minimum Unix timestamp; a value below the floor, like a parse failure, leaves the
//! destination untouched.

use std::any::Any;
use std::fmt::Write;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::options::{MinUnixScene, Options};
use crate::reflect::{Reflect, TypeInfo};

type TimeGet = fn(&dyn Any) -> Option<DateTime<FixedOffset>>;
type TimeSet = fn(&mut dyn Any, DateTime<FixedOffset>);

/// A compiled time conversion.
pub(crate) enum TimeProcedure {
    /// Time-like to `String`.
    Format {
        get: TimeGet,
        format: String,
        floor: Option<i64>,
    },
    /// `String` to time-like.
    Parse {
        set: TimeSet,
        format: String,
        floor: Option<i64>,
    },
    /// Time-like to another time-like type.
    Between { get: TimeGet, set: TimeSet },
}

impl TimeProcedure {
    /// Builds the procedure for a dereferenced pair, `None` when neither side fits.
    pub(crate) fn new(dst: &'static TypeInfo, src: &'static TypeInfo, options: &Options) -> Option<Self> {
        let string = |info: &TypeInfo| info.id() == std::any::TypeId::of::<String>();
        match (dst.as_time(), src.as_time()) {
            (Some(dst_time), Some(src_time)) => Some(TimeProcedure::Between {
                get: src_time.get,
                set: dst_time.set,
            }),
            (None, Some(src_time)) if string(dst) => Some(TimeProcedure::Format {
                get: src_time.get,
                format: options.time_format_for(src_time.format).to_string(),
                floor: options.min_unix_for(MinUnixScene::TIME_STRING),
            }),
            (Some(dst_time), None) if string(src) => Some(TimeProcedure::Parse {
                set: dst_time.set,
                format: options.time_format_for(dst_time.format).to_string(),
                floor: options.min_unix_for(MinUnixScene::STRING_TIME),
            }),
            _ => None,
        }
    }

    pub(crate) fn run(&self, dst: &mut dyn Reflect, src: &dyn Reflect) {
        match self {
            TimeProcedure::Format { get, format, floor } => {
                let Some(time) = get(src.as_any()) else {
                    return;
                };
                if below(&time, *floor) {
                    return;
                }
                let mut text = String::new();
                if write!(text, "{}", time.format(format)).is_err() {
                    return;
                }
                if let Some(dst) = dst.downcast_mut::<String>() {
                    *dst = text;
                }
            }
            TimeProcedure::Parse { set, format, floor } => {
                let Some(text) = src.downcast_ref::<String>() else {
                    return;
                };
                let Some(time) = parse_time(text, format) else {
                    return;
                };
                if below(&time, *floor) {
                    return;
                }
                set(dst.as_any_mut(), normalize(time));
            }
            TimeProcedure::Between { get, set } => {
                if let Some(time) = get(src.as_any()) {
                    set(dst.as_any_mut(), time);
                }
            }
        }
    }
}

fn below(time: &DateTime<FixedOffset>, floor: Option<i64>) -> bool {
    floor.is_some_and(|min| time.timestamp() < min)
}

/// Parses with an offset-carrying format, then as local date-time, then as a local date.
pub(crate) fn parse_time(text: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(time) = DateTime::parse_from_str(text, format) {
        return Some(time);
    }
    let naive = NaiveDateTime::parse_from_str(text, format).ok().or_else(|| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|time| time.fixed_offset())
}

/// Maps local Unix epoch and local year-one midnight to their UTC counterparts.
fn normalize(time: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    for (year, month, day) in [(1970, 1, 1), (1, 1, 1)] {
        let Some(local) = Local.with_ymd_and_hms(year, month, day, 0, 0, 0).earliest() else {
            continue;
        };
        if local == time {
            if let Some(utc) = Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).earliest() {
                return utc.fixed_offset();
            }
        }
    }
    time
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options;
    use crate::reflect::Typed;

    fn procedure<D: Typed, S: Typed>(options: &Options) -> TimeProcedure {
        TimeProcedure::new(D::type_info(), S::type_info(), options).expect("time procedure")
    }

    #[test]
    fn test_format_and_floor() {
        let time = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
        let p = procedure::<String, DateTime<Utc>>(&Options::default());
        let mut out = String::new();
        p.run(&mut out, &time);
        assert_eq!(out, "2024-03-04 05:06:07");

        let opts = Options::build(0, &[options::min_unix(time.timestamp() + 1)]);
        let p = procedure::<String, DateTime<Utc>>(&opts);
        let mut out = "kept".to_string();
        p.run(&mut out, &time);
        assert_eq!(out, "kept");
    }

    #[test]
    fn test_parse_with_offset() {
        let opts = Options::build(0, &[options::time_format("%Y-%m-%dT%H:%M:%S%z")]);
        let p = procedure::<DateTime<Utc>, String>(&opts);
        let mut out = DateTime::<Utc>::default();
        p.run(&mut out, &"2024-01-02T03:04:05+0200".to_string());
        assert_eq!(out, Utc.with_ymd_and_hms(2024, 1, 2, 1, 4, 5).unwrap());

        let mut kept = out;
        p.run(&mut kept, &"garbage".to_string());
        assert_eq!(kept, out);
    }

    #[test]
    fn test_parse_local_epoch_is_utc() {
        let p = procedure::<DateTime<Utc>, String>(&Options::default());
        let mut out = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        p.run(&mut out, &"1970-01-01 00:00:00".to_string());
        assert_eq!(out.timestamp(), 0);
    }

    #[test]
    fn test_parse_date_only_format() {
        let time = parse_time("2021-06-07", "%Y-%m-%d").unwrap();
        assert_eq!(time.naive_local().to_string(), "2021-06-07 00:00:00");
    }

    #[test]
    fn test_between_time_types() {
        let p = procedure::<NaiveDateTime, DateTime<Local>>(&Options::default());
        let local = Local.with_ymd_and_hms(2022, 2, 3, 4, 5, 6).unwrap();
        let mut out = NaiveDateTime::default();
        p.run(&mut out, &local);
        assert_eq!(out, local.naive_local());
    }

    #[test]
    fn test_string_floor_direction_only() {
        let opts = Options::build(0, &[options::min_unix_by(100, MinUnixScene::TIME_STRING)]);
        let p = procedure::<DateTime<Utc>, String>(&opts);
        let mut out = DateTime::<Utc>::default();
        p.run(&mut out, &"1970-01-01 00:00:10".to_string());
        assert_ne!(out, DateTime::<Utc>::default());
    }
}
