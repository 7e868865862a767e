//! Process-wide defaults.
//!
//! Every option set built by a conversion call starts from a snapshot of these
//! values. Changing a default therefore only affects converters resolved afterwards;
//! converters already published keep the settings they were built with, since the
//! snapshot is part of their cache key.
//!
//! # Thread Safety
//!
//! The defaults live behind one `RwLock`. Setters take the write lock briefly; option
//! building takes the read lock once per call.

use std::sync::{LazyLock, RwLock};

use crate::options::{MinUnixScene, NilValuePolicy};

/// Default fallback tag used to name structure fields.
pub const DEFAULT_TAG_NAME: &str = "json";

/// Default priority tag used to name structure fields.
pub const DEFAULT_PRIORITY_TAG_NAME: &str = "conv";

/// Default format for time and string conversions.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) tag_name: String,
    pub(crate) priority_tag_name: String,
    pub(crate) time_format: String,
    pub(crate) min_unix: Option<i64>,
    pub(crate) min_unix_scene: MinUnixScene,
    pub(crate) nil_value_policy: NilValuePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tag_name: DEFAULT_TAG_NAME.to_string(),
            priority_tag_name: DEFAULT_PRIORITY_TAG_NAME.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            min_unix: None,
            min_unix_scene: MinUnixScene::default(),
            nil_value_policy: NilValuePolicy::default(),
        }
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

pub(crate) fn snapshot() -> Settings {
    read_lock!(SETTINGS).clone()
}

/// Sets the fallback tag used to name structure fields (`json` by default).
///
/// When this tag is `json`, its value is cut at the first `,` so that
/// `json = "name,omitempty"` names the field `name`.
pub fn set_tag_name(name: impl Into<String>) {
    write_lock!(SETTINGS).tag_name = name.into();
}

/// Sets the priority tag used to name structure fields (`conv` by default).
pub fn set_priority_tag_name(name: impl Into<String>) {
    write_lock!(SETTINGS).priority_tag_name = name.into();
}

/// Sets the global default time format, a `chrono` strftime string.
///
/// The per-call option, the per-field `format` tag and a time wrapper's own default
/// all take precedence over it.
pub fn set_time_format(format: impl Into<String>) {
    write_lock!(SETTINGS).time_format = format.into();
}

/// Sets the global minimum Unix timestamp for time conversions.
pub fn set_min_unix(unix: i64) {
    write_lock!(SETTINGS).min_unix = Some(unix);
}

/// Sets the global minimum timestamp from a date-time value.
pub fn set_min_unix_by<Tz: chrono::TimeZone>(time: &chrono::DateTime<Tz>) {
    write_lock!(SETTINGS).min_unix = Some(time.timestamp());
}

/// Sets the conversions the global minimum timestamp applies to.
pub fn set_min_unix_scene(scene: MinUnixScene) {
    write_lock!(SETTINGS).min_unix_scene = scene;
}

/// Sets the global nil-value policy.
pub fn set_nil_value_policy(policy: NilValuePolicy) {
    write_lock!(SETTINGS).nil_value_policy = policy;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.tag_name, "json");
        assert_eq!(settings.priority_tag_name, "conv");
        assert_eq!(settings.time_format, DEFAULT_TIME_FORMAT);
        assert!(settings.min_unix.is_none());
        assert_eq!(settings.nil_value_policy, NilValuePolicy::Zero);
    }
}
