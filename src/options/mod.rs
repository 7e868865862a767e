//! Conversion options.
//!
//! A conversion call takes a slice of [`ConvOption`] mutators. They are applied in
//! order to a fresh [`Options`] value seeded from the process-wide defaults in
//! [`crate::settings`]; the finished value is immutable and identified by a
//! deterministic fingerprint that is part of every converter's cache key.
//!
//! # Key Components
//!
//! - [`Options`] - the resolved configuration, including per-field nested options
//! - [`ConvOption`] - one mutator, or a [`phase`] group of mutators
//! - [`MinUnixScene`] / [`NilValuePolicy`] - time floor scenes and nil handling
//!
//! # Nested options
//!
//! Field sets accept dotted names. `banned(["inner.secret"])` bans `secret` only
//! inside the field `inner`; the entry is hoisted into the nested options of `inner`,
//! which inherit every scalar setting of their parent. An allow-list entry `a.b` also
//! allows `a` itself on the parent.
//!
//! # Examples
//!
//! ```rust
//! use conv::options::{self, Options};
//!
//! let opts = Options::build(0, &[options::banned(["password"]), options::alias("name", "user_name")]);
//! assert!(opts.is_banned("password"));
//! assert_eq!(opts.alias_of("name"), Some("user_name"));
//! ```

mod scene;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::convert::custom::{installed_converters, CustomConverter};
use crate::settings;

pub use scene::{MinUnixScene, NilValuePolicy};

/// Resolved configuration of one conversion.
#[derive(Clone, Serialize)]
pub struct Options {
    ignore_private_fields: bool,
    include_private_fields: bool,
    ignore_empty_fields: bool,
    ignore_tag: bool,
    ignore_func: bool,
    use_strings: bool,
    use_marshal: bool,
    str_bytes_zero_copy: bool,
    serialize_to_string: bool,
    tag_name: String,
    priority_tag_name: String,
    time_format: Option<String>,
    field_format: Option<String>,
    default_time_format: String,
    min_unix: Option<i64>,
    min_unix_scene: MinUnixScene,
    nil_value_policy: NilValuePolicy,
    banned: BTreeSet<String>,
    white_list: BTreeSet<String>,
    alias: BTreeMap<String, String>,
    nested: BTreeMap<String, Options>,
    #[serde(skip)]
    custom: Vec<Arc<dyn CustomConverter>>,
    #[serde(skip)]
    fingerprint: Arc<str>,
}

impl Options {
    fn from_settings() -> Self {
        let defaults = settings::snapshot();
        Options {
            ignore_private_fields: false,
            include_private_fields: false,
            ignore_empty_fields: false,
            ignore_tag: false,
            ignore_func: false,
            use_strings: false,
            use_marshal: false,
            str_bytes_zero_copy: true,
            serialize_to_string: false,
            tag_name: defaults.tag_name,
            priority_tag_name: defaults.priority_tag_name,
            time_format: None,
            field_format: None,
            default_time_format: defaults.time_format,
            min_unix: defaults.min_unix,
            min_unix_scene: defaults.min_unix_scene,
            nil_value_policy: defaults.nil_value_policy,
            banned: BTreeSet::new(),
            white_list: BTreeSet::new(),
            alias: BTreeMap::new(),
            nested: BTreeMap::new(),
            custom: Vec::new(),
            fingerprint: Arc::from(""),
        }
    }

    /// Builds the options of one conversion phase.
    ///
    /// Phase `0` applies every mutator. Phase `n > 0` applies the mutators outside any
    /// [`phase`] group plus the contents of the `n`-th group.
    ///
    /// # Arguments
    ///
    /// * `phase` - The conversion phase, `0` for single-phase conversions
    /// * `opts` - The mutators in application order
    pub fn build(phase: usize, opts: &[ConvOption]) -> Self {
        let mut options = Options::from_settings();
        let mut group = 0;
        for opt in opts {
            match &*opt.0 {
                OptionKind::Apply(apply) => apply(&mut options),
                OptionKind::Phase(inner) => {
                    group += 1;
                    if phase == 0 || phase == group {
                        for opt in inner {
                            opt.apply_all(&mut options);
                        }
                    }
                }
            }
        }
        options.custom.extend(installed_converters().iter().cloned());
        options.hoist();
        options.seal();
        options
    }

    fn inherit(&self) -> Self {
        Options {
            banned: BTreeSet::new(),
            white_list: BTreeSet::new(),
            alias: BTreeMap::new(),
            nested: BTreeMap::new(),
            fingerprint: Arc::from(""),
            ..self.clone()
        }
    }

    fn nested_entry(&mut self, field: &str) -> &mut Options {
        let child = if self.nested.contains_key(field) {
            None
        } else {
            Some(self.inherit())
        };
        self.nested
            .entry(field.to_string())
            .or_insert_with(|| child.unwrap_or_default())
    }

    /// Moves dotted field names into the nested options of their first segment.
    fn hoist(&mut self) {
        let banned: Vec<(String, String)> = self.banned.iter().filter_map(|s| split(s)).collect();
        for (first, rest) in banned {
            self.nested_entry(&first).banned.insert(rest);
        }

        let allowed: Vec<(String, String)> =
            self.white_list.iter().filter_map(|s| split(s)).collect();
        for (first, rest) in allowed {
            self.white_list.insert(first.clone());
            self.nested_entry(&first).white_list.insert(rest);
        }

        let aliases: Vec<(String, String, String)> = self
            .alias
            .iter()
            .filter_map(|(from, to)| split(from).map(|(first, rest)| (first, rest, to.clone())))
            .collect();
        for (first, rest, to) in aliases {
            self.nested_entry(&first).alias.insert(rest, to);
        }

        for child in self.nested.values_mut() {
            child.hoist();
        }
    }

    /// Computes the fingerprints of this level and every nested level.
    fn seal(&mut self) {
        for child in self.nested.values_mut() {
            child.seal();
        }
        let mut keys: Vec<String> = self.custom.iter().map(|c| c.key()).collect();
        keys.sort();
        let body = serde_json::to_string(&*self).unwrap_or_default();
        self.fingerprint = Arc::from(format!("{body}{}", keys.join(";")));
    }

    /// Returns a copy carrying a per-field time format.
    pub(crate) fn with_field_format(&self, format: &str) -> Options {
        let mut options = self.clone();
        options.field_format = Some(format.to_string());
        options.seal();
        options
    }

    /// The deterministic identity of these options.
    pub fn fingerprint(&self) -> &Arc<str> {
        &self.fingerprint
    }

    /// Nested options of a field, when any dotted entry named it.
    pub fn nested(&self, field: &str) -> Option<&Options> {
        self.nested.get(field)
    }

    /// Returns `true` when the field name is banned.
    pub fn is_banned(&self, field: &str) -> bool {
        self.banned.contains(field)
    }

    /// Returns `true` when the field passes the allow-list (an empty list allows all).
    pub fn is_allowed(&self, field: &str) -> bool {
        self.white_list.is_empty() || self.white_list.contains(field)
    }

    /// The alias of a field name, if any.
    pub fn alias_of(&self, field: &str) -> Option<&str> {
        self.alias.get(field).map(String::as_str)
    }

    /// Custom converters, per-call ones first.
    pub fn custom(&self) -> &[Arc<dyn CustomConverter>] {
        &self.custom
    }

    /// The format a time conversion uses, given the time type's own default.
    pub fn time_format_for(&self, wrapper_default: Option<&'static str>) -> &str {
        self.time_format
            .as_deref()
            .or(self.field_format.as_deref())
            .or(wrapper_default)
            .unwrap_or(&self.default_time_format)
    }

    /// The minimum timestamp applying to a scene, if any.
    pub fn min_unix_for(&self, scene: MinUnixScene) -> Option<i64> {
        if self.min_unix_scene.contains(scene) {
            self.min_unix
        } else {
            None
        }
    }

    pub(crate) fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub(crate) fn priority_tag_name(&self) -> &str {
        &self.priority_tag_name
    }

    pub(crate) fn ignore_private_fields(&self) -> bool {
        self.ignore_private_fields
    }

    pub(crate) fn include_private_fields(&self) -> bool {
        self.include_private_fields
    }

    pub(crate) fn ignore_empty_fields(&self) -> bool {
        self.ignore_empty_fields
    }

    pub(crate) fn ignore_tag(&self) -> bool {
        self.ignore_tag
    }

    pub(crate) fn ignore_func(&self) -> bool {
        self.ignore_func
    }

    pub(crate) fn use_strings(&self) -> bool {
        self.use_strings
    }

    pub(crate) fn use_marshal(&self) -> bool {
        self.use_marshal
    }

    pub(crate) fn str_bytes_zero_copy(&self) -> bool {
        self.str_bytes_zero_copy
    }

    pub(crate) fn serialize_to_string(&self) -> bool {
        self.serialize_to_string
    }

    pub(crate) fn nil_value_policy(&self) -> NilValuePolicy {
        self.nil_value_policy
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::build(0, &[])
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

fn split(name: &str) -> Option<(String, String)> {
    name.split_once('.')
        .map(|(first, rest)| (first.to_string(), rest.to_string()))
}

enum OptionKind {
    Apply(Arc<dyn Fn(&mut Options) + Send + Sync>),
    Phase(Vec<ConvOption>),
}

/// One option mutator passed to a conversion call.
#[derive(Clone)]
pub struct ConvOption(Arc<OptionKind>);

impl ConvOption {
    fn new(apply: impl Fn(&mut Options) + Send + Sync + 'static) -> Self {
        ConvOption(Arc::new(OptionKind::Apply(Arc::new(apply))))
    }

    fn apply_all(&self, options: &mut Options) {
        match &*self.0 {
            OptionKind::Apply(apply) => apply(options),
            OptionKind::Phase(inner) => {
                for opt in inner {
                    opt.apply_all(options);
                }
            }
        }
    }
}

impl fmt::Debug for ConvOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            OptionKind::Apply(_) => f.write_str("ConvOption"),
            OptionKind::Phase(inner) => f.debug_tuple("Phase").field(inner).finish(),
        }
    }
}

fn names<I, S>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fields.into_iter().map(Into::into).collect()
}

/// Restricts conversion to the named source fields. Use `a.b` for nested fields.
pub fn white_list<I, S>(fields: I) -> ConvOption
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let fields = names(fields);
    ConvOption::new(move |o| o.white_list.extend(fields.iter().cloned()))
}

/// Excludes the named destination fields. Applied before aliases.
pub fn banned<I, S>(fields: I) -> ConvOption
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let fields = names(fields);
    ConvOption::new(move |o| o.banned.extend(fields.iter().cloned()))
}

/// Renames a destination field (or a map key) for matching. Applied after bans.
pub fn alias(field: impl Into<String>, alias: impl Into<String>) -> ConvOption {
    let (field, alias) = (field.into(), alias.into());
    ConvOption::new(move |o| {
        o.alias.insert(field.clone(), alias.clone());
    })
}

/// Adds several aliases at once.
pub fn alias_map<I, K, V>(aliases: I) -> ConvOption
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let aliases: Vec<(String, String)> = aliases
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    ConvOption::new(move |o| o.alias.extend(aliases.iter().cloned()))
}

/// Format for time and string conversions, a `chrono` strftime string.
pub fn time_format(format: impl Into<String>) -> ConvOption {
    let format = format.into();
    ConvOption::new(move |o| o.time_format = Some(format.clone()))
}

/// Minimum Unix timestamp for time and string conversions in both directions.
pub fn min_unix(unix: i64) -> ConvOption {
    min_unix_by(unix, MinUnixScene::default())
}

/// Minimum Unix timestamp for the selected conversions.
pub fn min_unix_by(unix: i64, scene: MinUnixScene) -> ConvOption {
    ConvOption::new(move |o| {
        o.min_unix = Some(unix);
        o.min_unix_scene = scene;
    })
}

/// Minimum timestamp taken from a date-time value, with the default scenes.
pub fn min_unix_at<Tz: chrono::TimeZone>(time: &chrono::DateTime<Tz>) -> ConvOption {
    min_unix(time.timestamp())
}

/// Fallback tag naming structure fields.
pub fn tag_name(name: impl Into<String>) -> ConvOption {
    let name = name.into();
    ConvOption::new(move |o| o.tag_name = name.clone())
}

/// Priority tag naming structure fields.
pub fn priority_tag_name(name: impl Into<String>) -> ConvOption {
    let name = name.into();
    ConvOption::new(move |o| o.priority_tag_name = name.clone())
}

/// Skips private fields in structure-to-structure conversions.
pub fn ignore_private_fields() -> ConvOption {
    ConvOption::new(|o| o.ignore_private_fields = true)
}

/// Includes private fields in structure-to-map conversions.
pub fn include_private_fields() -> ConvOption {
    ConvOption::new(|o| o.include_private_fields = true)
}

/// Skips zero-valued fields in structure-to-map conversions.
pub fn ignore_empty_fields() -> ConvOption {
    ConvOption::new(|o| o.ignore_empty_fields = true)
}

/// Ignores field tags and matches by identifier.
pub fn ignore_tag() -> ConvOption {
    ConvOption::new(|o| o.ignore_tag = true)
}

/// Ignores accessor fields and methods.
pub fn ignore_func() -> ConvOption {
    ConvOption::new(|o| o.ignore_func = true)
}

/// Uses a type's `Display` capability for conversions to `String`.
pub fn use_strings() -> ConvOption {
    ConvOption::new(|o| o.use_strings = true)
}

/// Uses a type's JSON marshal capability for conversions to `String`.
pub fn use_marshal() -> ConvOption {
    ConvOption::new(|o| o.use_marshal = true)
}

/// Chooses between buffer reuse (`true`, the default) and fresh allocation for
/// string and byte/char vector conversions.
pub fn str_bytes_zero_copy(zero_copy: bool) -> ConvOption {
    ConvOption::new(move |o| o.str_bytes_zero_copy = zero_copy)
}

/// Encodes any source as JSON when the destination is a `String`.
pub fn serialize_to_string() -> ConvOption {
    ConvOption::new(|o| o.serialize_to_string = true)
}

/// Sets the nil-value policy.
pub fn nil_value_policy(policy: NilValuePolicy) -> ConvOption {
    ConvOption::new(move |o| o.nil_value_policy = policy)
}

/// Registers a custom converter, consulted before any built-in rule.
pub fn custom_converter(converter: impl CustomConverter + 'static) -> ConvOption {
    let converter: Arc<dyn CustomConverter> = Arc::new(converter);
    ConvOption::new(move |o| o.custom.push(Arc::clone(&converter)))
}

/// Registers an already shared custom converter.
pub fn custom_converter_arc(converter: Arc<dyn CustomConverter>) -> ConvOption {
    ConvOption::new(move |o| o.custom.push(Arc::clone(&converter)))
}

/// Adds the prebuilt adapters of [`crate::extend`] to this call.
pub fn builtin_adapters() -> ConvOption {
    ConvOption::new(|o| o.custom.extend(crate::extend::default_adapters()))
}

/// Groups options that apply to one phase of a two-phase conversion.
///
/// The first group applies to the first phase, the second group to the second.
/// Options outside any group apply to both; single-phase conversions apply every
/// group.
pub fn phase(opts: impl IntoIterator<Item = ConvOption>) -> ConvOption {
    ConvOption(Arc::new(OptionKind::Phase(opts.into_iter().collect())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hoist_nested_fields() {
        let opts = Options::build(
            0,
            &[
                banned(["inner.secret", "top"]),
                white_list(["inner.name"]),
                alias("inner.name", "title"),
                ignore_empty_fields(),
            ],
        );
        assert!(opts.is_banned("top"));
        assert!(opts.is_allowed("inner"));
        let inner = opts.nested("inner").unwrap();
        assert!(inner.is_banned("secret"));
        assert!(inner.is_allowed("name"));
        assert!(!inner.is_allowed("other"));
        assert_eq!(inner.alias_of("name"), Some("title"));
        assert!(inner.ignore_empty_fields());
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = Options::build(0, &[banned(["b", "a"]), use_strings()]);
        let b = Options::build(0, &[use_strings(), banned(["a", "b"])]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        let c = Options::build(0, &[banned(["a"])]);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_phase_groups() {
        let opts = [
            use_strings(),
            phase([banned(["x"])]),
            phase([banned(["y"])]),
        ];
        let first = Options::build(1, &opts);
        assert!(first.use_strings());
        assert!(first.is_banned("x"));
        assert!(!first.is_banned("y"));

        let second = Options::build(2, &opts);
        assert!(second.use_strings());
        assert!(second.is_banned("y"));
        assert!(!second.is_banned("x"));

        let all = Options::build(0, &opts);
        assert!(all.is_banned("x") && all.is_banned("y"));
    }

    #[test]
    fn test_time_format_priority() {
        let plain = Options::build(0, &[]);
        assert_eq!(plain.time_format_for(None), settings::DEFAULT_TIME_FORMAT);
        assert_eq!(plain.time_format_for(Some("%Y")), "%Y");
        let field = plain.with_field_format("%m");
        assert_eq!(field.time_format_for(Some("%Y")), "%m");
        let call = Options::build(0, &[time_format("%d")]).with_field_format("%m");
        assert_eq!(call.time_format_for(Some("%Y")), "%d");
    }

    #[test]
    fn test_min_unix_scene() {
        let opts = Options::build(0, &[min_unix(100)]);
        assert_eq!(opts.min_unix_for(MinUnixScene::TIME_STRING), Some(100));
        assert_eq!(opts.min_unix_for(MinUnixScene::TIME_ANY), None);
        let opts = Options::build(0, &[min_unix_by(5, MinUnixScene::TIME_ANY)]);
        assert_eq!(opts.min_unix_for(MinUnixScene::TIME_ANY), Some(5));
        assert_eq!(opts.min_unix_for(MinUnixScene::STRING_TIME), None);
    }
}
