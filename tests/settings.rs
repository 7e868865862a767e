//! Process-wide settings. Kept in its own test binary with a single test so that
//! changing the defaults cannot race other conversions.

use chrono::{TimeZone, Utc};
use conv::prelude::*;
use conv::settings;

#[derive(Reflect, Default, Clone)]
pub struct Row {
    #[tag(db = "row_id", json = "id")]
    pub key: i64,
    pub stamp: chrono::DateTime<Utc>,
    pub child: Option<Box<Child>>,
}

#[derive(Reflect, Default, Clone)]
pub struct Child {
    pub n: i32,
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
pub struct ChildView {
    pub n: String,
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
pub struct RowView {
    pub id: i64,
    pub row_id: i64,
    pub stamp: String,
    pub child: ChildView,
}

#[test]
fn test_settings_apply_to_later_conversions() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let row = Row {
        key: 5,
        stamp: Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap(),
        child: None,
    };

    let view: RowView = convert(&row, &[]).unwrap();
    assert_eq!(view.id, 5);
    assert_eq!(view.row_id, 0);
    assert_eq!(view.stamp, "2020-01-02 03:04:05");
    assert_eq!(view.child, ChildView { n: "0".into() });

    settings::set_priority_tag_name("db");
    let view: RowView = convert(&row, &[]).unwrap();
    assert_eq!(view.id, 0);
    assert_eq!(view.row_id, 5);

    settings::set_time_format("%Y/%m/%d");
    let view: RowView = convert(&row, &[]).unwrap();
    assert_eq!(view.stamp, "2020/01/02");
    let view: RowView = convert(&row, &[options::time_format("%H:%M")]).unwrap();
    assert_eq!(view.stamp, "03:04");

    settings::set_min_unix_by(&Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap());
    let view: RowView = convert(&row, &[]).unwrap();
    assert_eq!(view.stamp, "");
    settings::set_min_unix_scene(MinUnixScene::STRING_TIME);
    let view: RowView = convert(&row, &[]).unwrap();
    assert_eq!(view.stamp, "2020/01/02");

    settings::set_nil_value_policy(NilValuePolicy::Ignore);
    let mut view = RowView {
        child: ChildView { n: "kept".into() },
        ..RowView::default()
    };
    convert_to(&row, &mut view, &[]).unwrap();
    assert_eq!(view.child.n, "kept");
}
