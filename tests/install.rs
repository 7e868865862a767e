//! Process-wide converter installation. The registry accepts one installation per
//! process, so this binary holds a single test.

use std::sync::Arc;
use std::time::Duration;

use conv::extend::{self, DurationValue, ValueBox};
use conv::prelude::*;

#[derive(Reflect, Default, Clone)]
pub struct Job {
    pub name: String,
    pub timeout: Duration,
    pub retries: Option<ValueBox<u32>>,
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
pub struct JobMessage {
    pub name: String,
    pub timeout: DurationValue,
    pub retries: Option<u32>,
}

#[test]
fn test_install_once() {
    let shout: Arc<dyn CustomConverter> = Arc::new(TypedConverter::new(
        "shout",
        |dst: &mut String, src: &String| *dst = src.to_uppercase(),
    ));
    assert!(extend::install(vec![shout]));
    assert!(!extend::install(Vec::new()));

    let job = Job {
        name: "sync".into(),
        timeout: Duration::from_millis(1_500),
        retries: Some(ValueBox::new(3)),
    };
    let message: JobMessage = convert(&job, &[]).unwrap();
    assert_eq!(message.name, "SYNC");
    assert_eq!(
        message.timeout,
        DurationValue {
            seconds: 1,
            nanos: 500_000_000
        }
    );
    assert_eq!(message.retries, Some(3));
}
