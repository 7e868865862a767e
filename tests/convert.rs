use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeZone, Utc};
use conv::prelude::*;

#[derive(Reflect, Default, Clone)]
pub struct User {
    pub name: String,
    pub age: isize,
    pub tag: Option<String>,
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
pub struct UserView {
    pub name: String,
    pub age: i32,
    pub tag: Option<String>,
}

#[derive(Reflect, Default, Clone)]
pub struct Address {
    pub city: String,
    pub zip: String,
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
pub struct AddressView {
    pub city: String,
    pub zip: String,
}

#[derive(Reflect, Default, Clone)]
pub struct Customer {
    #[tag(json = "customer_id,omitempty")]
    pub id: u64,
    pub email: String,
    pub address: Address,
    pub scores: Vec<i32>,
    pub created: DateTime<Utc>,
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
pub struct CustomerRow {
    pub customer_id: String,
    pub email: String,
    pub mail: String,
    pub address: AddressView,
    pub scores: Vec<f64>,
    pub created: String,
}

#[derive(Reflect, Default, Clone)]
pub struct Node {
    pub value: i64,
    pub next: Option<Box<Node>>,
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
pub struct NodeView {
    pub value: String,
    pub next: Option<Box<NodeView>>,
}

fn customer() -> Customer {
    Customer {
        id: 42,
        email: "ada@example.com".into(),
        address: Address {
            city: "Oslo".into(),
            zip: "0150".into(),
        },
        scores: vec![1, 2, 3],
        created: Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap(),
    }
}

#[test]
fn test_user_view() {
    let user = User {
        name: "ada".into(),
        age: 36,
        tag: None,
    };
    let view: UserView = convert(&user, &[]).unwrap();
    assert_eq!(
        view,
        UserView {
            name: "ada".into(),
            age: 36,
            tag: None
        }
    );
}

#[test]
fn test_customer_row() {
    let row: CustomerRow = convert(&customer(), &[]).unwrap();
    assert_eq!(row.customer_id, "42");
    assert_eq!(row.email, "ada@example.com");
    assert_eq!(row.mail, "");
    assert_eq!(row.address.city, "Oslo");
    assert_eq!(row.scores, vec![1.0, 2.0, 3.0]);
    assert_eq!(row.created, "2024-03-04 05:06:07");
}

#[test]
fn test_banned_white_list_and_alias() {
    let row: CustomerRow = convert(&customer(), &[options::banned(["email"])]).unwrap();
    assert_eq!(row.email, "");
    assert_eq!(row.customer_id, "42");

    let row: CustomerRow = convert(&customer(), &[options::white_list(["email"])]).unwrap();
    assert_eq!(row.email, "ada@example.com");
    assert_eq!(row.customer_id, "");
    assert!(row.scores.is_empty());

    let row: CustomerRow = convert(&customer(), &[options::alias("mail", "email")]).unwrap();
    assert_eq!(row.mail, "ada@example.com");
}

#[test]
fn test_nested_filters_apply_inside_member() {
    let row: CustomerRow = convert(&customer(), &[options::banned(["address.zip"])]).unwrap();
    assert_eq!(row.address.city, "Oslo");
    assert_eq!(row.address.zip, "");
    assert_eq!(row.email, "ada@example.com");

    let row: CustomerRow = convert(&customer(), &[options::white_list(["address.city"])]).unwrap();
    assert_eq!(row.address, AddressView { city: "Oslo".into(), zip: String::new() });
    assert_eq!(row.email, "");
}

#[test]
fn test_struct_to_map() {
    let map: HashMap<String, Dynamic> = convert(&customer(), &[]).unwrap();
    assert_eq!(map["customer_id"].downcast_ref::<u64>(), Some(&42));
    assert!(map.contains_key("address"));

    let map: BTreeMap<String, String> = convert(
        &customer(),
        &[options::alias("email", "contact"), options::banned(["scores"])],
    )
    .unwrap();
    assert_eq!(map["contact"], "ada@example.com");
    assert!(!map.contains_key("email"));
    assert!(!map.contains_key("scores"));
}

#[test]
fn test_self_referential_chain() {
    let list = Node {
        value: 1,
        next: Some(Box::new(Node {
            value: 2,
            next: None,
        })),
    };
    let view: NodeView = convert(&list, &[]).unwrap();
    assert_eq!(view.value, "1");
    let next = view.next.as_deref().unwrap();
    assert_eq!(next.value, "2");
    assert!(next.next.is_none());
}

#[test]
fn test_scalar_properties() {
    assert_eq!(convert::<u8, i32>(&300, &[]).unwrap(), 44);
    assert_eq!(convert::<i64, String>(&"12".to_string(), &[]).unwrap(), 12);

    let mut n = 5i64;
    convert_to(&true, &mut n, &[]).unwrap();
    assert_eq!(n, 1);
    let mut n = 5i64;
    convert_to(&false, &mut n, &[]).unwrap();
    assert_eq!(n, 5);

    let mut n = 8i32;
    convert_to(&"not a number".to_string(), &mut n, &[]).unwrap();
    assert_eq!(n, 0);

    let mut n = 9u8;
    convert_to(&"300".to_string(), &mut n, &[]).unwrap();
    assert_eq!(n, 255);

    let mut flag = true;
    convert_to(&"yes".to_string(), &mut flag, &[]).unwrap();
    assert!(!flag);
}

#[test]
fn test_string_bytes_round_trip() {
    let text = "h\u{e9}llo".to_string();
    let bytes: Vec<u8> = convert(&text, &[]).unwrap();
    assert_eq!(bytes, text.as_bytes());
    let back: String = convert(&bytes, &[]).unwrap();
    assert_eq!(back, text);

    let bytes: Vec<u8> = convert(&text, &[options::str_bytes_zero_copy(false)]).unwrap();
    let back: String = convert(&bytes, &[options::str_bytes_zero_copy(false)]).unwrap();
    assert_eq!(back, text);
}

#[test]
fn test_map_to_struct_is_unsupported() {
    let src: HashMap<String, Dynamic> = HashMap::from([("name".to_string(), Dynamic::new("ada".to_string()))]);
    let err = convert::<UserView, HashMap<String, Dynamic>>(&src, &[]).unwrap_err();
    assert!(matches!(err, Error::Unsupported { .. }));
}

#[test]
fn test_map_result_is_fresh() {
    let mut dst: HashMap<String, i32> = HashMap::from([("old".to_string(), 1)]);
    let src: HashMap<String, i64> = HashMap::from([("new".to_string(), 2)]);
    convert_to(&src, &mut dst, &[]).unwrap();
    assert_eq!(dst.len(), 1);
    assert_eq!(dst["new"], 2);
}

#[test]
fn test_pointer_layers() {
    let out: Option<Box<i32>> = convert(&7i64, &[]).unwrap();
    assert_eq!(out.as_deref(), Some(&7));

    let out: u8 = convert(&Some(Box::new(9i32)), &[]).unwrap();
    assert_eq!(out, 9);
}

#[test]
fn test_time_floor_per_scene() {
    let floor = customer().created.timestamp() + 1;

    let mut row = CustomerRow {
        created: "kept".into(),
        ..CustomerRow::default()
    };
    convert_to(&customer(), &mut row, &[options::min_unix(floor)]).unwrap();
    assert_eq!(row.created, "kept");

    let mut row = CustomerRow::default();
    convert_to(
        &customer(),
        &mut row,
        &[options::min_unix_by(floor, MinUnixScene::STRING_TIME)],
    )
    .unwrap();
    assert_eq!(row.created, "2024-03-04 05:06:07");
}

#[test]
fn test_unsupported_pair() {
    let err = convert::<Vec<i32>, bool>(&true, &[]).unwrap_err();
    assert!(matches!(err, Error::Unsupported { src: "bool", .. }));
    assert!(err.to_string().contains("can't convert"));
}

#[test]
fn test_prebuilt_converter_reuse() {
    let converter = new_converter::<UserView, User>(&[]).unwrap();
    assert_eq!(converter, new_converter::<UserView, User>(&[]).unwrap());

    let mut view = UserView::default();
    for age in 0..3 {
        let user = User {
            name: "n".into(),
            age,
            tag: Some("t".into()),
        };
        converter.convert(&mut view, &user).unwrap();
        assert_eq!(view.age, age as i32);
    }
    assert_eq!(view.tag.as_deref(), Some("t"));
}
