use super::{validate, Config, ConfigType, SchemaEntry};
use crate::node::StrNode;
use crate::ErrorKind;

static CHILD_SUBSCHEMA: &[SchemaEntry] = &[SchemaEntry::elem("A child node.", ConfigType::Node)];

static TEST_SCHEMA: &[SchemaEntry] = &[
    SchemaEntry::keyed("name", "A label.", ConfigType::String),
    SchemaEntry::keyed("min", "Lower bound.", ConfigType::I64),
    SchemaEntry::keyed("limit", "Upper bound.", ConfigType::U64),
    SchemaEntry::keyed("enabled", "Switch.", ConfigType::Bool),
    SchemaEntry::keyed_sub(
        "children",
        "Child nodes.",
        ConfigType::List,
        CHILD_SUBSCHEMA,
    ),
];

#[test]
fn accepts_known_keys() {
    let mut cfg = Config::dict();
    cfg.dict_set("name", Config::String("x".into())).unwrap();
    cfg.dict_set("min", Config::I64(-5)).unwrap();
    cfg.dict_set("enabled", Config::Bool(true)).unwrap();
    validate(TEST_SCHEMA, &cfg).unwrap();

    // absent keys are fine, requiredness is the kind's concern
    validate(TEST_SCHEMA, &Config::dict()).unwrap();
}

#[test]
fn rejects_unknown_key() {
    let mut cfg = Config::dict();
    cfg.dict_set("nam", Config::String("x".into())).unwrap();
    let err = validate(TEST_SCHEMA, &cfg).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn rejects_wrong_type() {
    let mut cfg = Config::dict();
    cfg.dict_set("min", Config::U64(5)).unwrap();
    assert!(validate(TEST_SCHEMA, &cfg).is_err());

    let mut cfg = Config::dict();
    cfg.dict_set("children", Config::Node(StrNode::new("c", "x").unwrap()))
        .unwrap();
    assert!(validate(TEST_SCHEMA, &cfg).is_err());
}

#[test]
fn validates_list_elements() {
    let mut children = Config::list();
    children
        .list_add(Config::Node(StrNode::new("c", "x").unwrap()))
        .unwrap();
    let mut cfg = Config::dict();
    cfg.dict_set("children", children).unwrap();
    validate(TEST_SCHEMA, &cfg).unwrap();

    let mut children = Config::list();
    children.list_add(Config::I64(1)).unwrap();
    let mut cfg = Config::dict();
    cfg.dict_set("children", children).unwrap();
    assert!(validate(TEST_SCHEMA, &cfg).is_err());
}

#[test]
fn top_level_must_be_dict() {
    assert!(validate(TEST_SCHEMA, &Config::I64(3)).is_err());
}

#[test]
fn deep_equality() {
    let node = StrNode::new("c", "x").unwrap();

    let mut a = Config::dict();
    a.dict_set("name", Config::String("x".into())).unwrap();
    a.dict_set("child", Config::Node(node.clone())).unwrap();

    let mut b = Config::dict();
    b.dict_set("name", Config::String("x".into())).unwrap();
    b.dict_set("child", Config::Node(node.clone())).unwrap();
    assert_eq!(a, b);

    // same literal but a different node identity
    let mut c = Config::dict();
    c.dict_set("name", Config::String("x".into())).unwrap();
    c.dict_set("child", Config::Node(StrNode::new("c", "x").unwrap()))
        .unwrap();
    assert_ne!(a, c);
}

#[test]
fn dup_shares_nodes() {
    let node = StrNode::new("c", "x").unwrap();
    let cfg = Config::Node(node.clone());
    let copy = cfg.clone();
    match (&cfg, &copy) {
        (Config::Node(a), Config::Node(b)) => assert!(std::rc::Rc::ptr_eq(a, b)),
        _ => unreachable!(),
    }
}
