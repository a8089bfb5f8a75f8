use super::{complete_values, parse_len};
use crate::complete::{complete_strvec, CompKind, CompMask};
use crate::node::{
    find, register_node_kind, set_file_ops, AnyNode, DirEntry, DynListFlags, DynListNode,
    EmptyNode, FileNode, FileOps, IntNode, Node, NodeOps, NodeRef, NoneNode, ReNode, SpaceNode,
    StrNode, UintNode, NO_ID,
};
use crate::strvec::StrVec;
use crate::ErrorKind;
use std::any::Any;
use std::rc::Rc;

#[test]
fn str_parse() {
    let node = StrNode::new(NO_ID, "foo").unwrap();
    assert_eq!(parse_len(&node, &["foo"]), Some(1));
    assert_eq!(parse_len(&node, &["foo", "bar"]), Some(1));
    assert_eq!(parse_len(&node, &["bar"]), None);
    assert_eq!(parse_len(&node, &[]), None);
}

#[test]
fn str_complete() {
    let node = StrNode::new(NO_ID, "foo").unwrap();
    assert_eq!(complete_values(&node, &[""]), vec!["foo"]);
    assert_eq!(complete_values(&node, &["f"]), vec!["foo"]);
    assert_eq!(complete_values(&node, &["foo"]), vec!["foo"]);
    assert!(complete_values(&node, &["fx"]).is_empty());
    assert!(complete_values(&node, &["foox"]).is_empty());
    // only a trailing token is completed
    assert!(complete_values(&node, &["foo", "bar"]).is_empty());

    let comp = complete_strvec(&node, &StrVec::from_array(&["fo"])).unwrap();
    let item = comp.iter(CompKind::Full).next().unwrap();
    assert_eq!(item.start(), Some("fo"));
    assert_eq!(item.completion(), Some("o"));
    assert_eq!(item.display(), Some("foo"));
}

#[test]
fn str_desc_and_reconfigure() {
    let node = StrNode::new("greeting", "hello").unwrap();
    assert_eq!(node.desc(), "hello");

    StrNode::set_str(&node, "bye").unwrap();
    assert_eq!(parse_len(&node, &["bye"]), Some(1));
    assert_eq!(parse_len(&node, &["hello"]), None);

    let other = EmptyNode::new(NO_ID);
    assert_eq!(
        StrNode::set_str(&other, "x").unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn re_parse_full_token() {
    let node = ReNode::new(NO_ID, "fo+").unwrap();
    assert_eq!(parse_len(&node, &["foo"]), Some(1));
    assert_eq!(parse_len(&node, &["fo"]), Some(1));
    // the whole token must match
    assert_eq!(parse_len(&node, &["fooz"]), None);
    assert_eq!(parse_len(&node, &["zfoo"]), None);
    assert_eq!(parse_len(&node, &[]), None);
}

#[test]
fn re_completes_unknown() {
    let node = ReNode::new(NO_ID, "[a-z]+").unwrap();
    let comp = complete_strvec(&node, &StrVec::from_array(&["ab"])).unwrap();
    assert_eq!(comp.count(CompKind::Unknown), 1);
    assert_eq!(comp.count(CompKind::Full), 0);
}

#[test]
fn re_keeps_previous_pattern_on_error() {
    let node = ReNode::new(NO_ID, "ab?").unwrap();
    let err = ReNode::set_pattern(&node, "a(").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    // the old pattern still applies
    assert_eq!(parse_len(&node, &["ab"]), Some(1));
    assert_eq!(parse_len(&node, &["ac"]), None);
}

#[test]
fn int_parse_and_value() {
    let node = IntNode::new(NO_ID, 0, 256, 0).unwrap();
    assert_eq!(parse_len(&node, &["0"]), Some(1));
    assert_eq!(parse_len(&node, &["256"]), Some(1));
    assert_eq!(parse_len(&node, &["0x100"]), Some(1));
    assert_eq!(parse_len(&node, &["-1"]), None);
    assert_eq!(parse_len(&node, &["0x101"]), None);
    assert_eq!(parse_len(&node, &[" 1"]), None);
    assert_eq!(parse_len(&node, &["1x"]), None);

    assert_eq!(IntNode::get_value(&node, "0x100").unwrap(), 256);
    assert!(IntNode::get_value(&node, "512").is_err());
}

#[test]
fn int_explicit_base() {
    let node = IntNode::new(NO_ID, -1, i64::MAX, 16).unwrap();
    assert_eq!(parse_len(&node, &["7fffffffffffffff"]), Some(1));
    assert_eq!(parse_len(&node, &["0x7fffffffffffffff"]), Some(1));
    assert_eq!(parse_len(&node, &["-1"]), Some(1));
    assert_eq!(parse_len(&node, &["-2"]), None);
    assert_eq!(IntNode::get_value(&node, "10").unwrap(), 16);
}

#[test]
fn uint_parse() {
    let node = UintNode::new(NO_ID, 1, 100, 10).unwrap();
    assert_eq!(parse_len(&node, &["100"]), Some(1));
    assert_eq!(parse_len(&node, &["0"]), None);
    assert_eq!(parse_len(&node, &["-1"]), None);
    assert_eq!(UintNode::get_value(&node, "42").unwrap(), 42);

    // kind mismatch is an error, not a no-match
    let int = IntNode::new(NO_ID, 0, 10, 10).unwrap();
    assert_eq!(
        UintNode::get_value(&int, "1").unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn any_parse() {
    let node = AnyNode::new(NO_ID, None).unwrap();
    assert_eq!(parse_len(&node, &["whatever"]), Some(1));
    assert_eq!(parse_len(&node, &[]), None);

    let comp = complete_strvec(&node, &StrVec::from_array(&["x"])).unwrap();
    assert_eq!(comp.count(CompMask::ALL), 1);
    assert_eq!(comp.count(CompKind::Unknown), 1);
}

#[test]
fn any_with_required_attr() {
    let node = AnyNode::new(NO_ID, Some("tagged")).unwrap();

    let mut vec = StrVec::new();
    vec.add("tok");
    assert_eq!(parse_len(&node, &["tok"]), None);

    let mut attrs = crate::attrs::Attrs::new();
    attrs.set_value("tagged", true);
    vec.set_attrs(0, attrs).unwrap();
    let tree = crate::parse::parse_strvec(&node, &vec).unwrap();
    assert!(tree.matches());
}

#[test]
fn empty_none_space() {
    let empty = EmptyNode::new(NO_ID);
    assert_eq!(parse_len(&empty, &["foo"]), Some(0));
    assert_eq!(parse_len(&empty, &[]), Some(0));

    let none = NoneNode::new(NO_ID);
    assert_eq!(parse_len(&none, &["foo"]), None);
    assert_eq!(parse_len(&none, &[]), None);

    let space = SpaceNode::new(NO_ID);
    assert_eq!(parse_len(&space, &[" \t "]), Some(1));
    assert_eq!(parse_len(&space, &["x "]), None);
    assert_eq!(parse_len(&space, &[""]), None);

    // neither empty nor none suggests anything
    let comp = complete_strvec(&empty, &StrVec::from_array(&[""])).unwrap();
    assert_eq!(comp.count(CompMask::ALL), 0);
    let comp = complete_strvec(&none, &StrVec::from_array(&[""])).unwrap();
    assert_eq!(comp.count(CompMask::ALL), 0);
}

fn color_list() -> crate::node::DynListGet {
    Rc::new(|_state| Ok(StrVec::from_array(&["red", "green", "blue"])))
}

#[test]
fn dynlist_match_list() {
    let node = DynListNode::new(
        NO_ID,
        color_list(),
        None,
        DynListFlags {
            match_list: true,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(parse_len(&node, &["red"]), Some(1));
    assert_eq!(parse_len(&node, &["yellow"]), None);

    let comp = complete_strvec(&node, &StrVec::from_array(&[""])).unwrap();
    // the unknown item comes first: other values may be accepted
    assert_eq!(comp.count(CompKind::Unknown), 1);
    assert_eq!(complete_values(&node, &[""]), vec!["red", "green", "blue"]);
    assert_eq!(complete_values(&node, &["gr"]), vec!["green"]);
}

#[test]
fn dynlist_match_regexp() {
    let node = DynListNode::new(
        NO_ID,
        color_list(),
        Some("[a-z]+"),
        DynListFlags {
            match_regexp: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(parse_len(&node, &["anything"]), Some(1));
    assert_eq!(parse_len(&node, &["UPPER"]), None);
    // no list match requested: nothing but the unknown item
    assert!(complete_values(&node, &["r"]).is_empty());
}

#[test]
fn dynlist_exclude_list() {
    let node = DynListNode::new(
        NO_ID,
        color_list(),
        Some("[a-z]+"),
        DynListFlags {
            match_regexp: true,
            exclude_list: true,
            ..Default::default()
        },
    )
    .unwrap();
    // in the list: refused even though the pattern matches
    assert_eq!(parse_len(&node, &["red"]), None);
    assert_eq!(parse_len(&node, &["cyan"]), Some(1));
}

#[test]
fn dynlist_needs_pattern_with_regexp_flag() {
    let err = DynListNode::new(
        NO_ID,
        color_list(),
        None,
        DynListFlags {
            match_regexp: true,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

struct FakeFs;

impl FileOps for FakeFs {
    fn is_dir(&self, path: &str) -> std::io::Result<bool> {
        match path {
            "." | "/" | "/dir1/" | "/dir1/subdir/" => Ok(true),
            "/file5" => Ok(false),
            _ => Err(std::io::Error::new(std::io::ErrorKind::NotFound, path)),
        }
    }

    fn read_dir(&self, path: &str) -> std::io::Result<Vec<DirEntry>> {
        let listing: &[(&str, bool)] = match path {
            "/" => &[
                ("dir1", true),
                ("dir2", true),
                ("file5", false),
                (".hidden", false),
            ],
            "/dir1/" => &[("file1", false), ("file2", false), ("subdir", true)],
            _ => return Err(std::io::Error::new(std::io::ErrorKind::NotFound, path)),
        };
        Ok(listing
            .iter()
            .map(|(name, is_dir)| DirEntry {
                name: name.to_string(),
                is_dir: *is_dir,
            })
            .collect())
    }
}

#[test]
fn file_completion() {
    set_file_ops(Rc::new(FakeFs));
    let node = FileNode::new(NO_ID);

    assert_eq!(parse_len(&node, &["/anything"]), Some(1));

    let comp = complete_strvec(&node, &StrVec::from_array(&["/d"])).unwrap();
    let values: Vec<_> = comp
        .iter(CompMask::ALL)
        .filter_map(|item| item.value())
        .collect();
    assert_eq!(values, vec!["/dir1/", "/dir2/"]);
    // directories complete partially, with a display of their own
    let first = comp.iter(CompKind::Partial).next().unwrap();
    assert_eq!(first.display(), Some("dir1/"));
    assert_eq!(first.completion(), Some("ir1/"));

    let values = complete_values(&node, &["/f"]);
    assert_eq!(values, vec!["/file5"]);

    // hidden entries only when asked for
    let comp = complete_strvec(&node, &StrVec::from_array(&["/"])).unwrap();
    assert_eq!(comp.count(CompMask::ALL), 3);
    let comp = complete_strvec(&node, &StrVec::from_array(&["/."])).unwrap();
    let values: Vec<_> = comp
        .iter(CompMask::ALL)
        .filter_map(|item| item.value())
        .collect();
    assert_eq!(values, vec!["/.hidden"]);

    // inside a subdirectory
    let comp = complete_strvec(&node, &StrVec::from_array(&["/dir1/fi"])).unwrap();
    let values: Vec<_> = comp
        .iter(CompMask::ALL)
        .filter_map(|item| item.value())
        .collect();
    assert_eq!(values, vec!["/dir1/file1", "/dir1/file2"]);

    // a missing directory yields no completion, not an error
    let comp = complete_strvec(&node, &StrVec::from_array(&["/nosuch/x"])).unwrap();
    assert_eq!(comp.count(CompMask::ALL), 0);
}

#[test]
fn node_ids_and_find() {
    let foo = StrNode::new("foo-id", "foo").unwrap();
    let node = crate::node::OrNode::new("root-id", vec![foo.clone()]).unwrap();

    assert_eq!(node.id(), "root-id");
    assert_eq!(
        find(&node, "foo-id").map(|n| n.id()),
        Some("foo-id".to_string())
    );
    assert!(find(&node, "nope").is_none());

    let anon = EmptyNode::new(NO_ID);
    assert_eq!(anon.id(), "no-id");
}

#[test]
fn create_by_name() {
    let node = Node::from_name("str", "by-name").unwrap();
    StrNode::set_str(&node, "x").unwrap();
    assert_eq!(parse_len(&node, &["x"]), Some(1));

    assert_eq!(
        Node::from_name("nope", NO_ID).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

struct NoParseOps;

impl NodeOps for NoParseOps {
    fn type_name(&self) -> &'static str {
        "no-parse"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn custom_kind_registration() {
    register_node_kind("no-parse", || Box::new(NoParseOps)).unwrap();
    assert_eq!(
        register_node_kind("no-parse", || Box::new(NoParseOps))
            .unwrap_err()
            .kind(),
        ErrorKind::AlreadyExists
    );
    assert_eq!(
        register_node_kind("str", || Box::new(NoParseOps))
            .unwrap_err()
            .kind(),
        ErrorKind::AlreadyExists
    );

    // a kind without a parse implementation reports not-supported
    let node = Node::from_name("no-parse", NO_ID).unwrap();
    let err = crate::parse::parse_strvec(&node, &StrVec::from_array(&["x"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotSupported);

    // ...and completes to a single unknown item
    let comp = complete_strvec(&node, &StrVec::from_array(&["x"])).unwrap();
    assert_eq!(comp.count(CompKind::Unknown), 1);
}

fn noop_ops() -> Box<dyn NodeOps> {
    Box::new(NoParseOps)
}

#[test]
fn node_attrs_are_free_form() {
    let node: NodeRef = Node::with_ops(noop_ops(), NO_ID);
    node.attrs_mut().set_value("help", String::from("does nothing"));
    assert_eq!(
        node.attrs().get_as::<String, _>("help").map(String::as_str),
        Some("does nothing")
    );
}
