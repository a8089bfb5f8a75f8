use super::{complete_values, parse_len, parse_tokens};
use crate::complete::{complete, complete_strvec, CompKind, CompMask};
use crate::node::{
    BypassNode, IntNode, ManyNode, OnceNode, OptionNode, OrNode, SeqNode, ShLexNode, StrNode,
    NO_ID,
};
use crate::parse::parse;
use crate::strvec::StrVec;
use std::rc::Rc;

#[test]
fn many_parse_bounds() {
    let node = ManyNode::new(NO_ID, StrNode::new(NO_ID, "foo").unwrap(), 2, 4).unwrap();

    assert_eq!(parse_len(&node, &["foo", "foo", "foo"]), Some(3));
    assert_eq!(parse_len(&node, &["foo", "foo"]), Some(2));
    // below the minimum
    assert_eq!(parse_len(&node, &["foo"]), None);
    assert_eq!(parse_len(&node, &[]), None);
    // greed stops at the maximum
    assert_eq!(parse_len(&node, &["foo"; 6]), Some(4));
    // a failed repetition leaves no children behind
    let tree = parse_tokens(&node, &["foo", "bar"]);
    assert!(!tree.matches());
    assert!(tree.children().is_empty());
}

#[test]
fn many_unbounded() {
    let node = ManyNode::new(NO_ID, StrNode::new(NO_ID, "foo").unwrap(), 0, 0).unwrap();
    assert_eq!(parse_len(&node, &[]), Some(0));
    assert_eq!(parse_len(&node, &["bar"]), Some(0));
    assert_eq!(parse_len(&node, &["foo"; 10]), Some(10));
}

#[test]
fn many_zero_width_child_terminates() {
    // an optional child matches zero tokens forever; unbounded repetition
    // must still terminate, discarding the zero-width attempt
    let child = OptionNode::new(NO_ID, StrNode::new(NO_ID, "foo").unwrap()).unwrap();
    let node = ManyNode::new(NO_ID, child, 0, 0).unwrap();

    let tree = parse_tokens(&node, &["bar"]);
    assert!(tree.matches());
    assert_eq!(tree.len(), 0);
    assert!(tree.children().is_empty());

    assert_eq!(parse_len(&node, &["foo", "foo", "bar"]), Some(2));
}

#[test]
fn many_bounded_keeps_zero_width_children() {
    // with a maximum, zero-width matches count toward it
    let child = OptionNode::new(NO_ID, StrNode::new(NO_ID, "foo").unwrap()).unwrap();
    let node = ManyNode::new(NO_ID, child, 0, 3).unwrap();

    let tree = parse_tokens(&node, &["bar"]);
    assert!(tree.matches());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.children().len(), 3);
}

#[test]
fn many_complete() {
    let node = ManyNode::new(NO_ID, StrNode::new(NO_ID, "foo").unwrap(), 2, 4).unwrap();

    assert_eq!(complete_values(&node, &[""]), vec!["foo"]);
    assert_eq!(complete_values(&node, &["foo", ""]), vec!["foo"]);
    assert_eq!(
        complete_values(&node, &["foo", "foo", "foo", ""]),
        vec!["foo"]
    );
    // the maximum has been reached: no further repetition is offered
    assert!(complete_values(&node, &["foo", "foo", "foo", "foo", ""]).is_empty());
}

#[test]
fn option_never_fails() {
    let node = OptionNode::new(NO_ID, StrNode::new(NO_ID, "foo").unwrap()).unwrap();

    assert_eq!(parse_len(&node, &["foo"]), Some(1));
    assert_eq!(parse_len(&node, &["bar"]), Some(0));
    assert_eq!(parse_len(&node, &[]), Some(0));

    // completion is the child's
    assert_eq!(complete_values(&node, &["f"]), vec!["foo"]);
}

#[test]
fn once_refuses_a_second_match() {
    let a = StrNode::new("a", "a").unwrap();
    let node = ManyNode::new(
        NO_ID,
        OrNode::new(
            NO_ID,
            vec![
                OnceNode::new(NO_ID, a.clone()).unwrap(),
                StrNode::new("b", "b").unwrap(),
            ],
        )
        .unwrap(),
        0,
        0,
    )
    .unwrap();

    assert_eq!(parse_len(&node, &["a", "b", "b"]), Some(3));
    assert_eq!(parse_len(&node, &["b", "a", "b"]), Some(3));
    // the second "a" is refused
    assert_eq!(parse_len(&node, &["a", "a"]), Some(1));
    assert_eq!(parse_len(&node, &["b", "a", "a"]), Some(2));

    // no parse tree ever references the child twice
    let tree = parse_tokens(&node, &["a", "b", "a"]);
    let hits = tree
        .iter()
        .filter(|p| Rc::ptr_eq(p.node(), &a))
        .count();
    assert!(hits <= 1);
}

#[test]
fn once_complete_suppresses_done_branches() {
    let a = StrNode::new(NO_ID, "aa").unwrap();
    let node = ManyNode::new(
        NO_ID,
        OrNode::new(
            NO_ID,
            vec![
                OnceNode::new(NO_ID, a).unwrap(),
                StrNode::new(NO_ID, "ab").unwrap(),
            ],
        )
        .unwrap(),
        0,
        0,
    )
    .unwrap();

    let mut values = complete_values(&node, &["a"]);
    values.sort();
    assert_eq!(values, vec!["aa", "ab"]);

    // "aa" was consumed: only "ab" remains
    assert_eq!(complete_values(&node, &["aa", "a"]), vec!["ab"]);
}

#[test]
fn bypass_is_transparent() {
    let node = BypassNode::new(NO_ID, StrNode::new(NO_ID, "foo").unwrap()).unwrap();

    assert_eq!(parse_len(&node, &["foo"]), Some(1));
    assert_eq!(parse_len(&node, &["foo", "bar"]), Some(1));
    assert_eq!(parse_len(&node, &["bar"]), None);
    assert_eq!(parse_len(&node, &[]), None);

    assert_eq!(complete_values(&node, &[""]), vec!["foo"]);
    assert_eq!(complete_values(&node, &["f"]), vec!["foo"]);
    assert!(complete_values(&node, &["b"]).is_empty());
}

#[test]
fn sh_lex_parse() {
    let node = ShLexNode::new(
        NO_ID,
        SeqNode::new(
            NO_ID,
            vec![
                StrNode::new(NO_ID, "hello").unwrap(),
                OptionNode::new(NO_ID, IntNode::new(NO_ID, 0, 10, 10).unwrap()).unwrap(),
            ],
        )
        .unwrap(),
    );

    assert!(parse(&node, "hello").unwrap().matches());
    assert!(parse(&node, "  hello   3 ").unwrap().matches());
    assert!(parse(&node, "'hello' 3").unwrap().matches());
    assert!(!parse(&node, "goodbye").unwrap().matches());
    // trailing garbage makes the whole line a no-match
    assert!(!parse(&node, "hello 3 more").unwrap().matches());
    // an unterminated quote is an incomplete line, not an error
    assert!(!parse(&node, "'hello").unwrap().matches());
}

#[test]
fn sh_lex_complete() {
    let node = ShLexNode::new(
        NO_ID,
        OrNode::new(
            NO_ID,
            vec![
                StrNode::new(NO_ID, "hello").unwrap(),
                StrNode::new(NO_ID, "bye").unwrap(),
            ],
        )
        .unwrap(),
    );

    let comp = complete(&node, "he").unwrap();
    let item = comp.iter(CompKind::Full).next().unwrap();
    assert_eq!(item.value(), Some("hello"));
    assert_eq!(item.completion(), Some("llo"));

    // appending the completion to the line re-tokenizes to an accepted
    // vector
    let line = format!("he{}", item.completion().unwrap());
    assert!(parse(&node, &line).unwrap().matches());

    let comp = complete(&node, "x").unwrap();
    assert_eq!(comp.count(CompKind::Full), 0);
}

#[test]
fn sh_lex_completes_later_tokens() {
    let node = ShLexNode::new(
        NO_ID,
        SeqNode::new(
            NO_ID,
            vec![
                StrNode::new(NO_ID, "hello").unwrap(),
                StrNode::new(NO_ID, "world").unwrap(),
            ],
        )
        .unwrap(),
    );

    let comp = complete(&node, "hello w").unwrap();
    let item = comp.iter(CompKind::Full).next().unwrap();
    assert_eq!(item.value(), Some("world"));
    assert_eq!(item.completion(), Some("orld"));

    // after a full first token, the space opens the second slot
    let comp = complete(&node, "hello ").unwrap();
    let item = comp.iter(CompKind::Full).next().unwrap();
    assert_eq!(item.value(), Some("world"));
    assert_eq!(item.completion(), Some("world"));
}

#[test]
fn sh_lex_requotes_unterminated_input() {
    let node = ShLexNode::new(NO_ID, StrNode::new(NO_ID, "hello world").unwrap());

    let comp = complete(&node, "'hello w").unwrap();
    let item = comp.iter(CompKind::Full).next().unwrap();
    // the value is re-wrapped so the returned literal stays tokenizable
    assert_eq!(item.value(), Some("'hello world'"));
    assert_eq!(item.completion(), Some("orld'"));

    let line = format!("'hello w{}", item.completion().unwrap());
    assert!(parse(&node, &line).unwrap().matches());
}

#[test]
fn sh_lex_expand_widens_abbreviations() {
    let grammar = SeqNode::new(
        NO_ID,
        vec![
            StrNode::new(NO_ID, "hello").unwrap(),
            StrNode::new(NO_ID, "world").unwrap(),
        ],
    )
    .unwrap();

    let strict = ShLexNode::new(NO_ID, grammar.clone());
    assert!(!parse(&strict, "hel wor").unwrap().matches());

    let expand = ShLexNode::expand(NO_ID, grammar);
    assert!(parse(&expand, "hel wor").unwrap().matches());
    assert!(parse(&expand, "hello world").unwrap().matches());
    assert!(!parse(&expand, "x wor").unwrap().matches());
}

#[test]
fn sh_lex_expand_compensates_completions() {
    let or = OrNode::new(
        NO_ID,
        vec![
            StrNode::new(NO_ID, "hello").unwrap(),
            StrNode::new(NO_ID, "help").unwrap(),
        ],
    )
    .unwrap();
    let node = ShLexNode::expand(NO_ID, or);

    // "hel" is ambiguous: both completions stay reachable, and their
    // suffixes apply to the typed token, not to the expansion
    let comp = complete(&node, "hel").unwrap();
    let mut suffixes: Vec<_> = comp
        .iter(CompKind::Full)
        .filter_map(|item| item.completion().map(String::from))
        .collect();
    suffixes.sort();
    assert_eq!(suffixes, vec!["lo", "p"]);
}

#[test]
fn sh_lex_empty_line_completion() {
    let node = ShLexNode::new(NO_ID, StrNode::new(NO_ID, "foo").unwrap());

    let comp = complete(&node, "").unwrap();
    assert_eq!(comp.count(CompMask::ALL), 1);
    let item = comp.iter(CompKind::Full).next().unwrap();
    assert_eq!(item.completion(), Some("foo"));
}

#[test]
fn sh_lex_only_completes_single_token_vectors() {
    let node = ShLexNode::new(NO_ID, StrNode::new(NO_ID, "foo").unwrap());
    let comp = complete_strvec(&node, &StrVec::from_array(&["foo", "bar"])).unwrap();
    assert_eq!(comp.count(CompMask::ALL), 0);
}
