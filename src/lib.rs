//! cligram is a library to build **interactive command-line interfaces**: the
//! caller assembles, at runtime, a directed graph of grammar nodes that
//! jointly describe a command language, and the engine offers two operations
//! over that graph: [parse()] (decide whether an input matches the grammar
//! and explain how with a tree) and [complete()] (enumerate the possible
//! continuations of a partial input).
//!
//! # Design
//!
//! A grammar is not compiled from a separate description language; it is
//! built directly in Rust from node constructors, the way one would assemble
//! production utilities for a recursive descent parser. Terminal kinds such
//! as [StrNode], [ReNode] or [IntNode] match one token; combinators such as
//! [OrNode], [SeqNode], [SubsetNode] and [ManyNode] arrange children;
//! wrappers such as [OptionNode], [OnceNode] and [BypassNode] alter one
//! child's behavior. All recursive descent operates on a token vector
//! ([StrVec]); the [ShLexNode] wrapper bridges single-string input and
//! token-vector grammars with a shell-like tokenizer (quotes, escapes,
//! comments).
//!
//! Nodes are shared by reference counting ([NodeRef]); sub-graphs may be
//! aliased freely, and recursive grammars close their cycles through a
//! [BypassNode] back edge so that dropping the caller's handle reclaims the
//! whole component.
//!
//! Parsing never confuses "the grammar does not accept this" with a real
//! error: the former is [ParseResult::NoMatch], the latter a
//! [GrammarError].
//!
//! # Example
//!
//! ```
//! use cligram::node::{OrNode, ShLexNode, StrNode};
//! use cligram::{complete, parse, CompKind};
//!
//! let grammar = ShLexNode::new(
//!     "line",
//!     OrNode::new(
//!         "cmd",
//!         vec![
//!             StrNode::new("hello-cmd", "hello").unwrap(),
//!             StrNode::new("bye-cmd", "bye").unwrap(),
//!         ],
//!     )
//!     .unwrap(),
//! );
//!
//! // parse a full line
//! let tree = parse(&grammar, "hello").unwrap();
//! assert!(tree.matches());
//! assert!(!parse(&grammar, "nope").unwrap().matches());
//!
//! // complete a partial line
//! let comp = complete(&grammar, "he").unwrap();
//! let item = comp.iter(CompKind::Full).next().unwrap();
//! assert_eq!(item.value(), Some("hello"));
//! assert_eq!(item.completion(), Some("llo"));
//! ```

pub mod attrs;
pub mod complete;
pub mod config;
mod error;
pub mod node;
pub mod parse;
pub mod strvec;
pub mod util;

pub use attrs::{AttrValue, Attrs, ByteAttrs, Dict};
pub use complete::{
    complete, complete_child, complete_strvec, expand_strvec, CompGroup, CompItem, CompKind,
    CompMask, Completion,
};
pub use config::{Config, ConfigType, SchemaEntry};
pub use error::{ErrorKind, GrammarError};
pub use node::{
    find, register_node_kind, AnyNode, BypassNode, DynListFlags, DynListGet, DynListNode,
    EmptyNode, FileNode, IntNode, ManyNode, Node, NodeOps, NodeRef, NoneNode, OnceNode, OptionNode,
    OrNode, ReNode, SeqNode, ShLexNode, SpaceNode, StrNode, SubsetNode, UintNode, NO_ID,
};
pub use parse::{parse, parse_child, parse_strvec, ParseNode, ParseNodeRef, ParseResult};
pub use strvec::{sh_lex_str, LexFlags, StrVec, ATTR_END, ATTR_START};
pub use util::Log;
