//! The generic grammar node and the built-in node kinds.
//!
//! A grammar is a directed graph of [Node] objects shared through
//! [NodeRef]. Each node pairs the generic envelope (id, attributes, applied
//! configuration, debug label) with a kind object implementing [NodeOps],
//! the way a production utility implements its own parsing rule. Kinds are
//! split into terminals (match tokens directly), non-terminals (combine
//! children) and wrappers (alter one child's behavior).

mod non_terminals;
mod terminals;
mod wrappers;


use crate::attrs::Attrs;
use crate::complete::{self, Completion};
use crate::config::{self, Config, SchemaEntry};
use crate::parse::ParseNodeRef;
use crate::strvec::StrVec;
use crate::util::Log;
use crate::{ErrorKind, GrammarError, ParseResult};
use once_cell::unsync::OnceCell;
use regex::Regex;
use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::fmt::Write;
use std::rc::{Rc, Weak};

pub use terminals::{set_file_ops, DirEntry, FileOps, OsFileOps};

/// The id of nodes whose creator did not pick one.
pub const NO_ID: &str = "no-id";

/// A shared handle on a grammar node. Cloning the handle shares the node;
/// dropping the last handle releases it and the children it owns.
pub type NodeRef = Rc<Node>;

/// The behavior and private state of a node kind.
///
/// Implement this trait and register a constructor with
/// [register_node_kind] to extend the engine with custom kinds. A kind
/// without a `parse` implementation reports
/// [NotSupported](ErrorKind::NotSupported); a kind without a `complete`
/// implementation falls back to a single *unknown* completion item.
pub trait NodeOps: Any {
    /// The registered kind name, e.g. `"str"` or `"seq"`.
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    /// The configuration schema, when the kind is configurable.
    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        None
    }

    /// Apply an already-validated configuration. Must leave the previous
    /// state untouched on failure.
    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        let _ = config;
        Ok(())
    }

    /// Try to match a prefix of `strvec`, growing the parse tree under
    /// `state` through [parse_child](crate::parse::parse_child).
    fn parse(
        &self,
        node: &NodeRef,
        state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        let _ = (node, state, strvec);
        Err(GrammarError::new(
            ErrorKind::NotSupported,
            format!("{} nodes cannot parse", self.type_name()),
        ))
    }

    /// Enumerate the continuations of `strvec`, either by emitting items
    /// directly or by delegating through
    /// [complete_child](crate::complete::complete_child).
    fn complete(
        &self,
        node: &NodeRef,
        comp: &mut Completion,
        strvec: &StrVec,
    ) -> Result<(), GrammarError> {
        complete::complete_unknown(node, comp, strvec)
    }

    /// A one-line description; `None` falls back to the kind name.
    fn desc(&self) -> Option<String> {
        None
    }

    /// The child nodes this kind holds strong references to.
    fn children(&self) -> Vec<NodeRef> {
        Vec::new()
    }
}

/// A grammar node: the generic envelope around a kind object.
pub struct Node {
    id: RefCell<String>,
    attrs: RefCell<Attrs>,
    config: RefCell<Option<Config>>,
    log: OnceCell<Log<&'static str>>,
    ops: Box<dyn NodeOps>,
}

impl Node {
    /// Wrap a kind object into a node. This is the "create by type
    /// pointer" entry; [Node::from_name] is the registry-driven one.
    pub fn with_ops(ops: Box<dyn NodeOps>, id: &str) -> NodeRef {
        Rc::new(Node {
            id: RefCell::new(id.to_string()),
            attrs: RefCell::new(Attrs::new()),
            config: RefCell::new(None),
            log: OnceCell::new(),
            ops,
        })
    }

    /// Instantiate a registered kind by name. The node comes back
    /// unconfigured.
    pub fn from_name(type_name: &str, id: &str) -> Result<NodeRef, GrammarError> {
        let ctor = with_registry(|reg| {
            reg.iter()
                .find(|(name, _)| *name == type_name)
                .map(|(_, ctor)| *ctor)
        })?
        .ok_or_else(|| {
            GrammarError::new(
                ErrorKind::NotFound,
                format!("no node kind named {:?}", type_name),
            )
        })?;
        Ok(Self::with_ops(ctor(), id))
    }

    pub fn id(&self) -> String {
        self.id.borrow().clone()
    }

    pub fn set_id(&self, id: &str) {
        *self.id.borrow_mut() = id.to_string();
    }

    pub fn type_name(&self) -> &'static str {
        self.ops.type_name()
    }

    /// Fail with [ErrorKind::InvalidArgument] unless the node has the given
    /// kind.
    pub fn check_type(&self, type_name: &str) -> Result<(), GrammarError> {
        if self.type_name() == type_name {
            Ok(())
        } else {
            Err(GrammarError::new(
                ErrorKind::InvalidArgument,
                format!(
                    "expected a {} node, got a {} node",
                    type_name,
                    self.type_name()
                ),
            ))
        }
    }

    /// A human-readable one-line description of the node.
    pub fn desc(&self) -> String {
        self.ops
            .desc()
            .unwrap_or_else(|| self.type_name().to_string())
    }

    pub fn attrs(&self) -> Ref<'_, Attrs> {
        self.attrs.borrow()
    }

    pub fn attrs_mut(&self) -> RefMut<'_, Attrs> {
        self.attrs.borrow_mut()
    }

    /// The currently applied configuration, if any.
    pub fn config(&self) -> Option<Config> {
        self.config.borrow().clone()
    }

    /// Validate `config` against the kind's schema, apply it, then record
    /// it. On any failure the node and its previous configuration are left
    /// intact.
    pub fn set_config(&self, config: Config) -> Result<(), GrammarError> {
        let schema = self.ops.schema().ok_or_else(|| {
            GrammarError::new(
                ErrorKind::NotSupported,
                format!("{} nodes are not configurable", self.type_name()),
            )
        })?;
        config::validate(schema, &config)?;
        self.ops.apply_config(&config)?;
        *self.config.borrow_mut() = Some(config);
        Ok(())
    }

    pub fn children(&self) -> Vec<NodeRef> {
        self.ops.children()
    }

    pub fn schema(&self) -> Option<&'static [SchemaEntry]> {
        self.ops.schema()
    }

    /// Attach a debug label. Printing happens in debug builds only.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Debug label {} is already set for this node.", err))
    }

    pub(crate) fn log(&self) -> Option<&Log<&'static str>> {
        self.log.get()
    }

    pub(crate) fn ops(&self) -> &dyn NodeOps {
        self.ops.as_ref()
    }

    /// Borrow the kind state, checking the kind name first.
    pub(crate) fn ops_as<T: 'static>(&self, type_name: &str) -> Result<&T, GrammarError> {
        self.check_type(type_name)?;
        self.ops.as_any().downcast_ref::<T>().ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "node kind state mismatch")
        })
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} type={} id={}", self.desc(), self.type_name(), self.id())
    }
}

/// Depth-first search for the first node whose id equals `id`. Safe on
/// cyclic graphs.
pub fn find(root: &NodeRef, id: &str) -> Option<NodeRef> {
    fn walk(node: &NodeRef, id: &str, seen: &mut HashSet<*const Node>) -> Option<NodeRef> {
        if !seen.insert(Rc::as_ptr(node)) {
            return None;
        }
        if node.id() == id {
            return Some(node.clone());
        }
        for child in node.children() {
            if let Some(found) = walk(&child, id, seen) {
                return Some(found);
            }
        }
        None
    }

    let mut seen = HashSet::new();
    walk(root, id, &mut seen)
}

/// Indented dump of the grammar graph reachable from `root`. A node already
/// printed on the current path is flagged instead of recursed into.
pub fn dump(root: &NodeRef) -> String {
    fn walk(node: &NodeRef, indent: usize, out: &mut String, seen: &mut HashSet<*const Node>) {
        let _ = write!(out, "{:indent$}{:?}", "", node, indent = indent * 2);
        if !seen.insert(Rc::as_ptr(node)) {
            out.push_str(" (already dumped)\n");
            return;
        }
        out.push('\n');
        for child in node.children() {
            walk(&child, indent + 1, out, seen);
        }
    }

    let mut out = String::new();
    let mut seen = HashSet::new();
    walk(root, 0, &mut out, &mut seen);
    out
}

/// Collect the node references of a `children` list config, the shape used
/// by the or/seq combinators.
pub fn node_list_from_config(config: &Config) -> Result<Vec<NodeRef>, GrammarError> {
    let list = config.as_list().ok_or_else(|| {
        GrammarError::new(ErrorKind::InvalidArgument, "expected a list config")
    })?;
    list.iter()
        .map(|elem| {
            elem.as_node().cloned().ok_or_else(|| {
                GrammarError::new(ErrorKind::InvalidArgument, "expected a node config")
            })
        })
        .collect()
}

/// Append one child to the `children` list config of `node`, keeping the
/// rest of its configuration. Shared by the or/seq add helpers.
pub(crate) fn append_child_config(
    node: &NodeRef,
    type_name: &str,
    child: NodeRef,
) -> Result<(), GrammarError> {
    node.check_type(type_name)?;

    let mut cfg = node.config().unwrap_or_else(Config::dict);
    if cfg.dict_get("children").is_none() {
        cfg.dict_set("children", Config::list())?;
    }
    cfg.dict_get_mut("children")
        .expect("children list was just inserted")
        .list_add(Config::Node(child))?;
    node.set_config(cfg)
}

type OpsCtor = fn() -> Box<dyn NodeOps>;

thread_local! {
    static REGISTRY: RefCell<Option<Vec<(&'static str, OpsCtor)>>> = RefCell::new(None);
}

fn builtin_kinds() -> Vec<(&'static str, OpsCtor)> {
    vec![
        ("str", || Box::new(StrNode::default())),
        ("re", || Box::new(ReNode::default())),
        ("int", || Box::new(IntNode::default())),
        ("uint", || Box::new(UintNode::default())),
        ("any", || Box::new(AnyNode::default())),
        ("empty", || Box::new(EmptyNode)),
        ("none", || Box::new(NoneNode)),
        ("space", || Box::new(SpaceNode)),
        ("file", || Box::new(FileNode)),
        ("dynlist", || Box::new(DynListNode::default())),
        ("or", || Box::new(OrNode::default())),
        ("seq", || Box::new(SeqNode::default())),
        ("subset", || Box::new(SubsetNode::default())),
        ("many", || Box::new(ManyNode::default())),
        ("option", || Box::new(OptionNode::default())),
        ("once", || Box::new(OnceNode::default())),
        ("bypass", || Box::new(BypassNode::default())),
        ("sh_lex", || Box::new(ShLexNode::default())),
    ]
}

fn with_registry<T>(
    f: impl FnOnce(&mut Vec<(&'static str, OpsCtor)>) -> T,
) -> Result<T, GrammarError> {
    REGISTRY.with(|cell| {
        let mut guard = cell
            .try_borrow_mut()
            .map_err(|_| GrammarError::new(ErrorKind::Busy, "node kind registry is busy"))?;
        Ok(f(guard.get_or_insert_with(builtin_kinds)))
    })
}

/// Register a custom node kind under `name`, to be instantiated through
/// [Node::from_name]. Kind names are unique.
pub fn register_node_kind(name: &'static str, ctor: OpsCtor) -> Result<(), GrammarError> {
    with_registry(|reg| {
        if reg.iter().any(|(existing, _)| *existing == name) {
            Err(GrammarError::new(
                ErrorKind::AlreadyExists,
                format!("node kind {:?} is already registered", name),
            ))
        } else {
            reg.push((name, ctor));
            Ok(())
        }
    })?
}

/// The registered kind names, in registration order.
pub fn node_kind_names() -> Vec<&'static str> {
    with_registry(|reg| reg.iter().map(|(name, _)| *name).collect())
        .unwrap_or_default()
}

/// Matches exactly one token equal to its configured literal.
#[derive(Default)]
pub struct StrNode {
    string: RefCell<Option<String>>,
}

/// Matches one token against a configured regular expression, anchored on
/// both ends.
#[derive(Default)]
pub struct ReNode {
    regex: RefCell<Option<(String, Regex)>>,
}

struct IntBounds {
    min: i64,
    max: i64,
    base: u32,
}

struct UintBounds {
    min: u64,
    max: u64,
    base: u32,
}

/// Matches one token interpreted as a signed integer within bounds.
#[derive(Default)]
pub struct IntNode {
    bounds: RefCell<Option<IntBounds>>,
}

/// Matches one token interpreted as an unsigned integer within bounds.
#[derive(Default)]
pub struct UintNode {
    bounds: RefCell<Option<UintBounds>>,
}

/// Matches any one token, optionally requiring a token attribute.
#[derive(Default)]
pub struct AnyNode {
    attr_name: RefCell<Option<String>>,
}

/// Always matches zero tokens.
pub struct EmptyNode;

/// Never matches.
pub struct NoneNode;

/// Matches one token made of whitespace only.
pub struct SpaceNode;

/// Matches any one token and completes it as a filesystem path.
pub struct FileNode;

/// The name provider of a [DynListNode]: called at parse and complete time
/// with the in-progress parse tree, returns the admissible names.
pub type DynListGet = Rc<dyn Fn(&ParseNodeRef) -> Result<StrVec, GrammarError>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Matching policy of a [DynListNode].
pub struct DynListFlags {
    /// Accept tokens present in the provided list.
    pub match_list: bool,
    /// Accept tokens matching the regular expression.
    pub match_regexp: bool,
    /// Reject tokens present in the provided list, even when the regular
    /// expression matches.
    pub exclude_list: bool,
}

struct DynListState {
    get: DynListGet,
    regex: Option<(String, Regex)>,
    flags: DynListFlags,
}

/// Matches one token against a runtime-provided list of names and/or a
/// regular expression.
#[derive(Default)]
pub struct DynListNode {
    state: RefCell<Option<DynListState>>,
}

/// Matches the first child that matches, in declared order.
#[derive(Default)]
pub struct OrNode {
    children: RefCell<Vec<NodeRef>>,
}

/// Matches its children one after the other.
#[derive(Default)]
pub struct SeqNode {
    children: RefCell<Vec<NodeRef>>,
}

/// Matches the longest ordering of a subset of its children, each child
/// used at most once.
#[derive(Default)]
pub struct SubsetNode {
    children: RefCell<Vec<NodeRef>>,
}

struct ManyState {
    child: NodeRef,
    min: u32,
    max: u32,
}

/// Greedy repetition of one child, `min..=max` times (`max == 0` means
/// unbounded).
#[derive(Default)]
pub struct ManyNode {
    state: RefCell<Option<ManyState>>,
}

/// Matches its child, or zero tokens.
#[derive(Default)]
pub struct OptionNode {
    child: RefCell<Option<NodeRef>>,
}

/// Refuses to match when its child already matched anywhere in the current
/// parse tree.
#[derive(Default)]
pub struct OnceNode {
    child: RefCell<Option<NodeRef>>,
}

#[derive(Default)]
enum BypassChild {
    #[default]
    Unset,
    Owned(NodeRef),
    Back(Weak<Node>),
}

/// Transparent pass-through. Its only purpose is to carry the back edge of
/// a cyclic grammar: bound with [BypassNode::bind], the edge does not keep
/// the cycle alive, so dropping the caller's handle reclaims the whole
/// component.
#[derive(Default)]
pub struct BypassNode {
    child: RefCell<BypassChild>,
}

struct ShLexState {
    child: NodeRef,
    expand: bool,
}

/// Tokenizes one input string with the shell lexer and parses the result
/// with its child grammar.
#[derive(Default)]
pub struct ShLexNode {
    state: RefCell<Option<ShLexState>>,
}
