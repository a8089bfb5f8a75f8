//! The parse tree and the parse drivers.
//!
//! Parsing builds a tree of [ParseNode]s mirroring the matched portion of
//! the grammar graph. The tree is grown top-down: a node kind's `parse`
//! hook receives its own in-progress tree node and links child attempts
//! under it through [parse_child]; the driver records the matched
//! sub-vector on success and unlinks the attempt on failure.


use crate::attrs::Attrs;
use crate::node::NodeRef;
use crate::strvec::StrVec;
use crate::GrammarError;
use ptree::TreeItem;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of a parse hook: either the number of leading tokens consumed,
/// or a syntactic non-match. Hard errors travel through the `Err` channel
/// instead and are never folded into `NoMatch`.
pub enum ParseResult {
    Match(usize),
    NoMatch,
}

impl ParseResult {
    pub fn is_match(&self) -> bool {
        matches!(self, ParseResult::Match(_))
    }

    /// The consumed token count, when matched.
    pub fn matched_len(&self) -> Option<usize> {
        match self {
            ParseResult::Match(len) => Some(*len),
            ParseResult::NoMatch => None,
        }
    }
}

/// A shared handle on a parse-tree node.
pub type ParseNodeRef = Rc<ParseNode>;

/// One node of the parse tree. It points at the grammar node that produced
/// it and, once matched, carries the sub-vector of tokens it consumed.
pub struct ParseNode {
    node: NodeRef,
    parent: RefCell<Weak<ParseNode>>,
    children: RefCell<Vec<ParseNodeRef>>,
    strvec: RefCell<Option<StrVec>>,
    attrs: RefCell<Attrs>,
}

impl ParseNode {
    pub fn new(node: &NodeRef) -> ParseNodeRef {
        Rc::new(ParseNode {
            node: node.clone(),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            strvec: RefCell::new(None),
            attrs: RefCell::new(Attrs::new()),
        })
    }

    /// The grammar node this tree node was produced by.
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn parent(&self) -> Option<ParseNodeRef> {
        self.parent.borrow().upgrade()
    }

    pub fn root(self: &Rc<Self>) -> ParseNodeRef {
        let mut cur = self.clone();
        while let Some(parent) = cur.parent() {
            cur = parent;
        }
        cur
    }

    pub fn children(&self) -> Vec<ParseNodeRef> {
        self.children.borrow().clone()
    }

    pub fn first_child(&self) -> Option<ParseNodeRef> {
        self.children.borrow().first().cloned()
    }

    pub fn last_child(&self) -> Option<ParseNodeRef> {
        self.children.borrow().last().cloned()
    }

    pub fn next_sibling(self: &Rc<Self>) -> Option<ParseNodeRef> {
        let parent = self.parent()?;
        let children = parent.children.borrow();
        let idx = children.iter().position(|c| Rc::ptr_eq(c, self))?;
        children.get(idx + 1).cloned()
    }

    /// Whether this node matched, i.e. carries a matched sub-vector.
    pub fn matches(&self) -> bool {
        self.strvec.borrow().is_some()
    }

    /// The matched sub-vector. Cheap: tokens are shared, not copied.
    pub fn strvec(&self) -> Option<StrVec> {
        self.strvec.borrow().clone()
    }

    /// Number of matched tokens; 0 when the node did not match.
    pub fn len(&self) -> usize {
        self.strvec.borrow().as_ref().map_or(0, StrVec::len)
    }

    pub fn attrs(&self) -> Ref<'_, Attrs> {
        self.attrs.borrow()
    }

    pub fn attrs_mut(&self) -> RefMut<'_, Attrs> {
        self.attrs.borrow_mut()
    }

    pub(crate) fn set_strvec(&self, vec: StrVec) {
        *self.strvec.borrow_mut() = Some(vec);
    }

    /// Append `child` under `parent`.
    pub fn link_child(parent: &ParseNodeRef, child: &ParseNodeRef) {
        parent.children.borrow_mut().push(child.clone());
        *child.parent.borrow_mut() = Rc::downgrade(parent);
    }

    /// Detach `child` from its parent, if any.
    pub fn unlink(child: &ParseNodeRef) {
        if let Some(parent) = child.parent() {
            parent
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(c, child));
            *child.parent.borrow_mut() = Weak::new();
        }
    }

    /// Drop the last child attempt, the completion backtracking primitive.
    pub fn del_last_child(&self) {
        if let Some(child) = self.children.borrow_mut().pop() {
            *child.parent.borrow_mut() = Weak::new();
        }
    }

    /// Drop every child of this node.
    pub fn clear_children(&self) {
        for child in self.children.borrow_mut().drain(..) {
            *child.parent.borrow_mut() = Weak::new();
        }
    }

    /// Preorder traversal of the subtree rooted here, including the root.
    pub fn iter(self: &Rc<Self>) -> ParseIter {
        ParseIter {
            stack: vec![self.clone()],
        }
    }

    /// The first node of the subtree whose grammar node has the given id.
    pub fn find(self: &Rc<Self>, id: &str) -> Option<ParseNodeRef> {
        self.iter().find(|p| p.node().id() == id)
    }

    /// The next node after `prev`, in preorder, whose grammar node has the
    /// given id.
    pub fn find_next(self: &Rc<Self>, prev: &ParseNodeRef, id: &str) -> Option<ParseNodeRef> {
        self.iter()
            .skip_while(|p| !Rc::ptr_eq(p, prev))
            .skip(1)
            .find(|p| p.node().id() == id)
    }

    /// Deep copy of the whole tree this node belongs to, returning the copy
    /// of this node. Used to snapshot the in-progress parse state of a
    /// completion group.
    pub fn dup(self: &Rc<Self>) -> ParseNodeRef {
        fn copy(
            original: &ParseNodeRef,
            wanted: &ParseNodeRef,
            found: &mut Option<ParseNodeRef>,
        ) -> ParseNodeRef {
            let dup = Rc::new(ParseNode {
                node: original.node.clone(),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                strvec: RefCell::new(original.strvec()),
                attrs: RefCell::new(original.attrs().clone()),
            });
            if Rc::ptr_eq(original, wanted) {
                *found = Some(dup.clone());
            }
            for child in original.children.borrow().iter() {
                let dup_child = copy(child, wanted, found);
                ParseNode::link_child(&dup, &dup_child);
            }
            dup
        }

        let mut found = None;
        let root = self.root();
        let dup_root = copy(&root, self, &mut found);
        found.unwrap_or(dup_root)
    }

    /// Print the tree on standard output.
    pub fn print(self: &Rc<Self>) -> Result<(), std::io::Error> {
        ptree::print_tree(&ParseNodeItem(self.clone()))
    }
}

impl Debug for ParseNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} type={} id={} vec=",
            self.node.desc(),
            self.node.type_name(),
            self.node.id()
        )?;
        match self.strvec() {
            Some(vec) => write!(f, "{}", vec),
            None => write!(f, "none"),
        }
    }
}

#[derive(Clone)]
struct ParseNodeItem(ParseNodeRef);

impl TreeItem for ParseNodeItem {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{:?}", self.0.as_ref())
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        std::borrow::Cow::from(
            ParseNode::children(self.0.as_ref())
                .into_iter()
                .map(ParseNodeItem)
                .collect::<Vec<_>>(),
        )
    }
}

/// Preorder iterator over a parse tree.
pub struct ParseIter {
    stack: Vec<ParseNodeRef>,
}

impl Iterator for ParseIter {
    type Item = ParseNodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.stack.pop()?;
        let children = cur.children.borrow();
        for child in children.iter().rev() {
            self.stack.push(child.clone());
        }
        drop(children);
        Some(cur)
    }
}

fn parse_child_inner(
    node: &NodeRef,
    state: &ParseNodeRef,
    is_root: bool,
    strvec: &StrVec,
) -> Result<ParseResult, GrammarError> {
    if let Some(log) = node.log() {
        log.log_entry();
    }

    let child = if is_root {
        state.clone()
    } else {
        let child = ParseNode::new(node);
        ParseNode::link_child(state, &child);
        child
    };

    let ret = match node.ops().parse(node, &child, strvec) {
        Ok(ParseResult::Match(len)) => strvec.ndup(0, len).map(|matched| {
            child.set_strvec(matched);
            ParseResult::Match(len)
        }),
        other => other,
    };

    if !is_root && !matches!(ret, Ok(ParseResult::Match(_))) {
        ParseNode::unlink(&child);
    }

    if let Some(log) = node.log() {
        match &ret {
            Ok(ParseResult::Match(len)) => log.log_match(*len),
            _ => log.log_no_match(),
        }
    }

    ret
}

/// Parse `strvec` with a child grammar node, linking the attempt under
/// `state`. This is the driver every combinator kind goes through; the
/// attempt is recorded under `state` only when the child matches.
pub fn parse_child(
    node: &NodeRef,
    state: &ParseNodeRef,
    strvec: &StrVec,
) -> Result<ParseResult, GrammarError> {
    parse_child_inner(node, state, false, strvec)
}

/// Parse a token vector with a grammar. The returned tree root matches iff
/// the grammar accepted a prefix of the vector; inspect it with
/// [ParseNode::matches] and [ParseNode::len].
pub fn parse_strvec(node: &NodeRef, strvec: &StrVec) -> Result<ParseNodeRef, GrammarError> {
    let root = ParseNode::new(node);
    parse_child_inner(node, &root, true, strvec)?;
    Ok(root)
}

/// Parse a single-string input: the string becomes a one-token vector,
/// which suits a grammar whose root is a shell-lexer node.
pub fn parse(node: &NodeRef, input: &str) -> Result<ParseNodeRef, GrammarError> {
    let mut vec = StrVec::new();
    vec.add(input);
    parse_strvec(node, &vec)
}
