use crate::complete::{complete_child, Completion};
use crate::config::{Config, ConfigType, SchemaEntry};
use crate::node::{BypassChild, BypassNode, Node, NodeOps, NodeRef};
use crate::parse::{parse_child, ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::{ErrorKind, GrammarError};
use std::any::Any;
use std::rc::Rc;

static BYPASS_SCHEMA: &[SchemaEntry] =
    &[SchemaEntry::keyed("child", "The child node.", ConfigType::Node)];

impl BypassNode {
    /// Create a transparent wrapper owning `child`.
    pub fn new(id: &str, child: NodeRef) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(BypassNode::default()), id);
        let mut cfg = Config::dict();
        cfg.dict_set("child", Config::Node(child))?;
        node.set_config(cfg)?;
        Ok(node)
    }

    /// Create a bypass with no child yet, to be closed later with
    /// [BypassNode::bind]. Parsing it before binding is an error.
    pub fn unbound(id: &str) -> NodeRef {
        Node::with_ops(Box::new(BypassNode::default()), id)
    }

    /// Close a back edge: make `node` forward to `target` without keeping
    /// it alive. This is the supported way to build a cyclic grammar; the
    /// cycle is reclaimed when the caller drops its own handle on the
    /// component.
    pub fn bind(node: &NodeRef, target: &NodeRef) -> Result<(), GrammarError> {
        let ops: &BypassNode = node.ops_as("bypass")?;
        *ops.child.borrow_mut() = BypassChild::Back(Rc::downgrade(target));
        Ok(())
    }

    fn resolve(&self) -> Result<NodeRef, GrammarError> {
        match &*self.child.borrow() {
            BypassChild::Unset => Err(GrammarError::new(
                ErrorKind::InvalidArgument,
                "bypass node has no child",
            )),
            BypassChild::Owned(child) => Ok(child.clone()),
            BypassChild::Back(weak) => weak.upgrade().ok_or_else(|| {
                GrammarError::new(
                    ErrorKind::InvalidArgument,
                    "bypass back edge target was dropped",
                )
            }),
        }
    }
}

impl NodeOps for BypassNode {
    fn type_name(&self) -> &'static str {
        "bypass"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        Some(BYPASS_SCHEMA)
    }

    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        let child = config
            .dict_get("child")
            .and_then(Config::as_node)
            .cloned()
            .ok_or_else(|| {
                GrammarError::new(
                    ErrorKind::InvalidArgument,
                    "a bypass node needs a \"child\" config",
                )
            })?;
        *self.child.borrow_mut() = BypassChild::Owned(child);
        Ok(())
    }

    fn parse(
        &self,
        _node: &NodeRef,
        state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        parse_child(&self.resolve()?, state, strvec)
    }

    fn complete(
        &self,
        _node: &NodeRef,
        comp: &mut Completion,
        strvec: &StrVec,
    ) -> Result<(), GrammarError> {
        complete_child(&self.resolve()?, comp, strvec)
    }

    fn children(&self) -> Vec<NodeRef> {
        match self.resolve() {
            Ok(child) => vec![child],
            Err(_) => Vec::new(),
        }
    }
}
