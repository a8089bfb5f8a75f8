use crate::complete::{complete_child, Completion};
use crate::config::{Config, ConfigType, SchemaEntry};
use crate::node::{Node, NodeOps, NodeRef, OnceNode};
use crate::parse::{parse_child, ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::{ErrorKind, GrammarError};
use std::any::Any;
use std::rc::Rc;

static ONCE_SCHEMA: &[SchemaEntry] =
    &[SchemaEntry::keyed("child", "The child node.", ConfigType::Node)];

/// Number of parse-tree nodes of `tree` produced by `node`.
fn count_node(tree: &ParseNodeRef, node: &NodeRef) -> usize {
    tree.iter().filter(|p| Rc::ptr_eq(p.node(), node)).count()
}

impl OnceNode {
    /// Create a node matching `child` at most once per parse tree.
    pub fn new(id: &str, child: NodeRef) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(OnceNode::default()), id);
        Self::set_child(&node, child)?;
        Ok(node)
    }

    /// Replace the child of an existing once node.
    pub fn set_child(node: &NodeRef, child: NodeRef) -> Result<(), GrammarError> {
        node.check_type("once")?;
        let mut cfg = node.config().unwrap_or_else(Config::dict);
        cfg.dict_set("child", Config::Node(child))?;
        node.set_config(cfg)
    }

    fn child(&self) -> Result<NodeRef, GrammarError> {
        self.child.borrow().clone().ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "once node is not configured")
        })
    }
}

impl NodeOps for OnceNode {
    fn type_name(&self) -> &'static str {
        "once"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        Some(ONCE_SCHEMA)
    }

    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        let child = config
            .dict_get("child")
            .and_then(Config::as_node)
            .cloned()
            .ok_or_else(|| {
                GrammarError::new(
                    ErrorKind::InvalidArgument,
                    "a once node needs a \"child\" config",
                )
            })?;
        *self.child.borrow_mut() = Some(child);
        Ok(())
    }

    fn parse(
        &self,
        _node: &NodeRef,
        state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        let child = self.child()?;

        // refuse when the child already matched somewhere in this tree
        if count_node(&state.root(), &child) > 0 {
            return Ok(ParseResult::NoMatch);
        }
        parse_child(&child, state, strvec)
    }

    fn complete(
        &self,
        _node: &NodeRef,
        comp: &mut Completion,
        strvec: &StrVec,
    ) -> Result<(), GrammarError> {
        let child = self.child()?;

        if let Some(cur) = comp.cur_state() {
            if count_node(&cur.root(), &child) > 0 {
                return Ok(());
            }
        }
        complete_child(&child, comp, strvec)
    }

    fn children(&self) -> Vec<NodeRef> {
        match self.child.borrow().as_ref() {
            Some(child) => vec![child.clone()],
            None => Vec::new(),
        }
    }
}
