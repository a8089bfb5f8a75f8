use crate::complete::{complete_child, Completion};
use crate::config::{Config, ConfigType, SchemaEntry};
use crate::node::{append_child_config, node_list_from_config, Node, NodeOps, NodeRef, OrNode};
use crate::parse::{parse_child, ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::{ErrorKind, GrammarError};
use std::any::Any;

static OR_SUBSCHEMA: &[SchemaEntry] = &[SchemaEntry::elem(
    "A child node which is part of the choice.",
    ConfigType::Node,
)];

static OR_SCHEMA: &[SchemaEntry] = &[SchemaEntry::keyed_sub(
    "children",
    "The list of children nodes defining the choice elements.",
    ConfigType::List,
    OR_SUBSCHEMA,
)];

impl OrNode {
    /// Create a node matching the first of `children` that matches, in
    /// declared order.
    pub fn new(id: &str, children: Vec<NodeRef>) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(OrNode::default()), id);
        let mut list = Config::list();
        for child in children {
            list.list_add(Config::Node(child))?;
        }
        let mut cfg = Config::dict();
        cfg.dict_set("children", list)?;
        node.set_config(cfg)?;
        Ok(node)
    }

    /// Append one alternative to an existing or node.
    pub fn add(node: &NodeRef, child: NodeRef) -> Result<(), GrammarError> {
        append_child_config(node, "or", child)
    }
}

impl NodeOps for OrNode {
    fn type_name(&self) -> &'static str {
        "or"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        Some(OR_SCHEMA)
    }

    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        let children = config.dict_get("children").ok_or_else(|| {
            GrammarError::new(
                ErrorKind::InvalidArgument,
                "an or node needs a \"children\" config",
            )
        })?;
        *self.children.borrow_mut() = node_list_from_config(children)?;
        Ok(())
    }

    fn parse(
        &self,
        _node: &NodeRef,
        state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        for child in self.children.borrow().iter() {
            match parse_child(child, state, strvec)? {
                ParseResult::NoMatch => continue,
                matched => return Ok(matched),
            }
        }
        Ok(ParseResult::NoMatch)
    }

    fn complete(
        &self,
        _node: &NodeRef,
        comp: &mut Completion,
        strvec: &StrVec,
    ) -> Result<(), GrammarError> {
        for child in self.children.borrow().iter() {
            complete_child(child, comp, strvec)?;
        }
        Ok(())
    }

    fn children(&self) -> Vec<NodeRef> {
        self.children.borrow().clone()
    }
}
