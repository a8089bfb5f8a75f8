use crate::complete::{complete_child, Completion};
use crate::config::{Config, ConfigType, SchemaEntry};
use crate::node::{Node, NodeOps, NodeRef, OptionNode};
use crate::parse::{parse_child, ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::{ErrorKind, GrammarError};
use std::any::Any;

static OPTION_SCHEMA: &[SchemaEntry] =
    &[SchemaEntry::keyed("child", "The child node.", ConfigType::Node)];

impl OptionNode {
    /// Create a node matching `child`, or zero tokens when it does not
    /// match.
    pub fn new(id: &str, child: NodeRef) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(OptionNode::default()), id);
        Self::set_child(&node, child)?;
        Ok(node)
    }

    /// Replace the child of an existing option node.
    pub fn set_child(node: &NodeRef, child: NodeRef) -> Result<(), GrammarError> {
        node.check_type("option")?;
        let mut cfg = node.config().unwrap_or_else(Config::dict);
        cfg.dict_set("child", Config::Node(child))?;
        node.set_config(cfg)
    }

    fn child(&self) -> Result<NodeRef, GrammarError> {
        self.child.borrow().clone().ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "option node is not configured")
        })
    }
}

impl NodeOps for OptionNode {
    fn type_name(&self) -> &'static str {
        "option"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        Some(OPTION_SCHEMA)
    }

    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        let child = config
            .dict_get("child")
            .and_then(Config::as_node)
            .cloned()
            .ok_or_else(|| {
                GrammarError::new(
                    ErrorKind::InvalidArgument,
                    "an option node needs a \"child\" config",
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
        match parse_child(&self.child()?, state, strvec)? {
            ParseResult::NoMatch => Ok(ParseResult::Match(0)),
            matched => Ok(matched),
        }
    }

    fn complete(
        &self,
        _node: &NodeRef,
        comp: &mut Completion,
        strvec: &StrVec,
    ) -> Result<(), GrammarError> {
        complete_child(&self.child()?, comp, strvec)
    }

    fn children(&self) -> Vec<NodeRef> {
        match self.child.borrow().as_ref() {
            Some(child) => vec![child.clone()],
            None => Vec::new(),
        }
    }
}
