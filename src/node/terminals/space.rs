use crate::node::{Node, NodeOps, NodeRef, SpaceNode};
use crate::parse::{ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::util::string::is_space_str;
use crate::GrammarError;
use std::any::Any;

impl SpaceNode {
    /// Create a node matching one non-empty all-whitespace token.
    pub fn new(id: &str) -> NodeRef {
        Node::with_ops(Box::new(SpaceNode), id)
    }
}

impl NodeOps for SpaceNode {
    fn type_name(&self) -> &'static str {
        "space"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn parse(
        &self,
        _node: &NodeRef,
        _state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        match strvec.val(0) {
            Some(token) if !token.is_empty() && is_space_str(token) => Ok(ParseResult::Match(1)),
            _ => Ok(ParseResult::NoMatch),
        }
    }
}
