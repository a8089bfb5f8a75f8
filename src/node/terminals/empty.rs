use crate::complete::Completion;
use crate::node::{EmptyNode, Node, NodeOps, NodeRef};
use crate::parse::{ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::GrammarError;
use std::any::Any;

impl EmptyNode {
    /// Create a node that always matches zero tokens.
    pub fn new(id: &str) -> NodeRef {
        Node::with_ops(Box::new(EmptyNode), id)
    }
}

impl NodeOps for EmptyNode {
    fn type_name(&self) -> &'static str {
        "empty"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn parse(
        &self,
        _node: &NodeRef,
        _state: &ParseNodeRef,
        _strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        Ok(ParseResult::Match(0))
    }

    fn complete(
        &self,
        _node: &NodeRef,
        _comp: &mut Completion,
        _strvec: &StrVec,
    ) -> Result<(), GrammarError> {
        Ok(())
    }
}
