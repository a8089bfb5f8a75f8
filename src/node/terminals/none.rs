use crate::complete::Completion;
use crate::node::{Node, NodeOps, NodeRef, NoneNode};
use crate::parse::{ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::GrammarError;
use std::any::Any;

impl NoneNode {
    /// Create a node that never matches.
    pub fn new(id: &str) -> NodeRef {
        Node::with_ops(Box::new(NoneNode), id)
    }
}

impl NodeOps for NoneNode {
    fn type_name(&self) -> &'static str {
        "none"
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
        Ok(ParseResult::NoMatch)
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
