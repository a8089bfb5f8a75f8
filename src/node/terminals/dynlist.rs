use crate::complete::{CompKind, Completion};
use crate::node::{DynListFlags, DynListGet, DynListNode, DynListState, Node, NodeOps, NodeRef};
use crate::parse::{ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::{ErrorKind, GrammarError};
use std::any::Any;
use std::cell::Ref;

use super::re::compile_anchored;

impl DynListNode {
    /// Create a node matching one token against names provided at
    /// parse/complete time by `get`, and/or against `pattern`, following
    /// `flags`.
    pub fn new(
        id: &str,
        get: DynListGet,
        pattern: Option<&str>,
        flags: DynListFlags,
    ) -> Result<NodeRef, GrammarError> {
        if (flags.match_regexp || flags.exclude_list) && pattern.is_none() {
            return Err(GrammarError::new(
                ErrorKind::InvalidArgument,
                "these dynlist flags need a pattern",
            ));
        }
        let regex = match pattern {
            Some(p) => Some((p.to_string(), compile_anchored(p)?)),
            None => None,
        };
        let node = Node::with_ops(Box::new(DynListNode::default()), id);
        let ops: &DynListNode = node.ops_as("dynlist")?;
        *ops.state.borrow_mut() = Some(DynListState { get, regex, flags });
        Ok(node)
    }

    fn state(&self) -> Result<Ref<'_, DynListState>, GrammarError> {
        let state = self.state.borrow();
        if state.is_none() {
            return Err(GrammarError::new(
                ErrorKind::NotFound,
                "dynlist node has no name provider",
            ));
        }
        Ok(Ref::map(state, |s| s.as_ref().expect("checked above")))
    }
}

impl NodeOps for DynListNode {
    fn type_name(&self) -> &'static str {
        "dynlist"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn parse(
        &self,
        _node: &NodeRef,
        state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        let st = self.state()?;
        let token = match strvec.val(0) {
            Some(token) => token,
            None => return Ok(ParseResult::NoMatch),
        };

        let names = (st.get)(state)?;
        for name in names.iter() {
            if name != token {
                continue;
            }
            if st.flags.exclude_list {
                return Ok(ParseResult::NoMatch);
            }
            if st.flags.match_list {
                return Ok(ParseResult::Match(1));
            }
        }

        if st.flags.match_regexp {
            if let Some((_, regex)) = &st.regex {
                if regex.is_match(token) {
                    return Ok(ParseResult::Match(1));
                }
            }
        }

        Ok(ParseResult::NoMatch)
    }

    fn complete(
        &self,
        node: &NodeRef,
        comp: &mut Completion,
        strvec: &StrVec,
    ) -> Result<(), GrammarError> {
        let st = self.state()?;
        if strvec.len() != 1 {
            return Ok(());
        }
        let token = strvec.val(0).expect("vector has one token");

        // an unknown item first: other values than the listed ones may be
        // accepted
        comp.add_item(node, CompKind::Unknown, None, None)?;

        if st.flags.match_list {
            let cur_state = comp.cur_state().cloned().ok_or_else(|| {
                GrammarError::new(ErrorKind::InvalidArgument, "no completion parse state")
            })?;
            let names = (st.get)(&cur_state)?;
            for name in names.iter() {
                if name.starts_with(token) {
                    comp.add_item(node, CompKind::Full, Some(token), Some(name))?;
                }
            }
        }
        Ok(())
    }
}
