use crate::complete::{complete_child, expand_strvec, CompKind, Completion};
use crate::node::{Node, NodeOps, NodeRef, ShLexNode, ShLexState};
use crate::parse::{parse_child, ParseNodeRef, ParseResult};
use crate::strvec::{sh_lex_str, LexFlags, StrVec};
use crate::util::string::common_prefix_len;
use crate::{ErrorKind, GrammarError};
use std::any::Any;
use std::cell::Ref;

impl ShLexNode {
    /// Create a node tokenizing one input string with the shell lexer and
    /// parsing the result with `child`.
    pub fn new(id: &str, child: NodeRef) -> NodeRef {
        Self::build(id, child, false)
    }

    /// Like [ShLexNode::new], but unambiguous token abbreviations are
    /// widened to their full completion before parsing.
    pub fn expand(id: &str, child: NodeRef) -> NodeRef {
        Self::build(id, child, true)
    }

    fn build(id: &str, child: NodeRef, expand: bool) -> NodeRef {
        let node = Node::with_ops(Box::new(ShLexNode::default()), id);
        let ops: &ShLexNode = node
            .ops_as("sh_lex")
            .expect("node was just built with this kind");
        *ops.state.borrow_mut() = Some(ShLexState { child, expand });
        node
    }

    fn state(&self) -> Result<Ref<'_, ShLexState>, GrammarError> {
        let state = self.state.borrow();
        if state.is_none() {
            return Err(GrammarError::new(
                ErrorKind::InvalidArgument,
                "sh_lex node has no child",
            ));
        }
        Ok(Ref::map(state, |s| s.as_ref().expect("checked above")))
    }
}

impl NodeOps for ShLexNode {
    fn type_name(&self) -> &'static str {
        "sh_lex"
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
        let line = match strvec.val(0) {
            Some(line) => line,
            None => return Ok(ParseResult::NoMatch),
        };

        let inner = match sh_lex_str(line, LexFlags::STRICT) {
            Ok((vec, _)) => vec,
            // an unterminated quote is an incomplete line, not an error
            Err(err) if err.kind() == ErrorKind::BadMessage => return Ok(ParseResult::NoMatch),
            Err(err) => return Err(err),
        };

        let inner = if st.expand {
            expand_strvec(&st.child, CompKind::Full, &inner)?
        } else {
            inner
        };

        match parse_child(&st.child, state, &inner)? {
            ParseResult::Match(len) if len == inner.len() => Ok(ParseResult::Match(1)),
            ParseResult::Match(_) => {
                // a partial match of the inner vector is no match at all
                state.del_last_child();
                Ok(ParseResult::NoMatch)
            }
            ParseResult::NoMatch => Ok(ParseResult::NoMatch),
        }
    }

    fn complete(
        &self,
        _node: &NodeRef,
        comp: &mut Completion,
        strvec: &StrVec,
    ) -> Result<(), GrammarError> {
        let st = self.state()?;
        if strvec.len() != 1 {
            return Ok(());
        }
        let line = strvec.val(0).expect("vector has one token");

        let (inner, missing_quote) = sh_lex_str(line, LexFlags::TRAILING_SPACE)?;
        let inner = if st.expand {
            expand_strvec(&st.child, CompKind::Full, &inner)?
        } else {
            inner
        };

        let group_mark = comp.groups_len();
        complete_child(&st.child, comp, &inner)?;

        let last = match inner.len() {
            0 => None,
            len => inner.val(len - 1).map(String::from),
        };

        for item in comp.items_mut_from(group_mark, CompKind::Full.into()) {
            // compensate the characters the expansion added to the token
            if st.expand {
                if let (Some(last), Some(value)) = (last.as_deref(), item.value()) {
                    let prefix = common_prefix_len(value, last);
                    let completion = value[prefix..].to_string();
                    item.set_completion(completion);
                }
            }

            // re-wrap fresh completions so the produced line stays
            // tokenizable despite the unterminated quote
            if let Some(quote) = missing_quote {
                let value = item.value().unwrap_or_default().to_string();
                item.set_value(format!("{}{}{}", quote, value, quote));
                let completion = item.completion().unwrap_or_default().to_string();
                item.set_completion(format!("{}{}", completion, quote));
            }
        }
        Ok(())
    }

    fn children(&self) -> Vec<NodeRef> {
        match self.state.borrow().as_ref() {
            Some(st) => vec![st.child.clone()],
            None => Vec::new(),
        }
    }
}
