use crate::complete::{complete_child, Completion};
use crate::node::{Node, NodeOps, NodeRef, SubsetNode};
use crate::parse::{parse_child, ParseNode, ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::GrammarError;
use std::any::Any;

/// The score of a candidate arrangement: children matched, then tokens
/// consumed as the tie-break.
type Score = (usize, usize);

/// Unlink and return the children of `state` past `mark`, in order.
fn detach_children_from(state: &ParseNodeRef, mark: usize) -> Vec<ParseNodeRef> {
    let children = state.children();
    for _ in mark..children.len() {
        state.del_last_child();
    }
    children[mark..].to_vec()
}

/// Find the arrangement of a subset of `table` consuming the longest token
/// prefix, each child used at most once. The best arrangement's parse
/// nodes are left linked under `state`.
fn parse_table(
    table: &[NodeRef],
    state: &ParseNodeRef,
    strvec: &StrVec,
) -> Result<Score, GrammarError> {
    if table.is_empty() {
        return Ok((0, 0));
    }

    let mark = state.children().len();
    let mut best: Score = (0, 0);
    let mut best_chain: Vec<ParseNodeRef> = Vec::new();

    for (i, child) in table.iter().enumerate() {
        let len = match parse_child(child, state, strvec)? {
            ParseResult::NoMatch => continue,
            ParseResult::Match(len) => len,
        };

        let mut rest_table = Vec::with_capacity(table.len() - 1);
        rest_table.extend_from_slice(&table[..i]);
        rest_table.extend_from_slice(&table[i + 1..]);
        let remainder = strvec.ndup_tail(len)?;
        let sub = parse_table(&rest_table, state, &remainder)?;

        let candidate: Score = (1 + sub.0, len + sub.1);
        let chain = detach_children_from(state, mark);
        if candidate > best {
            best = candidate;
            best_chain = chain;
        }
    }

    for parse_node in &best_chain {
        ParseNode::link_child(state, parse_node);
    }
    Ok(best)
}

fn complete_table(
    table: &[NodeRef],
    comp: &mut Completion,
    strvec: &StrVec,
) -> Result<(), GrammarError> {
    // each child may complete here...
    for child in table {
        complete_child(child, comp, strvec)?;
    }

    let parse = match comp.cur_state() {
        Some(parse) => parse.clone(),
        None => return Ok(()),
    };

    // ...and each matching child hands the remainder to the others
    for (i, child) in table.iter().enumerate() {
        let len = match parse_child(child, &parse, strvec)? {
            ParseResult::NoMatch => continue,
            ParseResult::Match(len) => len,
        };

        let mut rest_table = Vec::with_capacity(table.len() - 1);
        rest_table.extend_from_slice(&table[..i]);
        rest_table.extend_from_slice(&table[i + 1..]);
        let remainder = strvec.ndup_tail(len)?;
        let ret = complete_table(&rest_table, comp, &remainder);
        parse.del_last_child();
        ret?;
    }
    Ok(())
}

impl SubsetNode {
    /// Create a node matching any ordering of a subset of `children`, each
    /// used at most once, preferring the arrangement that consumes the
    /// most.
    pub fn new(id: &str, children: Vec<NodeRef>) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(SubsetNode::default()), id);
        let ops: &SubsetNode = node.ops_as("subset")?;
        *ops.children.borrow_mut() = children;
        Ok(node)
    }

    /// Append one candidate to an existing subset node.
    pub fn add(node: &NodeRef, child: NodeRef) -> Result<(), GrammarError> {
        let ops: &SubsetNode = node.ops_as("subset")?;
        ops.children.borrow_mut().push(child);
        Ok(())
    }
}

impl NodeOps for SubsetNode {
    fn type_name(&self) -> &'static str {
        "subset"
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
        if strvec.is_empty() {
            return Ok(ParseResult::NoMatch);
        }

        let children = self.children.borrow();
        let (matched_children, consumed) = parse_table(&children, state, strvec)?;

        // an empty arrangement is still a (zero-token) match
        if matched_children == 0 {
            return Ok(ParseResult::Match(0));
        }
        Ok(ParseResult::Match(consumed))
    }

    fn complete(
        &self,
        _node: &NodeRef,
        comp: &mut Completion,
        strvec: &StrVec,
    ) -> Result<(), GrammarError> {
        let children = self.children.borrow();
        complete_table(&children, comp, strvec)
    }

    fn children(&self) -> Vec<NodeRef> {
        self.children.borrow().clone()
    }
}
