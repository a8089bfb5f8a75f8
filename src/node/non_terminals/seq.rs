use crate::complete::{complete_child, Completion};
use crate::config::{Config, ConfigType, SchemaEntry};
use crate::node::{append_child_config, node_list_from_config, Node, NodeOps, NodeRef, SeqNode};
use crate::parse::{parse_child, ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::{ErrorKind, GrammarError};
use std::any::Any;

static SEQ_SUBSCHEMA: &[SchemaEntry] = &[SchemaEntry::elem(
    "A child node of the sequence.",
    ConfigType::Node,
)];

static SEQ_SCHEMA: &[SchemaEntry] = &[SchemaEntry::keyed_sub(
    "children",
    "The list of children nodes, parsed in order.",
    ConfigType::List,
    SEQ_SUBSCHEMA,
)];

impl SeqNode {
    /// Create a node matching its children one after the other.
    pub fn new(id: &str, children: Vec<NodeRef>) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(SeqNode::default()), id);
        let mut list = Config::list();
        for child in children {
            list.list_add(Config::Node(child))?;
        }
        let mut cfg = Config::dict();
        cfg.dict_set("children", list)?;
        node.set_config(cfg)?;
        Ok(node)
    }

    /// Append one element to an existing seq node.
    pub fn add(node: &NodeRef, child: NodeRef) -> Result<(), GrammarError> {
        append_child_config(node, "seq", child)
    }
}

/// Complete a table of children against `strvec`: complete the first child
/// on the whole vector, then, for every prefix the first child matches
/// exactly, complete the rest of the table on the remainder.
fn complete_table(
    table: &[NodeRef],
    comp: &mut Completion,
    strvec: &StrVec,
) -> Result<(), GrammarError> {
    let (first, rest) = match table.split_first() {
        Some(split) => split,
        None => return Ok(()),
    };

    complete_child(first, comp, strvec)?;

    let parse = match comp.cur_state() {
        Some(parse) => parse.clone(),
        None => return Ok(()),
    };

    for split in 0..strvec.len() {
        let prefix = strvec.ndup(0, split)?;
        match parse_child(first, &parse, &prefix)? {
            ParseResult::Match(len) if len == split => {
                let remainder = strvec.ndup_tail(split)?;
                let ret = complete_table(rest, comp, &remainder);
                parse.del_last_child();
                ret?;
            }
            ParseResult::Match(_) => parse.del_last_child(),
            ParseResult::NoMatch => {}
        }
    }
    Ok(())
}

impl NodeOps for SeqNode {
    fn type_name(&self) -> &'static str {
        "seq"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        Some(SEQ_SCHEMA)
    }

    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        let children = config.dict_get("children").ok_or_else(|| {
            GrammarError::new(
                ErrorKind::InvalidArgument,
                "a seq node needs a \"children\" config",
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
        let mut consumed = 0;
        for child in self.children.borrow().iter() {
            let remainder = strvec.ndup_tail(consumed)?;
            match parse_child(child, state, &remainder)? {
                ParseResult::NoMatch => {
                    state.clear_children();
                    return Ok(ParseResult::NoMatch);
                }
                ParseResult::Match(len) => consumed += len,
            }
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
