use crate::complete::{complete_child, Completion};
use crate::config::{Config, ConfigType, SchemaEntry};
use crate::node::{ManyNode, ManyState, Node, NodeOps, NodeRef};
use crate::parse::{parse_child, ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::{ErrorKind, GrammarError};
use std::any::Any;

static MANY_SCHEMA: &[SchemaEntry] = &[
    SchemaEntry::keyed("child", "The child node.", ConfigType::Node),
    SchemaEntry::keyed(
        "min",
        "The minimum number of matches (default = 0).",
        ConfigType::U64,
    ),
    SchemaEntry::keyed(
        "max",
        "The maximum number of matches. If 0, there is no maximum (default = 0).",
        ConfigType::U64,
    ),
];

impl ManyNode {
    /// Create a node matching `child` repeatedly, `min..=max` times
    /// (`max == 0` means unbounded).
    pub fn new(id: &str, child: NodeRef, min: u32, max: u32) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(ManyNode::default()), id);
        Self::set_params(&node, child, min, max)?;
        Ok(node)
    }

    /// Reconfigure an existing many node.
    pub fn set_params(
        node: &NodeRef,
        child: NodeRef,
        min: u32,
        max: u32,
    ) -> Result<(), GrammarError> {
        node.check_type("many")?;
        let mut cfg = node.config().unwrap_or_else(Config::dict);
        cfg.dict_set("child", Config::Node(child))?;
        cfg.dict_set("min", Config::U64(min as u64))?;
        cfg.dict_set("max", Config::U64(max as u64))?;
        node.set_config(cfg)
    }
}

fn config_count(config: &Config, key: &str) -> Result<u32, GrammarError> {
    let value = match config.dict_get(key) {
        Some(value) => value.as_u64().unwrap_or(0),
        None => 0,
    };
    u32::try_from(value).map_err(|_| {
        GrammarError::new(
            ErrorKind::InvalidArgument,
            format!("many {:?} bound is too large", key),
        )
    })
}

/// Complete the child against the whole remainder, then recurse with a
/// decremented budget after every prefix the child matches exactly.
fn complete_rec(
    child: &NodeRef,
    max: u32,
    comp: &mut Completion,
    strvec: &StrVec,
) -> Result<(), GrammarError> {
    complete_child(child, comp, strvec)?;

    if max == 1 {
        return Ok(());
    }
    let next_max = max.saturating_sub(1);

    let parse = match comp.cur_state() {
        Some(parse) => parse.clone(),
        None => return Ok(()),
    };

    for split in 0..strvec.len() {
        let prefix = strvec.ndup(0, split)?;
        match parse_child(child, &parse, &prefix)? {
            ParseResult::Match(len) if len == split => {
                let remainder = strvec.ndup_tail(split)?;
                let ret = complete_rec(child, next_max, comp, &remainder);
                parse.del_last_child();
                ret?;
            }
            ParseResult::Match(_) => parse.del_last_child(),
            ParseResult::NoMatch => {}
        }
    }
    Ok(())
}

impl NodeOps for ManyNode {
    fn type_name(&self) -> &'static str {
        "many"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        Some(MANY_SCHEMA)
    }

    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        let child = config
            .dict_get("child")
            .and_then(Config::as_node)
            .cloned()
            .ok_or_else(|| {
                GrammarError::new(
                    ErrorKind::InvalidArgument,
                    "a many node needs a \"child\" config",
                )
            })?;
        let min = config_count(config, "min")?;
        let max = config_count(config, "max")?;
        *self.state.borrow_mut() = Some(ManyState { child, min, max });
        Ok(())
    }

    fn parse(
        &self,
        _node: &NodeRef,
        state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        let st = self.state.borrow();
        let st = st.as_ref().ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "many node is not configured")
        })?;

        let mut consumed = 0;
        let mut count = 0;
        while st.max == 0 || count < st.max {
            let remainder = strvec.ndup_tail(consumed)?;
            match parse_child(&st.child, state, &remainder)? {
                ParseResult::NoMatch => break,
                ParseResult::Match(0) if st.max == 0 => {
                    // a zero-width match would repeat forever: drop it
                    state.del_last_child();
                    break;
                }
                ParseResult::Match(len) => {
                    consumed += len;
                    count += 1;
                }
            }
        }

        if count < st.min {
            state.clear_children();
            return Ok(ParseResult::NoMatch);
        }
        Ok(ParseResult::Match(consumed))
    }

    fn complete(
        &self,
        _node: &NodeRef,
        comp: &mut Completion,
        strvec: &StrVec,
    ) -> Result<(), GrammarError> {
        let st = self.state.borrow();
        let st = st.as_ref().ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "many node is not configured")
        })?;
        complete_rec(&st.child, st.max, comp, strvec)
    }

    fn children(&self) -> Vec<NodeRef> {
        match self.state.borrow().as_ref() {
            Some(st) => vec![st.child.clone()],
            None => Vec::new(),
        }
    }
}
