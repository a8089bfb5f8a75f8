use crate::config::{Config, ConfigType, SchemaEntry};
use crate::node::{IntBounds, IntNode, Node, NodeOps, NodeRef, UintBounds, UintNode};
use crate::parse::{ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::util::string::{parse_i64, parse_u64};
use crate::{ErrorKind, GrammarError};
use std::any::Any;

static INT_SCHEMA: &[SchemaEntry] = &[
    SchemaEntry::keyed(
        "min",
        "The minimum accepted value (default: no lower bound).",
        ConfigType::I64,
    ),
    SchemaEntry::keyed(
        "max",
        "The maximum accepted value (default: no upper bound).",
        ConfigType::I64,
    ),
    SchemaEntry::keyed(
        "base",
        "The numeric base; 0 resolves it from the token prefix (default).",
        ConfigType::U64,
    ),
];

static UINT_SCHEMA: &[SchemaEntry] = &[
    SchemaEntry::keyed(
        "min",
        "The minimum accepted value (default: no lower bound).",
        ConfigType::U64,
    ),
    SchemaEntry::keyed(
        "max",
        "The maximum accepted value (default: no upper bound).",
        ConfigType::U64,
    ),
    SchemaEntry::keyed(
        "base",
        "The numeric base; 0 resolves it from the token prefix (default).",
        ConfigType::U64,
    ),
];

fn config_base(config: &Config) -> Result<u32, GrammarError> {
    let base = match config.dict_get("base") {
        Some(value) => value.as_u64().unwrap_or(0),
        None => 0,
    };
    if base != 0 && !(2..=36).contains(&base) {
        return Err(GrammarError::new(
            ErrorKind::InvalidArgument,
            format!("unsupported numeric base {}", base),
        ));
    }
    Ok(base as u32)
}

impl IntNode {
    /// Create a node matching one token read as a signed integer in
    /// `min..=max`. Base 0 resolves the base from the token prefix.
    pub fn new(id: &str, min: i64, max: i64, base: u32) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(IntNode::default()), id);
        let mut cfg = Config::dict();
        cfg.dict_set("min", Config::I64(min))?;
        cfg.dict_set("max", Config::I64(max))?;
        cfg.dict_set("base", Config::U64(base as u64))?;
        node.set_config(cfg)?;
        Ok(node)
    }

    /// Re-read the numeric value of a token matched by this node. The
    /// parse tree does not store it.
    pub fn get_value(node: &NodeRef, token: &str) -> Result<i64, GrammarError> {
        let ops: &IntNode = node.ops_as("int")?;
        let bounds = ops.bounds.borrow();
        let bounds = bounds.as_ref().ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "int node is not configured")
        })?;
        parse_i64(token, bounds.base, bounds.min, bounds.max)
    }
}

impl NodeOps for IntNode {
    fn type_name(&self) -> &'static str {
        "int"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        Some(INT_SCHEMA)
    }

    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        let base = config_base(config)?;
        let min = config
            .dict_get("min")
            .and_then(Config::as_i64)
            .unwrap_or(i64::MIN);
        let max = config
            .dict_get("max")
            .and_then(Config::as_i64)
            .unwrap_or(i64::MAX);
        *self.bounds.borrow_mut() = Some(IntBounds { min, max, base });
        Ok(())
    }

    fn parse(
        &self,
        _node: &NodeRef,
        _state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        let bounds = self.bounds.borrow();
        let bounds = bounds.as_ref().ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "int node is not configured")
        })?;
        match strvec.val(0) {
            Some(token) if parse_i64(token, bounds.base, bounds.min, bounds.max).is_ok() => {
                Ok(ParseResult::Match(1))
            }
            _ => Ok(ParseResult::NoMatch),
        }
    }

    fn desc(&self) -> Option<String> {
        self.bounds
            .borrow()
            .as_ref()
            .map(|b| format!("int({}..{})", b.min, b.max))
    }
}

impl UintNode {
    /// Create a node matching one token read as an unsigned integer in
    /// `min..=max`. Base 0 resolves the base from the token prefix.
    pub fn new(id: &str, min: u64, max: u64, base: u32) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(UintNode::default()), id);
        let mut cfg = Config::dict();
        cfg.dict_set("min", Config::U64(min))?;
        cfg.dict_set("max", Config::U64(max))?;
        cfg.dict_set("base", Config::U64(base as u64))?;
        node.set_config(cfg)?;
        Ok(node)
    }

    /// Re-read the numeric value of a token matched by this node.
    pub fn get_value(node: &NodeRef, token: &str) -> Result<u64, GrammarError> {
        let ops: &UintNode = node.ops_as("uint")?;
        let bounds = ops.bounds.borrow();
        let bounds = bounds.as_ref().ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "uint node is not configured")
        })?;
        parse_u64(token, bounds.base, bounds.min, bounds.max)
    }
}

impl NodeOps for UintNode {
    fn type_name(&self) -> &'static str {
        "uint"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        Some(UINT_SCHEMA)
    }

    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        let base = config_base(config)?;
        let min = config
            .dict_get("min")
            .and_then(Config::as_u64)
            .unwrap_or(u64::MIN);
        let max = config
            .dict_get("max")
            .and_then(Config::as_u64)
            .unwrap_or(u64::MAX);
        *self.bounds.borrow_mut() = Some(UintBounds { min, max, base });
        Ok(())
    }

    fn parse(
        &self,
        _node: &NodeRef,
        _state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        let bounds = self.bounds.borrow();
        let bounds = bounds.as_ref().ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "uint node is not configured")
        })?;
        match strvec.val(0) {
            Some(token) if parse_u64(token, bounds.base, bounds.min, bounds.max).is_ok() => {
                Ok(ParseResult::Match(1))
            }
            _ => Ok(ParseResult::NoMatch),
        }
    }

    fn desc(&self) -> Option<String> {
        self.bounds
            .borrow()
            .as_ref()
            .map(|b| format!("uint({}..{})", b.min, b.max))
    }
}
