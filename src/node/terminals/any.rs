use crate::config::{Config, ConfigType, SchemaEntry};
use crate::node::{AnyNode, Node, NodeOps, NodeRef};
use crate::parse::{ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::GrammarError;
use std::any::Any;

static ANY_SCHEMA: &[SchemaEntry] = &[SchemaEntry::keyed(
    "attr",
    "The attribute the token must carry (optional).",
    ConfigType::String,
)];

impl AnyNode {
    /// Create a node matching any one token. With `attr` set, the token
    /// must carry that attribute key.
    pub fn new(id: &str, attr: Option<&str>) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(AnyNode::default()), id);
        let mut cfg = Config::dict();
        if let Some(attr) = attr {
            cfg.dict_set("attr", Config::String(attr.to_string()))?;
        }
        node.set_config(cfg)?;
        Ok(node)
    }
}

impl NodeOps for AnyNode {
    fn type_name(&self) -> &'static str {
        "any"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        Some(ANY_SCHEMA)
    }

    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        *self.attr_name.borrow_mut() = config
            .dict_get("attr")
            .and_then(Config::as_str)
            .map(String::from);
        Ok(())
    }

    fn parse(
        &self,
        _node: &NodeRef,
        _state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        if strvec.is_empty() {
            return Ok(ParseResult::NoMatch);
        }
        if let Some(required) = self.attr_name.borrow().as_deref() {
            match strvec.attrs(0) {
                Some(attrs) if attrs.has_key(required) => {}
                _ => return Ok(ParseResult::NoMatch),
            }
        }
        Ok(ParseResult::Match(1))
    }

    // no complete implementation: the unknown fallback is exactly what
    // "any token" means to the user
}
