use crate::config::{Config, ConfigType, SchemaEntry};
use crate::node::{Node, NodeOps, NodeRef, ReNode};
use crate::parse::{ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::{ErrorKind, GrammarError};
use regex::Regex;
use std::any::Any;

static RE_SCHEMA: &[SchemaEntry] = &[SchemaEntry::keyed(
    "pattern",
    "The regular expression the whole token must match.",
    ConfigType::String,
)];

/// Compile a pattern anchored on both ends, so a match always covers the
/// whole token.
pub(crate) fn compile_anchored(pattern: &str) -> Result<Regex, GrammarError> {
    Regex::new(&format!(r"\A(?:{})\z", pattern)).map_err(|err| {
        GrammarError::new(
            ErrorKind::InvalidArgument,
            format!("invalid pattern {:?}: {}", pattern, err),
        )
    })
}

impl ReNode {
    /// Create a node matching one token against `pattern`. The whole token
    /// must match, not just a substring.
    pub fn new(id: &str, pattern: &str) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(ReNode::default()), id);
        Self::set_pattern(&node, pattern)?;
        Ok(node)
    }

    /// Replace the pattern of an existing re node. On an invalid pattern
    /// the previous one is kept.
    pub fn set_pattern(node: &NodeRef, pattern: &str) -> Result<(), GrammarError> {
        node.check_type("re")?;
        let mut cfg = Config::dict();
        cfg.dict_set("pattern", Config::String(pattern.to_string()))?;
        node.set_config(cfg)
    }
}

impl NodeOps for ReNode {
    fn type_name(&self) -> &'static str {
        "re"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        Some(RE_SCHEMA)
    }

    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        let pattern = config
            .dict_get("pattern")
            .and_then(Config::as_str)
            .ok_or_else(|| {
                GrammarError::new(
                    ErrorKind::InvalidArgument,
                    "a re node needs a \"pattern\" config",
                )
            })?;
        let compiled = compile_anchored(pattern)?;
        *self.regex.borrow_mut() = Some((pattern.to_string(), compiled));
        Ok(())
    }

    fn parse(
        &self,
        _node: &NodeRef,
        _state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        let regex = self.regex.borrow();
        let (_, regex) = regex.as_ref().ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "re node is not configured")
        })?;
        match strvec.val(0) {
            Some(token) if regex.is_match(token) => Ok(ParseResult::Match(1)),
            _ => Ok(ParseResult::NoMatch),
        }
    }

    // no complete implementation: a pattern cannot enumerate its matches,
    // the driver falls back to a single unknown item
}
