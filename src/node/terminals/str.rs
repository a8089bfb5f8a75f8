use crate::complete::{CompKind, Completion};
use crate::config::{Config, ConfigType, SchemaEntry};
use crate::node::{Node, NodeOps, NodeRef, StrNode};
use crate::parse::{ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::util::string::common_prefix_len;
use crate::{ErrorKind, GrammarError};
use std::any::Any;

static STR_SCHEMA: &[SchemaEntry] = &[SchemaEntry::keyed(
    "string",
    "The string to match.",
    ConfigType::String,
)];

impl StrNode {
    /// Create a node matching exactly one token equal to `string`.
    pub fn new(id: &str, string: &str) -> Result<NodeRef, GrammarError> {
        let node = Node::with_ops(Box::new(StrNode::default()), id);
        Self::set_str(&node, string)?;
        Ok(node)
    }

    /// Replace the literal of an existing str node.
    pub fn set_str(node: &NodeRef, string: &str) -> Result<(), GrammarError> {
        node.check_type("str")?;
        let mut cfg = Config::dict();
        cfg.dict_set("string", Config::String(string.to_string()))?;
        node.set_config(cfg)
    }

    fn string(&self) -> Result<String, GrammarError> {
        self.string.borrow().clone().ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "str node is not configured")
        })
    }
}

impl NodeOps for StrNode {
    fn type_name(&self) -> &'static str {
        "str"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> Option<&'static [SchemaEntry]> {
        Some(STR_SCHEMA)
    }

    fn apply_config(&self, config: &Config) -> Result<(), GrammarError> {
        let value = config
            .dict_get("string")
            .and_then(Config::as_str)
            .ok_or_else(|| {
                GrammarError::new(
                    ErrorKind::InvalidArgument,
                    "a str node needs a \"string\" config",
                )
            })?;
        *self.string.borrow_mut() = Some(value.to_string());
        Ok(())
    }

    fn parse(
        &self,
        _node: &NodeRef,
        _state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        let string = self.string()?;
        match strvec.val(0) {
            Some(token) if token == string => Ok(ParseResult::Match(1)),
            _ => Ok(ParseResult::NoMatch),
        }
    }

    fn complete(
        &self,
        node: &NodeRef,
        comp: &mut Completion,
        strvec: &StrVec,
    ) -> Result<(), GrammarError> {
        if strvec.len() != 1 {
            return Ok(());
        }
        let string = self.string()?;
        let token = strvec.val(0).expect("vector has one token");

        // suggest the literal only when the token is a prefix of it
        if common_prefix_len(token, &string) == token.len() {
            comp.add_item(node, CompKind::Full, Some(token), Some(&string))?;
        }
        Ok(())
    }

    fn desc(&self) -> Option<String> {
        self.string.borrow().clone()
    }
}
