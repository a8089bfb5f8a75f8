//! Typed configuration values and the schemas node kinds validate them
//! against.
//!
//! A node kind declares a static [SchemaEntry] table; applying a [Config] to
//! a node first checks it against that table, then hands it to the kind. On
//! any failure the node keeps its previous configuration untouched.

#[cfg(test)]
mod __tests__;

use crate::node::NodeRef;
use crate::{ErrorKind, GrammarError};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Write};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The tag of a [Config] value.
pub enum ConfigType {
    Bool,
    I64,
    U64,
    String,
    Node,
    List,
    Dict,
}

#[derive(Clone)]
/// A configuration value: a scalar, a node reference, or a nested
/// list/dict.
///
/// `clone` is a deep copy for scalars, strings and containers, and a shared
/// reference for node values.
pub enum Config {
    Bool(bool),
    I64(i64),
    U64(u64),
    String(String),
    Node(NodeRef),
    List(Vec<Config>),
    Dict(HashMap<String, Config>),
}

impl Config {
    /// An empty list value.
    pub fn list() -> Self {
        Config::List(Vec::new())
    }

    /// An empty dict value.
    pub fn dict() -> Self {
        Config::Dict(HashMap::new())
    }

    pub fn get_type(&self) -> ConfigType {
        match self {
            Config::Bool(_) => ConfigType::Bool,
            Config::I64(_) => ConfigType::I64,
            Config::U64(_) => ConfigType::U64,
            Config::String(_) => ConfigType::String,
            Config::Node(_) => ConfigType::Node,
            Config::List(_) => ConfigType::List,
            Config::Dict(_) => ConfigType::Dict,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Config::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Config::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Config::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Config::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Config::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Config]> {
        match self {
            Config::List(l) => Some(l),
            _ => None,
        }
    }

    /// Append a value to a list config.
    pub fn list_add(&mut self, value: Config) -> Result<(), GrammarError> {
        match self {
            Config::List(l) => {
                l.push(value);
                Ok(())
            }
            _ => Err(GrammarError::new(
                ErrorKind::InvalidArgument,
                "not a list config",
            )),
        }
    }

    /// Insert or replace a key of a dict config.
    pub fn dict_set(&mut self, key: impl Into<String>, value: Config) -> Result<(), GrammarError> {
        match self {
            Config::Dict(d) => {
                d.insert(key.into(), value);
                Ok(())
            }
            _ => Err(GrammarError::new(
                ErrorKind::InvalidArgument,
                "not a dict config",
            )),
        }
    }

    /// Look up a key of a dict config. `None` when the key is absent or
    /// the value is not a dict.
    pub fn dict_get(&self, key: &str) -> Option<&Config> {
        match self {
            Config::Dict(d) => d.get(key),
            _ => None,
        }
    }

    pub fn dict_get_mut(&mut self, key: &str) -> Option<&mut Config> {
        match self {
            Config::Dict(d) => d.get_mut(key),
            _ => None,
        }
    }
}

/// Deep equality; node values compare by identity.
impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Config::Bool(a), Config::Bool(b)) => a == b,
            (Config::I64(a), Config::I64(b)) => a == b,
            (Config::U64(a), Config::U64(b)) => a == b,
            (Config::String(a), Config::String(b)) => a == b,
            (Config::Node(a), Config::Node(b)) => Rc::ptr_eq(a, b),
            (Config::List(a), Config::List(b)) => a == b,
            (Config::Dict(a), Config::Dict(b)) => a == b,
            _ => false,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Config::Bool(v) => write!(f, "{}", v),
            Config::I64(v) => write!(f, "{}", v),
            Config::U64(v) => write!(f, "{}", v),
            Config::String(s) => write!(f, "{:?}", s),
            Config::Node(n) => write!(f, "node({})", n.id()),
            Config::List(l) => f.debug_list().entries(l.iter()).finish(),
            Config::Dict(d) => f.debug_map().entries(d.iter()).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// One entry of a node kind's configuration schema.
///
/// Entries of a dict schema carry a key; the single entry of a list
/// subschema describes the element type and has no key.
pub struct SchemaEntry {
    pub key: Option<&'static str>,
    pub desc: &'static str,
    pub ty: ConfigType,
    pub subschema: Option<&'static [SchemaEntry]>,
}

impl SchemaEntry {
    pub const fn keyed(key: &'static str, desc: &'static str, ty: ConfigType) -> Self {
        Self {
            key: Some(key),
            desc,
            ty,
            subschema: None,
        }
    }

    pub const fn keyed_sub(
        key: &'static str,
        desc: &'static str,
        ty: ConfigType,
        subschema: &'static [SchemaEntry],
    ) -> Self {
        Self {
            key: Some(key),
            desc,
            ty,
            subschema: Some(subschema),
        }
    }

    pub const fn elem(desc: &'static str, ty: ConfigType) -> Self {
        Self {
            key: None,
            desc,
            ty,
            subschema: None,
        }
    }
}

fn validate_value(entry: &SchemaEntry, value: &Config) -> Result<(), GrammarError> {
    if value.get_type() != entry.ty {
        return Err(GrammarError::new(
            ErrorKind::InvalidArgument,
            format!(
                "config value for {:?} has type {:?}, expected {:?}",
                entry.key.unwrap_or("<element>"),
                value.get_type(),
                entry.ty
            ),
        ));
    }

    match value {
        Config::List(elems) => {
            let sub = entry.subschema.ok_or_else(|| {
                GrammarError::new(ErrorKind::InvalidArgument, "list entry without subschema")
            })?;
            let elem_entry = sub.first().ok_or_else(|| {
                GrammarError::new(ErrorKind::InvalidArgument, "empty list subschema")
            })?;
            for elem in elems {
                validate_value(elem_entry, elem)?;
            }
            Ok(())
        }
        Config::Dict(_) => {
            let sub = entry.subschema.ok_or_else(|| {
                GrammarError::new(ErrorKind::InvalidArgument, "dict entry without subschema")
            })?;
            validate(sub, value)
        }
        _ => Ok(()),
    }
}

/// Check a configuration dict against a schema table: every key must be
/// known and every value must have the declared type, recursively.
pub fn validate(schema: &[SchemaEntry], config: &Config) -> Result<(), GrammarError> {
    let dict = match config {
        Config::Dict(d) => d,
        _ => {
            return Err(GrammarError::new(
                ErrorKind::InvalidArgument,
                "node configuration must be a dict",
            ))
        }
    };

    for (key, value) in dict {
        let entry = schema
            .iter()
            .find(|e| e.key == Some(key.as_str()))
            .ok_or_else(|| {
                GrammarError::new(
                    ErrorKind::InvalidArgument,
                    format!("unknown config key {:?}", key),
                )
            })?;
        validate_value(entry, value)?;
    }

    Ok(())
}

/// Human-readable description of a schema table.
pub fn schema_dump(schema: &[SchemaEntry]) -> String {
    let mut out = String::new();
    for entry in schema {
        let _ = writeln!(
            out,
            "{}: {:?} - {}",
            entry.key.unwrap_or("<element>"),
            entry.ty,
            entry.desc
        );
        if let Some(sub) = entry.subschema {
            for line in schema_dump(sub).lines() {
                let _ = writeln!(out, "    {}", line);
            }
        }
    }
    out
}
