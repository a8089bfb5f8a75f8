//! Attribute dictionaries attached to nodes, tokens, parse-tree nodes,
//! completion groups and items.
//!
//! Values are type-erased and reference counted: duplicating a dictionary
//! shares its entries, and the last owner of an entry releases the value.

use crate::{ErrorKind, GrammarError};
use std::any::Any;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::rc::Rc;

/// A shared, type-erased attribute value.
pub type AttrValue = Rc<dyn Any>;

#[derive(Clone, Default)]
/// An unordered map from a key to a shared [AttrValue].
///
/// The engine itself only ever writes the tokenizer offsets
/// ([ATTR_START](crate::strvec::ATTR_START) /
/// [ATTR_END](crate::strvec::ATTR_END)); everything else is caller-defined
/// and opaque to the library.
pub struct Dict<K: Eq + Hash> {
    entries: HashMap<K, AttrValue>,
}

/// String-keyed attribute dictionary.
pub type Attrs = Dict<String>;

/// Byte-keyed attribute dictionary, for callers whose keys are not text.
pub type ByteAttrs = Dict<Vec<u8>>;

impl<K: Eq + Hash> Dict<K> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Insert or replace an entry. The previous value, if any, is returned;
    /// dropping it releases the old attribute.
    pub fn set(&mut self, key: impl Into<K>, value: AttrValue) -> Option<AttrValue> {
        self.entries.insert(key.into(), value)
    }

    /// Convenience wrapper boxing a concrete value into an [AttrValue].
    pub fn set_value<T: 'static>(&mut self, key: impl Into<K>, value: T) -> Option<AttrValue> {
        self.set(key, Rc::new(value))
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&AttrValue>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Fetch an entry downcast to a concrete type. `None` when the key is
    /// absent or holds a value of another type.
    pub fn get_as<T: 'static, Q>(&self, key: &Q) -> Option<&T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn del<Q>(&mut self, key: &Q) -> Result<(), GrammarError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.remove(key) {
            Some(_) => Ok(()),
            None => Err(GrammarError::new(ErrorKind::NotFound, "no such attribute")),
        }
    }

    /// Unordered iteration over entries.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &AttrValue)> {
        self.entries.iter()
    }
}

impl<K: Eq + Hash + Debug> Debug for Dict<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut set = f.debug_set();
        for key in self.entries.keys() {
            set.entry(key);
        }
        set.finish()
    }
}
