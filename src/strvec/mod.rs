//! The token vector every grammar node parses and completes against.
//!
//! Elements are shared: [StrVec::clone] and [StrVec::ndup] copy references,
//! not strings, so the recursive descent can slice the input at every offset
//! without reallocating. Writing attributes to a shared element copies it
//! first.

mod shlex;


pub use shlex::{sh_lex_str, LexFlags};

use crate::attrs::Attrs;
use crate::{ErrorKind, GrammarError};
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// Token attribute: byte offset of the token start in the pre-lexing string.
pub const ATTR_START: &str = "start";
/// Token attribute: byte offset one past the token end in the pre-lexing
/// string.
pub const ATTR_END: &str = "end";

#[derive(Clone)]
struct TokenElt {
    value: String,
    attrs: Option<Attrs>,
}

#[derive(Clone, Default)]
/// An ordered sequence of tokens, each carrying an optional attribute
/// dictionary.
pub struct StrVec {
    elts: Vec<Rc<TokenElt>>,
}

impl StrVec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_array<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut vec = Self::new();
        for token in tokens {
            vec.add(token.as_ref());
        }
        vec
    }

    pub fn len(&self) -> usize {
        self.elts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elts.is_empty()
    }

    /// Append a token.
    pub fn add(&mut self, s: impl Into<String>) {
        self.elts.push(Rc::new(TokenElt {
            value: s.into(),
            attrs: None,
        }));
    }

    /// Replace the token at `idx` with a fresh one. Attributes of the old
    /// token are not carried over.
    pub fn set(&mut self, idx: usize, s: impl Into<String>) -> Result<(), GrammarError> {
        let slot = self.elts.get_mut(idx).ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "token index out of bounds")
        })?;
        *slot = Rc::new(TokenElt {
            value: s.into(),
            attrs: None,
        });
        Ok(())
    }

    pub fn del_last(&mut self) -> Result<(), GrammarError> {
        match self.elts.pop() {
            Some(_) => Ok(()),
            None => Err(GrammarError::new(
                ErrorKind::InvalidArgument,
                "token vector is empty",
            )),
        }
    }

    /// The token value at `idx`.
    pub fn val(&self, idx: usize) -> Option<&str> {
        self.elts.get(idx).map(|e| e.value.as_str())
    }

    /// A sub-vector of `len` tokens starting at `off`, sharing the
    /// underlying elements. Fails when `off + len` overruns the vector.
    pub fn ndup(&self, off: usize, len: usize) -> Result<StrVec, GrammarError> {
        if off + len > self.elts.len() {
            return Err(GrammarError::new(
                ErrorKind::InvalidArgument,
                "sub-vector out of bounds",
            ));
        }
        Ok(StrVec {
            elts: self.elts[off..off + len].to_vec(),
        })
    }

    /// Everything from `off` to the end, sharing the underlying elements.
    pub fn ndup_tail(&self, off: usize) -> Result<StrVec, GrammarError> {
        self.ndup(off, self.elts.len().saturating_sub(off))
    }

    pub fn attrs(&self, idx: usize) -> Option<&Attrs> {
        self.elts.get(idx).and_then(|e| e.attrs.as_ref())
    }

    /// Attach an attribute dictionary to the token at `idx`. A shared
    /// element is copied first so aliasing vectors are unaffected.
    pub fn set_attrs(&mut self, idx: usize, attrs: Attrs) -> Result<(), GrammarError> {
        let slot = self.elts.get_mut(idx).ok_or_else(|| {
            GrammarError::new(ErrorKind::InvalidArgument, "token index out of bounds")
        })?;
        Rc::make_mut(slot).attrs = Some(attrs);
        Ok(())
    }

    /// Byte offset of the token start in the original input, when the token
    /// came out of the tokenizer.
    pub fn token_start(&self, idx: usize) -> Option<usize> {
        self.attrs(idx)?.get_as::<usize, _>(ATTR_START).copied()
    }

    /// Byte offset one past the token end in the original input.
    pub fn token_end(&self, idx: usize) -> Option<usize> {
        self.attrs(idx)?.get_as::<usize, _>(ATTR_END).copied()
    }

    /// Sort tokens by value with a caller-provided comparator. Attributes
    /// follow their token.
    pub fn sort_by(&mut self, cmp: impl Fn(&str, &str) -> Ordering) {
        self.elts.sort_by(|a, b| cmp(&a.value, &b.value));
    }

    /// Sort tokens lexicographically.
    pub fn sort(&mut self) {
        self.sort_by(|a, b| a.cmp(b));
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.elts.iter().map(|e| e.value.as_str())
    }
}

/// Token values are compared; attributes are ignored.
impl PartialEq for StrVec {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for StrVec {}

impl Display for StrVec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, val) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", val)?;
        }
        write!(f, "]")
    }
}

impl Debug for StrVec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<S: Into<String>> FromIterator<S> for StrVec {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut vec = Self::new();
        for s in iter {
            vec.add(s);
        }
        vec
    }
}
