//! Wrapper node kinds: they alter the behavior of a single child.

mod bypass;
mod many;
mod once;
mod option;
mod sh_lex;
