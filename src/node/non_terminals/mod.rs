//! Non-terminal node kinds: they combine the matches of several children.

mod or;
mod seq;
mod subset;
