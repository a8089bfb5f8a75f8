//! Terminal node kinds: they match tokens directly and emit completion
//! items themselves.

mod any;
mod dynlist;
mod empty;
mod file;
mod int;
mod none;
mod re;
mod space;
mod str;

pub use file::{set_file_ops, DirEntry, FileOps, OsFileOps};
