use crate::complete::{CompKind, Completion};
use crate::node::{FileNode, Node, NodeOps, NodeRef};
use crate::parse::{ParseNodeRef, ParseResult};
use crate::strvec::StrVec;
use crate::GrammarError;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
/// One entry of a listed directory.
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// The filesystem surface of the file node, replaceable so tests can stub
/// directory listings deterministically.
pub trait FileOps {
    /// Whether `path` is a directory, without following a final symlink.
    fn is_dir(&self, path: &str) -> std::io::Result<bool>;

    /// The entries of the directory at `path`, each resolved to
    /// file-or-directory.
    fn read_dir(&self, path: &str) -> std::io::Result<Vec<DirEntry>>;
}

/// The default [FileOps], backed by the standard library.
pub struct OsFileOps;

impl FileOps for OsFileOps {
    fn is_dir(&self, path: &str) -> std::io::Result<bool> {
        std::fs::symlink_metadata(path).map(|meta| meta.is_dir())
    }

    fn read_dir(&self, path: &str) -> std::io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        Ok(entries)
    }
}

thread_local! {
    static FILE_OPS: RefCell<Rc<dyn FileOps>> = RefCell::new(Rc::new(OsFileOps));
}

/// Install the filesystem operations used by every file node of this
/// thread.
pub fn set_file_ops(ops: Rc<dyn FileOps>) {
    FILE_OPS.with(|cell| *cell.borrow_mut() = ops);
}

fn file_ops() -> Rc<dyn FileOps> {
    FILE_OPS.with(|cell| cell.borrow().clone())
}

/// Split a path at its last slash; the directory part keeps the slash.
///
///   path       dirname   basename
///   /usr/lib   /usr/     lib
///   /usr/      /usr/
///   usr                  usr
///   /          /
fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(pos) => path.split_at(pos + 1),
        None => ("", path),
    }
}

impl FileNode {
    /// Create a node matching any one token and completing it as a
    /// filesystem path.
    pub fn new(id: &str) -> NodeRef {
        Node::with_ops(Box::new(FileNode), id)
    }
}

impl NodeOps for FileNode {
    fn type_name(&self) -> &'static str {
        "file"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn parse(
        &self,
        _node: &NodeRef,
        _state: &ParseNodeRef,
        strvec: &StrVec,
    ) -> Result<ParseResult, GrammarError> {
        if strvec.is_empty() {
            Ok(ParseResult::NoMatch)
        } else {
            Ok(ParseResult::Match(1))
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
        let input = strvec.val(0).expect("vector has one token");
        let (dname, bname) = split_path(input);
        let effective_dir = if dname.is_empty() { "." } else { dname };

        let ops = file_ops();
        // filesystem misses are not completion errors
        match ops.is_dir(effective_dir) {
            Ok(true) => {}
            _ => return Ok(()),
        }
        let entries = match ops.read_dir(effective_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(()),
        };

        for entry in entries {
            if !entry.name.starts_with(bname) {
                continue;
            }
            // hidden entries only when the basename asks for them
            if !bname.starts_with('.') && entry.name.starts_with('.') {
                continue;
            }

            let suffix = &entry.name[bname.len()..];
            if entry.is_dir {
                let value = format!("{}{}/", input, suffix);
                let item = comp.add_item(node, CompKind::Partial, Some(input), Some(&value))?;
                item.set_display(format!("{}/", entry.name));
            } else {
                let value = format!("{}{}", input, suffix);
                let item = comp.add_item(node, CompKind::Full, Some(input), Some(&value))?;
                item.set_display(entry.name.clone());
            }
        }
        Ok(())
    }
}
