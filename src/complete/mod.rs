//! The completion set and the complete drivers.
//!
//! Completing walks the grammar the way parsing does, but instead of a
//! parse tree it collects [CompItem]s: the possible continuations of the
//! trailing token. Items emitted within one [complete_child] call form a
//! [CompGroup] carrying a snapshot of the in-progress parse tree, so
//! callers can render contextual help for each suggestion.


use crate::attrs::Attrs;
use crate::node::NodeRef;
use crate::parse::{ParseNode, ParseNodeRef};
use crate::strvec::StrVec;
use crate::util::string::common_prefix_len;
use crate::{ErrorKind, GrammarError};
use std::fmt::Write;
use std::ops::BitOr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The nature of a completion item.
pub enum CompKind {
    /// The grammar accepts values here but cannot enumerate them.
    Unknown,
    /// A complete value: accepting it ends the token.
    Full,
    /// A value that extends the token without ending it, e.g. a directory
    /// component of a path.
    Partial,
}

impl CompKind {
    const fn bit(self) -> u8 {
        match self {
            CompKind::Unknown => 0x1,
            CompKind::Full => 0x2,
            CompKind::Partial => 0x4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A set of [CompKind]s, used to filter iteration and counting.
pub struct CompMask(u8);

impl CompMask {
    pub const ALL: CompMask = CompMask(0x7);

    pub fn contains(self, kind: CompKind) -> bool {
        self.0 & kind.bit() != 0
    }
}

impl From<CompKind> for CompMask {
    fn from(kind: CompKind) -> Self {
        CompMask(kind.bit())
    }
}

impl BitOr for CompKind {
    type Output = CompMask;

    fn bitor(self, rhs: CompKind) -> CompMask {
        CompMask(self.bit() | rhs.bit())
    }
}

impl BitOr<CompKind> for CompMask {
    type Output = CompMask;

    fn bitor(self, rhs: CompKind) -> CompMask {
        CompMask(self.0 | rhs.bit())
    }
}

/// One possible continuation of the input.
#[derive(Debug)]
pub struct CompItem {
    node: NodeRef,
    kind: CompKind,
    group: usize,
    start: Option<String>,
    value: Option<String>,
    display: Option<String>,
    completion: Option<String>,
    attrs: Attrs,
}

impl CompItem {
    /// The grammar node that emitted the item.
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn kind(&self) -> CompKind {
        self.kind
    }

    /// Index of the group the item belongs to, see [Completion::groups].
    pub fn group_index(&self) -> usize {
        self.group
    }

    /// The token the completion started from, usually the trailing partial
    /// token. Absent on *unknown* items.
    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// The literal completion value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// What to show the user; defaults to the value.
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// The characters to append to the input; defaults to the suffix of the
    /// value past the start token.
    pub fn completion(&self) -> Option<&str> {
        self.completion.as_deref()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    pub fn set_display(&mut self, display: impl Into<String>) {
        self.display = Some(display.into());
    }

    pub fn set_completion(&mut self, completion: impl Into<String>) {
        self.completion = Some(completion.into());
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }
}

/// The items emitted within one completion delegation, with the parse
/// context they were produced in.
pub struct CompGroup {
    node: NodeRef,
    state: ParseNodeRef,
    items: Vec<CompItem>,
    attrs: Attrs,
}

impl CompGroup {
    /// The grammar node the delegation targeted.
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    /// Snapshot of the in-progress parse tree at the moment the group was
    /// opened; the returned node is the current position in that tree.
    pub fn state(&self) -> &ParseNodeRef {
        &self.state
    }

    pub fn items(&self) -> &[CompItem] {
        &self.items
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }
}

#[derive(Default)]
/// A bag of completion items grouped by originating node.
pub struct Completion {
    groups: Vec<CompGroup>,
    count_unknown: usize,
    count_full: usize,
    count_partial: usize,
    cur_state: Option<ParseNodeRef>,
    cur_group: Option<usize>,
    attrs: Attrs,
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected items of the given kinds.
    pub fn count(&self, mask: impl Into<CompMask>) -> usize {
        let mask = mask.into();
        let mut count = 0;
        if mask.contains(CompKind::Unknown) {
            count += self.count_unknown;
        }
        if mask.contains(CompKind::Full) {
            count += self.count_full;
        }
        if mask.contains(CompKind::Partial) {
            count += self.count_partial;
        }
        count
    }

    pub fn groups(&self) -> &[CompGroup] {
        &self.groups
    }

    /// Iterate items of the given kinds, group by group, in insertion
    /// order.
    pub fn iter(&self, mask: impl Into<CompMask>) -> impl Iterator<Item = &CompItem> {
        let mask = mask.into();
        self.groups
            .iter()
            .flat_map(|g| g.items.iter())
            .filter(move |item| mask.contains(item.kind))
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    /// The in-progress parse tree position of the running completion.
    /// Node kinds use it to parse already-typed tokens while backtracking.
    pub fn cur_state(&self) -> Option<&ParseNodeRef> {
        self.cur_state.as_ref()
    }

    /// Emit one completion item for `node`.
    ///
    /// *Full* and *partial* items need both the start token and the value,
    /// and the value must extend the start token; the completion suffix and
    /// the display string are derived from them. *Unknown* items carry no
    /// strings.
    pub fn add_item(
        &mut self,
        node: &NodeRef,
        kind: CompKind,
        start: Option<&str>,
        value: Option<&str>,
    ) -> Result<&mut CompItem, GrammarError> {
        let (start, value, display, completion) = match kind {
            CompKind::Unknown => (start.map(String::from), None, None, None),
            _ => {
                let start = start.ok_or_else(|| {
                    GrammarError::new(ErrorKind::InvalidArgument, "completion item needs a start")
                })?;
                let value = value.ok_or_else(|| {
                    GrammarError::new(ErrorKind::InvalidArgument, "completion item needs a value")
                })?;
                if !value.starts_with(start) {
                    return Err(GrammarError::new(
                        ErrorKind::InvalidArgument,
                        format!("completion {:?} does not extend token {:?}", value, start),
                    ));
                }
                (
                    Some(start.to_string()),
                    Some(value.to_string()),
                    Some(value.to_string()),
                    Some(value[start.len()..].to_string()),
                )
            }
        };

        let group = match self.cur_group {
            Some(idx) => idx,
            None => {
                let state = match &self.cur_state {
                    Some(cur) => cur.dup(),
                    None => ParseNode::new(node),
                };
                self.groups.push(CompGroup {
                    node: node.clone(),
                    state,
                    items: Vec::new(),
                    attrs: Attrs::new(),
                });
                let idx = self.groups.len() - 1;
                self.cur_group = Some(idx);
                idx
            }
        };

        match kind {
            CompKind::Unknown => self.count_unknown += 1,
            CompKind::Full => self.count_full += 1,
            CompKind::Partial => self.count_partial += 1,
        }

        let items = &mut self.groups[group].items;
        items.push(CompItem {
            node: node.clone(),
            kind,
            group,
            start,
            value,
            display,
            completion,
            attrs: Attrs::new(),
        });
        Ok(items.last_mut().expect("item was just pushed"))
    }

    /// Append the groups of `other`, keeping their order.
    pub fn merge(&mut self, other: Completion) {
        let offset = self.groups.len();
        for mut group in other.groups {
            for item in &mut group.items {
                item.group += offset;
                match item.kind {
                    CompKind::Unknown => self.count_unknown += 1,
                    CompKind::Full => self.count_full += 1,
                    CompKind::Partial => self.count_partial += 1,
                }
            }
            self.groups.push(group);
        }
    }

    /// Human-readable list of the collected items.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if self.count(CompMask::ALL) == 0 {
            out.push_str("no completion\n");
            return out;
        }
        for item in self.iter(CompMask::ALL) {
            let _ = writeln!(
                out,
                "{:?} {:?} (display={:?}, completion={:?})",
                item.kind,
                item.value().unwrap_or("<none>"),
                item.display().unwrap_or("<none>"),
                item.completion().unwrap_or("<none>"),
            );
        }
        out
    }

    pub(crate) fn groups_len(&self) -> usize {
        self.groups.len()
    }

    /// Mutable access to the items of the groups added at or after
    /// `group_start`. The shell-lexer node uses it to rewrite the items a
    /// child completion just produced.
    pub(crate) fn items_mut_from(
        &mut self,
        group_start: usize,
        mask: CompMask,
    ) -> impl Iterator<Item = &mut CompItem> {
        self.groups
            .iter_mut()
            .skip(group_start)
            .flat_map(|g| g.items.iter_mut())
            .filter(move |item| mask.contains(item.kind))
    }
}

/// Run a child grammar node's completion into `comp`, opening a fresh
/// group scope and a fresh parse-tree position for it.
pub fn complete_child(
    node: &NodeRef,
    comp: &mut Completion,
    strvec: &StrVec,
) -> Result<(), GrammarError> {
    if let Some(log) = node.log() {
        log.log_entry();
    }

    let child_state = ParseNode::new(node);
    if let Some(cur) = comp.cur_state.as_ref() {
        ParseNode::link_child(cur, &child_state);
    }
    let saved_state = comp.cur_state.replace(child_state.clone());
    let saved_group = comp.cur_group.take();

    let ret = node.ops().complete(node, comp, strvec);

    comp.cur_state = saved_state;
    comp.cur_group = saved_group;
    ParseNode::unlink(&child_state);

    ret
}

/// The fallback completion of node kinds without a `complete`
/// implementation: one *unknown* item recording that values are accepted
/// here without being enumerable.
pub fn complete_unknown(
    node: &NodeRef,
    comp: &mut Completion,
    strvec: &StrVec,
) -> Result<(), GrammarError> {
    if strvec.len() != 1 {
        return Ok(());
    }
    comp.add_item(node, CompKind::Unknown, None, None)?;
    Ok(())
}

/// Complete a token vector against a grammar. The trailing element is the
/// token being completed; pass an empty trailing token to enumerate what
/// may begin there.
pub fn complete_strvec(node: &NodeRef, strvec: &StrVec) -> Result<Completion, GrammarError> {
    let mut comp = Completion::new();
    complete_child(node, &mut comp, strvec)?;
    Ok(comp)
}

/// Complete a single-string input: the string becomes a one-token vector,
/// which suits a grammar whose root is a shell-lexer node.
pub fn complete(node: &NodeRef, input: &str) -> Result<Completion, GrammarError> {
    let mut vec = StrVec::new();
    vec.add(input);
    complete_strvec(node, &vec)
}

/// Widen every token that has a single unambiguous completion of the given
/// kinds to that completion's shared prefix. The expand mode of the
/// shell-lexer node runs this before parsing, so unambiguous abbreviations
/// are accepted.
pub fn expand_strvec(
    node: &NodeRef,
    mask: impl Into<CompMask>,
    strvec: &StrVec,
) -> Result<StrVec, GrammarError> {
    let mask = mask.into();
    let mut out = strvec.clone();

    for i in 0..out.len() {
        let prefix_vec = out.ndup(0, i + 1)?;
        let comp = complete_strvec(node, &prefix_vec)?;

        let mut common: Option<String> = None;
        for item in comp.iter(mask) {
            if let Some(value) = item.value() {
                common = Some(match common {
                    None => value.to_string(),
                    Some(prefix) => {
                        let len = common_prefix_len(&prefix, value);
                        prefix[..len].to_string()
                    }
                });
            }
        }

        if let Some(widened) = common {
            let token = out.val(i).expect("index is in bounds");
            // only typed abbreviations are widened, never an empty slot
            if !token.is_empty() && widened.len() > token.len() && widened.starts_with(token) {
                out.set(i, widened)?;
            }
        }
    }

    Ok(out)
}
