//! Step module: the executable units of a compiled pattern.
//!
//! Every step receives the current node and value, derives a new pair and hands it to its
//! successor, or stops the whole walk with a no-match (`None`). A few steps look at what the
//! rest of the chain returns: Down tries the rest once per child, IsNull inverts it and
//! DefaultValue provides the fallback for a later Lookup.

use crate::lookup::{lookup_value, LookupTable};
use crate::tree::TreeNode;
use crate::types::{ChildRange, WordRange};
use crate::version::VersionCleaner;
use crate::walk_list::WalkList;
use std::fmt;
use std::sync::Arc;

/// Outcome of walking a step chain: the produced value, or `None` for a no-match.
pub type WalkResult = Option<String>;

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum StepKind {
    /// Children in `range` (counting only children called `name`, when given), first success wins.
    Down { range: ChildRange, name: Option<String> },
    Up,
    Next,
    Prev,
    Equals(String),
    NotEquals(String),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    /// Succeeds only when the rest of the chain does not.
    IsNull,
    CleanVersion(Arc<dyn VersionCleaner>),
    WordRange(WordRange),
    FixedString(String),
    BackToFull,
    DefaultValue(String),
    /// `with_default` pairs this lookup with the DefaultValue step compiled for it.
    Lookup { name: String, table: LookupTable, with_default: bool },
}

/// A step together with its place in the chain.
#[derive(Debug, Clone)]
pub struct Step {
    index: usize,
    next: Option<usize>,
    kind: StepKind,
}

/// Fallbacks set by DefaultValue steps and not yet consumed by their Lookup, innermost first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingDefault<'a> {
    value: &'a str,
    outer: Option<&'a PendingDefault<'a>>,
}

impl<'a> PendingDefault<'a> {
    pub(crate) fn new(value: &'a str, outer: Option<&'a PendingDefault<'a>>) -> Self {
        Self { value, outer }
    }
}

impl Step {
    pub(crate) fn new(kind: StepKind) -> Self {
        Self { index: 0, next: None, kind }
    }

    pub(crate) fn link(&mut self, index: usize, next: Option<usize>) {
        self.index = index;
        self.next = next;
    }

    /// Position of this step in its chain.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Position of the successor, `None` for the last step.
    pub fn next(&self) -> Option<usize> {
        self.next
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub(crate) fn walk<N: TreeNode>(
        &self,
        list: &WalkList,
        node: N,
        value: String,
        defaults: Option<&PendingDefault<'_>>,
    ) -> WalkResult {
        let next = self.next;
        match &self.kind {
            StepKind::Down { range, name } => {
                let candidates = node
                    .children()
                    .into_iter()
                    .filter(|child| name.as_deref().map_or(true, |name| child.name() == name));
                for (offset, child) in candidates.enumerate().take(range.end()) {
                    if !range.contains(offset + 1) {
                        continue;
                    }
                    if let Some(result) = list.walk_step(next, child, value.clone(), defaults) {
                        return Some(result);
                    }
                }
                None
            }
            StepKind::Up => list.walk_step(next, node.parent()?, value, defaults),
            StepKind::Next => list.walk_step(next, node.following_sibling()?, value, defaults),
            StepKind::Prev => list.walk_step(next, node.preceding_sibling()?, value, defaults),
            StepKind::Equals(expected) => {
                let matched = node.text() == expected.as_str();
                self.continue_if(matched, list, node, value, defaults)
            }
            StepKind::NotEquals(expected) => {
                let matched = node.text() != expected.as_str();
                self.continue_if(matched, list, node, value, defaults)
            }
            StepKind::StartsWith(prefix) => {
                let matched = node.text().starts_with(prefix.as_str());
                self.continue_if(matched, list, node, value, defaults)
            }
            StepKind::EndsWith(suffix) => {
                let matched = node.text().ends_with(suffix.as_str());
                self.continue_if(matched, list, node, value, defaults)
            }
            StepKind::Contains(needle) => {
                let matched = node.text().contains(needle.as_str());
                self.continue_if(matched, list, node, value, defaults)
            }
            StepKind::IsNull => match list.walk_step(next, node, value.clone(), defaults) {
                Some(_) => None,
                None => Some(value),
            },
            StepKind::CleanVersion(cleaner) => {
                let cleaned = cleaner.clean(&value)?;
                list.walk_step(next, node, cleaned, defaults)
            }
            StepKind::WordRange(range) => {
                let words = range.extract(node.text())?.to_string();
                list.walk_step(next, node, words, defaults)
            }
            StepKind::FixedString(fixed) => list.walk_step(next, node, fixed.clone(), defaults),
            StepKind::BackToFull => {
                let full = node.text().to_string();
                list.walk_step(next, node, full, defaults)
            }
            StepKind::DefaultValue(default) => {
                let pending = PendingDefault::new(default, defaults);
                list.walk_step(next, node, value, Some(&pending))
            }
            StepKind::Lookup { table, with_default, .. } => {
                let (fallback, remaining) = match (*with_default, defaults) {
                    (true, Some(pending)) => (Some(pending.value), pending.outer),
                    _ => (None, defaults),
                };
                let mapped = match lookup_value(table, &value) {
                    Some(hit) => hit.to_string(),
                    None => fallback?.to_string(),
                };
                list.walk_step(next, node, mapped, remaining)
            }
        }
    }

    fn continue_if<N: TreeNode>(
        &self,
        matched: bool,
        list: &WalkList,
        node: N,
        value: String,
        defaults: Option<&PendingDefault<'_>>,
    ) -> WalkResult {
        if matched {
            list.walk_step(self.next, node, value, defaults)
        } else {
            None
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Down { range, name } => write!(f, "Down({}{})", range, name.as_deref().unwrap_or("")),
            StepKind::Up => f.write_str("Up()"),
            StepKind::Next => f.write_str("Next()"),
            StepKind::Prev => f.write_str("Prev()"),
            StepKind::Equals(v) => write!(f, "Equals({})", v),
            StepKind::NotEquals(v) => write!(f, "NotEquals({})", v),
            StepKind::StartsWith(v) => write!(f, "StartsWith({})", v),
            StepKind::EndsWith(v) => write!(f, "EndsWith({})", v),
            StepKind::Contains(v) => write!(f, "Contains({})", v),
            StepKind::IsNull => f.write_str("IsNull()"),
            StepKind::CleanVersion(_) => f.write_str("CleanVersion()"),
            StepKind::WordRange(range) => write!(f, "WordRange({})", range),
            StepKind::FixedString(v) => write!(f, "FixedString({})", v),
            StepKind::BackToFull => f.write_str("BackToFull()"),
            StepKind::DefaultValue(v) => write!(f, "DefaultValue({})", v),
            StepKind::Lookup { name, .. } => write!(f, "Lookup(@{})", name),
        }
    }
}
