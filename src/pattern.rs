//! Pattern module: the parsed form of a path pattern, as handed over by the grammar.
//!
//! A [`Matcher`] wraps a singly linked chain of [`PathNode`]s in zero or more compound forms
//! (lookups, version cleaning, null checks). [`PathBuilder`] assembles chains in code.

use crate::types::{ChildRange, WordRange};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Matcher {
    /// A plain path; `None` is the empty path.
    Path(Option<PathNode>),
    /// Maps the value the inner matcher produces through a named lookup table.
    Lookup {
        name: String,
        default: Option<String>,
        inner: Box<Matcher>,
    },
    CleanVersion(Box<Matcher>),
    IsNull(Box<Matcher>),
}

/// One step of a path plus the rest of the path after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub op: PathOp,
    pub next: Option<Box<PathNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PathOp {
    Down { range: ChildRange, name: Option<String> },
    Up,
    Next,
    Prev,
    Equals(String),
    NotEquals(String),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    WordRange(WordRange),
    BackToFull,
    FixedValue(String),
}

impl Matcher {
    pub fn path(path: PathBuilder) -> Self {
        Matcher::Path(path.build())
    }

    pub fn lookup(name: impl Into<String>, inner: Matcher) -> Self {
        Matcher::Lookup { name: name.into(), default: None, inner: Box::new(inner) }
    }

    pub fn lookup_with_default(name: impl Into<String>, default: impl Into<String>, inner: Matcher) -> Self {
        Matcher::Lookup {
            name: name.into(),
            default: Some(default.into()),
            inner: Box::new(inner),
        }
    }

    pub fn clean_version(inner: Matcher) -> Self {
        Matcher::CleanVersion(Box::new(inner))
    }

    pub fn is_null(inner: Matcher) -> Self {
        Matcher::IsNull(Box::new(inner))
    }
}

impl PathNode {
    /// The ops of this node and every node after it, in path order.
    pub fn ops(&self) -> impl Iterator<Item = &PathOp> {
        std::iter::successors(Some(self), |node| node.next.as_deref()).map(|node| &node.op)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Path(None) => Ok(()),
            Matcher::Path(Some(node)) => write!(f, "{}", node),
            Matcher::Lookup { name, default: Some(default), inner } => {
                write!(f, "LookUp[{};{};\"{}\"]", name, inner, default)
            }
            Matcher::Lookup { name, default: None, inner } => write!(f, "LookUp[{};{}]", name, inner),
            Matcher::CleanVersion(inner) => write!(f, "CleanVersion[{}]", inner),
            Matcher::IsNull(inner) => write!(f, "IsNull[{}]", inner),
        }
    }
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in self.ops() {
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

impl fmt::Display for PathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathOp::Down { range, name } => write!(f, ".{}{}", range, name.as_deref().unwrap_or("")),
            PathOp::Up => f.write_str("^"),
            PathOp::Next => f.write_str(">"),
            PathOp::Prev => f.write_str("<"),
            PathOp::Equals(v) => write!(f, "=\"{}\"", v),
            PathOp::NotEquals(v) => write!(f, "!=\"{}\"", v),
            PathOp::StartsWith(v) => write!(f, "{{\"{}\"", v),
            PathOp::EndsWith(v) => write!(f, "}}\"{}\"", v),
            PathOp::Contains(v) => write!(f, "~\"{}\"", v),
            PathOp::WordRange(range) => write!(f, "{}", range),
            PathOp::BackToFull => f.write_str("@"),
            PathOp::FixedValue(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// Collects path ops left to right and links them into a [`PathNode`] chain.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    ops: Vec<PathOp>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(mut self, op: PathOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Children in `range` whose name is `name`.
    pub fn down(self, range: ChildRange, name: impl Into<String>) -> Self {
        self.op(PathOp::Down { range, name: Some(name.into()) })
    }

    /// Children in `range`, whatever their name.
    pub fn down_any(self, range: ChildRange) -> Self {
        self.op(PathOp::Down { range, name: None })
    }

    pub fn up(self) -> Self {
        self.op(PathOp::Up)
    }

    pub fn next(self) -> Self {
        self.op(PathOp::Next)
    }

    pub fn prev(self) -> Self {
        self.op(PathOp::Prev)
    }

    pub fn equals(self, value: impl Into<String>) -> Self {
        self.op(PathOp::Equals(value.into()))
    }

    pub fn not_equals(self, value: impl Into<String>) -> Self {
        self.op(PathOp::NotEquals(value.into()))
    }

    pub fn starts_with(self, value: impl Into<String>) -> Self {
        self.op(PathOp::StartsWith(value.into()))
    }

    pub fn ends_with(self, value: impl Into<String>) -> Self {
        self.op(PathOp::EndsWith(value.into()))
    }

    pub fn contains(self, value: impl Into<String>) -> Self {
        self.op(PathOp::Contains(value.into()))
    }

    pub fn words(self, range: WordRange) -> Self {
        self.op(PathOp::WordRange(range))
    }

    pub fn back_to_full(self) -> Self {
        self.op(PathOp::BackToFull)
    }

    pub fn fixed(self, value: impl Into<String>) -> Self {
        self.op(PathOp::FixedValue(value.into()))
    }

    pub fn build(self) -> Option<PathNode> {
        let mut next: Option<Box<PathNode>> = None;
        for op in self.ops.into_iter().rev() {
            next = Some(Box::new(PathNode { op, next }));
        }
        next.map(|node| *node)
    }

    pub fn matcher(self) -> Matcher {
        Matcher::path(self)
    }
}
