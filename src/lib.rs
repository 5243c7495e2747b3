//! Treewalk: compiles declarative tree path patterns into linked step chains.
//!
//! A pattern such as `agent.(1)product.(1)name="Chrome"^.(1)version` is parsed elsewhere into a
//! [`Matcher`] tree. This crate compiles that tree once into a [`WalkList`], an ordered and linked
//! chain of [`Step`]s, and replays the chain against parsed input trees to verify a candidate node
//! and extract (or transform) a value from it.
//!
//! # Architecture
//! - Pattern model (`Matcher`, `PathNode`, `PathOp`) and builder
//! - Input tree capability (`TreeNode`) with an arena-backed `ParseTree`
//! - Lookup tables (`LookupRegistry`) and version cleaning policy (`VersionCleaner`)
//! - Compilation with entry-point gating (`compile`)
//! - Step chain execution (`WalkList::walk`)
//! - Optional diagnostics through an injected `DiagnosticSink`

mod compiler;
mod config;
mod diagnostics;
mod lookup;
mod pattern;
mod step;
mod tree;
mod types;
mod version;
mod walk_list;

pub use compiler::*;
pub use config::*;
pub use diagnostics::*;
pub use lookup::*;
pub use pattern::*;
pub use step::*;
pub use tree::*;
pub use types::*;
pub use version::*;
pub use walk_list::*;

use thiserror::Error;

/// Unified error type for Treewalk operations.
///
/// These are configuration errors raised while building a walk list. A pattern that simply
/// does not match an input is not an error; walking reports it as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    #[error("Missing lookup \"{0}\"")]
    MissingLookup(String),
    #[error("Invalid child range ({start}-{end})")]
    InvalidChildRange { start: usize, end: usize },
    #[error("Invalid word range [{first}-{last}]")]
    InvalidWordRange { first: i32, last: i32 },
    #[error("Invalid tree: {0}")]
    InvalidTree(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}
