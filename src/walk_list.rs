//! Walk list module: a compiled pattern, ready to be walked over input trees.
//!
//! This module provides the WalkList type.

use crate::compiler::compile;
use crate::config::CompileOptions;
use crate::diagnostics::DiagnosticSink;
use crate::lookup::LookupRegistry;
use crate::pattern::Matcher;
use crate::step::{PendingDefault, Step, StepKind, WalkResult};
use crate::tree::TreeNode;
use crate::WalkError;
use std::fmt;
use std::sync::Arc;

/// The linked chain of steps for one pattern. Immutable once built; share it freely.
#[derive(Debug, Clone)]
pub struct WalkList {
    steps: Vec<Step>,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl WalkList {
    /// Compile `matcher` with default options, reporting to the `log` facade when `verbose`.
    pub fn new(matcher: &Matcher, lookups: &LookupRegistry, verbose: bool) -> Result<Self, WalkError> {
        compile(matcher, lookups, &CompileOptions::new().verbose(verbose))
    }

    /// Link already compiled steps into a walk list.
    pub fn from_steps(kinds: Vec<StepKind>, sink: Option<Arc<dyn DiagnosticSink>>) -> Self {
        let mut steps: Vec<Step> = kinds.into_iter().map(Step::new).collect();
        link_steps(&mut steps);
        Self { steps, sink }
    }

    /// Walk `node`, starting from the first step. An empty list returns `value` as is.
    pub fn walk<N: TreeNode>(&self, node: N, value: impl Into<String>) -> WalkResult {
        let value = value.into();
        let Some(first) = self.steps.first() else {
            return Some(value);
        };
        let Some(sink) = &self.sink else {
            return self.walk_step(Some(0), node, value, None);
        };
        sink.emit(format_args!("Tree: >>>{}<<<", node.text()));
        sink.emit(format_args!("Enter step: {}", first));
        let result = self.walk_step(Some(0), node, value, None);
        sink.emit(format_args!("Leave step ({}): {}", outcome(&result), first));
        result
    }

    /// Walk `node` starting at the step with position `index`, for callers that verified the
    /// steps before it by other means. Past the end the value is returned as is.
    ///
    /// Defaults set by skipped DefaultValue steps whose Lookup is not skipped as well still
    /// apply.
    pub fn walk_from<N: TreeNode>(&self, index: usize, node: N, value: impl Into<String>) -> WalkResult {
        let mut pending: Vec<&str> = Vec::new();
        for step in self.steps.iter().take(index) {
            match step.kind() {
                StepKind::DefaultValue(default) => pending.push(default),
                StepKind::Lookup { with_default: true, .. } => {
                    pending.pop();
                }
                _ => {}
            }
        }
        self.resume(index, &pending, node, value.into(), None)
    }

    /// Stacks `pending` (outermost first) before walking from `index`.
    fn resume<N: TreeNode>(
        &self,
        index: usize,
        pending: &[&str],
        node: N,
        value: String,
        outer: Option<&PendingDefault<'_>>,
    ) -> WalkResult {
        match pending.split_first() {
            Some((default, rest)) => {
                let default = PendingDefault::new(default, outer);
                self.resume(index, rest, node, value, Some(&default))
            }
            None => self.walk_step(Some(index), node, value, outer),
        }
    }

    pub(crate) fn walk_step<N: TreeNode>(
        &self,
        index: Option<usize>,
        node: N,
        value: String,
        defaults: Option<&PendingDefault<'_>>,
    ) -> WalkResult {
        let Some(step) = index.and_then(|i| self.steps.get(i)) else {
            return Some(value);
        };
        let Some(sink) = &self.sink else {
            return step.walk(self, node, value, defaults);
        };
        sink.emit(format_args!("{}: >>> {} on >>>{}<<< with \"{}\"", step.index(), step, node.text(), value));
        let result = step.walk(self, node, value, defaults);
        sink.emit(format_args!("{}: <<< {} ({})", step.index(), step, outcome(&result)));
        result
    }

    pub fn first_step(&self) -> Option<&Step> {
        self.steps.first()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_verbose(&self) -> bool {
        self.sink.is_some()
    }
}

fn link_steps(steps: &mut [Step]) {
    let count = steps.len();
    for (i, step) in steps.iter_mut().enumerate() {
        let next = (i + 1 < count).then_some(i + 1);
        step.link(i, next);
    }
}

fn outcome(result: &WalkResult) -> &'static str {
    if result.is_some() {
        "+"
    } else {
        "-"
    }
}

impl fmt::Display for WalkList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("Empty");
        }
        for step in &self.steps {
            write!(f, " --> {}", step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::lookup::LookupRegistryBuilder;
    use crate::tree::ParseTreeBuilder;
    use crate::types::ChildRange;

    fn kinds() -> Vec<StepKind> {
        vec![
            StepKind::Down { range: ChildRange::single(1).unwrap(), name: Some("agent".to_string()) },
            StepKind::Equals("Mozilla".to_string()),
            StepKind::BackToFull,
        ]
    }

    #[test]
    fn test_linking() {
        let list = WalkList::from_steps(kinds(), None);
        assert_eq!(list.len(), 3);
        for (i, step) in list.steps().iter().enumerate() {
            assert_eq!(step.index(), i);
        }
        assert_eq!(list.steps()[0].next(), Some(1));
        assert_eq!(list.steps()[1].next(), Some(2));
        assert_eq!(list.steps()[2].next(), None);
        assert_eq!(list.first_step().map(Step::index), Some(0));
    }

    #[test]
    fn test_empty_list() {
        let list = WalkList::from_steps(Vec::new(), None);
        let tree = ParseTreeBuilder::new("root", "anything").build();
        assert!(list.is_empty());
        assert!(list.first_step().is_none());
        assert_eq!(list.walk(tree.root(), "seed"), Some("seed".to_string()));
        assert_eq!(list.to_string(), "Empty");
    }

    #[test]
    fn test_display() {
        let list = WalkList::from_steps(kinds(), None);
        assert_eq!(list.to_string(), " --> Down((1)agent) --> Equals(Mozilla) --> BackToFull()");
    }

    #[test]
    fn test_walk_from_skips_earlier_steps() {
        let mut builder = ParseTreeBuilder::new("root", "Mozilla Firefox");
        builder.child(0, "agent", "Mozilla");
        let tree = builder.build();
        let list = WalkList::from_steps(kinds(), None);
        let agent = tree.root().children()[0];
        assert_eq!(list.walk_from(1, agent, "seed"), Some("Mozilla".to_string()));
        assert_eq!(list.walk_from(1, tree.root(), "seed"), None);
        assert_eq!(list.walk_from(3, tree.root(), "seed"), Some("seed".to_string()));
    }

    #[test]
    fn test_walk_from_keeps_skipped_defaults() {
        let lookups = LookupRegistryBuilder::new().table("brands", [("a", "Apple")]).build();
        let table = lookups.get("brands").cloned().unwrap();
        let lookup = || StepKind::Lookup { name: "brands".to_string(), table: table.clone(), with_default: true };
        let tree = ParseTreeBuilder::new("root", "Opera").build();

        let list = WalkList::from_steps(
            vec![StepKind::DefaultValue("Unknown".to_string()), StepKind::BackToFull, lookup()],
            None,
        );
        assert_eq!(list.walk_from(1, tree.root(), "seed"), Some("Unknown".to_string()));
        assert_eq!(list.walk_from(1, tree.root(), "seed"), list.walk(tree.root(), "seed"));

        // The inner pair is skipped entirely, so only the outer default is left.
        let nested = WalkList::from_steps(
            vec![
                StepKind::DefaultValue("outer".to_string()),
                StepKind::DefaultValue("inner".to_string()),
                lookup(),
                StepKind::BackToFull,
                lookup(),
            ],
            None,
        );
        assert_eq!(nested.walk_from(3, tree.root(), "a"), Some("outer".to_string()));
        assert_eq!(nested.walk_from(2, tree.root(), "b"), Some("outer".to_string()));
        assert_eq!(nested.walk_from(2, tree.root(), "a"), Some("outer".to_string()));
    }

    #[test]
    fn test_verbose_walk_reports_to_sink() {
        let mut builder = ParseTreeBuilder::new("root", "Opera");
        builder.child(0, "agent", "Opera");
        let tree = builder.build();
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<dyn DiagnosticSink> = sink.clone();
        let list = WalkList::from_steps(kinds(), Some(shared));
        assert!(list.is_verbose());
        assert_eq!(list.walk(tree.root(), "seed"), None);
        let lines = sink.lines();
        assert_eq!(lines[0], "Tree: >>>Opera<<<");
        assert_eq!(lines[1], "Enter step: Down((1)agent)");
        assert_eq!(lines.last().unwrap(), "Leave step (-): Down((1)agent)");
        // The failing Equals is entered, BackToFull never is.
        assert!(lines.iter().any(|l| l.starts_with("1: >>> Equals(Mozilla)")));
        assert!(lines.iter().any(|l| l == "1: <<< Equals(Mozilla) (-)"));
        assert!(!lines.iter().any(|l| l.starts_with("2:")));
    }
}
