//! Compiler module: turns a [`Matcher`] into a linked [`WalkList`].
//!
//! Patterns are matched against candidate nodes found through a static index keyed on the
//! literal start of each pattern. Whatever that index already guarantees is not compiled into
//! steps: nothing is emitted until the walk reaches the first op the index cannot resolve (the
//! entry point). Compound forms (lookups, defaults, version cleaning, null checks) are always
//! emitted.

use crate::config::CompileOptions;
use crate::lookup::LookupRegistry;
use crate::pattern::{Matcher, PathNode, PathOp};
use crate::step::StepKind;
use crate::walk_list::WalkList;
use crate::WalkError;
use std::sync::Arc;

/// Whether compilation has passed the point where the static index stops resolving the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Pending,
    Active,
}

/// How an op interacts with the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Resolvable by the index; emitted only once the entry point was reached earlier.
    Passive,
    /// Marks the entry point, then is emitted.
    MarkBefore,
    /// Emitted only if the entry point was reached earlier, then marks it.
    MarkAfter,
}

/// Compile `matcher` into a linked walk list.
///
/// Fails when the pattern uses a lookup the registry does not have.
pub fn compile(matcher: &Matcher, lookups: &LookupRegistry, options: &CompileOptions) -> Result<WalkList, WalkError> {
    let steps = WalkListBuilder::new(lookups, options).build(matcher)?;
    let sink = options.diagnostic_sink();
    let list = WalkList::from_steps(steps, sink.clone());
    if let Some(sink) = sink {
        sink.emit(format_args!("------------------------------------"));
        sink.emit(format_args!("Required: {}", matcher));
        for step in list.steps() {
            sink.emit(format_args!("{}: {}", step.index() + 1, step));
        }
    }
    Ok(list)
}

/// Produces the ordered step kinds for a matcher. Holds no state between ops: the entry point
/// is passed along and returned by every visit.
pub struct WalkListBuilder<'a> {
    lookups: &'a LookupRegistry,
    options: &'a CompileOptions,
}

impl<'a> WalkListBuilder<'a> {
    pub fn new(lookups: &'a LookupRegistry, options: &'a CompileOptions) -> Self {
        Self { lookups, options }
    }

    pub fn build(&self, matcher: &Matcher) -> Result<Vec<StepKind>, WalkError> {
        let start = if self.options.settings().static_index {
            EntryPoint::Pending
        } else {
            EntryPoint::Active
        };
        let mut steps = Vec::new();
        match matcher {
            // IsNull inverts everything after it, so it can only wrap the whole pattern.
            Matcher::IsNull(inner) => {
                steps.push(StepKind::IsNull);
                self.visit_matcher(inner, start, &mut steps)?;
            }
            _ => {
                self.visit_matcher(matcher, start, &mut steps)?;
            }
        }
        Ok(steps)
    }

    fn visit_matcher(&self, matcher: &Matcher, entry: EntryPoint, steps: &mut Vec<StepKind>) -> Result<EntryPoint, WalkError> {
        match matcher {
            Matcher::Path(None) => Ok(entry),
            Matcher::Path(Some(node)) => Ok(self.visit_path(node, entry, steps)),
            Matcher::Lookup { name, default, inner } => {
                if let Some(default) = default {
                    steps.push(StepKind::DefaultValue(default.clone()));
                }
                let entry = self.visit_matcher(inner, entry, steps)?;
                let table = self
                    .lookups
                    .get(name)
                    .ok_or_else(|| WalkError::MissingLookup(name.clone()))?;
                steps.push(StepKind::Lookup {
                    name: name.clone(),
                    table: Arc::clone(table),
                    with_default: default.is_some(),
                });
                Ok(entry)
            }
            Matcher::CleanVersion(inner) => {
                let entry = self.visit_matcher(inner, entry, steps)?;
                steps.push(StepKind::CleanVersion(Arc::clone(self.options.cleaner())));
                Ok(entry)
            }
            Matcher::IsNull(_) => Err(WalkError::InvalidPattern(format!(
                "IsNull is only allowed around a whole pattern: {}",
                matcher
            ))),
        }
    }

    fn visit_path(&self, node: &PathNode, entry: EntryPoint, steps: &mut Vec<StepKind>) -> EntryPoint {
        let entry = self.visit_op(&node.op, entry, steps);
        match &node.next {
            Some(next) => self.visit_path(next, entry, steps),
            None => entry,
        }
    }

    fn visit_op(&self, op: &PathOp, entry: EntryPoint, steps: &mut Vec<StepKind>) -> EntryPoint {
        let (step, gate) = self.step_for(op);
        let reached = if gate == Gate::MarkBefore { EntryPoint::Active } else { entry };
        if reached == EntryPoint::Active {
            steps.push(step);
        } else {
            log::trace!("Resolved by static index, not compiled: {}", step);
        }
        if gate == Gate::MarkAfter {
            EntryPoint::Active
        } else {
            reached
        }
    }

    fn step_for(&self, op: &PathOp) -> (StepKind, Gate) {
        match op {
            PathOp::Down { range, name } => (StepKind::Down { range: *range, name: name.clone() }, Gate::Passive),
            PathOp::Up => (StepKind::Up, Gate::MarkBefore),
            PathOp::Next => (StepKind::Next, Gate::MarkBefore),
            PathOp::Prev => (StepKind::Prev, Gate::MarkBefore),
            PathOp::Equals(v) => (StepKind::Equals(v.clone()), Gate::MarkAfter),
            PathOp::NotEquals(v) => (StepKind::NotEquals(v.clone()), Gate::MarkBefore),
            PathOp::StartsWith(v) => (StepKind::StartsWith(v.clone()), Gate::MarkBefore),
            PathOp::EndsWith(v) => (StepKind::EndsWith(v.clone()), Gate::MarkBefore),
            PathOp::Contains(v) => (StepKind::Contains(v.clone()), Gate::MarkBefore),
            PathOp::WordRange(range) => {
                let gate = if range.is_in_static_index(self.options.settings().indexed_word_limit) {
                    Gate::Passive
                } else {
                    Gate::MarkBefore
                };
                (StepKind::WordRange(*range), gate)
            }
            PathOp::BackToFull => (StepKind::BackToFull, Gate::Passive),
            PathOp::FixedValue(v) => (StepKind::FixedString(v.clone()), Gate::Passive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupRegistryBuilder;
    use crate::pattern::PathBuilder;
    use crate::types::{ChildRange, WordRange};

    fn lookups() -> LookupRegistry {
        LookupRegistryBuilder::new().table("brands", [("a", "Apple")]).build()
    }

    fn one() -> ChildRange {
        ChildRange::single(1).unwrap()
    }

    fn described(matcher: &Matcher, options: &CompileOptions) -> Vec<String> {
        let lookups = lookups();
        let steps = WalkListBuilder::new(&lookups, options).build(matcher).unwrap();
        steps.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_down_is_elided_before_entry_point() {
        let matcher = PathBuilder::new().down(one(), "product").down(one(), "name").matcher();
        assert!(described(&matcher, &CompileOptions::new()).is_empty());
    }

    #[test]
    fn test_equals_marks_after_itself() {
        let matcher = PathBuilder::new()
            .down(one(), "product")
            .equals("Chrome")
            .down(one(), "version")
            .matcher();
        assert_eq!(described(&matcher, &CompileOptions::new()), vec!["Down((1)version)"]);
    }

    #[test]
    fn test_navigation_and_comparisons_mark_before_themselves() {
        for (builder, first) in [
            (PathBuilder::new().up(), "Up()"),
            (PathBuilder::new().next(), "Next()"),
            (PathBuilder::new().prev(), "Prev()"),
            (PathBuilder::new().not_equals("x"), "NotEquals(x)"),
            (PathBuilder::new().starts_with("x"), "StartsWith(x)"),
            (PathBuilder::new().ends_with("x"), "EndsWith(x)"),
            (PathBuilder::new().contains("x"), "Contains(x)"),
        ] {
            let matcher = builder.down(one(), "name").matcher();
            let steps = described(&matcher, &CompileOptions::new());
            assert_eq!(steps, vec![first.to_string(), "Down((1)name)".to_string()]);
        }
    }

    #[test]
    fn test_word_range_marks_only_outside_static_index() {
        let indexed = PathBuilder::new().words(WordRange::new(1, 2).unwrap()).back_to_full().matcher();
        assert!(described(&indexed, &CompileOptions::new()).is_empty());
        let unindexed = PathBuilder::new().words(WordRange::new(2, 3).unwrap()).back_to_full().matcher();
        assert_eq!(described(&unindexed, &CompileOptions::new()), vec!["WordRange([2-3])", "BackToFull()"]);
        // A narrower index no longer covers [1-2].
        let narrow = CompileOptions::new().indexed_word_limit(1);
        assert_eq!(described(&indexed, &narrow), vec!["WordRange([1-2])", "BackToFull()"]);
    }

    #[test]
    fn test_fixed_value_and_back_to_full_never_mark() {
        let matcher = PathBuilder::new().fixed("x").back_to_full().matcher();
        assert!(described(&matcher, &CompileOptions::new()).is_empty());
        let after = PathBuilder::new().up().fixed("x").back_to_full().matcher();
        assert_eq!(described(&after, &CompileOptions::new()), vec!["Up()", "FixedString(x)", "BackToFull()"]);
    }

    #[test]
    fn test_compound_forms_always_emitted() {
        let inner = PathBuilder::new().down(one(), "name").matcher();
        let matcher = Matcher::clean_version(Matcher::lookup_with_default("brands", "Unknown", inner));
        assert_eq!(
            described(&matcher, &CompileOptions::new()),
            vec!["DefaultValue(Unknown)", "Lookup(@brands)", "CleanVersion()"]
        );
        let null = Matcher::is_null(PathBuilder::new().down(one(), "name").equals("x").matcher());
        assert_eq!(described(&null, &CompileOptions::new()), vec!["IsNull()"]);
    }

    #[test]
    fn test_is_null_only_wraps_whole_pattern() {
        let inner = PathBuilder::new().down(one(), "agent").equals("Opera").matcher();
        let nested = Matcher::lookup("brands", Matcher::is_null(inner.clone()));
        let err = compile(&nested, &lookups(), &CompileOptions::new().static_index(false)).unwrap_err();
        assert!(matches!(err, WalkError::InvalidPattern(_)));
        let twice = Matcher::is_null(Matcher::is_null(inner.clone()));
        assert!(compile(&twice, &lookups(), &CompileOptions::new()).is_err());
        let in_version = Matcher::clean_version(Matcher::is_null(inner.clone()));
        assert!(compile(&in_version, &lookups(), &CompileOptions::new()).is_err());
        let top = Matcher::is_null(Matcher::lookup("brands", inner));
        let options = CompileOptions::new().static_index(false);
        assert_eq!(
            described(&top, &options),
            vec!["IsNull()", "Down((1)agent)", "Equals(Opera)", "Lookup(@brands)"]
        );
    }

    #[test]
    fn test_entry_point_carries_through_compound_forms() {
        let inner = PathBuilder::new().down(one(), "product").equals("Chrome").matcher();
        let matcher = Matcher::lookup("brands", inner);
        assert_eq!(described(&matcher, &CompileOptions::new()), vec!["Lookup(@brands)"]);
        let walked = PathBuilder::new().down(one(), "product").up().down(one(), "name").matcher();
        let matcher = Matcher::lookup("brands", walked);
        assert_eq!(
            described(&matcher, &CompileOptions::new()),
            vec!["Up()", "Down((1)name)", "Lookup(@brands)"]
        );
    }

    #[test]
    fn test_without_static_index_everything_is_compiled() {
        let matcher = PathBuilder::new().down(one(), "agent").equals("Mozilla").matcher();
        let options = CompileOptions::new().static_index(false);
        assert_eq!(described(&matcher, &options), vec!["Down((1)agent)", "Equals(Mozilla)"]);
    }

    #[test]
    fn test_empty_pattern() {
        assert!(described(&Matcher::Path(None), &CompileOptions::new()).is_empty());
    }

    #[test]
    fn test_missing_lookup_is_a_configuration_error() {
        let matcher = Matcher::lookup("nope", PathBuilder::new().up().matcher());
        let err = compile(&matcher, &lookups(), &CompileOptions::new()).unwrap_err();
        assert_eq!(err, WalkError::MissingLookup("nope".to_string()));
        assert_eq!(err.to_string(), "Missing lookup \"nope\"");
    }

    #[test]
    fn test_verbose_compile_dumps_steps() {
        let sink = Arc::new(crate::diagnostics::MemorySink::new());
        let options = CompileOptions::new().sink(sink.clone());
        let matcher = PathBuilder::new().down(one(), "product").up().equals("x").matcher();
        let list = compile(&matcher, &lookups(), &options).unwrap();
        assert!(list.is_verbose());
        assert_eq!(
            sink.lines(),
            vec![
                "------------------------------------".to_string(),
                "Required: .(1)product^=\"x\"".to_string(),
                "1: Up()".to_string(),
                "2: Equals(x)".to_string(),
            ]
        );
    }
}
