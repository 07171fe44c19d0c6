//! Comparator contract and the merge-diff driver
//!
//! Every comparable object kind implements [`Comparator`]; [`diff`] walks two
//! sides of the same kind in lock-step and dispatches to add, drop or change.

use std::cmp::Ordering;

use crate::error::Result;
use crate::schema::emitter::DdlEmitter;

/// Operations a schema object kind provides to the merge driver
///
/// `self` on `add`/`change` is the source side (the shape wanted); `drop` is
/// called on the target side for objects the source does not have.
pub trait Comparator {
    /// Step to the next object; `false` once the side is exhausted
    fn advance(&mut self) -> bool;

    /// Order the current objects of both sides. An exhausted side sorts last.
    fn compare(&self, other: &Self) -> Ordering;

    /// compare_name of the current object, `""` when exhausted
    fn current_name(&self) -> &str;

    /// Emit DDL creating the current object on the side that lacks it
    fn add(&self, out: &mut DdlEmitter) -> Result<()>;

    /// Emit DDL removing the current object from the side that has it
    fn drop(&self, out: &mut DdlEmitter) -> Result<()>;

    /// Emit DDL making `other`'s current object match this one
    fn change(&self, other: &Self, out: &mut DdlEmitter) -> Result<()>;
}

/// Order two keys where `""` marks an exhausted side
pub fn compare_names(left: &str, right: &str) -> Ordering {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => left.cmp(right),
    }
}

/// An item whose DDL could not be generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub compare_name: String,
    pub message: String,
}

/// Counts of what the driver did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub added: usize,
    pub dropped: usize,
    /// Matched objects that produced at least one line
    pub changed: usize,
    pub unchanged: usize,
    pub failed: Vec<ItemFailure>,
}

impl DiffSummary {
    pub fn is_clean(&self) -> bool {
        self.added == 0 && self.dropped == 0 && self.changed == 0 && self.failed.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Step {
    Add,
    Drop,
    Change,
}

/// Walk both sides and write reconciling DDL for `target` into `out`
///
/// A failing item contributes an `-- ERROR:` comment instead of partial output,
/// and the walk continues with the next item.
pub fn diff<C: Comparator>(source: &mut C, target: &mut C, out: &mut DdlEmitter) -> DiffSummary {
    let mut summary = DiffSummary::default();
    let mut more_source = source.advance();
    let mut more_target = target.advance();

    while more_source || more_target {
        let step = match source.compare(target) {
            Ordering::Equal => Step::Change,
            Ordering::Less => Step::Add,
            Ordering::Greater => Step::Drop,
        };

        let mut item = DdlEmitter::new();
        let (name, result) = match step {
            Step::Add => (source.current_name(), source.add(&mut item)),
            Step::Drop => (target.current_name(), target.drop(&mut item)),
            Step::Change => (source.current_name(), source.change(target, &mut item)),
        };
        let name = name.to_string();

        match result {
            Ok(()) => {
                match step {
                    Step::Add => summary.added += 1,
                    Step::Drop => summary.dropped += 1,
                    Step::Change if item.is_empty() => summary.unchanged += 1,
                    Step::Change => summary.changed += 1,
                }
                tracing::debug!(compare_name = %name, lines = item.lines().len(), "Diffed item");
                out.append(&mut item);
            }
            Err(e) => {
                tracing::error!(compare_name = %name, error = %e, "Skipping item");
                out.comment(format!("ERROR: skipped {}: {}", name, e));
                summary.failed.push(ItemFailure {
                    compare_name: name,
                    message: e.to_string(),
                });
            }
        }

        match step {
            Step::Add => more_source = source.advance(),
            Step::Drop => more_target = target.advance(),
            Step::Change => {
                more_source = source.advance();
                more_target = target.advance();
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Comparator over bare keys that logs which operation ran
    struct Keys {
        keys: Vec<&'static str>,
        pos: Option<usize>,
        fail_on: Option<&'static str>,
    }

    impl Keys {
        fn new(keys: Vec<&'static str>) -> Self {
            Self { keys, pos: None, fail_on: None }
        }
    }

    impl Comparator for Keys {
        fn advance(&mut self) -> bool {
            let next = self.pos.map_or(0, |p| p + 1).min(self.keys.len());
            self.pos = Some(next);
            next < self.keys.len()
        }

        fn compare(&self, other: &Self) -> Ordering {
            compare_names(self.current_name(), other.current_name())
        }

        fn current_name(&self) -> &str {
            self.pos.and_then(|p| self.keys.get(p)).copied().unwrap_or("")
        }

        fn add(&self, out: &mut DdlEmitter) -> Result<()> {
            out.statement(format!("ADD {}", self.current_name()));
            Ok(())
        }

        fn drop(&self, out: &mut DdlEmitter) -> Result<()> {
            out.statement(format!("DROP {}", self.current_name()));
            Ok(())
        }

        fn change(&self, _other: &Self, out: &mut DdlEmitter) -> Result<()> {
            if self.fail_on == Some(self.current_name()) {
                out.statement("PARTIAL");
                return Err(Error::malformed(self.current_name(), "boom"));
            }
            Ok(())
        }
    }

    #[test]
    fn exhausted_side_sorts_last() {
        assert_eq!(compare_names("", "a"), Ordering::Greater);
        assert_eq!(compare_names("a", ""), Ordering::Less);
        assert_eq!(compare_names("", ""), Ordering::Equal);
        assert_eq!(compare_names("a", "b"), Ordering::Less);
    }

    #[test]
    fn merge_walks_both_sides() {
        let mut source = Keys::new(vec!["a", "c", "d", "f"]);
        let mut target = Keys::new(vec!["b", "c", "e"]);
        let mut out = DdlEmitter::new();

        let summary = diff(&mut source, &mut target, &mut out);

        let statements: Vec<_> = out.statements().collect();
        assert_eq!(
            statements,
            vec!["ADD a;", "DROP b;", "ADD d;", "DROP e;", "ADD f;"]
        );
        assert_eq!(summary.added, 3);
        assert_eq!(summary.dropped, 2);
        assert_eq!(summary.unchanged, 1);
    }

    #[test]
    fn failed_item_is_reported_and_skipped() {
        let mut source = Keys::new(vec!["a", "b"]);
        source.fail_on = Some("a");
        let mut target = Keys::new(vec!["a", "b"]);
        let mut out = DdlEmitter::new();

        let summary = diff(&mut source, &mut target, &mut out);

        assert_eq!(out.statements().count(), 0);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].compare_name, "a");
        assert!(out.render().starts_with("-- ERROR: skipped a:"));
        assert_eq!(summary.unchanged, 1);
    }
}
