//! Leaf nodes: [`Condition`] and [`Action`].
//!
//! Leaves wrap closures. A closure reports faults by returning
//! [`LeafError`]; a panicking closure is contained as well. Either way the
//! fault is logged and the leaf reports `Failure`, so one bad leaf never
//! aborts the rest of the tree's tick.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::warn;

use crate::blackboard::Blackboard;
use crate::error::LeafError;
use crate::node::{BehaviorNode, Status};

type Predicate = Box<dyn FnMut(&Blackboard) -> Result<bool, LeafError> + Send>;
type Effect = Box<dyn FnMut(&mut Blackboard) -> Result<Status, LeafError> + Send>;

/// Evaluates a predicate against the blackboard.
///
/// `true` maps to `Success`, `false` to `Failure`. Conditions never return
/// `Running`.
pub struct Condition {
    name: String,
    predicate: Predicate,
}

impl Condition {
    /// Wrap an infallible predicate.
    pub fn new<F>(name: impl Into<String>, mut predicate: F) -> Self
    where
        F: FnMut(&Blackboard) -> bool + Send + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(move |bb| Ok(predicate(bb))),
        }
    }

    /// Wrap a predicate that may report a fault.
    pub fn fallible<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: FnMut(&Blackboard) -> Result<bool, LeafError> + Send + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }
}

impl BehaviorNode for Condition {
    fn tick(&mut self, blackboard: &mut Blackboard) -> Status {
        let predicate = &mut self.predicate;
        let outcome = catch_unwind(AssertUnwindSafe(|| predicate(&*blackboard)));
        match flatten(outcome) {
            Ok(ok) => Status::from_bool(ok),
            Err(err) => {
                warn!(leaf = %self.name, error = %err, "condition fault, treating as failure");
                Status::Failure
            }
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        &self.name
    }
}

/// Runs a state-mutating closure against the blackboard.
pub struct Action {
    name: String,
    effect: Effect,
}

impl Action {
    /// Wrap an infallible action.
    pub fn new<F>(name: impl Into<String>, mut effect: F) -> Self
    where
        F: FnMut(&mut Blackboard) -> Status + Send + 'static,
    {
        Self {
            name: name.into(),
            effect: Box::new(move |bb| Ok(effect(bb))),
        }
    }

    /// Wrap an action that may report a fault.
    pub fn fallible<F>(name: impl Into<String>, effect: F) -> Self
    where
        F: FnMut(&mut Blackboard) -> Result<Status, LeafError> + Send + 'static,
    {
        Self {
            name: name.into(),
            effect: Box::new(effect),
        }
    }
}

impl BehaviorNode for Action {
    fn tick(&mut self, blackboard: &mut Blackboard) -> Status {
        let effect = &mut self.effect;
        let outcome = catch_unwind(AssertUnwindSafe(|| effect(blackboard)));
        match flatten(outcome) {
            Ok(status) => status,
            Err(err) => {
                warn!(leaf = %self.name, error = %err, "action fault, treating as failure");
                Status::Failure
            }
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        &self.name
    }
}

/// Merge a closure result and a caught panic into one fault channel.
fn flatten<T>(
    outcome: Result<Result<T, LeafError>, Box<dyn core::any::Any + Send>>,
) -> Result<T, LeafError> {
    match outcome {
        Ok(inner) => inner,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| String::from(*s))
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| String::from("non-string panic payload"));
            Err(LeafError::Panicked { message })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::Key;

    const FLAG: Key<bool> = Key::new("flag");
    const COUNTER: Key<u32> = Key::new("counter");

    #[test]
    fn condition_reads_blackboard() {
        let mut cond = Condition::new("flag set", |bb| bb.get_or(FLAG, false));
        let mut bb = Blackboard::new();
        assert_eq!(cond.tick(&mut bb), Status::Failure);
        bb.set(FLAG, true);
        assert_eq!(cond.tick(&mut bb), Status::Success);
    }

    #[test]
    fn action_mutates_blackboard() {
        let mut act = Action::new("count", |bb| {
            bb.update(COUNTER, |c| *c = c.saturating_add(1));
            Status::Success
        });
        let mut bb = Blackboard::new();
        act.tick(&mut bb);
        act.tick(&mut bb);
        assert_eq!(bb.get_copied(COUNTER), Some(2));
    }

    #[test]
    fn fallible_error_becomes_failure() {
        let mut act = Action::fallible("needs counter", |bb| {
            bb.get_copied(COUNTER)
                .map(|_| Status::Success)
                .ok_or(LeafError::MissingKey { key: COUNTER.name() })
        });
        let mut bb = Blackboard::new();
        assert_eq!(act.tick(&mut bb), Status::Failure);
        bb.set(COUNTER, 1);
        assert_eq!(act.tick(&mut bb), Status::Success);
    }

    #[test]
    #[allow(clippy::panic)]
    fn panicking_leaf_is_contained() {
        let mut cond = Condition::new("explodes", |_| panic!("boom"));
        let mut bb = Blackboard::new();
        assert_eq!(cond.tick(&mut bb), Status::Failure);

        let mut act = Action::new("explodes", |_| panic!("{}", String::from("bang")));
        assert_eq!(act.tick(&mut bb), Status::Failure);
    }

    #[test]
    fn flatten_reports_panic_message() {
        let payload: Box<dyn core::any::Any + Send> = Box::new("oops");
        let result: Result<(), LeafError> = flatten(Err(payload));
        assert!(matches!(result, Err(LeafError::Panicked { ref message }) if message == "oops"));
    }
}
