//! Composite nodes: [`Sequence`], [`Selector`], and [`Parallel`].
//!
//! Children are evaluated first to last, so child order is priority order.
//! `Sequence` and `Selector` remember the index of the child that returned
//! `Running` and resume there on the next tick instead of restarting; the
//! index returns to 0 whenever the composite finishes.

use crate::blackboard::Blackboard;
use crate::node::{BehaviorNode, BoxedNode, Status};

/// Runs children in order until one fails.
///
/// Empty sequences succeed.
pub struct Sequence {
    name: String,
    children: Vec<BoxedNode>,
    current: usize,
}

impl Sequence {
    /// Create a sequence over `children`.
    pub fn new(name: impl Into<String>, children: Vec<BoxedNode>) -> Self {
        Self {
            name: name.into(),
            children,
            current: 0,
        }
    }

    /// Index of the child that will be ticked next.
    pub const fn current_index(&self) -> usize {
        self.current
    }
}

impl BehaviorNode for Sequence {
    fn tick(&mut self, blackboard: &mut Blackboard) -> Status {
        while let Some(child) = self.children.get_mut(self.current) {
            match child.tick(blackboard) {
                Status::Running => return Status::Running,
                Status::Failure => {
                    self.current = 0;
                    return Status::Failure;
                }
                Status::Success => self.current = self.current.saturating_add(1),
            }
        }
        self.current = 0;
        Status::Success
    }

    fn reset(&mut self) {
        self.current = 0;
        for child in &mut self.children {
            child.reset();
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Runs children in order until one succeeds.
///
/// Empty selectors fail.
pub struct Selector {
    name: String,
    children: Vec<BoxedNode>,
    current: usize,
}

impl Selector {
    /// Create a selector over `children`.
    pub fn new(name: impl Into<String>, children: Vec<BoxedNode>) -> Self {
        Self {
            name: name.into(),
            children,
            current: 0,
        }
    }

    /// Index of the child that will be ticked next.
    pub const fn current_index(&self) -> usize {
        self.current
    }
}

impl BehaviorNode for Selector {
    fn tick(&mut self, blackboard: &mut Blackboard) -> Status {
        while let Some(child) = self.children.get_mut(self.current) {
            match child.tick(blackboard) {
                Status::Running => return Status::Running,
                Status::Success => {
                    self.current = 0;
                    return Status::Success;
                }
                Status::Failure => self.current = self.current.saturating_add(1),
            }
        }
        self.current = 0;
        Status::Failure
    }

    fn reset(&mut self) {
        self.current = 0;
        for child in &mut self.children {
            child.reset();
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Ticks every child on every call and decides by counting outcomes.
///
/// With `k` the success threshold and `n` children: `Success` once at least
/// `k` children succeed in a tick, `Failure` once `n - k + 1` have failed
/// (so `k` successes are no longer possible), otherwise `Running`. The
/// threshold is clamped to `1..=n`. A parallel with no children succeeds.
pub struct Parallel {
    name: String,
    children: Vec<BoxedNode>,
    success_threshold: usize,
}

impl Parallel {
    /// Create a parallel node that needs `success_threshold` successes.
    pub fn new(name: impl Into<String>, success_threshold: usize, children: Vec<BoxedNode>) -> Self {
        Self {
            name: name.into(),
            children,
            success_threshold,
        }
    }

    /// A parallel node that needs every child to succeed.
    pub fn all(name: impl Into<String>, children: Vec<BoxedNode>) -> Self {
        let n = children.len();
        Self::new(name, n, children)
    }

    /// A parallel node that needs one child to succeed.
    pub fn any(name: impl Into<String>, children: Vec<BoxedNode>) -> Self {
        Self::new(name, 1, children)
    }

    /// The effective threshold after clamping to `1..=n`.
    pub fn effective_threshold(&self) -> usize {
        self.success_threshold.clamp(1, self.children.len().max(1))
    }

    fn reset_children(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
    }
}

impl BehaviorNode for Parallel {
    fn tick(&mut self, blackboard: &mut Blackboard) -> Status {
        let n = self.children.len();
        if n == 0 {
            return Status::Success;
        }
        let k = self.effective_threshold();
        let failure_limit = n.saturating_sub(k).saturating_add(1);

        let mut successes: usize = 0;
        let mut failures: usize = 0;
        for child in &mut self.children {
            match child.tick(blackboard) {
                Status::Success => successes = successes.saturating_add(1),
                Status::Failure => failures = failures.saturating_add(1),
                Status::Running => {}
            }
        }

        if successes >= k {
            self.reset_children();
            Status::Success
        } else if failures >= failure_limit {
            self.reset_children();
            Status::Failure
        } else {
            Status::Running
        }
    }

    fn reset(&mut self) {
        self.reset_children();
    }

    fn name(&self) -> &str {
        &self.name
    }
}
