//! Decorator nodes wrapping exactly one child.

use crate::blackboard::Blackboard;
use crate::node::{BehaviorNode, BoxedNode, Status};

/// Swaps `Success` and `Failure`; passes `Running` through.
pub struct Inverter {
    name: String,
    child: BoxedNode,
}

impl Inverter {
    /// Invert `child`.
    pub fn new(name: impl Into<String>, child: BoxedNode) -> Self {
        Self {
            name: name.into(),
            child,
        }
    }
}

impl BehaviorNode for Inverter {
    fn tick(&mut self, blackboard: &mut Blackboard) -> Status {
        self.child.tick(blackboard).inverted()
    }

    fn reset(&mut self) {
        self.child.reset();
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Re-runs its child until it fails or a repetition bound is reached.
///
/// Each tick forwards one tick to the child. A child `Failure` is propagated
/// immediately and clears the repetition count. Each child `Success` counts
/// one repetition; reaching the bound yields `Success`, otherwise the
/// repeater reports `Running` and starts the child afresh next tick. An
/// unbounded repeater never succeeds.
pub struct Repeater {
    name: String,
    child: BoxedNode,
    limit: Option<u32>,
    completed: u32,
}

impl Repeater {
    /// Repeat `child` `limit` times.
    pub fn times(name: impl Into<String>, limit: u32, child: BoxedNode) -> Self {
        Self {
            name: name.into(),
            child,
            limit: Some(limit),
            completed: 0,
        }
    }

    /// Repeat `child` until it fails.
    pub fn forever(name: impl Into<String>, child: BoxedNode) -> Self {
        Self {
            name: name.into(),
            child,
            limit: None,
            completed: 0,
        }
    }

    /// Repetitions completed in the current run.
    pub const fn completed(&self) -> u32 {
        self.completed
    }
}

impl BehaviorNode for Repeater {
    fn tick(&mut self, blackboard: &mut Blackboard) -> Status {
        if self.limit == Some(0) {
            return Status::Success;
        }
        match self.child.tick(blackboard) {
            Status::Running => Status::Running,
            Status::Failure => {
                self.completed = 0;
                Status::Failure
            }
            Status::Success => {
                self.completed = self.completed.saturating_add(1);
                self.child.reset();
                if self.limit.is_some_and(|limit| self.completed >= limit) {
                    self.completed = 0;
                    Status::Success
                } else {
                    Status::Running
                }
            }
        }
    }

    fn reset(&mut self) {
        self.completed = 0;
        self.child.reset();
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Ticks its child for side effects and always reports `Success`.
///
/// A child left `Running` keeps its own resume state and continues the next
/// time this node is ticked.
pub struct Succeeder {
    name: String,
    child: BoxedNode,
}

impl Succeeder {
    /// Wrap `child`.
    pub fn new(name: impl Into<String>, child: BoxedNode) -> Self {
        Self {
            name: name.into(),
            child,
        }
    }
}

impl BehaviorNode for Succeeder {
    fn tick(&mut self, blackboard: &mut Blackboard) -> Status {
        let _ = self.child.tick(blackboard);
        Status::Success
    }

    fn reset(&mut self) {
        self.child.reset();
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeExt;
    use crate::testing::Scripted;

    #[test]
    fn inverter_swaps_outcomes() {
        let mut bb = Blackboard::new();
        let (ok, _) = Scripted::new(vec![Status::Success]);
        assert_eq!(Inverter::new("inv", ok.boxed()).tick(&mut bb), Status::Failure);
        let (bad, _) = Scripted::new(vec![Status::Failure]);
        assert_eq!(Inverter::new("inv", bad.boxed()).tick(&mut bb), Status::Success);
        let (run, _) = Scripted::new(vec![Status::Running]);
        assert_eq!(Inverter::new("inv", run.boxed()).tick(&mut bb), Status::Running);
    }

    #[test]
    fn repeater_succeeds_after_bound() {
        let (child, ticks) = Scripted::new(vec![Status::Success]);
        let mut rep = Repeater::times("rep", 3, child.boxed());
        let mut bb = Blackboard::new();
        assert_eq!(rep.tick(&mut bb), Status::Running);
        assert_eq!(rep.tick(&mut bb), Status::Running);
        assert_eq!(rep.tick(&mut bb), Status::Success);
        assert_eq!(ticks.get(), 3);
        assert_eq!(rep.completed(), 0);
    }

    #[test]
    fn repeater_propagates_failure() {
        let (child, _) = Scripted::new(vec![Status::Success, Status::Failure]);
        let mut rep = Repeater::times("rep", 5, child.boxed());
        let mut bb = Blackboard::new();
        assert_eq!(rep.tick(&mut bb), Status::Running);
        assert_eq!(rep.completed(), 1);
        assert_eq!(rep.tick(&mut bb), Status::Failure);
        assert_eq!(rep.completed(), 0);
    }

    #[test]
    fn repeater_waits_on_running_child() {
        let (child, _) = Scripted::new(vec![Status::Running, Status::Success]);
        let mut rep = Repeater::times("rep", 1, child.boxed());
        let mut bb = Blackboard::new();
        assert_eq!(rep.tick(&mut bb), Status::Running);
        assert_eq!(rep.completed(), 0);
        assert_eq!(rep.tick(&mut bb), Status::Success);
    }

    #[test]
    fn unbounded_repeater_never_succeeds() {
        let (child, _) = Scripted::new(vec![Status::Success]);
        let mut rep = Repeater::forever("loop", child.boxed());
        let mut bb = Blackboard::new();
        for _ in 0..50 {
            assert_eq!(rep.tick(&mut bb), Status::Running);
        }
    }

    #[test]
    fn zero_bound_succeeds_without_ticking() {
        let (child, ticks) = Scripted::new(vec![Status::Failure]);
        let mut rep = Repeater::times("rep", 0, child.boxed());
        let mut bb = Blackboard::new();
        assert_eq!(rep.tick(&mut bb), Status::Success);
        assert_eq!(ticks.get(), 0);
    }

    #[test]
    fn succeeder_always_succeeds_but_ticks_child() {
        let (child, ticks) = Scripted::new(vec![Status::Failure, Status::Running]);
        let mut node = Succeeder::new("ok", child.boxed());
        let mut bb = Blackboard::new();
        assert_eq!(node.tick(&mut bb), Status::Success);
        assert_eq!(node.tick(&mut bb), Status::Success);
        assert_eq!(ticks.get(), 2);
    }
}
