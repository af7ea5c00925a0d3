//! Decision sources: what drives an agent each tick.
//!
//! The default brain is the agent's behavior tree. Any other mechanism (a
//! scripted bot, a language-model planner, a human at a debug console) plugs
//! in behind [`DecisionSource`]: it sees the same blackboard a tree would
//! and answers through the same slots, so the rest of the simulation cannot
//! tell the difference.

use std::collections::VecDeque;

use civitas_behavior::{BehaviorTree, Blackboard, Status};
use civitas_types::{AgentActivity, Vec2};

use crate::keys::{self, Effect};

/// A pluggable source of agent decisions.
///
/// `decide` runs once per tick after the agent has written its sensed state
/// into `blackboard`. Implementations steer through
/// [`keys::DESIRED_VELOCITY`], label themselves through [`keys::ACTIVITY`],
/// and request state changes by pushing onto [`keys::EFFECTS`].
pub trait DecisionSource: Send {
    /// Produce this tick's decision.
    fn decide(&mut self, blackboard: &mut Blackboard) -> Status;

    /// Discard any in-progress plan.
    fn reset(&mut self) {}

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// A decision source that always stands still.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleDecisionSource;

impl DecisionSource for IdleDecisionSource {
    fn decide(&mut self, blackboard: &mut Blackboard) -> Status {
        blackboard.set(keys::DESIRED_VELOCITY, Vec2::ZERO);
        blackboard.set(keys::ACTIVITY, AgentActivity::Idle);
        Status::Success
    }

    fn name(&self) -> &str {
        "idle"
    }
}

/// One scripted tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedStep {
    /// Activity label.
    pub activity: AgentActivity,
    /// Desired velocity.
    pub velocity: Vec2,
    /// Effects to emit.
    pub effects: Vec<Effect>,
}

/// Plays back a fixed list of steps, then idles.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisionSource {
    steps: VecDeque<ScriptedStep>,
}

impl ScriptedDecisionSource {
    /// Play back `steps` in order.
    pub fn new(steps: impl IntoIterator<Item = ScriptedStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// Steps not yet played.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl DecisionSource for ScriptedDecisionSource {
    fn decide(&mut self, blackboard: &mut Blackboard) -> Status {
        let Some(step) = self.steps.pop_front() else {
            return IdleDecisionSource.decide(blackboard);
        };
        blackboard.set(keys::DESIRED_VELOCITY, step.velocity);
        blackboard.set(keys::ACTIVITY, step.activity);
        for effect in step.effects {
            keys::push_effect(blackboard, effect);
        }
        if self.steps.is_empty() {
            Status::Success
        } else {
            Status::Running
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// The thing that makes an agent's decisions.
pub enum Brain {
    /// A behavior tree with its own blackboard.
    Tree(BehaviorTree),
    /// An external source with a blackboard kept by the agent.
    External {
        /// Slots shared with the source.
        blackboard: Blackboard,
        /// The source itself.
        source: Box<dyn DecisionSource>,
    },
}

impl Brain {
    /// Wrap an external decision source.
    pub fn external(source: impl DecisionSource + 'static) -> Self {
        Self::External {
            blackboard: Blackboard::new(),
            source: Box::new(source),
        }
    }

    /// The blackboard this brain reads and writes.
    pub const fn blackboard(&self) -> &Blackboard {
        match self {
            Self::Tree(tree) => tree.blackboard(),
            Self::External { blackboard, .. } => blackboard,
        }
    }

    /// Mutable access to the blackboard.
    pub const fn blackboard_mut(&mut self) -> &mut Blackboard {
        match self {
            Self::Tree(tree) => tree.blackboard_mut(),
            Self::External { blackboard, .. } => blackboard,
        }
    }

    /// Run one decision step.
    pub fn tick(&mut self) -> Status {
        match self {
            Self::Tree(tree) => tree.tick(),
            Self::External { blackboard, source } => source.decide(blackboard),
        }
    }

    /// Abandon the current plan.
    pub fn reset(&mut self) {
        match self {
            Self::Tree(tree) => tree.reset(),
            Self::External { source, .. } => source.reset(),
        }
    }

    /// Name used in logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Tree(tree) => tree.root_name(),
            Self::External { source, .. } => source.name(),
        }
    }
}

impl core::fmt::Debug for Brain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Tree(tree) => f.debug_tuple("Tree").field(tree).finish(),
            Self::External { source, .. } => {
                f.debug_struct("External").field("source", &source.name()).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use civitas_behavior::{Action, NodeExt};

    use super::*;

    #[test]
    fn idle_source_stands_still() {
        let mut brain = Brain::external(IdleDecisionSource);
        assert_eq!(brain.tick(), Status::Success);
        assert_eq!(brain.blackboard().get_copied(keys::DESIRED_VELOCITY), Some(Vec2::ZERO));
        assert_eq!(brain.blackboard().get_copied(keys::ACTIVITY), Some(AgentActivity::Idle));
        assert_eq!(brain.name(), "idle");
    }

    #[test]
    fn scripted_source_plays_steps_then_idles() {
        let step = ScriptedStep {
            activity: AgentActivity::Walking,
            velocity: Vec2::new(1.0, 0.0),
            effects: vec![Effect::Consume(civitas_types::Item::Food)],
        };
        let mut brain = Brain::external(ScriptedDecisionSource::new([step.clone(), step]));
        assert_eq!(brain.tick(), Status::Running);
        assert_eq!(brain.tick(), Status::Success);
        assert_eq!(brain.blackboard().get(keys::EFFECTS).map(Vec::len), Some(2));
        assert_eq!(brain.tick(), Status::Success);
        assert_eq!(brain.blackboard().get_copied(keys::ACTIVITY), Some(AgentActivity::Idle));
    }

    #[test]
    fn tree_brain_delegates_to_tree() {
        let root = Action::new("walk", |bb| {
            bb.set(keys::ACTIVITY, AgentActivity::Walking);
            Status::Running
        });
        let mut brain = Brain::Tree(BehaviorTree::new(root.boxed()));
        assert_eq!(brain.tick(), Status::Running);
        assert_eq!(brain.blackboard().get_copied(keys::ACTIVITY), Some(AgentActivity::Walking));
        assert_eq!(brain.name(), "walk");
    }
}
