//! The node contract shared by every behavior tree node.

use crate::blackboard::Blackboard;

/// Result of ticking a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The node finished and achieved its goal.
    Success,
    /// The node finished without achieving its goal.
    Failure,
    /// The node needs more ticks; it resumes where it left off.
    Running,
}

impl Status {
    /// Whether the node finished (`Success` or `Failure`).
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Swap `Success` and `Failure`; `Running` is unchanged.
    pub const fn inverted(self) -> Self {
        match self {
            Self::Success => Self::Failure,
            Self::Failure => Self::Success,
            Self::Running => Self::Running,
        }
    }

    /// `Success` for `true`, `Failure` for `false`.
    pub const fn from_bool(ok: bool) -> Self {
        if ok { Self::Success } else { Self::Failure }
    }
}

/// A node in a behavior tree.
///
/// Nodes own their children exclusively, so a tree is always a strict tree.
/// Composite and decorator nodes keep resume state between ticks; `reset`
/// clears it recursively.
pub trait BehaviorNode: Send {
    /// Run one tick of this node against the agent's blackboard.
    fn tick(&mut self, blackboard: &mut Blackboard) -> Status;

    /// Clear resume state in this node and all of its descendants.
    fn reset(&mut self);

    /// Human-readable name used in logs.
    fn name(&self) -> &str;
}

/// An owned, type-erased behavior tree node.
pub type BoxedNode = Box<dyn BehaviorNode>;

/// Convenience conversion of concrete nodes into [`BoxedNode`].
pub trait NodeExt: BehaviorNode + Sized + 'static {
    /// Box this node.
    fn boxed(self) -> BoxedNode {
        Box::new(self)
    }
}

impl<T: BehaviorNode + 'static> NodeExt for T {}
