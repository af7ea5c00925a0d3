//! A behavior tree: one root node coupled with one blackboard.

use tracing::trace;

use crate::blackboard::Blackboard;
use crate::node::{BoxedNode, Status};

/// One root node plus the blackboard it reads and writes.
///
/// A tree is exclusively owned by a single agent. Structurally identical
/// trees for different agents are separate instances with separate state.
pub struct BehaviorTree {
    root: BoxedNode,
    blackboard: Blackboard,
    ticks: u64,
    last_status: Option<Status>,
}

impl BehaviorTree {
    /// Create a tree with an empty blackboard.
    pub const fn new(root: BoxedNode) -> Self {
        Self::with_blackboard(root, Blackboard::new())
    }

    /// Create a tree over an existing blackboard.
    pub const fn with_blackboard(root: BoxedNode, blackboard: Blackboard) -> Self {
        Self {
            root,
            blackboard,
            ticks: 0,
            last_status: None,
        }
    }

    /// Tick the root once against the tree's blackboard.
    pub fn tick(&mut self) -> Status {
        let status = self.root.tick(&mut self.blackboard);
        self.ticks = self.ticks.saturating_add(1);
        self.last_status = Some(status);
        trace!(tree = self.root.name(), ?status, ticks = self.ticks, "tree ticked");
        status
    }

    /// Recursively clear every composite and decorator resume state.
    ///
    /// The blackboard is left untouched.
    pub fn reset(&mut self) {
        self.root.reset();
        self.last_status = None;
    }

    /// Borrow the blackboard.
    pub const fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    /// Mutably borrow the blackboard.
    pub const fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// Status returned by the most recent tick, if any since the last reset.
    pub const fn last_status(&self) -> Option<Status> {
        self.last_status
    }

    /// Number of ticks performed.
    pub const fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Name of the root node.
    pub fn root_name(&self) -> &str {
        self.root.name()
    }
}

impl core::fmt::Debug for BehaviorTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("root", &self.root.name())
            .field("ticks", &self.ticks)
            .field("last_status", &self.last_status)
            .field("blackboard", &self.blackboard)
            .finish()
    }
}
