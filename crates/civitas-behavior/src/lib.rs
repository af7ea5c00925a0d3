//! Behavior tree engine for Civitas agents.
//!
//! A tree is a strict hierarchy of [`BehaviorNode`]s ticked once per agent
//! update. Each tick returns a [`Status`]; composites and decorators remember
//! where a `Running` child left off so long actions (walking to a building,
//! queueing at a counter) span many ticks without restarting. Nodes exchange
//! data through the agent's typed [`Blackboard`].
//!
//! # Modules
//!
//! - [`blackboard`] -- Typed per-agent key/value store
//! - [`node`] -- The [`BehaviorNode`] contract and [`Status`]
//! - [`composite`] -- [`Sequence`], [`Selector`], [`Parallel`]
//! - [`decorator`] -- [`Inverter`], [`Repeater`], [`Succeeder`]
//! - [`leaf`] -- Closure-backed [`Condition`] and [`Action`] leaves
//! - [`tree`] -- [`BehaviorTree`], a root node bound to its blackboard
//! - [`error`] -- [`LeafError`] reported by fallible leaves

pub mod blackboard;
pub mod composite;
pub mod decorator;
pub mod error;
pub mod leaf;
pub mod node;
pub mod tree;

pub use blackboard::{Blackboard, Key};
pub use composite::{Parallel, Selector, Sequence};
pub use decorator::{Inverter, Repeater, Succeeder};
pub use error::LeafError;
pub use leaf::{Action, Condition};
pub use node::{BehaviorNode, BoxedNode, NodeExt, Status};
pub use tree::BehaviorTree;

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted nodes for exercising composites and decorators.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::blackboard::Blackboard;
    use crate::node::{BehaviorNode, Status};

    /// Shared view of how often a [`Scripted`] node was ticked and reset.
    #[derive(Clone, Default)]
    pub struct TickCounter {
        ticks: Arc<AtomicUsize>,
        resets: Arc<AtomicUsize>,
    }

    impl TickCounter {
        pub fn get(&self) -> usize {
            self.ticks.load(Ordering::SeqCst)
        }

        pub fn resets(&self) -> usize {
            self.resets.load(Ordering::SeqCst)
        }
    }

    /// Returns a fixed sequence of statuses, repeating the last one.
    ///
    /// `reset` is counted but does not rewind the script, so tests can tell
    /// a restarted child from a resumed one by its tick count.
    pub struct Scripted {
        script: Vec<Status>,
        cursor: usize,
        counter: TickCounter,
    }

    impl Scripted {
        pub fn new(script: Vec<Status>) -> (Self, TickCounter) {
            let counter = TickCounter::default();
            let node = Self {
                script,
                cursor: 0,
                counter: counter.clone(),
            };
            (node, counter)
        }
    }

    impl BehaviorNode for Scripted {
        fn tick(&mut self, _blackboard: &mut Blackboard) -> Status {
            self.counter.ticks.fetch_add(1, Ordering::SeqCst);
            let status = self
                .script
                .get(self.cursor)
                .or_else(|| self.script.last())
                .copied()
                .unwrap_or(Status::Failure);
            if self.cursor < self.script.len() {
                self.cursor += 1;
            }
            status
        }

        fn reset(&mut self) {
            self.counter.resets.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }
}
