//! Blackboard slots shared between an [`Agent`](crate::Agent) and its brain.
//!
//! Before each think step the agent writes its sensed state into the
//! blackboard. Leaves read those slots, steer through [`DESIRED_VELOCITY`],
//! label what they are doing through [`ACTIVITY`], and request changes to
//! agent state by pushing [`Effect`]s onto [`EFFECTS`]. The agent applies
//! the effects after the tick, so leaves never hold a borrow of the agent.

use std::collections::BTreeMap;

use civitas_behavior::Key;
use civitas_types::{AgentActivity, AgentId, Item, MemoryEventKind, NeedKind, Vec2};
use rust_decimal::Decimal;

/// Another agent inside the perception radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// The other agent.
    pub id: AgentId,
    /// Its position.
    pub position: Vec2,
    /// Distance from the perceiving agent.
    pub distance: f64,
    /// The perceiving agent's relationship toward it.
    pub relationship: f64,
}

/// A state change requested by a leaf and applied by the agent.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Move a need toward its good end by a fraction of its range.
    Satisfy {
        /// The need.
        need: NeedKind,
        /// Fraction of the need's range.
        amount: f64,
    },
    /// Receive wages.
    Earn(Decimal),
    /// Buy one item at a shop.
    Purchase {
        /// The item bought.
        item: Item,
        /// Price paid.
        price: Decimal,
    },
    /// Consume one carried item and relieve its need.
    Consume(Item),
    /// Ask the manager to start a conversation with another agent.
    SeekInteraction(AgentId),
    /// Ask the manager to draft a trade with another agent.
    ProposeTrade(AgentId),
    /// Record an event in memory.
    Remember {
        /// Event category.
        kind: MemoryEventKind,
        /// The other agent involved, if any.
        subject: Option<AgentId>,
        /// Structured details.
        payload: serde_json::Value,
    },
}

// ---------------------------------------------------------------------------
// Written by the agent before every think step
// ---------------------------------------------------------------------------

/// The agent's own id.
pub const SELF_ID: Key<AgentId> = Key::new("self_id");
/// Current world position.
pub const POSITION: Key<Vec2> = Key::new("position");
/// Velocity from the previous tick.
pub const VELOCITY: Key<Vec2> = Key::new("velocity");
/// Top walking speed in cells per second.
pub const MAX_SPEED: Key<f64> = Key::new("max_speed");
/// Urgency of every need in `[0, 1]`.
pub const URGENCIES: Key<BTreeMap<NeedKind, f64>> = Key::new("urgencies");
/// The most critical need and its urgency.
pub const MOST_CRITICAL: Key<Option<(NeedKind, f64)>> = Key::new("most_critical");
/// Perceived neighbors, nearest first.
pub const NEIGHBORS: Key<Vec<Neighbor>> = Key::new("neighbors");
/// Currency balance.
pub const BALANCE: Key<Decimal> = Key::new("balance");
/// Carried items.
pub const INVENTORY: Key<BTreeMap<Item, u32>> = Key::new("inventory");
/// Simulated seconds in this tick.
pub const DT: Key<f64> = Key::new("dt");
/// Simulated hour of day in `[0, 24)`.
pub const HOUR: Key<f64> = Key::new("hour");
/// Simulation clock in seconds.
pub const NOW: Key<f64> = Key::new("now");

// ---------------------------------------------------------------------------
// Written by leaves
// ---------------------------------------------------------------------------

/// Velocity the brain wants this tick, before avoidance.
pub const DESIRED_VELOCITY: Key<Vec2> = Key::new("desired_velocity");
/// Activity label for this tick.
pub const ACTIVITY: Key<AgentActivity> = Key::new("activity");
/// Pending effects, drained by the agent after every think step.
pub const EFFECTS: Key<Vec<Effect>> = Key::new("effects");

/// Read the urgency of `need` from the blackboard, zero if absent.
pub fn urgency(blackboard: &civitas_behavior::Blackboard, need: NeedKind) -> f64 {
    blackboard
        .get(URGENCIES)
        .and_then(|u| u.get(&need))
        .copied()
        .unwrap_or(0.0)
}

/// Queue an effect for the agent to apply.
pub fn push_effect(blackboard: &mut civitas_behavior::Blackboard, effect: Effect) {
    blackboard.update(EFFECTS, |effects| effects.push(effect));
}
