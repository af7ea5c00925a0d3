//! Tunable parameters for citizen needs, memory, social contact, trade, and
//! behavior.
//!
//! Every struct deserializes with `#[serde(default)]`, so a partial section
//! in `civitas-config.yaml` only overrides the keys it names. The simulation
//! crate embeds these sections in its top-level config.

use civitas_types::{NeedKind, NeedPolarity};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Needs
// ---------------------------------------------------------------------------

/// Declaration of one need: its range, drift rate, and polarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeedSpec {
    /// Which need this is.
    pub kind: NeedKind,
    /// Lower bound of the value range.
    pub min: f64,
    /// Upper bound of the value range.
    pub max: f64,
    /// Change in value per simulated second. Positive values grow.
    pub rate: f64,
    /// Which end of the range is bad.
    pub polarity: NeedPolarity,
    /// Value at spawn.
    pub initial: f64,
}

impl NeedSpec {
    /// Declare a need.
    pub const fn new(
        kind: NeedKind,
        min: f64,
        max: f64,
        rate: f64,
        polarity: NeedPolarity,
        initial: f64,
    ) -> Self {
        Self {
            kind,
            min,
            max,
            rate,
            polarity,
            initial,
        }
    }
}

/// Configuration for the needs model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedsConfig {
    /// Declared needs, in tie-break order for "most critical".
    pub needs: Vec<NeedSpec>,
    /// Urgency at or above which a need counts as critical and preempts the
    /// current behavior.
    pub critical_urgency: f64,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            needs: vec![
                NeedSpec::new(NeedKind::Hunger, 0.0, 100.0, 0.35, NeedPolarity::BadWhenHigh, 20.0),
                NeedSpec::new(NeedKind::Energy, 0.0, 1.0, -0.002, NeedPolarity::BadWhenLow, 0.9),
                NeedSpec::new(NeedKind::Social, 0.0, 1.0, -0.003, NeedPolarity::BadWhenLow, 0.7),
                NeedSpec::new(NeedKind::Fun, 0.0, 1.0, -0.0025, NeedPolarity::BadWhenLow, 0.7),
            ],
            critical_urgency: 0.85,
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Configuration for the event log and relationship ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Maximum number of events retained; the oldest is evicted first.
    pub capacity: usize,
    /// Events older than this many simulated seconds are purged.
    pub event_ttl_seconds: f64,
    /// Relationship points per simulated second that every relationship
    /// drifts toward zero.
    pub relationship_decay_per_second: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            event_ttl_seconds: 600.0,
            relationship_decay_per_second: 0.01,
        }
    }
}

// ---------------------------------------------------------------------------
// Social
// ---------------------------------------------------------------------------

/// Configuration for pairwise social interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Maximum relationship change from a single interaction.
    pub interaction_strength: f64,
    /// Weight of mean agreeableness added to compatibility.
    pub agreeableness_bonus: f64,
    /// Fraction of the social range restored to both participants.
    pub social_gain: f64,
    /// Relationship above which the other agent counts as a friend.
    pub friend_threshold: f64,
    /// Relationship below which the other agent counts as hostile.
    pub hostile_threshold: f64,
    /// Maximum distance at which two agents can talk.
    pub interaction_radius: f64,
    /// Per-tick probability that a nearby idle pair strikes up a
    /// conversation on its own.
    pub spontaneous_chance: f64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            interaction_strength: 10.0,
            agreeableness_bonus: 0.2,
            social_gain: 0.15,
            friend_threshold: 50.0,
            hostile_threshold: -50.0,
            interaction_radius: 2.5,
            spontaneous_chance: 0.02,
        }
    }
}

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

/// Configuration for bilateral trade evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    /// Acceptance fraction toward friends (relationship above the friend threshold).
    pub friend_fraction: f64,
    /// Acceptance fraction toward neutral agents.
    pub neutral_fraction: f64,
    /// Acceptance fraction toward hostile agents (relationship below the hostile threshold).
    pub hostile_fraction: f64,
    /// Relationship change for both parties when a trade is accepted.
    pub accept_delta: f64,
    /// Relationship change for the proposer when a trade is rejected.
    pub reject_delta: f64,
    /// Maximum distance at which a trade can be proposed.
    pub trade_radius: f64,
    /// Per-tick probability that a nearby pair attempts a trade on its own.
    pub spontaneous_chance: f64,
    /// Upper bound on proposals queued for resolution next tick.
    pub max_pending: usize,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            friend_fraction: 0.8,
            neutral_fraction: 0.9,
            hostile_fraction: 1.3,
            accept_delta: 2.0,
            reject_delta: -1.0,
            trade_radius: 3.0,
            spontaneous_chance: 0.01,
            max_pending: 256,
        }
    }
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Thresholds and rates used by the citizen behavior tree.
///
/// Urgencies are normalized to `[0, 1]`; amounts are fractions of a need's
/// range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Hunger urgency at which an agent goes to eat.
    pub hunger_threshold: f64,
    /// Energy urgency at which an agent goes home to rest.
    pub energy_threshold: f64,
    /// Social urgency at which an agent seeks company.
    pub social_threshold: f64,
    /// Fun urgency at which an agent heads to a park.
    pub fun_threshold: f64,
    /// Urgency at which an agent tries to trade for a relieving item.
    pub trade_threshold: f64,
    /// Resting and leisure stop once urgency drops to this level.
    pub release_urgency: f64,
    /// Fraction of a need's range relieved by consuming one item.
    pub item_relief: f64,
    /// Fraction of the energy range restored per second of rest.
    pub rest_rate: f64,
    /// Fraction of the fun range restored per second in a park.
    pub leisure_rate: f64,
    /// Simulated seconds in one work shift before the agent reconsiders.
    pub shift_seconds: f64,
    /// Hour of day at which work starts.
    pub work_start_hour: f64,
    /// Hour of day at which work ends.
    pub work_end_hour: f64,
    /// Distance from a waypoint center that counts as reached.
    pub arrival_radius: f64,
    /// Distance at which an agent stops approaching someone to talk or trade.
    pub contact_radius: f64,
    /// Minimum simulated seconds between two conversations, and between two
    /// trade offers, started by the same agent.
    pub contact_cooldown_seconds: f64,
    /// Neighbors whose relationship is at or below this are not approached.
    pub avoid_below: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            hunger_threshold: 0.6,
            energy_threshold: 0.7,
            social_threshold: 0.5,
            fun_threshold: 0.6,
            trade_threshold: 0.5,
            release_urgency: 0.15,
            item_relief: 0.5,
            rest_rate: 0.02,
            leisure_rate: 0.02,
            shift_seconds: 120.0,
            work_start_hour: 8.0,
            work_end_hour: 18.0,
            arrival_radius: 0.35,
            contact_radius: 2.0,
            contact_cooldown_seconds: 20.0,
            avoid_below: -50.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Everything an individual agent needs at spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Needs model.
    pub needs: NeedsConfig,
    /// Event log and relationships.
    pub memory: MemoryConfig,
    /// Citizen behavior tree.
    pub behavior: BehaviorConfig,
    /// Walking speed cap in cells per simulated second.
    pub max_speed: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            needs: NeedsConfig::default(),
            memory: MemoryConfig::default(),
            behavior: BehaviorConfig::default(),
            max_speed: 1.4,
        }
    }
}
