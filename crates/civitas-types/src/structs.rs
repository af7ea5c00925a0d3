//! Core entity structs shared across the workspace.
//!
//! Profiles and personalities describe agents at spawn; buildings and road
//! segments are the world generator's output; snapshots and statistics are
//! what the rendering host polls each frame.

use std::collections::BTreeMap;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AgentActivity, Archetype, Item, MemoryEventKind, NeedKind, ZoneType};
use crate::geometry::{GridPos, Vec2};
use crate::ids::AgentId;

// ---------------------------------------------------------------------------
// Personality
// ---------------------------------------------------------------------------

/// Personality vector of an agent.
///
/// Each trait is in `[0.0, 1.0]`. Personality never changes after spawn; it
/// scales perception radius, interaction frequency, and social compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Personality {
    /// Curiosity and appetite for novelty.
    pub openness: f64,
    /// Diligence; drives how readily the agent goes to work.
    pub conscientiousness: f64,
    /// Sociability; widens perception and raises interaction frequency.
    pub extraversion: f64,
    /// Warmth toward others; adds a compatibility bonus.
    pub agreeableness: f64,
    /// Emotional volatility; amplifies relationship swings.
    pub neuroticism: f64,
}

impl Personality {
    /// Build a personality, clamping every trait into `[0, 1]`.
    ///
    /// NaN traits become 0.5.
    pub fn new(
        openness: f64,
        conscientiousness: f64,
        extraversion: f64,
        agreeableness: f64,
        neuroticism: f64,
    ) -> Self {
        Self {
            openness: clamp_unit(openness),
            conscientiousness: clamp_unit(conscientiousness),
            extraversion: clamp_unit(extraversion),
            agreeableness: clamp_unit(agreeableness),
            neuroticism: clamp_unit(neuroticism),
        }
    }

    /// A personality with every trait at 0.5.
    pub const fn balanced() -> Self {
        Self {
            openness: 0.5,
            conscientiousness: 0.5,
            extraversion: 0.5,
            agreeableness: 0.5,
            neuroticism: 0.5,
        }
    }

    /// Draw a uniformly random personality from `rng`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(
            rng.random(),
            rng.random(),
            rng.random(),
            rng.random(),
            rng.random(),
        )
    }

    /// Distance between the four social traits, normalized to `[0, 1]`.
    ///
    /// Uses openness, conscientiousness, extraversion, and agreeableness.
    /// Neuroticism is excluded. The maximum Euclidean distance over four unit
    /// axes is 2, which maps to 1.0.
    pub fn social_distance(&self, other: &Self) -> f64 {
        let d = [
            self.openness - other.openness,
            self.conscientiousness - other.conscientiousness,
            self.extraversion - other.extraversion,
            self.agreeableness - other.agreeableness,
        ];
        let sum_sq: f64 = d.iter().map(|v| v * v).sum();
        (sum_sq.sqrt() / 2.0).clamp(0.0, 1.0)
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::balanced()
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.5 } else { v.clamp(0.0, 1.0) }
}

// ---------------------------------------------------------------------------
// Spawn profile
// ---------------------------------------------------------------------------

/// Everything the manager needs to spawn an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentProfile {
    /// Display name.
    pub name: String,
    /// Broad role; decides the workplace and wage.
    pub archetype: Archetype,
    /// Fixed personality vector.
    pub personality: Personality,
    /// Starting currency balance. Negative values are clamped to zero.
    #[ts(as = "String")]
    pub starting_balance: Decimal,
    /// Starting items.
    pub starting_inventory: BTreeMap<Item, u32>,
}

impl AgentProfile {
    /// A profile with an empty inventory and zero balance.
    pub fn new(name: impl Into<String>, archetype: Archetype, personality: Personality) -> Self {
        Self {
            name: name.into(),
            archetype,
            personality,
            starting_balance: Decimal::ZERO,
            starting_inventory: BTreeMap::new(),
        }
    }

    /// Set the starting balance.
    #[must_use]
    pub const fn with_balance(mut self, balance: Decimal) -> Self {
        self.starting_balance = balance;
        self
    }

    /// Add `quantity` of `item` to the starting inventory.
    #[must_use]
    pub fn with_item(mut self, item: Item, quantity: u32) -> Self {
        let slot = self.starting_inventory.entry(item).or_insert(0);
        *slot = slot.saturating_add(quantity);
        self
    }
}

// ---------------------------------------------------------------------------
// World generator output
// ---------------------------------------------------------------------------

/// A building placed by the world generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Building {
    /// Generator-assigned index, unique per layout.
    pub id: u32,
    /// The walkable entrance cell agents navigate to.
    pub entrance: GridPos,
    /// Land-use tag.
    pub zone: ZoneType,
}

/// A straight road segment between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RoadSegment {
    /// First endpoint.
    pub start: GridPos,
    /// Second endpoint.
    pub end: GridPos,
}

// ---------------------------------------------------------------------------
// Memory events
// ---------------------------------------------------------------------------

/// One entry in an agent's bounded event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemoryEvent {
    /// What happened.
    pub kind: MemoryEventKind,
    /// The other agent involved, if any.
    pub subject: Option<AgentId>,
    /// Free-form structured details.
    pub payload: serde_json::Value,
    /// Simulation time in seconds when the event occurred.
    pub timestamp: f64,
}

// ---------------------------------------------------------------------------
// Render-facing snapshots
// ---------------------------------------------------------------------------

/// Per-agent state polled by the renderer and the debug overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentSnapshot {
    /// Agent identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Spawn archetype.
    pub archetype: Archetype,
    /// World position.
    pub position: Vec2,
    /// Facing in degrees, `[0, 360)`.
    pub heading: f64,
    /// Current activity tag.
    pub activity: AgentActivity,
    /// Current need values.
    pub needs: BTreeMap<NeedKind, f64>,
    /// The need with the highest urgency.
    pub most_critical: Option<NeedKind>,
    /// Currency balance.
    #[ts(as = "String")]
    pub balance: Decimal,
    /// Carried items.
    pub inventory: BTreeMap<Item, u32>,
    /// Number of relationships above the friendship threshold.
    pub friends: u32,
}

/// Aggregate statistics over the whole population.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationStats {
    /// Number of completed ticks.
    pub tick: u64,
    /// Simulated seconds elapsed.
    pub elapsed_seconds: f64,
    /// Number of agents alive.
    pub population: u32,
    /// How many agents are in each activity.
    pub activity_histogram: BTreeMap<AgentActivity, u32>,
    /// Mean value of each need across the population.
    pub average_needs: BTreeMap<NeedKind, f64>,
    /// Wealth inequality in `[0, 1]`.
    pub gini: f64,
    /// Sum of all balances.
    #[ts(as = "String")]
    pub total_wealth: Decimal,
    /// Social interactions since the simulation started.
    pub interactions: u64,
    /// Trade proposals created since the simulation started.
    pub trades_proposed: u64,
    /// Trades accepted since the simulation started.
    pub trades_accepted: u64,
    /// Trades rejected since the simulation started.
    pub trades_rejected: u64,
    /// Trades dropped unresolved since the simulation started, because a
    /// party left or could no longer cover its side.
    pub trades_expired: u64,
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn personality_traits_are_clamped() {
        let p = Personality::new(-1.0, 2.0, 0.3, f64::NAN, 0.9);
        assert!((p.openness - 0.0).abs() < f64::EPSILON);
        assert!((p.conscientiousness - 1.0).abs() < f64::EPSILON);
        assert!((p.agreeableness - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn social_distance_bounds() {
        let a = Personality::new(0.0, 0.0, 0.0, 0.0, 0.0);
        let b = Personality::new(1.0, 1.0, 1.0, 1.0, 0.0);
        assert!((a.social_distance(&a)).abs() < 1e-12);
        assert!((a.social_distance(&b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn social_distance_ignores_neuroticism() {
        let a = Personality::new(0.5, 0.5, 0.5, 0.5, 0.0);
        let b = Personality::new(0.5, 0.5, 0.5, 0.5, 1.0);
        assert!(a.social_distance(&b).abs() < 1e-12);
    }

    #[test]
    fn random_personality_is_seeded() {
        let mut r1 = StdRng::seed_from_u64(11);
        let mut r2 = StdRng::seed_from_u64(11);
        assert_eq!(Personality::random(&mut r1), Personality::random(&mut r2));
    }

    #[test]
    fn profile_builder_accumulates_items() {
        let profile = AgentProfile::new("Ada", Archetype::Merchant, Personality::balanced())
            .with_balance(Decimal::new(50, 0))
            .with_item(Item::Food, 2)
            .with_item(Item::Food, 3);
        assert_eq!(profile.starting_inventory.get(&Item::Food), Some(&5));
        assert_eq!(profile.starting_balance, Decimal::new(50, 0));
    }

    #[test]
    fn stats_roundtrip_json() {
        let mut stats = SimulationStats {
            population: 3,
            gini: 0.25,
            ..SimulationStats::default()
        };
        stats.activity_histogram.insert(AgentActivity::Walking, 2);
        let json = serde_json::to_string(&stats).ok();
        let back: Option<SimulationStats> =
            json.as_deref().and_then(|s| serde_json::from_str(s).ok());
        assert_eq!(back, Some(stats));
    }
}
