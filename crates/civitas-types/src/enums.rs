//! Enumeration types for the Civitas simulation.
//!
//! Activities, zones, archetypes, needs, items, and memory event kinds.
//! Every enum here is serializable and exported to `TypeScript` so the
//! rendering host can consume the same vocabulary.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Activity (render-facing state tag)
// ---------------------------------------------------------------------------

/// The discrete activity an agent is currently engaged in.
///
/// This is the state tag polled by the renderer to pick animations and
/// debug overlay colors.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum AgentActivity {
    /// Standing around with nothing to do.
    #[default]
    Idle,
    /// Moving toward a destination.
    Walking,
    /// Earning wages at a work site.
    Working,
    /// Talking with another agent.
    Socializing,
    /// Negotiating or executing a trade.
    Trading,
    /// Recovering energy at home.
    Resting,
    /// Looking for something that satisfies a pressing need.
    Seeking,
}

impl AgentActivity {
    /// Every activity in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Idle,
        Self::Walking,
        Self::Working,
        Self::Socializing,
        Self::Trading,
        Self::Resting,
        Self::Seeking,
    ];

    /// Lowercase tag used in logs and snapshots.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walking => "walking",
            Self::Working => "working",
            Self::Socializing => "socializing",
            Self::Trading => "trading",
            Self::Resting => "resting",
            Self::Seeking => "seeking",
        }
    }
}

impl core::fmt::Display for AgentActivity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Land-use tag attached to each building by the world generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    /// Shops, cafes, markets. Food and goods are bought here.
    Commercial,
    /// Homes. Agents rest here.
    Residential,
    /// Factories and workshops. Agents work here.
    Industrial,
    /// Parks and plazas. Agents relax and meet here.
    Park,
    /// Mixed use: counts as both commercial and residential.
    Mixed,
}

impl ZoneType {
    /// Whether a building of this zone can serve a request for `wanted`.
    ///
    /// [`ZoneType::Mixed`] serves both commercial and residential requests.
    pub const fn serves(self, wanted: Self) -> bool {
        match (self, wanted) {
            (Self::Mixed, Self::Commercial | Self::Residential | Self::Mixed) => true,
            (Self::Commercial, Self::Commercial)
            | (Self::Residential, Self::Residential)
            | (Self::Industrial, Self::Industrial)
            | (Self::Park, Self::Park) => true,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Archetypes
// ---------------------------------------------------------------------------

/// Broad role a citizen is spawned with. Shapes wages and preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Works industrial shifts for steady wages.
    Laborer,
    /// Works commercial shifts and trades eagerly.
    Merchant,
    /// Prioritizes company and leisure.
    Socialite,
    /// Drifts along roads, rarely works.
    Wanderer,
}

impl Archetype {
    /// Every archetype in declaration order.
    pub const ALL: [Self; 4] = [Self::Laborer, Self::Merchant, Self::Socialite, Self::Wanderer];

    /// The zone this archetype commutes to for work, if any.
    pub const fn workplace(self) -> Option<ZoneType> {
        match self {
            Self::Laborer => Some(ZoneType::Industrial),
            Self::Merchant => Some(ZoneType::Commercial),
            Self::Socialite => Some(ZoneType::Mixed),
            Self::Wanderer => None,
        }
    }

    /// Wage earned per simulated second of work, in currency units.
    pub const fn wage_per_second(self) -> f64 {
        match self {
            Self::Laborer => 1.2,
            Self::Merchant => 1.6,
            Self::Socialite => 0.8,
            Self::Wanderer => 0.4,
        }
    }
}

// ---------------------------------------------------------------------------
// Needs
// ---------------------------------------------------------------------------

/// A motivational need tracked per agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum NeedKind {
    /// Grows over time; bad when high.
    Hunger,
    /// Drains over time; bad when low.
    Energy,
    /// Drains over time; bad when low.
    Social,
    /// Drains over time; bad when low.
    Fun,
}

impl NeedKind {
    /// Lowercase name used in logs, snapshots, and config files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hunger => "hunger",
            Self::Energy => "energy",
            Self::Social => "social",
            Self::Fun => "fun",
        }
    }
}

impl core::fmt::Display for NeedKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction in which a need value becomes a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum NeedPolarity {
    /// Urgency equals the normalized value (e.g. hunger).
    BadWhenHigh,
    /// Urgency equals one minus the normalized value (e.g. energy).
    BadWhenLow,
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A tradeable item carried in an agent's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Item {
    /// Relieves hunger.
    Food,
    /// Restores energy.
    Coffee,
    /// Work equipment; valued by everyone but relieves no need.
    Tools,
    /// Relieves boredom.
    Book,
    /// Relieves loneliness.
    Gift,
}

impl Item {
    /// Every item in declaration order.
    pub const ALL: [Self; 5] = [Self::Food, Self::Coffee, Self::Tools, Self::Book, Self::Gift];

    /// Reference price in currency units before need weighting.
    pub const fn base_value(self) -> f64 {
        match self {
            Self::Food => 10.0,
            Self::Coffee => 6.0,
            Self::Tools => 25.0,
            Self::Book => 12.0,
            Self::Gift => 8.0,
        }
    }

    /// The need this item relieves when consumed, if any.
    pub const fn relieves(self) -> Option<NeedKind> {
        match self {
            Self::Food => Some(NeedKind::Hunger),
            Self::Coffee => Some(NeedKind::Energy),
            Self::Book => Some(NeedKind::Fun),
            Self::Gift => Some(NeedKind::Social),
            Self::Tools => None,
        }
    }

    /// The item that relieves `need`, if one exists.
    pub const fn for_need(need: NeedKind) -> Self {
        match need {
            NeedKind::Hunger => Self::Food,
            NeedKind::Energy => Self::Coffee,
            NeedKind::Social => Self::Gift,
            NeedKind::Fun => Self::Book,
        }
    }

    /// Stable lowercase label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Coffee => "coffee",
            Self::Tools => "tools",
            Self::Book => "book",
            Self::Gift => "gift",
        }
    }
}

impl core::fmt::Display for Item {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Memory events
// ---------------------------------------------------------------------------

/// Category of an entry in an agent's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum MemoryEventKind {
    /// A conversation with another agent.
    Interaction,
    /// A trade this agent took part in was completed.
    TradeAccepted,
    /// A trade this agent proposed or received was declined.
    TradeRejected,
    /// A need was satisfied by consuming, resting, or working.
    NeedSatisfied,
    /// A purchase at a commercial building.
    Purchase,
    /// Navigation could not find a way to a destination.
    PathFailed,
    /// Arrived at a destination.
    Arrived,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_zone_serves_commercial_and_residential() {
        assert!(ZoneType::Mixed.serves(ZoneType::Commercial));
        assert!(ZoneType::Mixed.serves(ZoneType::Residential));
        assert!(!ZoneType::Mixed.serves(ZoneType::Industrial));
        assert!(!ZoneType::Park.serves(ZoneType::Commercial));
        assert!(ZoneType::Industrial.serves(ZoneType::Industrial));
    }

    #[test]
    fn every_need_has_a_relieving_item() {
        for need in [NeedKind::Hunger, NeedKind::Energy, NeedKind::Social, NeedKind::Fun] {
            assert_eq!(Item::for_need(need).relieves(), Some(need));
        }
        assert_eq!(Item::Tools.relieves(), None);
    }

    #[test]
    fn activity_serializes_snake_case() {
        let json = serde_json::to_string(&AgentActivity::Socializing).ok();
        assert_eq!(json.as_deref(), Some("\"socializing\""));
    }
}
