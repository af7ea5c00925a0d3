//! Shared type definitions for the Civitas city simulation.
//!
//! This crate is the single source of truth for the vocabulary used across
//! the workspace: identifiers, activities, needs, items, geometry, spawn
//! profiles, and the snapshot types the rendering host polls. Render-facing
//! types are exported to `TypeScript` via `ts-rs` for the debug overlay.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers ([`AgentId`], [`TradeId`])
//! - [`enums`] -- Activities, zones, archetypes, needs, items, event kinds
//! - [`geometry`] -- [`Vec2`] world positions and [`GridPos`] cells
//! - [`structs`] -- Personalities, profiles, buildings, roads, snapshots

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AgentActivity, Archetype, Item, MemoryEventKind, NeedKind, NeedPolarity, ZoneType};
pub use geometry::{GridPos, Vec2};
pub use ids::{AgentId, TradeId};
pub use structs::{
    AgentProfile, AgentSnapshot, Building, MemoryEvent, Personality, RoadSegment, SimulationStats,
};
