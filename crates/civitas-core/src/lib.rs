//! Simulation clock, perception, cross-agent resolution, and the population
//! manager for the Civitas city simulation.
//!
//! This crate owns the tick cycle: needs, perception, decision, motion,
//! trade resolution, interaction, metrics, and memory decay. See
//! [`manager`] for the phase order.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter, simulated time, and hour of day.
//! - [`config`] -- Configuration loading from `civitas-config.yaml` into
//!   strongly-typed structs.
//! - [`interaction`] -- Conversations and trade settlement between two agents.
//! - [`manager`] -- [`Simulation`]: spawn, remove, update, and read-only views.
//! - [`metrics`] -- Gini coefficient and population statistics.
//! - [`perception`] -- Neighbor scan and collision avoidance.

pub mod clock;
pub mod config;
pub mod interaction;
pub mod manager;
pub mod metrics;
pub mod perception;

pub use clock::{ClockError, SimulationClock};
pub use config::{ConfigError, SimulationConfig};
pub use interaction::{InteractionOutcome, TradeOutcome};
pub use manager::{Simulation, SimulationError, TickSummary};
pub use metrics::{Counters, gini};
