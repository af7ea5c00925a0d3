//! Citizens of the Civitas city simulation.
//!
//! This crate holds everything that operates on one agent's state without
//! touching the rest of the population: needs, memory, wallet, the pure
//! social and trade rules, the blackboard protocol between an agent and its
//! brain, and the standard citizen behavior tree. The manager in
//! `civitas-core` owns the population and performs every cross-agent
//! mutation.
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] and its per-tick phases
//! - [`behaviors`] -- The standard citizen tree ([`citizen_tree`])
//! - [`config`] -- Tunable parameters ([`AgentConfig`] and friends)
//! - [`decision`] -- Pluggable decision sources ([`Brain`], [`DecisionSource`])
//! - [`error`] -- Wallet, inventory, and trade errors ([`AgentError`])
//! - [`inventory`] -- Currency balance and carried items
//! - [`keys`] -- Blackboard slots and the [`Effect`] protocol
//! - [`memory`] -- Bounded event log and relationship ledger
//! - [`needs`] -- Decaying motivations and urgency
//! - [`social`] -- Compatibility and relationship deltas
//! - [`trade`] -- Needs-weighted valuation, acceptance, and atomic execution

pub mod agent;
pub mod behaviors;
pub mod config;
pub mod decision;
pub mod error;
pub mod inventory;
pub mod keys;
pub mod memory;
pub mod needs;
pub mod social;
pub mod trade;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, Intentions, ThinkContext};
pub use behaviors::citizen_tree;
pub use config::{
    AgentConfig, BehaviorConfig, MemoryConfig, NeedSpec, NeedsConfig, SocialConfig, TradeConfig,
};
pub use decision::{Brain, DecisionSource, IdleDecisionSource, ScriptedDecisionSource, ScriptedStep};
pub use error::AgentError;
pub use inventory::Inventory;
pub use keys::{Effect, Neighbor};
pub use memory::{Memory, RELATIONSHIP_MAX, RELATIONSHIP_MIN};
pub use needs::Needs;
pub use social::{Standing, compatibility, relationship_delta, standing};
pub use trade::{
    Bundle, TradeEvaluation, TradeOffer, TradeProposal, acceptance_fraction, draft_offer,
    evaluate_offer, execute_trade, validate_offer, valuation,
};
