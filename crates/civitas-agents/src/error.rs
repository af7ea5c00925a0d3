//! Error types for the civitas-agents crate.
//!
//! Wallet, inventory, and trade operations validate before they mutate and
//! report problems through [`AgentError`]. Need and relationship updates
//! never fail: out-of-range values are clamped instead.

use civitas_types::{AgentId, Item};
use rust_decimal::Decimal;

/// Errors that can occur during agent state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// A currency amount was negative where only non-negative amounts are valid.
    #[error("negative currency amount: {0}")]
    NegativeAmount(Decimal),

    /// The wallet does not hold enough currency.
    #[error("insufficient funds: wanted {requested} but only have {available}")]
    InsufficientFunds {
        /// The amount the caller attempted to spend.
        requested: Decimal,
        /// The current balance.
        available: Decimal,
    },

    /// The inventory does not hold enough of an item.
    #[error("insufficient {item}: wanted {requested} but only have {available}")]
    InsufficientItems {
        /// The item being removed.
        item: Item,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity actually held.
        available: u32,
    },

    /// An item count or balance would overflow.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A trade offer exchanges nothing in one direction.
    #[error("trade offer is empty on the {side} side")]
    EmptyOffer {
        /// Which side is empty (`give` or `receive`).
        side: &'static str,
    },

    /// An agent tried to trade or interact with itself.
    #[error("agent {0} cannot trade with itself")]
    SelfTrade(AgentId),

    /// Agent with the given ID was not found.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),
}
