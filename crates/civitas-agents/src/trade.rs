//! Bilateral trade: needs-weighted valuation, acceptance, and settlement.
//!
//! A [`TradeOffer`] is written from the proposer's side: the proposer hands
//! over `give` and asks for `receive`. The responder accepts when what it
//! would receive is worth at least a relationship-dependent fraction of what
//! it would give up, both measured with its own needs:
//!
//! | Standing | Fraction |
//! |----------|----------|
//! | friend   | 0.8      |
//! | neutral  | 0.9      |
//! | hostile  | 1.3      |
//!
//! Settlement is atomic: both inventories are validated and updated on
//! copies, and only committed if every transfer succeeds.

use std::collections::BTreeMap;

use civitas_types::{AgentId, Item, TradeId};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::config::{SocialConfig, TradeConfig};
use crate::error::AgentError;
use crate::inventory::Inventory;
use crate::needs::Needs;
use crate::social::{Standing, standing};

/// Tolerance for value comparisons, so an offer at exactly the threshold
/// is accepted despite floating-point rounding.
const VALUE_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

/// Items plus currency moving in one direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    /// Items and quantities.
    pub items: BTreeMap<Item, u32>,
    /// Currency amount. Never negative.
    pub currency: Decimal,
}

impl Bundle {
    /// A bundle of currency only.
    pub fn currency(amount: Decimal) -> Self {
        Self {
            items: BTreeMap::new(),
            currency: amount.max(Decimal::ZERO),
        }
    }

    /// A bundle of one item kind.
    pub fn item(item: Item, quantity: u32) -> Self {
        let mut items = BTreeMap::new();
        if quantity > 0 {
            items.insert(item, quantity);
        }
        Self {
            items,
            currency: Decimal::ZERO,
        }
    }

    /// Whether nothing moves.
    pub fn is_empty(&self) -> bool {
        self.currency <= Decimal::ZERO && self.items.values().all(|&q| q == 0)
    }
}

/// An exchange seen from the proposer's side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeOffer {
    /// What the proposer hands over.
    pub give: Bundle,
    /// What the proposer asks for in return.
    pub receive: Bundle,
}

/// A queued offer awaiting the responder's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeProposal {
    /// Unique proposal id.
    pub id: TradeId,
    /// Agent making the offer.
    pub proposer: AgentId,
    /// Agent asked to accept.
    pub responder: AgentId,
    /// The exchange.
    pub offer: TradeOffer,
    /// Tick the proposal was made on.
    pub tick: u64,
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

/// Value of `bundle` to an agent with `needs`.
///
/// Each item is worth its base value scaled by `1 + urgency` of the need it
/// relieves; currency is worth its face value.
pub fn valuation(bundle: &Bundle, needs: &Needs) -> f64 {
    let items: f64 = bundle
        .items
        .iter()
        .map(|(&item, &qty)| {
            let weight = item
                .relieves()
                .and_then(|need| needs.urgency(need))
                .unwrap_or(0.0);
            item.base_value() * (1.0 + weight) * f64::from(qty)
        })
        .sum();
    items + bundle.currency.to_f64().unwrap_or(0.0)
}

/// Fraction of the given value that the received value must reach.
pub fn acceptance_fraction(relationship: f64, trade: &TradeConfig, social: &SocialConfig) -> f64 {
    match standing(relationship, social) {
        Standing::Friend => trade.friend_fraction,
        Standing::Neutral => trade.neutral_fraction,
        Standing::Hostile => trade.hostile_fraction,
    }
}

/// The responder's assessment of an offer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeEvaluation {
    /// Value to the responder of what it would receive.
    pub received_value: f64,
    /// Value to the responder of what it would give up.
    pub given_value: f64,
    /// Required ratio of received to given.
    pub fraction: f64,
    /// Whether the responder accepts.
    pub accepted: bool,
}

/// Evaluate `offer` from the responder's point of view.
///
/// `relationship` is the responder's score toward the proposer.
pub fn evaluate_offer(
    offer: &TradeOffer,
    responder_needs: &Needs,
    relationship: f64,
    trade: &TradeConfig,
    social: &SocialConfig,
) -> TradeEvaluation {
    let received_value = valuation(&offer.give, responder_needs);
    let given_value = valuation(&offer.receive, responder_needs);
    let fraction = acceptance_fraction(relationship, trade, social);
    TradeEvaluation {
        received_value,
        given_value,
        fraction,
        accepted: received_value + VALUE_EPSILON >= fraction * given_value,
    }
}

// ---------------------------------------------------------------------------
// Validation and settlement
// ---------------------------------------------------------------------------

/// Check that both sides of `offer` are non-empty and covered by the
/// respective inventories.
pub fn validate_offer(
    offer: &TradeOffer,
    proposer: &Inventory,
    responder: &Inventory,
) -> Result<(), AgentError> {
    if offer.give.is_empty() {
        return Err(AgentError::EmptyOffer { side: "give" });
    }
    if offer.receive.is_empty() {
        return Err(AgentError::EmptyOffer { side: "receive" });
    }
    covers(proposer, &offer.give)?;
    covers(responder, &offer.receive)
}

/// Settle `offer` between the two inventories.
///
/// Either every transfer happens or none does.
pub fn execute_trade(
    offer: &TradeOffer,
    proposer: &mut Inventory,
    responder: &mut Inventory,
) -> Result<(), AgentError> {
    validate_offer(offer, proposer, responder)?;
    let mut next_proposer = proposer.clone();
    let mut next_responder = responder.clone();
    transfer(&offer.give, &mut next_proposer, &mut next_responder)?;
    transfer(&offer.receive, &mut next_responder, &mut next_proposer)?;
    *proposer = next_proposer;
    *responder = next_responder;
    Ok(())
}

fn covers(inventory: &Inventory, bundle: &Bundle) -> Result<(), AgentError> {
    if !inventory.can_afford(bundle.currency) {
        return Err(AgentError::InsufficientFunds {
            requested: bundle.currency,
            available: inventory.balance(),
        });
    }
    for (&item, &qty) in &bundle.items {
        if !inventory.has(item, qty) {
            return Err(AgentError::InsufficientItems {
                item,
                requested: qty,
                available: inventory.quantity(item),
            });
        }
    }
    Ok(())
}

fn transfer(bundle: &Bundle, from: &mut Inventory, to: &mut Inventory) -> Result<(), AgentError> {
    from.debit(bundle.currency)?;
    to.credit(bundle.currency)?;
    for (&item, &qty) in &bundle.items {
        from.remove_item(item, qty)?;
        to.add_item(item, qty)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Drafting
// ---------------------------------------------------------------------------

/// Draft an offer from a proposer to a specific responder.
///
/// The proposer asks for one unit of the item relieving its most urgent
/// need that the responder holds and the proposer does not. It pays in
/// currency (base value weighted by its own urgency, to the cent) when it
/// can afford to, and otherwise barters one unit of an item it values less.
/// Returns `None` when no sensible exchange exists.
pub fn draft_offer(
    proposer: &Inventory,
    proposer_needs: &Needs,
    responder: &Inventory,
) -> Option<TradeOffer> {
    let mut wants: Vec<(Item, f64)> = proposer_needs
        .urgencies()
        .into_iter()
        .map(|(need, urgency)| (Item::for_need(need), urgency))
        .filter(|&(item, _)| responder.has(item, 1) && !proposer.has(item, 1))
        .collect();
    wants.sort_by(|a, b| b.1.total_cmp(&a.1));
    let &(wanted, urgency) = wants.first()?;

    let price = Decimal::from_f64(wanted.base_value() * (1.0 + urgency))?.round_dp(2);
    let give = if price > Decimal::ZERO && proposer.can_afford(price) {
        Bundle::currency(price)
    } else {
        let spare = proposer.items().keys().copied().find(|&item| {
            item != wanted
                && item
                    .relieves()
                    .and_then(|need| proposer_needs.urgency(need))
                    .is_none_or(|u| u < urgency)
        })?;
        Bundle::item(spare, 1)
    };

    Some(TradeOffer {
        give,
        receive: Bundle::item(wanted, 1),
    })
}
