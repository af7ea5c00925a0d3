//! Cross-agent effects: conversations and trade settlement.
//!
//! These are the only places where one agent's state changes because of
//! another. Both functions take the two agents by exclusive reference; the
//! manager is responsible for pairing them.

use civitas_agents::{
    Agent, SocialConfig, TradeConfig, TradeProposal, compatibility, evaluate_offer, execute_trade,
    relationship_delta, validate_offer,
};
use civitas_types::{AgentActivity, MemoryEventKind, NeedKind};
use serde_json::json;
use tracing::debug;

/// Result of one conversation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionOutcome {
    /// Personality compatibility in `[0, 1]`.
    pub compatibility: f64,
    /// Relationship change applied to both sides.
    pub delta: f64,
}

/// Run a conversation between `a` and `b`.
///
/// Both relationships move by the same compatibility-derived delta, both
/// agents regain social need, and each logs one interaction event.
pub fn interact(a: &mut Agent, b: &mut Agent, config: &SocialConfig, now: f64) -> InteractionOutcome {
    let compatibility = compatibility(a.personality(), b.personality(), config);
    let delta = relationship_delta(compatibility, config);
    let payload = json!({ "compatibility": compatibility, "delta": delta });
    let (a_id, b_id) = (a.id(), b.id());

    for (me, other) in [(&mut *a, b_id), (&mut *b, a_id)] {
        me.memory_mut().update_relationship(other, delta);
        me.needs_mut().satisfy(NeedKind::Social, config.social_gain);
        me.memory_mut()
            .remember_event(MemoryEventKind::Interaction, Some(other), payload.clone(), now);
        me.set_activity(AgentActivity::Socializing);
    }
    debug!(a = %a_id, b = %b_id, compatibility, delta, "agents interacted");
    InteractionOutcome {
        compatibility,
        delta,
    }
}

/// How a queued trade proposal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOutcome {
    /// The responder accepted and the goods changed hands.
    Accepted,
    /// The responder declined.
    Rejected,
    /// The offer was no longer feasible (a side could not cover it).
    Expired,
}

/// Resolve a queued proposal between its two agents.
///
/// An offer that either side can no longer cover expires untouched.
/// Otherwise the responder evaluates it against its own needs and its
/// relationship toward the proposer. Acceptance settles atomically and
/// improves both relationships; rejection costs the proposer standing.
pub fn resolve_trade(
    proposal: &TradeProposal,
    proposer: &mut Agent,
    responder: &mut Agent,
    trade: &TradeConfig,
    social: &SocialConfig,
    now: f64,
) -> TradeOutcome {
    if let Err(err) = validate_offer(&proposal.offer, proposer.inventory(), responder.inventory()) {
        debug!(trade_id = %proposal.id, error = %err, "trade no longer feasible");
        return TradeOutcome::Expired;
    }
    let (proposer_id, responder_id) = (proposer.id(), responder.id());
    let relationship = responder.memory().relationship(proposer_id);
    let evaluation = evaluate_offer(
        &proposal.offer,
        responder.needs(),
        relationship,
        trade,
        social,
    );
    let payload = json!({
        "trade_id": proposal.id,
        "received_value": evaluation.received_value,
        "given_value": evaluation.given_value,
    });

    if !evaluation.accepted {
        proposer
            .memory_mut()
            .update_relationship(responder_id, trade.reject_delta);
        for (me, other) in [(&mut *proposer, responder_id), (&mut *responder, proposer_id)] {
            me.memory_mut().remember_event(
                MemoryEventKind::TradeRejected,
                Some(other),
                payload.clone(),
                now,
            );
        }
        debug!(trade_id = %proposal.id, fraction = evaluation.fraction, "trade rejected");
        return TradeOutcome::Rejected;
    }

    if let Err(err) = execute_trade(
        &proposal.offer,
        proposer.inventory_mut(),
        responder.inventory_mut(),
    ) {
        debug!(trade_id = %proposal.id, error = %err, "trade settlement failed");
        return TradeOutcome::Expired;
    }
    for (me, other) in [(&mut *proposer, responder_id), (&mut *responder, proposer_id)] {
        me.memory_mut().update_relationship(other, trade.accept_delta);
        me.memory_mut().remember_event(
            MemoryEventKind::TradeAccepted,
            Some(other),
            payload.clone(),
            now,
        );
        me.set_activity(AgentActivity::Trading);
    }
    debug!(trade_id = %proposal.id, "trade accepted");
    TradeOutcome::Accepted
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use civitas_agents::{AgentConfig, Brain, Bundle, IdleDecisionSource, TradeOffer};
    use civitas_types::{AgentId, AgentProfile, Archetype, Item, Personality, TradeId, Vec2};
    use rust_decimal::Decimal;

    use super::*;

    fn agent(name: &str, personality: Personality, balance: i64, items: &[(Item, u32)]) -> Agent {
        let mut profile = AgentProfile::new(name, Archetype::Merchant, personality)
            .with_balance(Decimal::new(balance, 0));
        for &(item, qty) in items {
            profile = profile.with_item(item, qty);
        }
        Agent::new(
            AgentId::new(),
            &profile,
            Vec2::ZERO,
            &AgentConfig::default(),
            Brain::external(IdleDecisionSource),
            0.0,
        )
    }

    fn proposal(proposer: &Agent, responder: &Agent, give: Bundle, receive: Bundle) -> TradeProposal {
        TradeProposal {
            id: TradeId::new(),
            proposer: proposer.id(),
            responder: responder.id(),
            offer: TradeOffer { give, receive },
            tick: 1,
        }
    }

    #[test]
    fn identical_agreeable_agents_bond() {
        let p = Personality::new(0.5, 0.5, 0.5, 1.0, 0.5);
        let mut a = agent("a", p, 0, &[]);
        let mut b = agent("b", p, 0, &[]);
        a.needs_mut().set(NeedKind::Social, 0.2);
        let outcome = interact(&mut a, &mut b, &SocialConfig::default(), 3.0);

        assert!(outcome.delta > 0.0);
        assert!((a.memory().relationship(b.id()) - outcome.delta).abs() < 1e-12);
        assert!((b.memory().relationship(a.id()) - outcome.delta).abs() < 1e-12);
        assert!(a.needs().value(NeedKind::Social).unwrap() > 0.2);
        assert_eq!(a.memory().event_count(), 1);
        assert_eq!(b.memory().event_count(), 1);
        assert_eq!(a.activity(), AgentActivity::Socializing);
    }

    #[test]
    fn opposite_agents_sour() {
        let mut a = agent("a", Personality::new(0.0, 0.0, 0.0, 0.0, 0.5), 0, &[]);
        let mut b = agent("b", Personality::new(1.0, 1.0, 1.0, 0.0, 0.5), 0, &[]);
        let outcome = interact(&mut a, &mut b, &SocialConfig::default(), 0.0);
        assert!(outcome.delta < 0.0);
        assert!(a.memory().relationship(b.id()) < 0.0);
    }

    #[test]
    fn fair_trade_is_accepted_and_settled() {
        let mut buyer = agent("buyer", Personality::balanced(), 30, &[]);
        let mut seller = agent("seller", Personality::balanced(), 0, &[(Item::Food, 2)]);
        let offer = proposal(
            &buyer,
            &seller,
            Bundle::currency(Decimal::new(20, 0)),
            Bundle::item(Item::Food, 1),
        );
        let outcome = resolve_trade(
            &offer,
            &mut buyer,
            &mut seller,
            &TradeConfig::default(),
            &SocialConfig::default(),
            1.0,
        );
        assert_eq!(outcome, TradeOutcome::Accepted);
        assert_eq!(buyer.inventory().balance(), Decimal::new(10, 0));
        assert_eq!(buyer.inventory().quantity(Item::Food), 1);
        assert_eq!(seller.inventory().balance(), Decimal::new(20, 0));
        assert!(buyer.memory().relationship(seller.id()) > 0.0);
        assert!(seller.memory().relationship(buyer.id()) > 0.0);
    }

    #[test]
    fn lowball_is_rejected_and_costs_the_proposer() {
        let mut buyer = agent("buyer", Personality::balanced(), 30, &[]);
        let mut seller = agent("seller", Personality::balanced(), 0, &[(Item::Tools, 1)]);
        let offer = proposal(
            &buyer,
            &seller,
            Bundle::currency(Decimal::new(1, 0)),
            Bundle::item(Item::Tools, 1),
        );
        let outcome = resolve_trade(
            &offer,
            &mut buyer,
            &mut seller,
            &TradeConfig::default(),
            &SocialConfig::default(),
            1.0,
        );
        assert_eq!(outcome, TradeOutcome::Rejected);
        assert!(buyer.memory().relationship(seller.id()) < 0.0);
        assert!(seller.memory().relationship(buyer.id()).abs() < f64::EPSILON);
        assert_eq!(seller.inventory().quantity(Item::Tools), 1);
    }

    #[test]
    fn uncovered_offer_expires() {
        let mut buyer = agent("buyer", Personality::balanced(), 5, &[]);
        let mut seller = agent("seller", Personality::balanced(), 0, &[(Item::Food, 1)]);
        let offer = proposal(
            &buyer,
            &seller,
            Bundle::currency(Decimal::new(50, 0)),
            Bundle::item(Item::Food, 1),
        );
        let outcome = resolve_trade(
            &offer,
            &mut buyer,
            &mut seller,
            &TradeConfig::default(),
            &SocialConfig::default(),
            1.0,
        );
        assert_eq!(outcome, TradeOutcome::Expired);
        assert_eq!(buyer.inventory().balance(), Decimal::new(5, 0));
        assert_eq!(buyer.memory().event_count(), 0);
    }
}
