//! Population statistics: activity histogram, average needs, and wealth
//! inequality.

use std::collections::BTreeMap;

use civitas_agents::Agent;
use civitas_types::{NeedKind, SimulationStats};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Running totals the manager keeps between stat refreshes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Conversations held.
    pub interactions: u64,
    /// Trade proposals queued.
    pub trades_proposed: u64,
    /// Trades that settled.
    pub trades_accepted: u64,
    /// Trades the responder declined.
    pub trades_rejected: u64,
    /// Trades that were no longer feasible when resolved.
    pub trades_expired: u64,
}

/// Gini coefficient of `values`.
///
/// Uses the sorted-rank form `2 * sum(i * x_i) / (n * sum(x)) - (n + 1) / n`
/// with 1-based ranks. Returns 0 for fewer than two values or a
/// non-positive total. Negative inputs are treated as zero.
#[allow(clippy::cast_precision_loss)]
pub fn gini(values: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() { v.max(0.0) } else { 0.0 })
        .collect();
    if sorted.len() < 2 {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);

    let total: f64 = sorted.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let n = sorted.len() as f64;
    let weighted: f64 = sorted
        .iter()
        .zip(1_u32..)
        .map(|(x, rank)| f64::from(rank) * x)
        .sum();
    (2.0 * weighted / (n * total) - (n + 1.0) / n).clamp(0.0, 1.0)
}

/// Aggregate the population into a [`SimulationStats`].
pub fn compute_stats<'a, I>(
    agents: I,
    tick: u64,
    elapsed_seconds: f64,
    counters: Counters,
) -> SimulationStats
where
    I: IntoIterator<Item = &'a Agent>,
{
    let mut population: u32 = 0;
    let mut activity_histogram = BTreeMap::new();
    let mut need_sums: BTreeMap<NeedKind, (f64, u32)> = BTreeMap::new();
    let mut balances = Vec::new();
    let mut total_wealth = Decimal::ZERO;

    for agent in agents {
        population = population.saturating_add(1);
        let slot = activity_histogram.entry(agent.activity()).or_insert(0_u32);
        *slot = slot.saturating_add(1);
        for (kind, value) in agent.needs().iter() {
            let (sum, count) = need_sums.entry(kind).or_insert((0.0, 0));
            *sum += value;
            *count = count.saturating_add(1);
        }
        let balance = agent.inventory().balance();
        total_wealth = total_wealth.saturating_add(balance);
        balances.push(balance.to_f64().unwrap_or(0.0));
    }

    let average_needs = need_sums
        .into_iter()
        .filter(|&(_, (_, count))| count > 0)
        .map(|(kind, (sum, count))| (kind, sum / f64::from(count)))
        .collect();

    SimulationStats {
        tick,
        elapsed_seconds,
        population,
        activity_histogram,
        average_needs,
        gini: gini(&balances),
        total_wealth,
        interactions: counters.interactions,
        trades_proposed: counters.trades_proposed,
        trades_accepted: counters.trades_accepted,
        trades_rejected: counters.trades_rejected,
        trades_expired: counters.trades_expired,
    }
}

#[cfg(test)]
mod tests {
    use civitas_agents::{AgentConfig, Brain, IdleDecisionSource};
    use civitas_types::{AgentActivity, AgentId, AgentProfile, Archetype, Personality, Vec2};

    use super::*;

    fn citizen(balance: i64) -> Agent {
        let profile = AgentProfile::new("c", Archetype::Laborer, Personality::balanced())
            .with_balance(Decimal::new(balance, 0));
        Agent::new(
            AgentId::new(),
            &profile,
            Vec2::ZERO,
            &AgentConfig::default(),
            Brain::external(IdleDecisionSource),
            0.0,
        )
    }

    #[test]
    fn equal_wealth_has_zero_gini() {
        assert!(gini(&[100.0, 100.0, 100.0]).abs() < 1e-12);
    }

    #[test]
    fn concentrated_wealth() {
        assert!((gini(&[0.0, 0.0, 100.0]) - 2.0 / 3.0).abs() < 1e-12);
        assert!((gini(&[100.0, 0.0, 0.0]) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_are_neutral() {
        assert!(gini(&[]).abs() < f64::EPSILON);
        assert!(gini(&[42.0]).abs() < f64::EPSILON);
        assert!(gini(&[0.0, 0.0]).abs() < f64::EPSILON);
    }

    #[test]
    fn gini_stays_in_unit_interval() {
        let g = gini(&[1.0, 2.0, 3.0, 50.0, 0.5, 7.0]);
        assert!((0.0..=1.0).contains(&g));
    }

    #[test]
    fn stats_aggregate_population() {
        let agents = [citizen(10), citizen(30)];
        let counters = Counters {
            interactions: 3,
            trades_proposed: 3,
            trades_accepted: 1,
            trades_rejected: 1,
            trades_expired: 1,
        };
        let stats = compute_stats(&agents, 5, 5.0, counters);

        assert_eq!(stats.population, 2);
        assert_eq!(stats.total_wealth, Decimal::new(40, 0));
        assert_eq!(stats.activity_histogram.get(&AgentActivity::Idle), Some(&2));
        assert_eq!(stats.average_needs.len(), 4);
        assert!((stats.gini - 0.25).abs() < 1e-12);
        assert_eq!(stats.interactions, 3);
        assert_eq!(stats.trades_rejected, 1);
        assert_eq!(stats.trades_expired, 1);
    }

    #[test]
    fn empty_population_is_neutral() {
        let stats = compute_stats(std::iter::empty(), 0, 0.0, Counters::default());
        assert_eq!(stats.population, 0);
        assert!(stats.average_needs.is_empty());
        assert!(stats.gini.abs() < f64::EPSILON);
    }
}
