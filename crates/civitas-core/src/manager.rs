//! The population manager and its tick cycle.
//!
//! Each call to [`Simulation::update`] runs these phases over the whole
//! population, in agent-id order:
//!
//! 1. **Clock** -- advance the tick counter and simulated time.
//! 2. **Needs** -- every agent's needs decay by `dt`.
//! 3. **Perception** -- neighbor lists are rebuilt from current positions.
//! 4. **Decision** -- every brain ticks and reports its [`Intentions`].
//! 5. **Motion** -- collision avoidance is added to each desired velocity
//!    and the agent integrates against the walkable grid.
//! 6. **Trade resolution** -- proposals queued on the previous tick are
//!    evaluated and settled.
//! 7. **Interaction** -- intended conversations run, intended trades are
//!    queued, then nearby pairs get a seeded chance of a spontaneous
//!    conversation or trade.
//! 8. **Metrics** -- aggregate statistics refresh every few ticks.
//! 9. **Memory** -- events age and relationships decay.
//!
//! Given the same layout, configuration, seed, and spawn calls, a run is
//! fully deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use civitas_agents::{
    Agent, AgentConfig, Brain, Intentions, ThinkContext, TradeProposal, citizen_tree, draft_offer,
};
use civitas_types::{AgentId, AgentProfile, AgentSnapshot, SimulationStats, TradeId, Vec2};
use civitas_world::{CityLayout, Navigator, Walkability};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::clock::{ClockError, SimulationClock};
use crate::config::SimulationConfig;
use crate::interaction::{self, TradeOutcome};
use crate::metrics::{self, Counters};
use crate::perception::{self, Body};

/// Errors that can occur while managing the population.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The requested spawn position is off the grid or blocked.
    #[error("cannot spawn at ({x}, {y}): position is not walkable")]
    UnwalkableSpawn {
        /// Requested x coordinate.
        x: f64,
        /// Requested y coordinate.
        y: f64,
    },

    /// No agent with this id is alive.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// What happened during one call to [`Simulation::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// The tick that was executed.
    pub tick: u64,
    /// Simulated seconds elapsed after this tick.
    pub elapsed: f64,
    /// Conversations held this tick.
    pub interactions: u32,
    /// Trade proposals queued this tick.
    pub trades_proposed: u32,
    /// Queued trades that settled this tick.
    pub trades_accepted: u32,
    /// Queued trades declined this tick.
    pub trades_rejected: u32,
    /// Queued trades that were no longer feasible.
    pub trades_expired: u32,
}

/// The simulated city population.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    agent_config: AgentConfig,
    navigator: Arc<Navigator>,
    agents: BTreeMap<AgentId, Agent>,
    pending: Vec<TradeProposal>,
    clock: SimulationClock,
    rng: StdRng,
    counters: Counters,
    stats: SimulationStats,
}

impl Simulation {
    /// Create an empty simulation over `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Clock`] if the world timing configuration
    /// is invalid.
    pub fn new(config: SimulationConfig, layout: Arc<CityLayout>) -> Result<Self, SimulationError> {
        let clock = SimulationClock::new(&config.world)?;
        let navigator = Arc::new(Navigator::new(layout, config.navigation.clone()));
        let rng = StdRng::seed_from_u64(config.world.seed);
        info!(
            seed = config.world.seed,
            world = %config.world.name,
            "simulation created"
        );
        Ok(Self {
            agent_config: config.agent_config(),
            config,
            navigator,
            agents: BTreeMap::new(),
            pending: Vec::new(),
            clock,
            rng,
            counters: Counters::default(),
            stats: SimulationStats::default(),
        })
    }

    // -------------------------------------------------------------------
    // Population
    // -------------------------------------------------------------------

    /// Spawn a citizen driven by the standard behavior tree.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnwalkableSpawn`] if `position` is not on
    /// a walkable cell.
    pub fn spawn(&mut self, profile: &AgentProfile, position: Vec2) -> Result<AgentId, SimulationError> {
        self.check_spawn(position)?;
        let seed = self.rng.random::<u64>();
        let tree = citizen_tree(
            Arc::clone(&self.navigator),
            profile.archetype,
            &self.agent_config.behavior,
            seed,
        );
        Ok(self.insert(profile, position, Brain::Tree(tree)))
    }

    /// Spawn an agent with a caller-supplied brain.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnwalkableSpawn`] if `position` is not on
    /// a walkable cell.
    pub fn spawn_with_brain(
        &mut self,
        profile: &AgentProfile,
        position: Vec2,
        brain: Brain,
    ) -> Result<AgentId, SimulationError> {
        self.check_spawn(position)?;
        Ok(self.insert(profile, position, brain))
    }

    /// Remove an agent.
    ///
    /// Its pending trades are dropped and every other agent forgets it.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::AgentNotFound`] if no such agent exists.
    pub fn remove(&mut self, id: AgentId) -> Result<Agent, SimulationError> {
        let agent = self
            .agents
            .remove(&id)
            .ok_or(SimulationError::AgentNotFound(id))?;
        self.pending
            .retain(|p| p.proposer != id && p.responder != id);
        for other in self.agents.values_mut() {
            other.memory_mut().forget(id);
        }
        info!(agent_id = %id, name = agent.name(), "agent removed");
        Ok(agent)
    }

    fn check_spawn(&self, position: Vec2) -> Result<(), SimulationError> {
        let on_grid = position.x.is_finite()
            && position.y.is_finite()
            && self.navigator.layout().grid().is_walkable(position.cell());
        if on_grid {
            Ok(())
        } else {
            Err(SimulationError::UnwalkableSpawn {
                x: position.x,
                y: position.y,
            })
        }
    }

    fn insert(
        &mut self,
        profile: &AgentProfile,
        position: Vec2,
        brain: Brain,
    ) -> AgentId {
        let id = AgentId::from_rng(&mut self.rng);
        let agent = Agent::new(
            id,
            profile,
            position,
            &self.agent_config,
            brain,
            self.clock.elapsed(),
        );
        info!(
            agent_id = %id,
            name = %profile.name,
            archetype = ?profile.archetype,
            brain = agent.brain().name(),
            "agent spawned"
        );
        self.agents.insert(id, agent);
        id
    }

    // -------------------------------------------------------------------
    // Tick cycle
    // -------------------------------------------------------------------

    /// Advance the simulation by one tick of `dt` simulated seconds.
    ///
    /// A non-finite or negative `dt` is treated as zero: the tick still
    /// runs but nothing decays or moves.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Clock`] if the tick counter overflows.
    pub fn update(&mut self, dt: f64) -> Result<TickSummary, SimulationError> {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let tick = self.clock.advance(dt)?;
        let now = self.clock.elapsed();
        let mut summary = TickSummary {
            tick,
            elapsed: now,
            ..TickSummary::default()
        };

        for agent in self.agents.values_mut() {
            agent.update_needs(dt);
        }

        self.refresh_perception();

        let ctx = ThinkContext {
            dt,
            now,
            hour: self.clock.hour_of_day(),
        };
        let intentions: Vec<(AgentId, Intentions)> = self
            .agents
            .iter_mut()
            .map(|(&id, agent)| (id, agent.think(ctx)))
            .collect();

        self.move_agents(&intentions, dt);
        self.resolve_pending(&mut summary, now);

        let mut talked = BTreeSet::new();
        self.apply_intentions(&intentions, &mut talked, &mut summary, tick, now);
        self.sample_encounters(&mut talked, &mut summary, tick, now);

        self.counters.interactions = self
            .counters
            .interactions
            .saturating_add(u64::from(summary.interactions));
        self.counters.trades_proposed = self
            .counters
            .trades_proposed
            .saturating_add(u64::from(summary.trades_proposed));

        let every = self.config.metrics.refresh_every_ticks.max(1);
        if tick.checked_rem(every) == Some(0) {
            let stats = self.refresh_stats();
            info!(
                tick,
                population = stats.population,
                gini = stats.gini,
                total_wealth = %stats.total_wealth,
                interactions = stats.interactions,
                trades_accepted = stats.trades_accepted,
                "population stats"
            );
        }

        for agent in self.agents.values_mut() {
            agent.decay_memories(dt);
        }

        debug!(
            tick,
            interactions = summary.interactions,
            trades_proposed = summary.trades_proposed,
            trades_accepted = summary.trades_accepted,
            trades_rejected = summary.trades_rejected,
            trades_expired = summary.trades_expired,
            "tick complete"
        );
        Ok(summary)
    }

    fn refresh_perception(&mut self) {
        let base = self.config.perception.base_radius;
        let bodies: Vec<Body> = self
            .agents
            .values()
            .map(|agent| Body {
                id: agent.id(),
                position: agent.position(),
                radius: perception::perception_radius(base, agent.personality()),
            })
            .collect();
        let agents = &self.agents;
        let lists = perception::perceive(&bodies, |observer, other| {
            agents
                .get(&observer)
                .map_or(0.0, |a| a.memory().relationship(other))
        });
        for (body, neighbors) in bodies.iter().zip(lists) {
            if let Some(agent) = self.agents.get_mut(&body.id) {
                agent.set_neighbors(neighbors);
            }
        }
    }

    fn move_agents(&mut self, intentions: &[(AgentId, Intentions)], dt: f64) {
        let movement = &self.config.movement;
        let grid = self.navigator.layout().grid();
        for (id, intent) in intentions {
            if let Some(agent) = self.agents.get_mut(id) {
                let push = perception::avoidance(
                    *id,
                    agent.position(),
                    agent.neighbors(),
                    movement.personal_space,
                    movement.avoidance_strength,
                );
                agent.step_motion(intent.desired_velocity + push, dt, grid);
            }
        }
    }

    fn resolve_pending(&mut self, summary: &mut TickSummary, now: f64) {
        let pending = std::mem::take(&mut self.pending);
        let (trade, social) = (&self.config.trade, &self.config.social);
        for proposal in pending {
            let outcome = with_pair(
                &mut self.agents,
                proposal.proposer,
                proposal.responder,
                |proposer, responder| {
                    interaction::resolve_trade(&proposal, proposer, responder, trade, social, now)
                },
            )
            .unwrap_or(TradeOutcome::Expired);
            match outcome {
                TradeOutcome::Accepted => {
                    summary.trades_accepted = summary.trades_accepted.saturating_add(1);
                    self.counters.trades_accepted = self.counters.trades_accepted.saturating_add(1);
                }
                TradeOutcome::Rejected => {
                    summary.trades_rejected = summary.trades_rejected.saturating_add(1);
                    self.counters.trades_rejected = self.counters.trades_rejected.saturating_add(1);
                }
                TradeOutcome::Expired => {
                    summary.trades_expired = summary.trades_expired.saturating_add(1);
                    self.counters.trades_expired = self.counters.trades_expired.saturating_add(1);
                }
            }
        }
    }

    fn apply_intentions(
        &mut self,
        intentions: &[(AgentId, Intentions)],
        talked: &mut BTreeSet<(AgentId, AgentId)>,
        summary: &mut TickSummary,
        tick: u64,
        now: f64,
    ) {
        let radius = self.config.social.interaction_radius;
        for (id, intent) in intentions {
            for &other in &intent.interact_with {
                if self.distance(*id, other).is_some_and(|d| d <= radius) {
                    self.converse(*id, other, talked, summary, now);
                }
            }
            for &other in &intent.trade_with {
                if self.propose_trade(*id, other, tick) {
                    summary.trades_proposed = summary.trades_proposed.saturating_add(1);
                }
            }
        }
    }

    /// Give every nearby pair one roll for a spontaneous conversation and
    /// one for a spontaneous trade.
    fn sample_encounters(
        &mut self,
        talked: &mut BTreeSet<(AgentId, AgentId)>,
        summary: &mut TickSummary,
        tick: u64,
        now: f64,
    ) {
        let mut pairs: BTreeMap<(AgentId, AgentId), f64> = BTreeMap::new();
        for agent in self.agents.values() {
            for neighbor in agent.neighbors() {
                pairs.insert(ordered(agent.id(), neighbor.id), neighbor.distance);
            }
        }

        let (talk_radius, talk_chance) = (
            self.config.social.interaction_radius,
            self.config.social.spontaneous_chance,
        );
        let (trade_radius, trade_chance) = (
            self.config.trade.trade_radius,
            self.config.trade.spontaneous_chance,
        );
        for ((a, b), distance) in pairs {
            if distance <= talk_radius && roll(&mut self.rng, talk_chance) {
                self.converse(a, b, talked, summary, now);
            }
            if distance <= trade_radius
                && roll(&mut self.rng, trade_chance)
                && (self.propose_trade(a, b, tick) || self.propose_trade(b, a, tick))
            {
                summary.trades_proposed = summary.trades_proposed.saturating_add(1);
            }
        }
    }

    /// Run one conversation unless this pair already talked this tick.
    fn converse(
        &mut self,
        a: AgentId,
        b: AgentId,
        talked: &mut BTreeSet<(AgentId, AgentId)>,
        summary: &mut TickSummary,
        now: f64,
    ) {
        let pair = ordered(a, b);
        if a == b || talked.contains(&pair) {
            return;
        }
        let social = &self.config.social;
        let held = with_pair(&mut self.agents, a, b, |x, y| {
            interaction::interact(x, y, social, now)
        });
        if held.is_some() {
            talked.insert(pair);
            summary.interactions = summary.interactions.saturating_add(1);
        }
    }

    /// Queue an offer from `proposer` to `responder` for the next tick.
    ///
    /// Returns `false` when the queue is full, the pair already has an offer
    /// outstanding, they are out of trading range, or no sensible exchange
    /// exists.
    fn propose_trade(&mut self, proposer: AgentId, responder: AgentId, tick: u64) -> bool {
        if proposer == responder || self.pending.len() >= self.config.trade.max_pending {
            return false;
        }
        let pair = ordered(proposer, responder);
        if self
            .pending
            .iter()
            .any(|p| ordered(p.proposer, p.responder) == pair)
        {
            return false;
        }
        if !self
            .distance(proposer, responder)
            .is_some_and(|d| d <= self.config.trade.trade_radius)
        {
            return false;
        }
        let (Some(p), Some(r)) = (self.agents.get(&proposer), self.agents.get(&responder)) else {
            return false;
        };
        let Some(offer) = draft_offer(p.inventory(), p.needs(), r.inventory()) else {
            return false;
        };

        let id = TradeId::from_rng(&mut self.rng);
        debug!(trade_id = %id, %proposer, %responder, tick, "trade proposed");
        self.pending.push(TradeProposal {
            id,
            proposer,
            responder,
            offer,
            tick,
        });
        true
    }

    fn distance(&self, a: AgentId, b: AgentId) -> Option<f64> {
        let a = self.agents.get(&a)?;
        let b = self.agents.get(&b)?;
        Some(a.position().distance(b.position()))
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// Statistics as of the last refresh.
    pub const fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Recompute statistics now.
    pub fn refresh_stats(&mut self) -> &SimulationStats {
        self.stats = metrics::compute_stats(
            self.agents.values(),
            self.clock.tick(),
            self.clock.elapsed(),
            self.counters,
        );
        &self.stats
    }

    /// Running totals since the simulation started.
    pub const fn counters(&self) -> Counters {
        self.counters
    }

    /// Render-facing view of every agent, in id order.
    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        let friend = self.config.social.friend_threshold;
        self.agents.values().map(|a| a.snapshot(friend)).collect()
    }

    /// Look up one agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Mutable access to one agent.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Every agent, in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Number of agents alive.
    pub fn population(&self) -> usize {
        self.agents.len()
    }

    /// The simulation clock.
    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Shared pathfinding front end.
    pub const fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    /// Proposals waiting for the next tick.
    pub fn pending_trades(&self) -> &[TradeProposal] {
        &self.pending
    }

    /// The configuration this simulation was built with.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

/// Order a pair so `(a, b)` and `(b, a)` compare equal.
fn ordered(a: AgentId, b: AgentId) -> (AgentId, AgentId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Bernoulli trial that tolerates out-of-range probabilities.
fn roll(rng: &mut StdRng, chance: f64) -> bool {
    if chance.is_nan() || chance <= 0.0 {
        false
    } else if chance >= 1.0 {
        true
    } else {
        rng.random_bool(chance)
    }
}

/// Run `f` with exclusive access to two distinct agents.
///
/// Returns `None` if the ids are equal or either agent is missing.
fn with_pair<R>(
    agents: &mut BTreeMap<AgentId, Agent>,
    a: AgentId,
    b: AgentId,
    f: impl FnOnce(&mut Agent, &mut Agent) -> R,
) -> Option<R> {
    if a == b {
        return None;
    }
    let mut first = agents.remove(&a)?;
    let result = agents.get_mut(&b).map(|second| f(&mut first, second));
    agents.insert(a, first);
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use civitas_agents::{Effect, IdleDecisionSource, ScriptedDecisionSource, ScriptedStep};
    use civitas_types::{AgentActivity, Archetype, Item, Personality};
    use civitas_world::WalkableGrid;
    use rust_decimal::Decimal;

    use super::*;

    fn open_layout() -> Arc<CityLayout> {
        Arc::new(CityLayout::new(WalkableGrid::open(20, 20).unwrap()))
    }

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.social.spontaneous_chance = 0.0;
        config.trade.spontaneous_chance = 0.0;
        config
    }

    fn profile(name: &str) -> AgentProfile {
        AgentProfile::new(name, Archetype::Merchant, Personality::balanced())
    }

    #[test]
    fn spawn_rejects_blocked_cells() {
        let mut grid = WalkableGrid::open(5, 5).unwrap();
        grid.set_walkable(civitas_types::GridPos::new(2, 2), false).unwrap();
        let layout = Arc::new(CityLayout::new(grid));
        let mut sim = Simulation::new(quiet_config(), layout).unwrap();

        let err = sim.spawn(&profile("a"), Vec2::new(2.5, 2.5)).unwrap_err();
        assert!(matches!(err, SimulationError::UnwalkableSpawn { .. }));
        assert!(sim.spawn(&profile("a"), Vec2::new(-1.0, 0.5)).is_err());
        assert!(sim.spawn(&profile("a"), Vec2::new(f64::NAN, 0.5)).is_err());
        assert!(sim.spawn(&profile("a"), Vec2::new(0.5, 0.5)).is_ok());
        assert_eq!(sim.population(), 1);
    }

    #[test]
    fn remove_forgets_the_agent() {
        let mut sim = Simulation::new(quiet_config(), open_layout()).unwrap();
        let a = sim
            .spawn_with_brain(&profile("a"), Vec2::new(1.5, 1.5), Brain::external(IdleDecisionSource))
            .unwrap();
        let b = sim
            .spawn_with_brain(&profile("b"), Vec2::new(2.0, 1.5), Brain::external(IdleDecisionSource))
            .unwrap();
        sim.agent_mut(a).unwrap().memory_mut().update_relationship(b, 30.0);

        let removed = sim.remove(b).unwrap();
        assert_eq!(removed.id(), b);
        assert_eq!(sim.population(), 1);
        assert!(sim.agent(a).unwrap().memory().relationship(b).abs() < f64::EPSILON);
        assert!(matches!(sim.remove(b), Err(SimulationError::AgentNotFound(id)) if id == b));
    }

    #[test]
    fn intended_conversation_runs_once_per_pair() {
        let mut sim = Simulation::new(quiet_config(), open_layout()).unwrap();
        let b_slot = Vec2::new(5.5, 5.5);
        let b = sim
            .spawn_with_brain(&profile("b"), b_slot, Brain::external(IdleDecisionSource))
            .unwrap();
        let talk = ScriptedStep {
            activity: AgentActivity::Socializing,
            velocity: Vec2::ZERO,
            effects: vec![Effect::SeekInteraction(b), Effect::SeekInteraction(b)],
        };
        let a = sim
            .spawn_with_brain(
                &profile("a"),
                Vec2::new(5.0, 5.5),
                Brain::external(ScriptedDecisionSource::new([talk])),
            )
            .unwrap();

        let summary = sim.update(1.0).unwrap();
        assert_eq!(summary.interactions, 1);
        assert!(sim.agent(a).unwrap().memory().relationship(b) > 0.0);
        assert_eq!(sim.agent(b).unwrap().activity(), AgentActivity::Socializing);
    }

    #[test]
    fn intended_trade_resolves_next_tick() {
        let mut sim = Simulation::new(quiet_config(), open_layout()).unwrap();
        let seller_profile = profile("seller").with_item(Item::Food, 2);
        let seller = sim
            .spawn_with_brain(&seller_profile, Vec2::new(5.5, 5.5), Brain::external(IdleDecisionSource))
            .unwrap();
        let buyer_profile = profile("buyer").with_balance(Decimal::new(100, 0));
        let ask = ScriptedStep {
            activity: AgentActivity::Trading,
            velocity: Vec2::ZERO,
            effects: vec![Effect::ProposeTrade(seller)],
        };
        let buyer = sim
            .spawn_with_brain(
                &buyer_profile,
                Vec2::new(5.0, 5.5),
                Brain::external(ScriptedDecisionSource::new([ask])),
            )
            .unwrap();
        sim.agent_mut(buyer)
            .unwrap()
            .needs_mut()
            .set(civitas_types::NeedKind::Hunger, 90.0);

        let first = sim.update(1.0).unwrap();
        assert_eq!(first.trades_proposed, 1);
        assert_eq!(sim.pending_trades().len(), 1);
        assert_eq!(sim.agent(buyer).unwrap().inventory().quantity(Item::Food), 0);

        let second = sim.update(1.0).unwrap();
        assert_eq!(second.trades_accepted, 1);
        assert!(sim.pending_trades().is_empty());
        assert_eq!(sim.agent(buyer).unwrap().inventory().quantity(Item::Food), 1);
        assert_eq!(sim.agent(seller).unwrap().inventory().quantity(Item::Food), 1);
        assert_eq!(sim.counters().trades_accepted, 1);
    }

    #[test]
    fn crowded_agents_are_pushed_apart() {
        let mut config = quiet_config();
        config.movement.personal_space = 1.0;
        let mut sim = Simulation::new(config, open_layout()).unwrap();
        let a = sim
            .spawn_with_brain(&profile("a"), Vec2::new(5.0, 5.5), Brain::external(IdleDecisionSource))
            .unwrap();
        let b = sim
            .spawn_with_brain(&profile("b"), Vec2::new(5.4, 5.5), Brain::external(IdleDecisionSource))
            .unwrap();
        sim.update(0.1).unwrap();
        let gap = sim
            .agent(a)
            .unwrap()
            .position()
            .distance(sim.agent(b).unwrap().position());
        assert!(gap > 0.4);
    }

    #[test]
    fn stacked_agents_separate() {
        let mut sim = Simulation::new(quiet_config(), open_layout()).unwrap();
        let spot = Vec2::new(5.5, 5.5);
        let a = sim
            .spawn_with_brain(&profile("a"), spot, Brain::external(IdleDecisionSource))
            .unwrap();
        let b = sim
            .spawn_with_brain(&profile("b"), spot, Brain::external(IdleDecisionSource))
            .unwrap();
        for _ in 0..50 {
            sim.update(0.1).unwrap();
        }
        let gap = sim
            .agent(a)
            .unwrap()
            .position()
            .distance(sim.agent(b).unwrap().position());
        assert!(gap > 0.5);
    }

    #[test]
    fn metrics_refresh_on_schedule() {
        let mut config = quiet_config();
        config.metrics.refresh_every_ticks = 2;
        let mut sim = Simulation::new(config, open_layout()).unwrap();
        sim.spawn_with_brain(&profile("a"), Vec2::new(1.5, 1.5), Brain::external(IdleDecisionSource))
            .unwrap();

        sim.update(1.0).unwrap();
        assert_eq!(sim.stats().population, 0);
        sim.update(1.0).unwrap();
        assert_eq!(sim.stats().population, 1);
        assert_eq!(sim.stats().tick, 2);
    }

    #[test]
    fn bad_dt_still_counts_a_tick() {
        let mut sim = Simulation::new(quiet_config(), open_layout()).unwrap();
        let summary = sim.update(f64::NAN).unwrap();
        assert_eq!(summary.tick, 1);
        assert!(sim.clock().elapsed().abs() < f64::EPSILON);
    }
}
