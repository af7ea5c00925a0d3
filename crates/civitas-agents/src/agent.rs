//! A single citizen: needs, memory, wallet, kinematics, and a brain.
//!
//! The manager drives an agent through four calls per tick, always in this
//! order across the whole population:
//!
//! 1. [`Agent::update_needs`]
//! 2. [`Agent::set_neighbors`] with the fresh perception list
//! 3. [`Agent::think`], which ticks the brain and applies its effects
//! 4. [`Agent::step_motion`] with the avoidance-adjusted velocity
//!
//! Cross-agent effects (conversations and trades) are never applied here.
//! `think` returns them as [`Intentions`] for the manager to resolve.

use civitas_behavior::Status;
use civitas_types::{
    AgentActivity, AgentId, AgentProfile, AgentSnapshot, Archetype, MemoryEventKind, NeedKind,
    Personality, Vec2,
};
use civitas_world::{Walkability, has_line_of_sight};
use tracing::{debug, trace};

use crate::config::AgentConfig;
use crate::decision::Brain;
use crate::error::AgentError;
use crate::inventory::Inventory;
use crate::keys::{self, Effect, Neighbor};
use crate::memory::Memory;
use crate::needs::Needs;

/// Below this speed an agent keeps its previous heading.
const HEADING_EPSILON: f64 = 1e-6;

/// Per-tick inputs to [`Agent::think`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThinkContext {
    /// Simulated seconds in this tick.
    pub dt: f64,
    /// Simulation clock in seconds.
    pub now: f64,
    /// Hour of day in `[0, 24)`.
    pub hour: f64,
}

/// What the brain decided this tick that involves other agents or motion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intentions {
    /// Velocity the brain wants, before avoidance and clamping.
    pub desired_velocity: Vec2,
    /// Agents this one wants to talk to.
    pub interact_with: Vec<AgentId>,
    /// Agents this one wants to trade with.
    pub trade_with: Vec<AgentId>,
    /// Status the brain returned.
    pub status: Option<Status>,
}

/// One simulated citizen.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    name: String,
    archetype: Archetype,
    personality: Personality,
    needs: Needs,
    memory: Memory,
    inventory: Inventory,
    position: Vec2,
    velocity: Vec2,
    heading: f64,
    activity: AgentActivity,
    max_speed: f64,
    brain: Brain,
    neighbors: Vec<Neighbor>,
    critical: Option<NeedKind>,
    critical_urgency: f64,
    item_relief: f64,
}

impl Agent {
    /// Create an agent from a spawn profile.
    pub fn new(
        id: AgentId,
        profile: &AgentProfile,
        position: Vec2,
        config: &AgentConfig,
        brain: Brain,
        now: f64,
    ) -> Self {
        Self {
            id,
            name: profile.name.clone(),
            archetype: profile.archetype,
            personality: profile.personality,
            needs: Needs::new(&config.needs.needs),
            memory: Memory::new(&config.memory, now),
            inventory: Inventory::new(profile.starting_balance, profile.starting_inventory.clone()),
            position,
            velocity: Vec2::ZERO,
            heading: 0.0,
            activity: AgentActivity::Idle,
            max_speed: config.max_speed.max(0.0),
            brain,
            neighbors: Vec::new(),
            critical: None,
            critical_urgency: config.needs.critical_urgency,
            item_relief: config.behavior.item_relief,
        }
    }

    // -------------------------------------------------------------------
    // Tick phases
    // -------------------------------------------------------------------

    /// Advance every need by `dt` seconds.
    pub fn update_needs(&mut self, dt: f64) {
        self.needs.update(dt);
    }

    /// Replace the perception list.
    pub fn set_neighbors(&mut self, neighbors: Vec<Neighbor>) {
        self.neighbors = neighbors;
    }

    /// Run one decision step.
    ///
    /// Writes the agent's state into the brain's blackboard, resets the
    /// brain when a need has just become critical, ticks it, and applies
    /// the effects it queued. Effects that cannot be applied (spending more
    /// than the balance, eating food that is not carried) are skipped.
    pub fn think(&mut self, ctx: ThinkContext) -> Intentions {
        self.write_blackboard(ctx);
        self.check_preemption();

        let status = self.brain.tick();

        let blackboard = self.brain.blackboard_mut();
        let desired_velocity = blackboard
            .get_copied(keys::DESIRED_VELOCITY)
            .unwrap_or(Vec2::ZERO);
        let activity = blackboard
            .get_copied(keys::ACTIVITY)
            .unwrap_or(AgentActivity::Idle);
        let effects = blackboard.take(keys::EFFECTS).unwrap_or_default();
        self.activity = activity;

        let mut intentions = Intentions {
            desired_velocity,
            status: Some(status),
            ..Intentions::default()
        };
        for effect in effects {
            if let Err(err) = self.apply_effect(effect, ctx.now, &mut intentions) {
                debug!(agent_id = %self.id, error = %err, "effect skipped");
            }
        }
        trace!(
            agent_id = %self.id,
            brain = self.brain.name(),
            ?status,
            activity = %self.activity,
            "agent thought"
        );
        intentions
    }

    /// Move with `velocity` for `dt` seconds.
    ///
    /// The velocity is clamped to the agent's top speed. A step may not pass
    /// through or cut the corner of a blocked cell; if the full step would,
    /// the agent slides along whichever axis is clear, and stops if neither
    /// is.
    pub fn step_motion<G: Walkability + ?Sized>(&mut self, velocity: Vec2, dt: f64, grid: &G) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let velocity = velocity.clamp_length(self.max_speed);
        let step = velocity * dt;
        let candidates = [
            (self.position + step, velocity),
            (self.position + Vec2::new(step.x, 0.0), Vec2::new(velocity.x, 0.0)),
            (self.position + Vec2::new(0.0, step.y), Vec2::new(0.0, velocity.y)),
        ];
        let here = self.position.cell();
        let moved = candidates
            .into_iter()
            .find(|(next, _)| has_line_of_sight(here, next.cell(), grid));
        match moved {
            Some((next, applied)) => {
                self.position = next;
                self.velocity = applied;
            }
            None => self.velocity = Vec2::ZERO,
        }
        if self.velocity.length() > HEADING_EPSILON {
            self.heading = self.velocity.heading_degrees();
        }
    }

    /// Age memories and decay relationships by `dt` seconds.
    pub fn decay_memories(&mut self, dt: f64) {
        self.memory.decay_memories(dt);
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// Unique identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawn archetype.
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Personality vector.
    pub const fn personality(&self) -> &Personality {
        &self.personality
    }

    /// Needs model.
    pub const fn needs(&self) -> &Needs {
        &self.needs
    }

    /// Mutable needs model.
    pub const fn needs_mut(&mut self) -> &mut Needs {
        &mut self.needs
    }

    /// Event log and relationships.
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable event log and relationships.
    pub const fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Wallet and items.
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Mutable wallet and items.
    pub const fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// World position.
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity applied in the last motion step.
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Facing in degrees.
    pub const fn heading(&self) -> f64 {
        self.heading
    }

    /// Current activity.
    pub const fn activity(&self) -> AgentActivity {
        self.activity
    }

    /// Override the activity label, e.g. while the manager runs a
    /// conversation.
    pub const fn set_activity(&mut self, activity: AgentActivity) {
        self.activity = activity;
    }

    /// Top speed in cells per second.
    pub const fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Current perception list.
    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    /// The decision maker.
    pub const fn brain(&self) -> &Brain {
        &self.brain
    }

    /// The need currently above the critical threshold, if any.
    pub const fn critical_need(&self) -> Option<NeedKind> {
        self.critical
    }

    /// Render-facing view of this agent.
    pub fn snapshot(&self, friend_threshold: f64) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            name: self.name.clone(),
            archetype: self.archetype,
            position: self.position,
            heading: self.heading,
            activity: self.activity,
            needs: self.needs.values(),
            most_critical: self.needs.get_most_critical().map(|(kind, _)| kind),
            balance: self.inventory.balance(),
            inventory: self.inventory.items().clone(),
            friends: u32::try_from(self.memory.count_above(friend_threshold)).unwrap_or(u32::MAX),
        }
    }

    // -------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------

    fn write_blackboard(&mut self, ctx: ThinkContext) {
        let urgencies = self.needs.urgencies();
        let most_critical = self.needs.get_most_critical();
        let bb = self.brain.blackboard_mut();
        bb.set(keys::SELF_ID, self.id);
        bb.set(keys::POSITION, self.position);
        bb.set(keys::VELOCITY, self.velocity);
        bb.set(keys::MAX_SPEED, self.max_speed);
        bb.set(keys::URGENCIES, urgencies);
        bb.set(keys::MOST_CRITICAL, most_critical);
        bb.set(keys::NEIGHBORS, self.neighbors.clone());
        bb.set(keys::BALANCE, self.inventory.balance());
        bb.set(keys::INVENTORY, self.inventory.items().clone());
        bb.set(keys::DT, ctx.dt);
        bb.set(keys::HOUR, ctx.hour);
        bb.set(keys::NOW, ctx.now);
        bb.set(keys::DESIRED_VELOCITY, Vec2::ZERO);
        bb.set(keys::ACTIVITY, AgentActivity::Idle);
        bb.set(keys::EFFECTS, Vec::new());
    }

    /// Reset the brain when a need newly crosses the critical threshold, so
    /// a long-running branch cannot starve the survival branches.
    fn check_preemption(&mut self) {
        let critical = self
            .needs
            .get_most_critical()
            .filter(|&(_, urgency)| urgency >= self.critical_urgency)
            .map(|(kind, _)| kind);
        if let Some(kind) = critical
            && self.critical != Some(kind)
        {
            debug!(agent_id = %self.id, need = %kind, "critical need, preempting behavior");
            self.brain.reset();
        }
        self.critical = critical;
    }

    fn apply_effect(
        &mut self,
        effect: Effect,
        now: f64,
        intentions: &mut Intentions,
    ) -> Result<(), AgentError> {
        match effect {
            Effect::Satisfy { need, amount } => self.needs.satisfy(need, amount),
            Effect::Earn(amount) => self.inventory.credit(amount)?,
            Effect::Purchase { item, price } => {
                self.inventory.debit(price)?;
                self.inventory.add_item(item, 1)?;
                self.memory.remember_event(
                    MemoryEventKind::Purchase,
                    None,
                    serde_json::json!({ "item": item, "price": price.to_string() }),
                    now,
                );
            }
            Effect::Consume(item) => {
                self.inventory.remove_item(item, 1)?;
                if let Some(need) = item.relieves() {
                    self.needs.satisfy(need, self.item_relief);
                    self.memory.remember_event(
                        MemoryEventKind::NeedSatisfied,
                        None,
                        serde_json::json!({ "need": need, "item": item }),
                        now,
                    );
                }
            }
            Effect::SeekInteraction(other) => {
                if other != self.id && !intentions.interact_with.contains(&other) {
                    intentions.interact_with.push(other);
                }
            }
            Effect::ProposeTrade(other) => {
                if other != self.id && !intentions.trade_with.contains(&other) {
                    intentions.trade_with.push(other);
                }
            }
            Effect::Remember {
                kind,
                subject,
                payload,
            } => self.memory.remember_event(kind, subject, payload, now),
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use civitas_types::Item;
    use civitas_world::WalkableGrid;
    use rust_decimal::Decimal;

    use super::*;
    use crate::decision::{IdleDecisionSource, ScriptedDecisionSource, ScriptedStep};

    fn profile() -> AgentProfile {
        AgentProfile::new("Ada", Archetype::Merchant, Personality::balanced())
            .with_balance(Decimal::new(20, 0))
            .with_item(Item::Food, 1)
    }

    fn scripted(steps: Vec<ScriptedStep>) -> Agent {
        Agent::new(
            AgentId::new(),
            &profile(),
            Vec2::new(2.5, 2.5),
            &AgentConfig::default(),
            Brain::external(ScriptedDecisionSource::new(steps)),
            0.0,
        )
    }

    fn step(effects: Vec<Effect>) -> ScriptedStep {
        ScriptedStep {
            activity: AgentActivity::Seeking,
            velocity: Vec2::new(1.0, 0.0),
            effects,
        }
    }

    const CTX: ThinkContext = ThinkContext {
        dt: 1.0,
        now: 5.0,
        hour: 12.0,
    };

    #[test]
    fn think_applies_purchase_and_consume() {
        let mut agent = scripted(vec![step(vec![
            Effect::Purchase {
                item: Item::Food,
                price: Decimal::new(10, 0),
            },
            Effect::Consume(Item::Food),
        ])]);
        agent.needs_mut().set(NeedKind::Hunger, 80.0);
        let intentions = agent.think(CTX);

        assert_eq!(intentions.desired_velocity, Vec2::new(1.0, 0.0));
        assert_eq!(agent.activity(), AgentActivity::Seeking);
        assert_eq!(agent.inventory().balance(), Decimal::new(10, 0));
        // One bought, one eaten: the starting food is still there.
        assert_eq!(agent.inventory().quantity(Item::Food), 1);
        assert!(agent.needs().value(NeedKind::Hunger).unwrap() < 80.0);
        assert!(agent.memory().last_event(MemoryEventKind::Purchase).is_some());
    }

    #[test]
    fn unaffordable_purchase_is_skipped() {
        let mut agent = scripted(vec![step(vec![Effect::Purchase {
            item: Item::Tools,
            price: Decimal::new(500, 0),
        }])]);
        agent.think(CTX);
        assert_eq!(agent.inventory().balance(), Decimal::new(20, 0));
        assert_eq!(agent.inventory().quantity(Item::Tools), 0);
    }

    #[test]
    fn social_intentions_are_deduplicated() {
        let other = AgentId::new();
        let mut agent = scripted(vec![step(vec![
            Effect::SeekInteraction(other),
            Effect::SeekInteraction(other),
            Effect::ProposeTrade(other),
        ])]);
        let self_id = agent.id();
        let intentions = agent.think(CTX);
        assert_eq!(intentions.interact_with, vec![other]);
        assert_eq!(intentions.trade_with, vec![other]);
        assert!(!intentions.interact_with.contains(&self_id));
    }

    #[test]
    fn critical_need_is_tracked() {
        let mut agent = scripted(Vec::new());
        agent.needs_mut().set(NeedKind::Hunger, 95.0);
        agent.think(CTX);
        assert_eq!(agent.critical_need(), Some(NeedKind::Hunger));
        agent.needs_mut().set(NeedKind::Hunger, 10.0);
        agent.think(CTX);
        assert_eq!(agent.critical_need(), None);
    }

    #[test]
    fn motion_is_clamped_to_max_speed() {
        let grid = WalkableGrid::open(10, 10).unwrap();
        let mut agent = scripted(Vec::new());
        agent.step_motion(Vec2::new(10.0, 0.0), 1.0, &grid);
        assert!((agent.position().x - (2.5 + agent.max_speed())).abs() < 1e-9);
        assert!((agent.heading() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn blocked_motion_slides_along_open_axis() {
        let grid = WalkableGrid::from_rows(&[".....", ".....", "...#.", "....."]).unwrap();
        let mut agent = scripted(Vec::new());
        // Heading east from (2, 2) runs into the wall at (3, 2).
        agent.step_motion(Vec2::new(1.0, 0.0), 1.0, &grid);
        assert_eq!(agent.position().cell(), civitas_types::GridPos::new(2, 2));
        assert_eq!(agent.velocity(), Vec2::ZERO);

        // The diagonal to (3, 3) would cut the wall's corner; slide south.
        agent.step_motion(Vec2::new(1.0, 1.0), 0.9, &grid);
        assert_eq!(agent.position().cell(), civitas_types::GridPos::new(2, 3));
        assert!(agent.velocity().x.abs() < 1e-12);
        assert!(agent.velocity().y > 0.0);
    }

    #[test]
    fn long_step_cannot_jump_a_wall() {
        let grid = WalkableGrid::from_rows(&["...#....", "...#....", "...#...."]).unwrap();
        let mut agent = Agent::new(
            AgentId::new(),
            &profile(),
            Vec2::new(2.9, 1.5),
            &AgentConfig::default(),
            Brain::external(IdleDecisionSource),
            0.0,
        );
        agent.step_motion(Vec2::new(1.4, 0.0), 1.0, &grid);
        assert_eq!(agent.position().cell(), civitas_types::GridPos::new(2, 1));
        assert_eq!(agent.velocity(), Vec2::ZERO);
    }

    #[test]
    fn snapshot_reflects_state() {
        let agent = Agent::new(
            AgentId::new(),
            &profile(),
            Vec2::new(1.0, 1.0),
            &AgentConfig::default(),
            Brain::external(IdleDecisionSource),
            0.0,
        );
        let snap = agent.snapshot(50.0);
        assert_eq!(snap.name, "Ada");
        assert_eq!(snap.balance, Decimal::new(20, 0));
        assert_eq!(snap.inventory.get(&Item::Food), Some(&1));
        assert_eq!(snap.friends, 0);
        assert_eq!(snap.needs.len(), 4);
    }
}
