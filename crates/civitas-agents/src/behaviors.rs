//! The standard citizen behavior tree.
//!
//! Branches are listed in priority order: survival first, then the other
//! needs, then company, then economic activity, and wandering as the
//! fallback.
//!
//! ```text
//! Selector "citizen"
//!   Sequence "eat"        hungry -> (eat carried food | go to market -> buy and eat)
//!   Sequence "rest"       tired or night -> go home -> sleep
//!   Sequence "leisure"    bored -> go to park -> relax
//!   Sequence "socialize"  lonely -> ready to talk -> approach neighbor -> greet
//!   Sequence "trade"      lacking goods -> ready to trade -> offer trade
//!   Sequence "work"       on the clock -> commute -> work shift
//!   Sequence "wander"     pick destination -> walk route
//! ```
//!
//! Building destinations are reached by following the navigator's shared
//! flow fields; wandering follows an A* route to a random road cell. The
//! `work` branch exists only for archetypes with a workplace.

use std::collections::VecDeque;
use std::sync::Arc;

use civitas_behavior::{
    Action, BehaviorTree, Blackboard, BoxedNode, Condition, Key, LeafError, NodeExt, Selector,
    Sequence, Status,
};
use civitas_types::{
    AgentActivity, Archetype, GridPos, Item, MemoryEventKind, NeedKind, Vec2, ZoneType,
};
use civitas_world::Navigator;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::config::BehaviorConfig;
use crate::keys::{self, Effect, Neighbor};

/// Remaining waypoints of the current wander route.
const ROUTE: Key<VecDeque<GridPos>> = Key::new("citizen.route");
/// Seconds worked in the current shift.
const SHIFT_ELAPSED: Key<f64> = Key::new("citizen.shift_elapsed");
/// Clock time of the last conversation this agent started.
const LAST_CONTACT: Key<f64> = Key::new("citizen.last_contact");
/// Clock time of the last trade this agent offered.
const LAST_TRADE: Key<f64> = Key::new("citizen.last_trade");

/// Citizens wake this many hours before work starts.
const WAKE_BEFORE_WORK: f64 = 2.0;
/// Citizens turn in this many hours after work ends.
const BEDTIME_AFTER_WORK: f64 = 4.0;

/// Build the citizen tree for one agent.
///
/// `seed` feeds the random generator owned by the wander branch, so two
/// trees built with the same seed wander identically.
pub fn citizen_tree(
    navigator: Arc<Navigator>,
    archetype: Archetype,
    config: &BehaviorConfig,
    seed: u64,
) -> BehaviorTree {
    let mut branches = vec![
        eat_branch(&navigator, config),
        rest_branch(&navigator, config),
        leisure_branch(&navigator, config),
        social_branch(config),
        trade_branch(config),
    ];
    if let Some(zone) = archetype.workplace() {
        branches.push(work_branch(&navigator, archetype, zone, config));
    }
    branches.push(wander_branch(navigator, config, seed));
    BehaviorTree::new(Selector::new("citizen", branches).boxed())
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

fn eat_branch(navigator: &Arc<Navigator>, config: &BehaviorConfig) -> BoxedNode {
    let price = Decimal::from_f64(Item::Food.base_value()).unwrap_or(Decimal::TEN);
    Sequence::new(
        "eat",
        vec![
            urgent("hungry", NeedKind::Hunger, config.hunger_threshold),
            Selector::new(
                "find food",
                vec![
                    Action::fallible("eat carried food", |bb| {
                        if !carries(bb, Item::Food)? {
                            return Ok(Status::Failure);
                        }
                        keys::push_effect(bb, Effect::Consume(Item::Food));
                        stop(bb, AgentActivity::Idle);
                        Ok(Status::Success)
                    })
                    .boxed(),
                    Sequence::new(
                        "buy food",
                        vec![
                            travel_to(
                                Arc::clone(navigator),
                                "go to market",
                                ZoneType::Commercial,
                                config.arrival_radius,
                            ),
                            Action::fallible("buy and eat", move |bb| {
                                if read(bb, keys::BALANCE)? < price {
                                    return Ok(Status::Failure);
                                }
                                keys::push_effect(
                                    bb,
                                    Effect::Purchase {
                                        item: Item::Food,
                                        price,
                                    },
                                );
                                keys::push_effect(bb, Effect::Consume(Item::Food));
                                stop(bb, AgentActivity::Idle);
                                Ok(Status::Success)
                            })
                            .boxed(),
                        ],
                    )
                    .boxed(),
                ],
            )
            .boxed(),
        ],
    )
    .boxed()
}

fn rest_branch(navigator: &Arc<Navigator>, config: &BehaviorConfig) -> BoxedNode {
    let threshold = config.energy_threshold;
    let release = config.release_urgency;
    let (start, end) = (config.work_start_hour, config.work_end_hour);
    Sequence::new(
        "rest",
        vec![
            Condition::new("tired or night", move |bb| {
                let urgency = keys::urgency(bb, NeedKind::Energy);
                let hour = bb.get_or(keys::HOUR, 12.0);
                urgency >= threshold || (is_night(hour, start, end) && urgency > release)
            })
            .boxed(),
            travel_to(
                Arc::clone(navigator),
                "go home",
                ZoneType::Residential,
                config.arrival_radius,
            ),
            recover("sleep", NeedKind::Energy, config.rest_rate, release, AgentActivity::Resting),
        ],
    )
    .boxed()
}

fn leisure_branch(navigator: &Arc<Navigator>, config: &BehaviorConfig) -> BoxedNode {
    Sequence::new(
        "leisure",
        vec![
            urgent("bored", NeedKind::Fun, config.fun_threshold),
            travel_to(
                Arc::clone(navigator),
                "go to park",
                ZoneType::Park,
                config.arrival_radius,
            ),
            recover(
                "relax",
                NeedKind::Fun,
                config.leisure_rate,
                config.release_urgency,
                AgentActivity::Idle,
            ),
        ],
    )
    .boxed()
}

fn social_branch(config: &BehaviorConfig) -> BoxedNode {
    let cooldown = config.contact_cooldown_seconds;
    let (radius, avoid_below) = (config.contact_radius, config.avoid_below);
    Sequence::new(
        "socialize",
        vec![
            urgent("lonely", NeedKind::Social, config.social_threshold),
            Condition::new("ready to talk", move |bb| off_cooldown(bb, LAST_CONTACT, cooldown))
                .boxed(),
            Action::fallible("approach neighbor", move |bb| {
                let Some(other) = approachable(bb, avoid_below)? else {
                    return Ok(Status::Failure);
                };
                if other.distance <= radius {
                    stop(bb, AgentActivity::Socializing);
                    return Ok(Status::Success);
                }
                steer(bb, other.position, AgentActivity::Walking)?;
                Ok(Status::Running)
            })
            .boxed(),
            Action::fallible("greet", move |bb| {
                let Some(other) = approachable(bb, avoid_below)?.filter(|n| n.distance <= radius)
                else {
                    return Ok(Status::Failure);
                };
                keys::push_effect(bb, Effect::SeekInteraction(other.id));
                bb.set(LAST_CONTACT, read(bb, keys::NOW)?);
                stop(bb, AgentActivity::Socializing);
                Ok(Status::Success)
            })
            .boxed(),
        ],
    )
    .boxed()
}

fn trade_branch(config: &BehaviorConfig) -> BoxedNode {
    let threshold = config.trade_threshold;
    let cooldown = config.contact_cooldown_seconds;
    let (radius, avoid_below) = (config.contact_radius, config.avoid_below);
    Sequence::new(
        "trade",
        vec![
            Condition::fallible("lacking goods", move |bb| {
                let inventory = bb
                    .get(keys::INVENTORY)
                    .ok_or(LeafError::MissingKey {
                        key: keys::INVENTORY.name(),
                    })?;
                let urgencies = bb.get(keys::URGENCIES).ok_or(LeafError::MissingKey {
                    key: keys::URGENCIES.name(),
                })?;
                Ok(urgencies.iter().any(|(&need, &urgency)| {
                    urgency >= threshold
                        && inventory.get(&Item::for_need(need)).is_none_or(|&q| q == 0)
                }))
            })
            .boxed(),
            Condition::new("ready to trade", move |bb| off_cooldown(bb, LAST_TRADE, cooldown))
                .boxed(),
            Action::fallible("offer trade", move |bb| {
                let Some(other) = approachable(bb, avoid_below)?.filter(|n| n.distance <= radius)
                else {
                    return Ok(Status::Failure);
                };
                keys::push_effect(bb, Effect::ProposeTrade(other.id));
                bb.set(LAST_TRADE, read(bb, keys::NOW)?);
                stop(bb, AgentActivity::Trading);
                Ok(Status::Success)
            })
            .boxed(),
        ],
    )
    .boxed()
}

fn work_branch(
    navigator: &Arc<Navigator>,
    archetype: Archetype,
    zone: ZoneType,
    config: &BehaviorConfig,
) -> BoxedNode {
    let (start, end) = (config.work_start_hour, config.work_end_hour);
    let shift = config.shift_seconds;
    let wage = archetype.wage_per_second();
    Sequence::new(
        "work",
        vec![
            Condition::new("on the clock", move |bb| {
                is_work_hour(bb.get_or(keys::HOUR, 0.0), start, end)
            })
            .boxed(),
            travel_to(Arc::clone(navigator), "commute", zone, config.arrival_radius),
            Action::fallible("work shift", move |bb| {
                let dt = read(bb, keys::DT)?;
                let hour = read(bb, keys::HOUR)?;
                let elapsed = bb.get_or(SHIFT_ELAPSED, 0.0) + dt;
                if let Some(pay) = Decimal::from_f64(wage * dt).map(|d| d.round_dp(4))
                    && pay > Decimal::ZERO
                {
                    keys::push_effect(bb, Effect::Earn(pay));
                }
                stop(bb, AgentActivity::Working);
                if elapsed >= shift || !is_work_hour(hour, start, end) {
                    bb.set(SHIFT_ELAPSED, 0.0);
                    return Ok(Status::Success);
                }
                bb.set(SHIFT_ELAPSED, elapsed);
                Ok(Status::Running)
            })
            .boxed(),
        ],
    )
    .boxed()
}

fn wander_branch(navigator: Arc<Navigator>, config: &BehaviorConfig, seed: u64) -> BoxedNode {
    let mut rng = StdRng::seed_from_u64(seed);
    let arrival = config.arrival_radius;
    Sequence::new(
        "wander",
        vec![
            Action::fallible("pick destination", move |bb| {
                let here = read(bb, keys::POSITION)?.cell();
                let Some(target) = navigator.layout().random_road_cell(&mut rng) else {
                    stop(bb, AgentActivity::Idle);
                    return Ok(Status::Failure);
                };
                let Some(plan) = navigator.plan_path(here, target) else {
                    return Ok(path_failed(bb, serde_json::json!({ "target": target })));
                };
                bb.set(ROUTE, VecDeque::from(plan.waypoints));
                Ok(Status::Success)
            })
            .boxed(),
            Action::fallible("walk route", move |bb| {
                let position = read(bb, keys::POSITION)?;
                while let Some(next) = bb.get(ROUTE).and_then(|route| route.front().copied()) {
                    if position.distance(next.center()) > arrival {
                        steer(bb, next.center(), AgentActivity::Walking)?;
                        return Ok(Status::Running);
                    }
                    bb.update(ROUTE, |route| {
                        route.pop_front();
                    });
                }
                stop(bb, AgentActivity::Idle);
                Ok(Status::Success)
            })
            .boxed(),
        ],
    )
    .boxed()
}

// ---------------------------------------------------------------------------
// Shared leaves
// ---------------------------------------------------------------------------

/// Succeeds while `need` is at least `threshold` urgent.
fn urgent(name: &str, need: NeedKind, threshold: f64) -> BoxedNode {
    Condition::new(name, move |bb| keys::urgency(bb, need) >= threshold).boxed()
}

/// Walk to the nearest building serving `zone` by following its flow field.
///
/// `Running` while under way, `Success` on arrival, `Failure` (with a
/// `PathFailed` memory) if no such building exists or neither its entrance
/// nor the nearest walkable cell to it can be reached.
fn travel_to(
    navigator: Arc<Navigator>,
    name: &str,
    zone: ZoneType,
    arrival_radius: f64,
) -> BoxedNode {
    Action::fallible(name, move |bb| {
        let position = read(bb, keys::POSITION)?;
        let here = position.cell();
        let Some(building) = navigator.layout().nearest_building(here, zone).copied() else {
            return Ok(path_failed(bb, serde_json::json!({ "zone": zone })));
        };
        let entrance = building.entrance;
        let (goal, next) = if position.distance(entrance.center()) <= arrival_radius {
            (entrance, entrance)
        } else if let Some(step) = navigator.flow_step(here, entrance) {
            (step.goal, step.next)
        } else {
            return Ok(path_failed(
                bb,
                serde_json::json!({ "zone": zone, "building": building.id }),
            ));
        };
        if position.distance(goal.center()) <= arrival_radius {
            let was_moving = read(bb, keys::VELOCITY)?.length() > 0.0;
            stop(bb, AgentActivity::Idle);
            if was_moving {
                keys::push_effect(
                    bb,
                    Effect::Remember {
                        kind: MemoryEventKind::Arrived,
                        subject: None,
                        payload: serde_json::json!({ "building": building.id, "zone": zone }),
                    },
                );
            }
            return Ok(Status::Success);
        }
        steer(bb, next.center(), AgentActivity::Seeking)?;
        Ok(Status::Running)
    })
    .boxed()
}

/// Stand still and restore `need` at `rate` per second until its urgency
/// drops to `release`.
fn recover(
    name: &str,
    need: NeedKind,
    rate: f64,
    release: f64,
    activity: AgentActivity,
) -> BoxedNode {
    Action::fallible(name, move |bb| {
        let dt = read(bb, keys::DT)?;
        stop(bb, activity);
        if keys::urgency(bb, need) <= release {
            keys::push_effect(
                bb,
                Effect::Remember {
                    kind: MemoryEventKind::NeedSatisfied,
                    subject: None,
                    payload: serde_json::json!({ "need": need }),
                },
            );
            return Ok(Status::Success);
        }
        keys::push_effect(
            bb,
            Effect::Satisfy {
                need,
                amount: rate * dt,
            },
        );
        Ok(Status::Running)
    })
    .boxed()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read<T: Copy + 'static>(bb: &Blackboard, key: Key<T>) -> Result<T, LeafError> {
    bb.get_copied(key)
        .ok_or(LeafError::MissingKey { key: key.name() })
}

fn carries(bb: &Blackboard, item: Item) -> Result<bool, LeafError> {
    let inventory = bb.get(keys::INVENTORY).ok_or(LeafError::MissingKey {
        key: keys::INVENTORY.name(),
    })?;
    Ok(inventory.get(&item).is_some_and(|&q| q > 0))
}

fn stop(bb: &mut Blackboard, activity: AgentActivity) {
    bb.set(keys::DESIRED_VELOCITY, Vec2::ZERO);
    bb.set(keys::ACTIVITY, activity);
}

/// Head for `target` at top speed, slowing so as not to overshoot it this
/// tick. Returns the remaining distance.
fn steer(bb: &mut Blackboard, target: Vec2, activity: AgentActivity) -> Result<f64, LeafError> {
    let position = read(bb, keys::POSITION)?;
    let max_speed = read(bb, keys::MAX_SPEED)?;
    let dt = read(bb, keys::DT)?;
    let offset = target - position;
    let distance = offset.length();
    let speed = if dt > 0.0 {
        max_speed.min(distance / dt)
    } else {
        max_speed
    };
    bb.set(keys::DESIRED_VELOCITY, offset.normalized() * speed);
    bb.set(keys::ACTIVITY, activity);
    Ok(distance)
}

fn path_failed(bb: &mut Blackboard, payload: serde_json::Value) -> Status {
    keys::push_effect(
        bb,
        Effect::Remember {
            kind: MemoryEventKind::PathFailed,
            subject: None,
            payload,
        },
    );
    stop(bb, AgentActivity::Idle);
    Status::Failure
}

/// The nearest perceived neighbor not disliked enough to avoid.
fn approachable(bb: &Blackboard, avoid_below: f64) -> Result<Option<Neighbor>, LeafError> {
    let neighbors = bb.get(keys::NEIGHBORS).ok_or(LeafError::MissingKey {
        key: keys::NEIGHBORS.name(),
    })?;
    Ok(neighbors
        .iter()
        .filter(|n| n.relationship > avoid_below)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
        .copied())
}

fn off_cooldown(bb: &Blackboard, key: Key<f64>, cooldown: f64) -> bool {
    match (bb.get_copied(key), bb.get_copied(keys::NOW)) {
        (Some(last), Some(now)) => now - last >= cooldown,
        _ => true,
    }
}

fn is_work_hour(hour: f64, start: f64, end: f64) -> bool {
    hour >= start && hour < end
}

fn is_night(hour: f64, start: f64, end: f64) -> bool {
    hour < start - WAKE_BEFORE_WORK || hour >= end + BEDTIME_AFTER_WORK
}
