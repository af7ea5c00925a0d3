//! Seeds the simulation with its starting population.
//!
//! Each citizen gets a unique name from the pool, a uniformly chosen
//! archetype, random personality traits, a starting balance, and a few
//! items, and is placed on a random road cell. All randomness comes from
//! the caller's generator so a seeded run spawns the same town every time.

use std::collections::BTreeSet;

use civitas_core::Simulation;
use civitas_core::config::SpawnerConfig;
use civitas_types::{AgentId, AgentProfile, Archetype, GridPos, Item, Personality};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::info;

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Name pool
// -----------------------------------------------------------------------

/// Built-in pool of citizen names. The spawner samples without
/// replacement and falls back to numbered names once the pool runs out.
const NAME_POOL: &[&str] = &[
    "Ada", "Basil", "Cora", "Dmitri", "Elena", "Farid", "Greta", "Hugo",
    "Ines", "Jonas", "Kaia", "Luca", "Mara", "Nils", "Olga", "Pavel",
    "Quinn", "Rosa", "Soren", "Talia", "Ugo", "Vera", "Wim", "Xenia",
    "Yusuf", "Zora", "Anton", "Bea", "Cyril", "Dora", "Emil", "Fleur",
    "Gustav", "Hana", "Ivo", "Jana", "Kurt", "Lena", "Milo", "Nora",
    "Otto", "Pia", "Rafael", "Sina", "Theo", "Uma", "Viktor", "Willa",
];

// -----------------------------------------------------------------------
// Spawning
// -----------------------------------------------------------------------

/// Spawn `config.population` citizens into `sim`.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] if the layout has no road cells to
/// place citizens on, or [`EngineError::Simulation`] if a spawn is
/// rejected.
pub fn spawn_population<R: Rng>(
    sim: &mut Simulation,
    config: &SpawnerConfig,
    rng: &mut R,
) -> Result<Vec<AgentId>, EngineError> {
    let cells: Vec<GridPos> = sim.navigator().layout().road_cells().collect();
    if cells.is_empty() && config.population > 0 {
        return Err(EngineError::Spawner {
            message: String::from("city layout has no road cells to place citizens on"),
        });
    }

    let names = pick_unique_names(rng, config.population);
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let profile = random_profile(rng, config, name);
        let cell = cells
            .get(rng.random_range(0..cells.len()))
            .copied()
            .ok_or_else(|| EngineError::Spawner {
                message: String::from("failed to select a road cell"),
            })?;
        let id = sim.spawn(&profile, cell.center())?;
        ids.push(id);
    }

    info!(
        spawned = ids.len(),
        road_cells = cells.len(),
        "initial population spawned"
    );
    Ok(ids)
}

/// Build one citizen's profile.
fn random_profile<R: Rng>(rng: &mut R, config: &SpawnerConfig, name: String) -> AgentProfile {
    let archetype = Archetype::ALL
        .get(rng.random_range(0..Archetype::ALL.len()))
        .copied()
        .unwrap_or(Archetype::Wanderer);
    let low = config.min_balance.min(config.max_balance);
    let high = config.min_balance.max(config.max_balance);
    let balance = Decimal::from(rng.random_range(low..=high));

    let mut profile =
        AgentProfile::new(name, archetype, Personality::random(rng)).with_balance(balance);
    for item in Item::ALL {
        let quantity = rng.random_range(0..=config.max_starting_items);
        if quantity > 0 {
            profile = profile.with_item(item, quantity);
        }
    }
    profile
}

/// Pick `count` distinct names, topping up with numbered names when the
/// pool is exhausted.
fn pick_unique_names<R: Rng>(rng: &mut R, count: u32) -> Vec<String> {
    let mut available: Vec<&str> = NAME_POOL.to_vec();
    let mut taken = BTreeSet::new();
    let mut names = Vec::new();
    for _ in 0..count {
        let name = if available.is_empty() {
            let mut suffix: u32 = rng.random_range(1000..10_000);
            while taken.contains(&format!("Citizen-{suffix}")) {
                suffix = suffix.wrapping_add(1);
            }
            format!("Citizen-{suffix}")
        } else {
            let idx = rng.random_range(0..available.len());
            String::from(available.swap_remove(idx))
        };
        taken.insert(name.clone());
        names.push(name);
    }
    names
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
