//! Headless engine binary for the Civitas city simulation.
//!
//! Loads configuration, builds the demo city, spawns the starting
//! population, and runs the paced tick loop until the tick limit is reached
//! or Ctrl-C is pressed.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `CIVITAS_CONFIG` (default
//!    `civitas-config.yaml`) and apply environment overrides
//! 2. Initialize structured logging (tracing)
//! 3. Build the demo city layout
//! 4. Create the simulation and spawn the starting population
//! 5. Run the tick loop
//! 6. Log final statistics

mod city;
mod error;
mod runner;
mod spawner;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use civitas_core::config::LoggingConfig;
use civitas_core::{Simulation, SimulationConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::runner::RunLimits;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "CIVITAS_CONFIG";
/// Configuration file used when `CIVITAS_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "civitas-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself
/// fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, source) = load_config().context("loading configuration")?;
    init_logging(&config.logging);

    info!(
        world_name = %config.world.name,
        seed = config.world.seed,
        source = %source.display(),
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        "civitas-engine starting"
    );

    let layout = city::demo_city().map_err(EngineError::from)?;
    let mut sim =
        Simulation::new(config.clone(), Arc::new(layout)).map_err(EngineError::from)?;

    // Population draws use a stream separate from the simulation's own.
    let mut spawn_rng = StdRng::seed_from_u64(config.world.seed.wrapping_add(1));
    spawner::spawn_population(&mut sim, &config.spawner, &mut spawn_rng)?;
    sim.refresh_stats();

    let limits = RunLimits {
        tick_seconds: config.world.tick_seconds,
        max_ticks: config.world.max_ticks,
        interval: Duration::from_millis(config.world.tick_interval_ms),
    };
    let result = runner::run(&mut sim, limits, shutdown_signal()).await?;
    runner::log_run_end(&result, &mut sim);

    info!("civitas-engine shutdown complete");
    Ok(())
}

/// Load the configuration file, falling back to defaults when it does not
/// exist. Environment overrides are applied exactly once on either branch.
/// Returns the config and the path that was consulted.
fn load_config() -> Result<(SimulationConfig, PathBuf), EngineError> {
    let path = std::env::var_os(CONFIG_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = load_config_from(&path)?;
    Ok((config, path))
}

fn load_config_from(path: &Path) -> Result<SimulationConfig, EngineError> {
    let config = if path.exists() {
        SimulationConfig::from_file(path)?
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides()?;
        config
    };
    Ok(config)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed the loop runs
/// until its tick limit.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let path = Path::new("/nonexistent/civitas-config.yaml");
        let config = load_config_from(path).unwrap();
        let mut expected = SimulationConfig::default();
        expected.apply_env_overrides().unwrap();
        assert_eq!(config, expected);
    }

    #[test]
    fn file_values_are_loaded() {
        let path = std::env::temp_dir().join(format!(
            "civitas-engine-config-{}.yaml",
            std::process::id()
        ));
        std::fs::write(&path, "world:\n  name: Fileville\nspawner:\n  population: 3\n").unwrap();
        let config = load_config_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.world.name, "Fileville");
        assert_eq!(config.spawner.population, 3);
    }
}
