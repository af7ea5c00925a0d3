//! Configuration loading and typed config structures for the Civitas
//! simulation.
//!
//! The canonical configuration lives in `civitas-config.yaml` at the project
//! root. Every section and every key has a default, so a partial file (or no
//! file at all) yields a runnable simulation. Sections that configure a
//! single citizen reuse the structs from `civitas-agents`; navigation reuses
//! [`NavigatorConfig`] from `civitas-world`.

use std::path::Path;

use civitas_agents::{
    AgentConfig, BehaviorConfig, MemoryConfig, NeedsConfig, SocialConfig, TradeConfig,
};
use civitas_world::NavigatorConfig;
use serde::Deserialize;

/// Environment variable overriding `world.seed`.
pub const SEED_ENV: &str = "CIVITAS_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// `CIVITAS_SEED` is set but is not an unsigned integer.
    #[error("invalid CIVITAS_SEED value {value:?}")]
    InvalidSeed {
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `civitas-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed, timing, and run length.
    pub world: WorldConfig,
    /// Need declarations and the critical threshold.
    pub needs: NeedsConfig,
    /// Event log and relationship decay.
    pub memory: MemoryConfig,
    /// Pairwise conversations.
    pub social: SocialConfig,
    /// Trade evaluation and proposal limits.
    pub trade: TradeConfig,
    /// Citizen behavior tree thresholds.
    pub behavior: BehaviorConfig,
    /// Perception radius.
    pub perception: PerceptionConfig,
    /// Speed cap and collision avoidance.
    pub movement: MovementConfig,
    /// Pathfinding options and flow-field cache.
    pub navigation: NavigatorConfig,
    /// Aggregate statistics.
    pub metrics: MetricsConfig,
    /// Initial population.
    pub spawner: SpawnerConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `CIVITAS_SEED`, when set, overrides `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidSeed`] for a malformed seed override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::InvalidSeed`] for a malformed seed override.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSeed`] if `CIVITAS_SEED` is not a `u64`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(SEED_ENV) {
            match value.trim().parse() {
                Ok(seed) => self.world.seed = seed,
                Err(_) => return Err(ConfigError::InvalidSeed { value }),
            }
        }
        Ok(())
    }

    /// The per-agent slice of this configuration.
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            needs: self.needs.clone(),
            memory: self.memory.clone(),
            behavior: self.behavior.clone(),
            max_speed: self.movement.max_speed,
        }
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    pub name: String,
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Simulated seconds advanced by each tick.
    pub tick_seconds: f64,
    /// Ticks to run before the engine stops. Zero runs until interrupted.
    pub max_ticks: u64,
    /// Real-time milliseconds between ticks in the engine loop.
    pub tick_interval_ms: u64,
    /// Hour of day at simulation start.
    pub start_hour: f64,
    /// Simulated seconds in one in-game hour.
    pub seconds_per_hour: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: "Civitas".to_owned(),
            seed: 42,
            tick_seconds: 1.0,
            max_ticks: 0,
            tick_interval_ms: 100,
            start_hour: 7.0,
            seconds_per_hour: 60.0,
        }
    }
}

/// Perception configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Radius for an agent of average extraversion. The effective radius is
    /// `base_radius * (0.5 + extraversion)`.
    pub base_radius: f64,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self { base_radius: 6.0 }
    }
}

/// Movement and collision avoidance configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Walking speed cap in cells per simulated second.
    pub max_speed: f64,
    /// Neighbors closer than this push each other apart.
    pub personal_space: f64,
    /// Repulsion speed at zero distance.
    pub avoidance_strength: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_speed: 1.4,
            personal_space: 0.8,
            avoidance_strength: 1.0,
        }
    }
}

/// Aggregate statistics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Recompute population statistics every N ticks.
    pub refresh_every_ticks: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            refresh_every_ticks: 10,
        }
    }
}

/// Initial population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Number of agents spawned at start.
    pub population: u32,
    /// Lowest starting balance, in whole currency units.
    pub min_balance: u32,
    /// Highest starting balance, in whole currency units.
    pub max_balance: u32,
    /// Most units of each item an agent may start with.
    pub max_starting_items: u32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            population: 40,
            min_balance: 20,
            max_balance: 120,
            max_starting_items: 2,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse_without_env(yaml: &str) -> SimulationConfig {
        serde_yml::from_str(yaml).unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.spawner.population, 40);
        assert_eq!(config.needs.needs.len(), 4);
        assert!(config.spawner.min_balance <= config.spawner.max_balance);
        assert!(config.world.seconds_per_hour > 0.0);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = parse_without_env(
            r"
world:
  seed: 7
trade:
  hostile_fraction: 1.5
",
        );
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.name, "Civitas");
        assert!((config.trade.hostile_fraction - 1.5).abs() < f64::EPSILON);
        assert!((config.trade.neutral_fraction - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.metrics, MetricsConfig::default());
    }

    #[test]
    fn parse_full_sections() {
        let config = parse_without_env(
            r"
world:
  name: Testville
  tick_seconds: 0.5
  max_ticks: 100
perception:
  base_radius: 4.0
movement:
  max_speed: 2.0
navigation:
  allow_diagonal: false
  metric: manhattan
spawner:
  population: 5
logging:
  level: debug
  json: true
",
        );
        assert_eq!(config.world.name, "Testville");
        assert_eq!(config.world.max_ticks, 100);
        assert!(!config.navigation.allow_diagonal);
        assert_eq!(config.spawner.population, 5);
        assert!(config.logging.json);
        assert!((config.agent_config().max_speed - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = parse_without_env(include_str!("../../../civitas-config.yaml"));
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result: Result<SimulationConfig, _> = serde_yml::from_str("world: [unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/civitas-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
