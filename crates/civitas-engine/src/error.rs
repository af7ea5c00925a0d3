//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the run
//! loop so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: civitas_core::ConfigError,
    },

    /// Building the city layout failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: civitas_world::WorldError,
    },

    /// The simulation rejected an operation.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: civitas_core::SimulationError,
    },

    /// Agent spawning failed.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },
}
