//! Paced simulation loop with bounded run length and Ctrl-C shutdown.

use std::future::Future;
use std::time::Duration;

use civitas_core::{Simulation, TickSummary};
use tracing::{info, warn};

use crate::error::EngineError;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// `max_ticks` ticks completed.
    MaxTicksReached,
    /// The shutdown signal fired.
    Interrupted,
    /// Every agent has been removed.
    Empty,
}

/// Outcome of [`run`].
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Why the loop stopped.
    pub end_reason: EndReason,
    /// Summary of the last completed tick, if any.
    pub final_summary: Option<TickSummary>,
    /// Ticks executed by this call.
    pub total_ticks: u64,
}

/// Pacing and limits for [`run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunLimits {
    /// Simulated seconds per tick.
    pub tick_seconds: f64,
    /// Stop after this many ticks; 0 runs until interrupted.
    pub max_ticks: u64,
    /// Wall-clock pause between ticks.
    pub interval: Duration,
}

/// Tick `sim` until a limit is hit or `shutdown` resolves.
///
/// # Errors
///
/// Returns [`EngineError::Simulation`] if a tick fails.
pub async fn run<S>(
    sim: &mut Simulation,
    limits: RunLimits,
    shutdown: S,
) -> Result<RunResult, EngineError>
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut last_summary = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = limits.max_ticks,
        tick_seconds = limits.tick_seconds,
        interval_ms = u64::try_from(limits.interval.as_millis()).unwrap_or(u64::MAX),
        population = sim.population(),
        "entering tick loop"
    );

    loop {
        if sim.population() == 0 {
            info!("no agents left");
            return Ok(finish(EndReason::Empty, last_summary, total_ticks));
        }

        let summary = sim.update(limits.tick_seconds)?;
        total_ticks = total_ticks.saturating_add(1);

        if limits.max_ticks > 0 && summary.tick >= limits.max_ticks {
            info!(tick = summary.tick, max_ticks = limits.max_ticks, "tick limit reached");
            return Ok(finish(EndReason::MaxTicksReached, Some(summary), total_ticks));
        }
        last_summary = Some(summary);

        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!("shutdown requested");
                return Ok(finish(EndReason::Interrupted, last_summary, total_ticks));
            }
            () = tokio::time::sleep(limits.interval) => {}
        }
    }
}

fn finish(end_reason: EndReason, final_summary: Option<TickSummary>, total_ticks: u64) -> RunResult {
    RunResult {
        end_reason,
        final_summary,
        total_ticks,
    }
}

/// Log the end of a run together with final statistics.
pub fn log_run_end(result: &RunResult, sim: &mut Simulation) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "simulation ended"
    );
    if result.final_summary.is_none() {
        warn!("simulation ended with no ticks executed");
    }

    let stats = sim.refresh_stats();
    info!(
        population = stats.population,
        gini = stats.gini,
        total_wealth = %stats.total_wealth,
        interactions = stats.interactions,
        trades_proposed = stats.trades_proposed,
        trades_accepted = stats.trades_accepted,
        trades_rejected = stats.trades_rejected,
        trades_expired = stats.trades_expired,
        "final statistics"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use civitas_core::SimulationConfig;
    use civitas_types::{AgentProfile, Archetype, Personality};
    use civitas_world::{CityLayout, WalkableGrid};

    use super::*;

    fn sim_with_one() -> Simulation {
        let layout = Arc::new(CityLayout::new(WalkableGrid::open(8, 8).unwrap()));
        let mut sim = Simulation::new(SimulationConfig::default(), layout).unwrap();
        let profile = AgentProfile::new("solo", Archetype::Wanderer, Personality::balanced());
        sim.spawn(&profile, civitas_types::Vec2::new(2.5, 2.5)).unwrap();
        sim
    }

    fn limits(max_ticks: u64) -> RunLimits {
        RunLimits {
            tick_seconds: 1.0,
            max_ticks,
            interval: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn stops_at_tick_limit() {
        let mut sim = sim_with_one();
        let result = run(&mut sim, limits(5), std::future::pending()).await.unwrap();
        assert_eq!(result.end_reason, EndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(sim.clock().tick(), 5);
    }

    #[tokio::test]
    async fn stops_on_shutdown() {
        let mut sim = sim_with_one();
        let result = run(&mut sim, limits(0), async {}).await.unwrap();
        assert_eq!(result.end_reason, EndReason::Interrupted);
        assert_eq!(result.total_ticks, 1);
    }

    #[tokio::test]
    async fn empty_simulation_ends_immediately() {
        let layout = Arc::new(CityLayout::new(WalkableGrid::open(4, 4).unwrap()));
        let mut sim = Simulation::new(SimulationConfig::default(), layout).unwrap();
        let result = run(&mut sim, limits(10), std::future::pending()).await.unwrap();
        assert_eq!(result.end_reason, EndReason::Empty);
        assert_eq!(result.total_ticks, 0);
    }
}
