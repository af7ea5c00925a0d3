//! Simulation clock.
//!
//! The tick counter and elapsed simulated seconds are the only stored
//! state. Hour of day is derived from elapsed time on demand, never stored.

use crate::config::WorldConfig;

/// Hours in one in-game day.
const HOURS_PER_DAY: f64 = 24.0;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid time configuration.
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Tick counter plus simulated time.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    tick: u64,
    elapsed: f64,
    start_hour: f64,
    seconds_per_hour: f64,
}

impl SimulationClock {
    /// Create a clock at tick 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `seconds_per_hour` is not a
    /// positive finite number or `start_hour` is not finite.
    pub fn new(config: &WorldConfig) -> Result<Self, ClockError> {
        if !config.seconds_per_hour.is_finite() || config.seconds_per_hour <= 0.0 {
            return Err(ClockError::InvalidConfig {
                reason: "seconds_per_hour must be positive".to_owned(),
            });
        }
        if !config.start_hour.is_finite() {
            return Err(ClockError::InvalidConfig {
                reason: "start_hour must be finite".to_owned(),
            });
        }
        Ok(Self {
            tick: 0,
            elapsed: 0.0,
            start_hour: config.start_hour.rem_euclid(HOURS_PER_DAY),
            seconds_per_hour: config.seconds_per_hour,
        })
    }

    /// Advance by one tick of `dt` simulated seconds. Returns the new tick
    /// number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self, dt: f64) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        Ok(self.tick)
    }

    /// Number of completed ticks.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds since start.
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Hour of day in `[0, 24)`.
    pub fn hour_of_day(&self) -> f64 {
        (self.start_hour + self.elapsed / self.seconds_per_hour).rem_euclid(HOURS_PER_DAY)
    }

    /// Whole days elapsed since start.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn day(&self) -> u64 {
        ((self.start_hour + self.elapsed / self.seconds_per_hour) / HOURS_PER_DAY).floor() as u64
    }
}
