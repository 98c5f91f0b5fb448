/*!
 * Simulation Configuration
 *
 * Pacing and stopping policy of a run, with presets and environment overrides.
 */

use crate::core::errors::SimulationError;
use crate::core::limits::{DEFAULT_MAX_TICKS, DEFAULT_RESULTS_FILE, DEFAULT_TICK_DELAY};
use crate::core::types::SimResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Tick delay in milliseconds
pub const TICK_DELAY_ENV: &str = "RR_SIM_TICK_DELAY_MS";
/// Maximum number of ticks per run
pub const MAX_TICKS_ENV: &str = "RR_SIM_MAX_TICKS";
/// Destination of the CSV export
pub const RESULTS_PATH_ENV: &str = "RR_SIM_RESULTS_PATH";

/// Configuration of a simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Wall-clock delay between ticks (default: 50ms)
    pub tick_delay: Duration,

    /// Stop after this many ticks, if set
    pub max_ticks: Option<u64>,

    /// End the run on its own once every process has terminated
    pub stop_when_drained: bool,

    /// Where the CLI writes the terminated-process export
    pub results_path: PathBuf,
}

impl SimulationConfig {
    /// Animated run that keeps ticking until stopped (default)
    pub fn realtime() -> Self {
        Self {
            tick_delay: DEFAULT_TICK_DELAY,
            max_ticks: None,
            stop_when_drained: false,
            results_path: PathBuf::from(DEFAULT_RESULTS_FILE),
        }
    }

    /// Unpaced run that ends as soon as the workload drains (batch and testing)
    pub fn instant() -> Self {
        Self {
            tick_delay: Duration::ZERO,
            max_ticks: Some(DEFAULT_MAX_TICKS),
            stop_when_drained: true,
            results_path: PathBuf::from(DEFAULT_RESULTS_FILE),
        }
    }

    /// Default configuration with `RR_SIM_*` environment overrides
    pub fn from_env() -> SimResult<Self> {
        Self::realtime().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (environment, tests)
    pub fn with_overrides<F>(mut self, lookup: F) -> SimResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(TICK_DELAY_ENV) {
            let millis = parse_u64(TICK_DELAY_ENV, &value)?;
            self.tick_delay = Duration::from_millis(millis);
        }
        if let Some(value) = lookup(MAX_TICKS_ENV) {
            self.max_ticks = Some(parse_u64(MAX_TICKS_ENV, &value)?);
        }
        if let Some(value) = lookup(RESULTS_PATH_ENV) {
            if value.trim().is_empty() {
                return Err(SimulationError::Configuration(format!(
                    "{} must not be empty",
                    RESULTS_PATH_ENV
                )));
            }
            self.results_path = PathBuf::from(value);
        }
        Ok(self)
    }

    pub fn with_tick_delay(mut self, delay: Duration) -> Self {
        self.tick_delay = delay;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn with_stop_when_drained(mut self, stop: bool) -> Self {
        self.stop_when_drained = stop;
        self
    }

    pub fn with_results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = path.into();
        self
    }

    /// Whether a run under this configuration ends without an explicit stop
    pub fn is_self_terminating(&self) -> bool {
        self.stop_when_drained || self.max_ticks.is_some()
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::realtime()
    }
}

fn parse_u64(key: &str, value: &str) -> SimResult<u64> {
    value.trim().parse().map_err(|_| {
        SimulationError::Configuration(format!(
            "{} must be a non-negative integer, got '{}'",
            key, value
        ))
    })
}
