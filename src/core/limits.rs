/*!
 * Simulation Limits and Constants
 *
 * Centralized location for clock granularity, pacing defaults and file names.
 */

use std::time::Duration;

// =============================================================================
// CLOCK
// =============================================================================

/// Number of clock ticks per simulated time unit
/// One tick is the 0.1 time-unit micro-step every process runs in
pub const TICKS_PER_UNIT: u64 = 10;

/// Smallest quantum handed to a dispatched process (one tick)
pub const MIN_QUANTUM_TICKS: u64 = 1;

// =============================================================================
// PACING
// =============================================================================

/// Wall-clock delay between ticks for an animated run (50ms)
pub const DEFAULT_TICK_DELAY: Duration = Duration::from_millis(50);

/// Upper bound on ticks for a run that stops on its own (~27.7 simulated hours)
pub const DEFAULT_MAX_TICKS: u64 = 1_000_000;

// =============================================================================
// EXPORT
// =============================================================================

/// Default destination of the terminated-process export
pub const DEFAULT_RESULTS_FILE: &str = "process_meta.csv";

/// Header row of the terminated-process export
pub const RESULTS_HEADER: &str =
    "pid,burst_time,arrival_time,admitted_time,terminated_time,waiting_time,turnaround_time";

/// Thread name of the simulation worker
pub const WORKER_THREAD_NAME: &str = "rr-sim-worker";
