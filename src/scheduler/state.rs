/*!
 * Scheduler State
 * State machine states, transition events and per-tick snapshots
 */

use crate::core::types::{Pid, SimTime};
use crate::process::ProcessSummary;
use serde::{Deserialize, Serialize};

/// Scheduler state between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SchedulerState {
    /// Nothing running
    Idle,
    /// A process is executing its quantum in micro-steps
    Dispatching {
        pid: Pid,
        quantum: SimTime,
        ran: SimTime,
    },
    /// Stopped externally; no further ticks
    Stopped,
}

/// Transition produced while executing a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedEvent {
    Admitted { pid: Pid, at: SimTime },
    Idle { at: SimTime },
    Dispatched { pid: Pid, quantum: SimTime, at: SimTime },
    Ran { pid: Pid, runtime: SimTime },
    Preempted { pid: Pid, runtime: SimTime, at: SimTime },
    Terminated { pid: Pid, at: SimTime },
}

/// Per-run scheduler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub idle_ticks: u64,
    pub dispatches: u64,
    pub preemptions: u64,
    pub terminations: u64,
}

impl SchedulerStats {
    /// Fraction of ticks the CPU spent running a process
    pub fn utilization(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        (self.ticks - self.idle_ticks) as f64 / self.ticks as f64
    }
}

/// Observable view of the scheduler after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub clock: SimTime,
    pub state: SchedulerState,
    pub running: Option<ProcessSummary>,
    pub ready: Vec<ProcessSummary>,
    pub pending: usize,
    pub terminated: usize,
    pub events: Vec<SchedEvent>,
}

impl TickSnapshot {
    /// No process holds the CPU
    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }
}
