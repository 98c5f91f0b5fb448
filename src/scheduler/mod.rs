/*!
 * Round-Robin Scheduler
 * Simulation engine with a dynamically recomputed time quantum
 */

use crate::core::types::SimTime;
use crate::process::{Process, ProcessSummary};
use serde::{Deserialize, Serialize};
use tracing::info;

mod operations;
pub mod quantum;
pub mod queues;
pub mod state;

pub use quantum::QuantumMethod;
pub use queues::{PendingArrivals, ReadyQueue};
pub use state::{SchedEvent, SchedulerState, SchedulerStats, TickSnapshot};

/// Process currently holding the CPU
#[derive(Debug, Clone)]
struct Dispatch {
    process: Process,
    quantum: SimTime,
    ran: SimTime,
}

/// Round-robin simulation engine
///
/// Owns the clock and every process of a run. Each call to [`Scheduler::tick`]
/// advances the clock by exactly one tick.
#[derive(Debug)]
pub struct Scheduler {
    method: QuantumMethod,
    clock: SimTime,
    pending: PendingArrivals,
    ready: ReadyQueue,
    running: Option<Dispatch>,
    terminated: Vec<Process>,
    stats: SchedulerStats,
    stopped: bool,
}

/// Everything left once a scheduler is done
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerOutcome {
    pub clock: SimTime,
    pub terminated: Vec<Process>,
    pub unfinished: Vec<ProcessSummary>,
    pub stats: SchedulerStats,
}

impl Scheduler {
    /// Create an empty scheduler
    pub fn new(method: QuantumMethod) -> Self {
        Self::with_pending(method, PendingArrivals::new())
    }

    /// Create a scheduler over an already ordered pending set
    pub fn with_pending(method: QuantumMethod, pending: PendingArrivals) -> Self {
        info!(
            method = %method,
            processes = pending.len(),
            "Scheduler initialized"
        );

        Self {
            method,
            clock: SimTime::ZERO,
            pending,
            ready: ReadyQueue::new(),
            running: None,
            terminated: Vec::new(),
            stats: SchedulerStats::default(),
            stopped: false,
        }
    }

    /// Create a scheduler from processes in submission order
    pub fn from_processes(method: QuantumMethod, processes: Vec<Process>) -> Self {
        Self::with_pending(method, processes.into_iter().collect())
    }

    pub fn method(&self) -> QuantumMethod {
        self.method
    }

    pub fn clock(&self) -> SimTime {
        self.clock
    }

    pub fn pending(&self) -> &PendingArrivals {
        &self.pending
    }

    pub fn ready(&self) -> &ReadyQueue {
        &self.ready
    }

    pub fn running(&self) -> Option<&Process> {
        self.running.as_ref().map(|d| &d.process)
    }

    /// Terminated processes in termination order
    pub fn terminated(&self) -> &[Process] {
        &self.terminated
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn state(&self) -> SchedulerState {
        if self.stopped {
            return SchedulerState::Stopped;
        }
        match &self.running {
            Some(d) => SchedulerState::Dispatching {
                pid: d.process.pid,
                quantum: d.quantum,
                ran: d.ran,
            },
            None => SchedulerState::Idle,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// True once nothing is pending, ready or running
    pub fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.ready.is_empty() && self.running.is_none()
    }

    /// Consume the scheduler, splitting finished from unfinished work
    pub fn into_outcome(self) -> SchedulerOutcome {
        let mut unfinished = Vec::new();
        if let Some(d) = &self.running {
            unfinished.push(d.process.summary());
        }
        unfinished.extend(self.ready.summaries());
        unfinished.extend(self.pending.summaries());

        SchedulerOutcome {
            clock: self.clock,
            terminated: self.terminated,
            unfinished,
            stats: self.stats,
        }
    }
}
