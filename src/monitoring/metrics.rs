/*!
 * Run Metrics
 * Throughput and latency figures computed from terminated processes
 */

use crate::core::errors::SimulationError;
use crate::core::types::SimResult;
use crate::process::Process;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate metrics of a run
///
/// All times are in simulated time units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Mean termination time
    pub throughput: f64,
    /// Mean of `terminated_time - admitted_time`
    pub avg_turnaround_time: f64,
    /// Mean time spent in the ready queue
    pub avg_waiting_time: f64,
    /// Number of terminated processes the means are taken over
    pub completed: usize,
}

impl Metrics {
    /// Compute metrics over a terminated set
    ///
    /// An empty set is rejected rather than yielding NaN. Processes that never
    /// terminated are ignored.
    pub fn from_terminated(processes: &[Process]) -> SimResult<Self> {
        let mut completed = 0usize;
        let mut terminated_sum = 0.0;
        let mut turnaround_sum = 0.0;
        let mut waiting_sum = 0.0;

        for process in processes {
            let (Some(terminated), Some(turnaround)) =
                (process.terminated_time, process.turnaround_time())
            else {
                continue;
            };
            completed += 1;
            terminated_sum += terminated.as_units();
            turnaround_sum += turnaround.as_units();
            waiting_sum += process.waiting_time.as_units();
        }

        if completed == 0 {
            return Err(SimulationError::NoTerminatedProcesses);
        }

        let n = completed as f64;
        Ok(Self {
            throughput: terminated_sum / n,
            avg_turnaround_time: turnaround_sum / n,
            avg_waiting_time: waiting_sum / n,
            completed,
        })
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Throughput           :   {:.4}", self.throughput)?;
        writeln!(f, "Avg. TurnAround Time :   {:.4}", self.avg_turnaround_time)?;
        writeln!(f, "Avg. Waiting Time    :   {:.4}", self.avg_waiting_time)?;
        write!(f, "No latency assumed. So, time to context switch is 0.")
    }
}
