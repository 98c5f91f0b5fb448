/*!
 * Process Types
 * Simulated process record and its scheduling bookkeeping
 */

use crate::core::types::{Pid, SimTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Submitted, waiting for its arrival time
    Pending,
    /// Admitted and sitting in the ready queue
    Ready,
    /// Currently dispatched
    Running,
    /// Ran for its full burst time
    Terminated,
}

/// A simulated process
///
/// Identity (`pid`, `arrival_time`, `burst_time`) is fixed at construction.
/// The remaining fields are bookkeeping mutated by the scheduler only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub pid: Pid,
    pub arrival_time: SimTime,
    pub burst_time: SimTime,
    pub state: ProcessState,
    pub admitted_time: Option<SimTime>,
    pub last_preempted: Option<SimTime>,
    pub waiting_time: SimTime,
    pub runtime: SimTime,
    pub terminated_time: Option<SimTime>,

    // Submission order, breaks arrival-time ties
    #[serde(skip)]
    pub(crate) seq: u64,
}

impl Process {
    pub fn new(pid: Pid, arrival_time: SimTime, burst_time: SimTime) -> Self {
        Self {
            pid,
            arrival_time,
            burst_time,
            state: ProcessState::Pending,
            admitted_time: None,
            last_preempted: None,
            waiting_time: SimTime::ZERO,
            runtime: SimTime::ZERO,
            terminated_time: None,
            seq: 0,
        }
    }

    /// Ordering key for the pending-arrivals set
    #[inline]
    pub fn arrival_key(&self) -> (SimTime, u64) {
        (self.arrival_time, self.seq)
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated_time.is_some()
    }

    /// CPU time still owed to this process
    pub fn remaining(&self) -> SimTime {
        self.burst_time - self.runtime
    }

    /// `terminated_time - admitted_time`, once terminated
    pub fn turnaround_time(&self) -> Option<SimTime> {
        match (self.terminated_time, self.admitted_time) {
            (Some(done), Some(admitted)) => Some(done - admitted),
            _ => None,
        }
    }

    pub fn summary(&self) -> ProcessSummary {
        ProcessSummary {
            pid: self.pid,
            arrival_time: self.arrival_time,
            burst_time: self.burst_time,
            state: self.state,
            runtime: self.runtime,
            waiting_time: self.waiting_time,
            admitted_time: self.admitted_time,
            terminated_time: self.terminated_time,
            turnaround_time: self.turnaround_time(),
        }
    }

    // --- lifecycle transitions, driven by the scheduler ---

    pub(crate) fn admit(&mut self, clock: SimTime) {
        debug_assert_eq!(self.state, ProcessState::Pending, "process {} admitted twice", self.pid);
        debug_assert!(self.arrival_time <= clock);

        self.state = ProcessState::Ready;
        self.admitted_time = Some(clock);
        self.last_preempted = Some(clock);
        self.waiting_time = clock - self.arrival_time;
        self.runtime = SimTime::ZERO;
    }

    /// Charge the time spent in the ready queue since the last event
    pub(crate) fn dispatch(&mut self, clock: SimTime) {
        debug_assert_eq!(self.state, ProcessState::Ready);

        let since = self.last_preempted.unwrap_or(clock);
        self.waiting_time += clock - since;
        self.state = ProcessState::Running;
    }

    pub(crate) fn run_tick(&mut self) {
        debug_assert!(self.runtime < self.burst_time, "process {} overran its burst", self.pid);
        self.runtime += SimTime::TICK;
    }

    pub(crate) fn preempt(&mut self, clock: SimTime) {
        self.state = ProcessState::Ready;
        self.last_preempted = Some(clock);
    }

    pub(crate) fn terminate(&mut self, clock: SimTime) {
        debug_assert_eq!(self.runtime, self.burst_time);

        self.state = ProcessState::Terminated;
        self.terminated_time = Some(clock);
        self.last_preempted = Some(clock);
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PID:          {}", self.pid)?;
        writeln!(f, "Burst Time:   {}", self.burst_time)?;
        write!(f, "Arrival Time: {}", self.arrival_time)?;
        if let Some(terminated) = self.terminated_time {
            writeln!(f)?;
            writeln!(f, "Total Runtime: {}", self.runtime)?;
            write!(f, "Terminated:    {}", terminated)?;
        }
        Ok(())
    }
}

/// Read-only view of a process for reporting and snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub pid: Pid,
    pub arrival_time: SimTime,
    pub burst_time: SimTime,
    pub state: ProcessState,
    pub runtime: SimTime,
    pub waiting_time: SimTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admitted_time: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminated_time: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turnaround_time: Option<SimTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(n: u64) -> SimTime {
        SimTime::from_units(n)
    }

    #[test]
    fn test_new_process_is_pending() {
        let p = Process::new(1, units(2), units(5));
        assert_eq!(p.state, ProcessState::Pending);
        assert_eq!(p.runtime, SimTime::ZERO);
        assert_eq!(p.remaining(), units(5));
        assert!(p.admitted_time.is_none());
        assert!(!p.is_terminated());
    }

    #[test]
    fn test_admission_records_initial_wait() {
        let mut p = Process::new(1, units(2), units(5));
        p.admit(SimTime::from_ticks(23));

        assert_eq!(p.state, ProcessState::Ready);
        assert_eq!(p.admitted_time, Some(SimTime::from_ticks(23)));
        assert_eq!(p.last_preempted, Some(SimTime::from_ticks(23)));
        assert_eq!(p.waiting_time, SimTime::from_ticks(3));
    }

    #[test]
    fn test_dispatch_accumulates_waiting() {
        let mut p = Process::new(1, units(0), units(5));
        p.admit(units(0));
        p.dispatch(units(2));
        assert_eq!(p.waiting_time, units(2));

        p.run_tick();
        p.preempt(SimTime::from_ticks(21));
        p.dispatch(SimTime::from_ticks(30));
        assert_eq!(p.waiting_time, SimTime::from_ticks(29));
        assert_eq!(p.runtime, SimTime::TICK);
    }

    #[test]
    fn test_turnaround_after_termination() {
        let mut p = Process::new(7, units(1), SimTime::TICK);
        p.admit(units(1));
        p.dispatch(units(1));
        p.run_tick();
        p.terminate(SimTime::from_ticks(11));

        assert!(p.is_terminated());
        assert_eq!(p.turnaround_time(), Some(SimTime::TICK));
        let summary = p.summary();
        assert_eq!(summary.state, ProcessState::Terminated);
        assert_eq!(summary.terminated_time, Some(SimTime::from_ticks(11)));
    }

    #[test]
    fn test_display_includes_meta_when_terminated() {
        let mut p = Process::new(3, units(0), SimTime::TICK);
        assert!(!p.to_string().contains("Terminated"));

        p.admit(units(0));
        p.dispatch(units(0));
        p.run_tick();
        p.terminate(SimTime::TICK);
        let text = p.to_string();
        assert!(text.starts_with("PID:          3"));
        assert!(text.contains("Terminated:    0.1"));
    }
}
