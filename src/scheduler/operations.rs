/*!
 * Scheduler Core Operations
 * Admission, dispatch, micro-step execution, preemption and termination
 */

use super::state::{SchedEvent, TickSnapshot};
use super::{Dispatch, Scheduler};
use crate::core::errors::SimulationError;
use crate::core::types::{Pid, SimResult, SimTime};
use crate::process::Process;
use tracing::{debug, info};

impl Scheduler {
    /// Add a process to the pending set, before or during a run
    pub fn add(&mut self, process: Process) -> SimResult<()> {
        if self.stopped {
            return Err(SimulationError::invalid_state(
                "cannot add processes to a stopped scheduler",
            ));
        }
        if self.contains(process.pid) {
            return Err(SimulationError::DuplicatePid(process.pid));
        }

        debug!(
            pid = process.pid,
            arrival = %process.arrival_time,
            burst = %process.burst_time,
            "Process added to pending arrivals"
        );
        self.pending.insert(process);
        Ok(())
    }

    /// Whether `pid` is known to this scheduler in any state
    pub fn contains(&self, pid: Pid) -> bool {
        self.pending.contains(pid)
            || self.ready.contains(pid)
            || self.running.as_ref().is_some_and(|d| d.process.pid == pid)
            || self.terminated.iter().any(|p| p.pid == pid)
    }

    /// Move every process that has arrived by the current clock into the
    /// ready queue. Returns the number of processes admitted.
    pub fn admit_new_arrivals(&mut self) -> usize {
        self.admit(&mut Vec::new())
    }

    fn admit(&mut self, events: &mut Vec<SchedEvent>) -> usize {
        let clock = self.clock;
        let mut admitted = 0;

        while let Some(mut process) = self.pending.pop_arrived(clock) {
            process.admit(clock);
            debug!(pid = process.pid, clock = %clock, wait = %process.waiting_time, "Process admitted");
            events.push(SchedEvent::Admitted {
                pid: process.pid,
                at: clock,
            });
            self.ready.push_back(process);
            admitted += 1;
        }

        admitted
    }

    /// Execute one clock tick
    ///
    /// Dispatches the head of the ready queue if the CPU is idle, runs the
    /// dispatched process for one micro-step, then settles termination or
    /// preemption at the new clock value.
    pub fn tick(&mut self) -> SimResult<Vec<SchedEvent>> {
        if self.stopped {
            return Err(SimulationError::invalid_state("scheduler is stopped"));
        }

        let mut events = Vec::new();
        self.stats.ticks += 1;

        if self.running.is_none() {
            self.admit(&mut events);

            let head_arrived = self
                .ready
                .front()
                .is_some_and(|p| p.arrival_time <= self.clock);
            if !head_arrived {
                events.push(SchedEvent::Idle { at: self.clock });
                self.stats.idle_ticks += 1;
                self.clock += SimTime::TICK;
                return Ok(events);
            }

            self.dispatch_next(&mut events)?;
        }

        self.step_running(&mut events);
        Ok(events)
    }

    fn dispatch_next(&mut self, events: &mut Vec<SchedEvent>) -> SimResult<()> {
        // Quantum base is the whole ready queue, including the head
        let quantum = self.method.quantum(self.ready.burst_times())?;
        let mut process = self
            .ready
            .pop_front()
            .ok_or(SimulationError::EmptyReadyQueue)?;

        process.dispatch(self.clock);
        self.stats.dispatches += 1;

        debug!(
            pid = process.pid,
            clock = %self.clock,
            quantum = %quantum,
            remaining = %process.remaining(),
            "Process dispatched"
        );
        events.push(SchedEvent::Dispatched {
            pid: process.pid,
            quantum,
            at: self.clock,
        });

        self.running = Some(Dispatch {
            process,
            quantum,
            ran: SimTime::ZERO,
        });
        Ok(())
    }

    fn step_running(&mut self, events: &mut Vec<SchedEvent>) {
        let Some(mut dispatch) = self.running.take() else {
            return;
        };

        dispatch.process.run_tick();
        dispatch.ran += SimTime::TICK;
        events.push(SchedEvent::Ran {
            pid: dispatch.process.pid,
            runtime: dispatch.process.runtime,
        });

        // Arrivals during the micro-step queue up behind the running process
        self.admit(events);
        self.clock += SimTime::TICK;

        self.settle(dispatch, events);
    }

    fn settle(&mut self, dispatch: Dispatch, events: &mut Vec<SchedEvent>) {
        let clock = self.clock;
        let Dispatch {
            mut process,
            quantum,
            ran,
        } = dispatch;

        if process.runtime == process.burst_time {
            process.terminate(clock);
            self.stats.terminations += 1;
            debug!(pid = process.pid, clock = %clock, wait = %process.waiting_time, "Process terminated");
            events.push(SchedEvent::Terminated {
                pid: process.pid,
                at: clock,
            });
            self.terminated.push(process);
        } else if ran >= quantum {
            process.preempt(clock);
            self.stats.preemptions += 1;
            debug!(pid = process.pid, clock = %clock, runtime = %process.runtime, "Process preempted");
            events.push(SchedEvent::Preempted {
                pid: process.pid,
                runtime: process.runtime,
                at: clock,
            });
            self.ready.push_back(process);
        } else {
            self.running = Some(Dispatch {
                process,
                quantum,
                ran,
            });
        }
    }

    /// Tick until every process has terminated or `max_ticks` elapse
    ///
    /// Returns the number of ticks executed.
    pub fn run_until_drained(&mut self, max_ticks: u64) -> SimResult<u64> {
        let mut ticks = 0;
        while !self.is_drained() && ticks < max_ticks {
            self.tick()?;
            ticks += 1;
        }

        info!(
            clock = %self.clock,
            ticks,
            terminated = self.terminated.len(),
            drained = self.is_drained(),
            "Scheduler run finished"
        );
        Ok(ticks)
    }

    /// Stop the scheduler; a dispatched process keeps its partial state
    pub fn stop(&mut self) {
        if !self.stopped {
            info!(clock = %self.clock, running = ?self.running().map(|p| p.pid), "Scheduler stopped");
        }
        self.stopped = true;
    }

    /// Snapshot without tick events
    pub fn snapshot(&self) -> TickSnapshot {
        self.snapshot_with(Vec::new())
    }

    pub(crate) fn snapshot_with(&self, events: Vec<SchedEvent>) -> TickSnapshot {
        TickSnapshot {
            clock: self.clock,
            state: self.state(),
            running: self.running().map(Process::summary),
            ready: self.ready.summaries(),
            pending: self.pending.len(),
            terminated: self.terminated.len(),
            events,
        }
    }
}
