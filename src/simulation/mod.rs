/*!
 * Simulation Context
 *
 * Owns the pending workload between runs and the lifecycle of the worker
 * that executes a run. Presentation layers submit processes, start and stop
 * runs, and observe progress through callbacks or a channel.
 */

pub mod config;
pub mod observer;
mod worker;

pub use config::SimulationConfig;
pub use observer::{ChannelObserver, Observer, SimulationEvent};

use crate::core::errors::SimulationError;
use crate::core::types::{Pid, SimResult, SimTime};
use crate::export::ResultsSink;
use crate::monitoring::Metrics;
use crate::process::{parse_process, Process, ProcessSummary};
use crate::scheduler::{PendingArrivals, QuantumMethod, Scheduler, SchedulerStats, TickSnapshot};
use observer::{CompleteFn, ObserverRegistry, TickFn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};
use worker::{Worker, WorkerCommand};

/// Result of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub method: QuantumMethod,
    pub final_clock: SimTime,
    /// Terminated processes in termination order
    pub terminated: Vec<Process>,
    /// Processes still pending, ready or running when the run ended
    pub unfinished: Vec<ProcessSummary>,
    pub stats: SchedulerStats,
    /// `None` when nothing terminated
    pub metrics: Option<Metrics>,
    /// Ended before every process terminated
    pub stopped_early: bool,
}

impl RunReport {
    /// Export the terminated processes through `sink`
    pub fn export(&self, sink: &mut dyn ResultsSink) -> SimResult<usize> {
        sink.export(&self.terminated)
    }
}

/// Handle to an active run
struct ActiveRun {
    method: QuantumMethod,
    stop: Arc<AtomicBool>,
    commands: flume::Sender<WorkerCommand>,
    /// Context-side receiver for commands the worker never read
    unread: flume::Receiver<WorkerCommand>,
    handle: JoinHandle<RunReport>,
}

impl ActiveRun {
    /// Wait for the worker, returning its report and any submissions it left queued
    fn join(self) -> SimResult<(RunReport, Vec<Process>)> {
        let report = self
            .handle
            .join()
            .map_err(|_| SimulationError::WorkerPanicked)?;

        let leftover = self
            .unread
            .try_iter()
            .map(|WorkerCommand::Submit(process)| process)
            .collect();
        Ok((report, leftover))
    }
}

/// Simulation session: pending workload, active run and observers
pub struct SimulationContext {
    config: SimulationConfig,
    pending: PendingArrivals,
    /// Pids submitted since the last run ended, including ones handed to the worker
    known_pids: HashSet<Pid>,
    observers: ObserverRegistry,
    active: Option<ActiveRun>,
    last_report: Option<RunReport>,
}

impl SimulationContext {
    pub fn new(config: SimulationConfig) -> Self {
        debug!(config = ?config, "Simulation context created");
        Self {
            config,
            pending: PendingArrivals::new(),
            known_pids: HashSet::new(),
            observers: ObserverRegistry::default(),
            active: None,
            last_report: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Parse a process description and submit it
    ///
    /// While a run is active the process is handed to the worker and becomes
    /// a late arrival; otherwise it joins the pending set for the next run.
    pub fn submit_process(&mut self, text: &str) -> SimResult<ProcessSummary> {
        let process = parse_process(text)?;
        self.submit(process)
    }

    /// Submit an already built process
    pub fn submit(&mut self, process: Process) -> SimResult<ProcessSummary> {
        self.reap_finished()?;

        if self.known_pids.contains(&process.pid) {
            return Err(SimulationError::DuplicatePid(process.pid));
        }
        let summary = process.summary();

        match &self.active {
            Some(run) => {
                // The context keeps a receiver, so a submission the worker
                // never reads is recovered when the run is collected
                if let Err(e) = run.commands.send(WorkerCommand::Submit(process)) {
                    let WorkerCommand::Submit(process) = e.into_inner();
                    self.pending.insert(process);
                    debug!(pid = summary.pid, "Worker channel closed, process kept pending");
                } else {
                    debug!(pid = summary.pid, "Late arrival handed to worker");
                }
            }
            None => {
                self.pending.insert(process);
                debug!(pid = summary.pid, pending = self.pending.len(), "Process submitted");
            }
        }

        self.known_pids.insert(summary.pid);
        Ok(summary)
    }

    /// Remove a not yet run process; only valid between runs
    pub fn remove_process(&mut self, pid: Pid) -> SimResult<Process> {
        self.ensure_idle("remove a process")?;

        let process = self
            .pending
            .remove(pid)
            .ok_or(SimulationError::ProcessNotFound(pid))?;
        self.known_pids.remove(&pid);
        debug!(pid, "Process removed");
        Ok(process)
    }

    /// Start a run over the pending set with the given quantum method
    pub fn start_run(&mut self, method: QuantumMethod) -> SimResult<()> {
        self.ensure_idle("start a run")?;

        let pending = mem::take(&mut self.pending);
        let processes = pending.len();
        let scheduler = Scheduler::with_pending(method, pending);

        let stop = Arc::new(AtomicBool::new(false));
        let (commands, command_rx) = flume::unbounded();
        let unread = command_rx.clone();
        let worker = Worker::new(
            scheduler,
            self.config.clone(),
            stop.clone(),
            command_rx,
            self.observers.clone(),
        );
        let handle = worker.spawn()?;

        info!(
            method = %method,
            processes,
            observers = self.observers.len(),
            "Run started"
        );
        self.active = Some(ActiveRun {
            method,
            stop,
            commands,
            unread,
            handle,
        });
        Ok(())
    }

    /// Signal the active run to stop and wait for its report
    ///
    /// Returns once the worker has exited. Metrics in the report are computed
    /// over whatever terminated before the stop.
    pub fn stop_run(&mut self) -> SimResult<RunReport> {
        let run = self
            .active
            .take()
            .ok_or_else(|| SimulationError::invalid_state("no active run to stop"))?;

        // Polled by the worker before every tick
        run.stop.store(true, Ordering::Release);
        info!(method = %run.method, "Stop requested");

        self.collect(run)
    }

    /// Block until the active run ends on its own
    pub fn wait(&mut self) -> SimResult<RunReport> {
        if self.active.is_some() && !self.config.is_self_terminating() {
            return Err(SimulationError::invalid_state(
                "run never ends on its own; set stop_when_drained or max_ticks, or call stop_run",
            ));
        }

        let run = self
            .active
            .take()
            .ok_or_else(|| SimulationError::invalid_state("no active run to wait for"))?;
        self.collect(run)
    }

    /// Call `callback` on the worker thread after every tick
    pub fn on_tick<F>(&self, callback: F)
    where
        F: FnMut(&TickSnapshot) + Send + 'static,
    {
        self.observers.register(Box::new(TickFn(callback)));
    }

    /// Call `callback` on the worker thread when a run completes
    pub fn on_run_complete<F>(&self, callback: F)
    where
        F: FnMut(&RunReport) + Send + 'static,
    {
        self.observers.register(Box::new(CompleteFn(callback)));
    }

    pub fn add_observer(&self, observer: Box<dyn Observer>) {
        self.observers.register(observer);
    }

    /// Receive every tick snapshot and run report over a channel
    pub fn subscribe(&self) -> flume::Receiver<SimulationEvent> {
        let (observer, rx) = ChannelObserver::new();
        self.observers.register(Box::new(observer));
        rx
    }

    /// Processes waiting for the next run, in arrival order
    pub fn pending(&self) -> Vec<ProcessSummary> {
        self.pending.summaries()
    }

    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// True while a worker is executing ticks
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|run| !run.handle.is_finished())
    }

    /// Discard the pending set and the last report
    pub fn reset(&mut self) -> SimResult<()> {
        self.ensure_idle("reset")?;
        self.pending.clear();
        self.known_pids.clear();
        self.last_report = None;
        info!("Simulation context reset");
        Ok(())
    }

    /// Collect a run that already ended on its own, if any
    fn reap_finished(&mut self) -> SimResult<()> {
        if self
            .active
            .as_ref()
            .is_some_and(|run| run.handle.is_finished())
        {
            if let Some(run) = self.active.take() {
                self.collect(run)?;
            }
        }
        Ok(())
    }

    fn ensure_idle(&mut self, action: &str) -> SimResult<()> {
        self.reap_finished()?;
        if self.active.is_some() {
            return Err(SimulationError::invalid_state(format!(
                "cannot {} while a run is active",
                action
            )));
        }
        Ok(())
    }

    /// Join a run and keep submissions that arrived after its last tick
    fn collect(&mut self, run: ActiveRun) -> SimResult<RunReport> {
        let (report, leftover) = run.join()?;
        if !leftover.is_empty() {
            info!(
                processes = leftover.len(),
                "Late submissions arrived after the run ended, kept for the next run"
            );
        }
        for process in leftover {
            self.pending.insert(process);
        }
        Ok(self.record(report))
    }

    fn record(&mut self, report: RunReport) -> RunReport {
        // A finished run releases its pids
        self.known_pids.clear();
        self.known_pids.extend(self.pending.iter().map(|p| p.pid));
        self.last_report = Some(report.clone());
        report
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl Drop for SimulationContext {
    fn drop(&mut self) {
        if let Some(run) = self.active.take() {
            warn!(method = %run.method, "Simulation context dropped with an active run, stopping worker");
            run.stop.store(true, Ordering::Release);
            if run.join().is_err() {
                warn!("Simulation worker panicked during shutdown");
            }
        }
    }
}
