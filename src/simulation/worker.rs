/*!
 * Simulation Worker
 *
 * Dedicated thread driving the scheduler one tick at a time. The worker owns
 * the scheduler exclusively; the context talks to it through the stop flag
 * and the command channel only.
 */

use super::config::SimulationConfig;
use super::observer::ObserverRegistry;
use super::RunReport;
use crate::core::limits::WORKER_THREAD_NAME;
use crate::core::types::SimResult;
use crate::monitoring::Metrics;
use crate::process::Process;
use crate::scheduler::Scheduler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

/// Control messages for a running worker
#[derive(Debug)]
pub(crate) enum WorkerCommand {
    /// Late arrival submitted while the run is active
    Submit(Process),
}

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Stopped,
    Drained,
    TickLimit,
    Failed,
}

pub(crate) struct Worker {
    scheduler: Scheduler,
    config: SimulationConfig,
    stop: Arc<AtomicBool>,
    commands: flume::Receiver<WorkerCommand>,
    observers: ObserverRegistry,
}

impl Worker {
    pub(crate) fn new(
        scheduler: Scheduler,
        config: SimulationConfig,
        stop: Arc<AtomicBool>,
        commands: flume::Receiver<WorkerCommand>,
        observers: ObserverRegistry,
    ) -> Self {
        Self {
            scheduler,
            config,
            stop,
            commands,
            observers,
        }
    }

    /// Start the worker on its own named thread
    pub(crate) fn spawn(self) -> SimResult<JoinHandle<RunReport>> {
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || self.run())?;
        Ok(handle)
    }

    /// Tick until stopped, drained or out of ticks, then report
    pub(crate) fn run(mut self) -> RunReport {
        info!(
            method = %self.scheduler.method(),
            processes = self.scheduler.pending().len(),
            tick_delay_ms = self.config.tick_delay.as_millis() as u64,
            "Simulation worker started"
        );

        let mut ticks: u64 = 0;
        let exit = loop {
            self.drain_commands();

            if self.stop.load(Ordering::Acquire) {
                break Exit::Stopped;
            }
            if self.config.stop_when_drained && self.scheduler.is_drained() {
                break Exit::Drained;
            }
            if self.config.max_ticks.is_some_and(|max| ticks >= max) {
                break Exit::TickLimit;
            }

            match self.scheduler.tick() {
                Ok(events) => {
                    let snapshot = self.scheduler.snapshot_with(events);
                    self.observers.notify_tick(&snapshot);
                }
                Err(e) => {
                    error!(error = %e, clock = %self.scheduler.clock(), "Tick failed");
                    break Exit::Failed;
                }
            }
            ticks += 1;

            if !self.config.tick_delay.is_zero() {
                thread::sleep(self.config.tick_delay);
            }
        };

        if exit == Exit::TickLimit {
            warn!(ticks, "Tick limit reached before the workload drained");
        }
        self.finish(exit)
    }

    fn drain_commands(&mut self) {
        for command in self.commands.try_iter() {
            match command {
                WorkerCommand::Submit(process) => {
                    let pid = process.pid;
                    if let Err(e) = self.scheduler.add(process) {
                        warn!(pid, error = %e, "Late submission rejected");
                    }
                }
            }
        }
    }

    fn finish(mut self, exit: Exit) -> RunReport {
        self.scheduler.stop();
        let method = self.scheduler.method();
        let drained = self.scheduler.is_drained();
        let outcome = self.scheduler.into_outcome();

        let metrics = match Metrics::from_terminated(&outcome.terminated) {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                info!(error = %e, "Run ended without metrics");
                None
            }
        };

        let report = RunReport {
            method,
            final_clock: outcome.clock,
            terminated: outcome.terminated,
            unfinished: outcome.unfinished,
            stats: outcome.stats,
            metrics,
            stopped_early: !drained,
        };

        info!(
            exit = ?exit,
            clock = %report.final_clock,
            terminated = report.terminated.len(),
            unfinished = report.unfinished.len(),
            "Simulation worker finished"
        );

        self.observers.notify_complete(&report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SimTime;
    use crate::scheduler::QuantumMethod;

    fn worker(
        processes: Vec<Process>,
        config: SimulationConfig,
    ) -> (Worker, Arc<AtomicBool>, flume::Sender<WorkerCommand>) {
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = flume::unbounded();
        let scheduler = Scheduler::from_processes(QuantumMethod::Arithmetic, processes);
        (
            Worker::new(scheduler, config, stop.clone(), rx, ObserverRegistry::default()),
            stop,
            tx,
        )
    }

    fn process(pid: u32, arrival: u64, burst: u64) -> Process {
        Process::new(pid, SimTime::from_units(arrival), SimTime::from_units(burst))
    }

    #[test]
    fn test_runs_until_drained() {
        let (worker, _, _tx) = worker(
            vec![process(1, 0, 2), process(2, 1, 1)],
            SimulationConfig::instant(),
        );
        let report = worker.run();

        assert!(!report.stopped_early);
        assert_eq!(report.terminated.len(), 2);
        assert!(report.unfinished.is_empty());
        assert!(report.metrics.is_some());
    }

    #[test]
    fn test_stop_flag_set_before_start() {
        let (worker, stop, _tx) = worker(vec![process(1, 0, 2)], SimulationConfig::instant());
        stop.store(true, Ordering::Release);
        let report = worker.run();

        assert!(report.stopped_early);
        assert_eq!(report.final_clock, SimTime::ZERO);
        assert!(report.metrics.is_none());
        assert_eq!(report.unfinished.len(), 1);
    }

    #[test]
    fn test_commands_applied_before_tick() {
        let (worker, _, tx) = worker(vec![process(1, 0, 1)], SimulationConfig::instant());
        tx.send(WorkerCommand::Submit(process(2, 0, 1))).unwrap();
        tx.send(WorkerCommand::Submit(process(1, 0, 1))).unwrap();
        let report = worker.run();

        let pids: Vec<u32> = report.terminated.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![1, 2]);
    }

    #[test]
    fn test_tick_limit() {
        let config = SimulationConfig::instant().with_max_ticks(5);
        let (worker, _, _tx) = worker(vec![process(1, 0, 3)], config);
        let report = worker.run();

        assert!(report.stopped_early);
        assert_eq!(report.final_clock, SimTime::from_ticks(5));
        assert_eq!(report.stats.ticks, 5);
    }
}
