/*!
 * Simulation Context Tests
 * Run lifecycle, late submissions and observer notifications
 */

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use rr_sim::simulation::Observer;
use rr_sim::{
    QuantumMethod, RunReport, SimTime, SimulationConfig, SimulationContext, SimulationError,
    SimulationEvent, TickSnapshot,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn paced() -> SimulationConfig {
    SimulationConfig::realtime().with_tick_delay(Duration::from_millis(1))
}

#[test]
fn test_batch_run_reports_metrics() {
    let mut ctx = SimulationContext::new(SimulationConfig::instant());
    ctx.submit_process("1 ; 0 ; 5").unwrap();
    ctx.submit_process("2 ; 1 ; 3").unwrap();

    ctx.start_run(QuantumMethod::Arithmetic).unwrap();
    let report = ctx.wait().unwrap();

    assert_eq!(report.method, QuantumMethod::Arithmetic);
    assert_eq!(report.final_clock, SimTime::from_units(8));
    assert!(!report.stopped_early);
    assert!(report.unfinished.is_empty());

    let metrics = report.metrics.unwrap();
    assert_eq!(metrics.completed, 2);
    assert_eq!(metrics.throughput, 6.5);
    assert_eq!(metrics.avg_turnaround_time, 6.0);
    assert_eq!(metrics.avg_waiting_time, 2.0);
}

#[test]
fn test_lifecycle_errors_while_running() {
    let mut ctx = SimulationContext::new(paced());
    ctx.submit_process("1;0;100").unwrap();
    ctx.submit_process("2;50;1").unwrap();
    ctx.start_run(QuantumMethod::Harmonic).unwrap();
    assert!(ctx.is_running());

    assert!(matches!(
        ctx.start_run(QuantumMethod::Arithmetic),
        Err(SimulationError::InvalidState(_))
    ));
    assert!(matches!(
        ctx.remove_process(2),
        Err(SimulationError::InvalidState(_))
    ));
    assert!(matches!(ctx.reset(), Err(SimulationError::InvalidState(_))));

    let report = ctx.stop_run().unwrap();
    assert!(!ctx.is_running());
    assert!(report.stopped_early);
    assert!(report.metrics.is_none());
    assert!(report.terminated.is_empty());
    assert_eq!(report.unfinished.len(), 2);

    assert!(matches!(ctx.stop_run(), Err(SimulationError::InvalidState(_))));
}

#[test]
fn test_late_submission_joins_active_run() {
    let config = paced().with_stop_when_drained(true);
    let mut ctx = SimulationContext::new(config);
    ctx.submit_process("1;0;20").unwrap();
    ctx.start_run(QuantumMethod::Arithmetic).unwrap();

    ctx.submit_process("2;0;1").unwrap();
    assert_eq!(
        ctx.submit_process("1;3;3").unwrap_err(),
        SimulationError::DuplicatePid(1)
    );

    let report = ctx.wait().unwrap();
    let pids: Vec<u32> = report.terminated.iter().map(|p| p.pid).collect();
    assert_eq!(pids.len(), 2);
    assert!(pids.contains(&2));
    assert!(ctx.pending().is_empty());
}

#[test]
fn test_submission_after_last_tick_is_kept() {
    let mut ctx = SimulationContext::new(SimulationConfig::instant());
    // Holds the worker between its last tick and the join
    ctx.on_run_complete(|_| std::thread::sleep(Duration::from_millis(300)));

    ctx.submit_process("1;0;1").unwrap();
    ctx.start_run(QuantumMethod::Arithmetic).unwrap();
    std::thread::sleep(Duration::from_millis(100));
    ctx.submit_process("2;0;1").unwrap();

    let report = ctx.wait().unwrap();
    let pids: Vec<u32> = report.terminated.iter().map(|p| p.pid).collect();
    assert_eq!(pids, vec![1]);
    assert!(report.unfinished.is_empty());

    let pending: Vec<u32> = ctx.pending().iter().map(|p| p.pid).collect();
    assert_eq!(pending, vec![2]);
    assert_eq!(
        ctx.submit_process("2;5;5").unwrap_err(),
        SimulationError::DuplicatePid(2)
    );

    ctx.start_run(QuantumMethod::Arithmetic).unwrap();
    let report = ctx.wait().unwrap();
    assert_eq!(report.terminated[0].pid, 2);
    assert!(ctx.pending().is_empty());
}

#[derive(Default)]
struct Counts {
    ticks: usize,
    idle: usize,
    completions: Vec<usize>,
}

struct CountingObserver(Arc<Mutex<Counts>>);

impl Observer for CountingObserver {
    fn on_tick(&mut self, snapshot: &TickSnapshot) {
        let mut counts = self.0.lock();
        counts.ticks += 1;
        if snapshot.is_idle() {
            counts.idle += 1;
        }
    }

    fn on_run_complete(&mut self, report: &RunReport) {
        self.0.lock().completions.push(report.terminated.len());
    }
}

#[test]
fn test_custom_observer_sees_run() {
    let mut ctx = SimulationContext::new(SimulationConfig::instant());
    let counts = Arc::new(Mutex::new(Counts::default()));
    ctx.add_observer(Box::new(CountingObserver(counts.clone())));

    ctx.submit_process("1;1;1").unwrap();
    ctx.submit_process("2;1;1").unwrap();
    ctx.start_run(QuantumMethod::Arithmetic).unwrap();
    let report = ctx.wait().unwrap();

    let counts = counts.lock();
    assert_eq!(counts.ticks as u64, report.stats.ticks);
    assert_eq!(counts.ticks, 30);
    assert_eq!(counts.completions, vec![2]);
    // 10 ticks before the arrivals plus the two ticks that end a process
    assert_eq!(report.stats.idle_ticks, 10);
    assert_eq!(counts.idle, 12);
}

#[test]
fn test_callbacks_observe_every_tick() {
    let mut ctx = SimulationContext::new(SimulationConfig::instant());
    let ticks = Arc::new(AtomicUsize::new(0));
    let reports = Arc::new(Mutex::new(Vec::new()));

    let counter = ticks.clone();
    ctx.on_tick(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let sink = reports.clone();
    ctx.on_run_complete(move |report| sink.lock().push(report.final_clock));

    ctx.submit_process("1;2;1").unwrap();
    ctx.start_run(QuantumMethod::Geometric).unwrap();
    let report = ctx.wait().unwrap();

    // 20 idle ticks then 10 running ticks
    assert_eq!(ticks.load(Ordering::SeqCst), 30);
    assert_eq!(report.stats.ticks, 30);
    assert_eq!(*reports.lock(), vec![SimTime::from_units(3)]);
}

#[test]
fn test_subscribe_receives_ticks_then_completion() {
    let mut ctx = SimulationContext::new(SimulationConfig::instant());
    let events = ctx.subscribe();

    ctx.submit_process("1;0;1").unwrap();
    ctx.start_run(QuantumMethod::Arithmetic).unwrap();
    ctx.wait().unwrap();

    let received: Vec<SimulationEvent> = events.try_iter().collect();
    assert_eq!(received.len(), 11);
    assert!(matches!(received[0], SimulationEvent::Tick(ref s) if s.clock == SimTime::TICK));
    match received.last() {
        Some(SimulationEvent::RunComplete(report)) => assert_eq!(report.terminated.len(), 1),
        other => panic!("expected completion last, got {:?}", other),
    }
}

#[test]
fn test_context_reusable_after_run() {
    let mut ctx = SimulationContext::new(SimulationConfig::instant());
    ctx.submit_process("1;0;1").unwrap();
    ctx.start_run(QuantumMethod::Arithmetic).unwrap();
    ctx.wait().unwrap();

    ctx.submit_process("1;0;2").unwrap();
    ctx.submit_process("3;1;1").unwrap();
    ctx.remove_process(3).unwrap();
    ctx.start_run(QuantumMethod::Harmonic).unwrap();
    let report = ctx.wait().unwrap();

    assert_eq!(report.method, QuantumMethod::Harmonic);
    assert_eq!(report.terminated[0].burst_time, SimTime::from_units(2));
    assert_eq!(ctx.last_report().map(|r| r.final_clock), Some(SimTime::from_units(2)));

    ctx.reset().unwrap();
    assert!(ctx.last_report().is_none());
}

#[test]
fn test_drop_stops_active_run() {
    let mut ctx = SimulationContext::new(paced());
    ctx.submit_process("1;0;1000").unwrap();
    ctx.start_run(QuantumMethod::Arithmetic).unwrap();
    drop(ctx);
}
