/*!
 * Simulation Observers
 *
 * Presentation hooks for a run. The worker notifies every registered
 * observer after each tick and once when the run completes. Observers run on
 * the worker thread and must not block for long.
 */

use super::RunReport;
use crate::scheduler::TickSnapshot;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Receives scheduler state while a run progresses
pub trait Observer: Send {
    /// Called after every tick with the state it produced
    fn on_tick(&mut self, _snapshot: &TickSnapshot) {}

    /// Called once when the run ends, stopped or drained
    fn on_run_complete(&mut self, _report: &RunReport) {}
}

/// Event published to channel subscribers
#[derive(Debug, Clone)]
pub enum SimulationEvent {
    Tick(TickSnapshot),
    RunComplete(Box<RunReport>),
}

/// Observer forwarding every notification into a flume channel
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: flume::Sender<SimulationEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel
    pub fn new() -> (Self, flume::Receiver<SimulationEvent>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    fn publish(&self, event: SimulationEvent) {
        if self.tx.send(event).is_err() {
            debug!("Subscriber dropped, event discarded");
        }
    }
}

impl Observer for ChannelObserver {
    fn on_tick(&mut self, snapshot: &TickSnapshot) {
        self.publish(SimulationEvent::Tick(snapshot.clone()));
    }

    fn on_run_complete(&mut self, report: &RunReport) {
        self.publish(SimulationEvent::RunComplete(Box::new(report.clone())));
    }
}

pub(crate) struct TickFn<F>(pub(crate) F);

impl<F> Observer for TickFn<F>
where
    F: FnMut(&TickSnapshot) + Send,
{
    fn on_tick(&mut self, snapshot: &TickSnapshot) {
        (self.0)(snapshot)
    }
}

pub(crate) struct CompleteFn<F>(pub(crate) F);

impl<F> Observer for CompleteFn<F>
where
    F: FnMut(&RunReport) + Send,
{
    fn on_run_complete(&mut self, report: &RunReport) {
        (self.0)(report)
    }
}

/// Observers shared between the context and its worker
#[derive(Clone, Default)]
pub(crate) struct ObserverRegistry {
    observers: Arc<Mutex<Vec<Box<dyn Observer>>>>,
}

impl ObserverRegistry {
    pub(crate) fn register(&self, observer: Box<dyn Observer>) {
        let mut observers = self.observers.lock();
        observers.push(observer);
        debug!(count = observers.len(), "Observer registered");
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.lock().len()
    }

    pub(crate) fn notify_tick(&self, snapshot: &TickSnapshot) {
        for observer in self.observers.lock().iter_mut() {
            observer.on_tick(snapshot);
        }
    }

    pub(crate) fn notify_complete(&self, report: &RunReport) {
        for observer in self.observers.lock().iter_mut() {
            observer.on_run_complete(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SimTime;
    use crate::scheduler::SchedulerState;

    fn snapshot(ticks: u64) -> TickSnapshot {
        TickSnapshot {
            clock: SimTime::from_ticks(ticks),
            state: SchedulerState::Idle,
            running: None,
            ready: Vec::new(),
            pending: 0,
            terminated: 0,
            events: Vec::new(),
        }
    }

    #[test]
    fn test_closure_observers() {
        let registry = ObserverRegistry::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        registry.register(Box::new(TickFn(move |s: &TickSnapshot| {
            sink.lock().push(s.clock.ticks())
        })));

        registry.notify_tick(&snapshot(1));
        registry.notify_tick(&snapshot(2));
        assert_eq!(*seen.lock(), vec![1, 2]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_channel_observer_publishes() {
        let registry = ObserverRegistry::default();
        let (observer, rx) = ChannelObserver::new();
        registry.register(Box::new(observer));

        registry.notify_tick(&snapshot(7));
        match rx.try_recv().unwrap() {
            SimulationEvent::Tick(s) => assert_eq!(s.clock, SimTime::from_ticks(7)),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_dropped_subscriber_is_ignored() {
        let registry = ObserverRegistry::default();
        let (observer, rx) = ChannelObserver::new();
        registry.register(Box::new(observer));
        drop(rx);

        registry.notify_tick(&snapshot(1));
    }
}
