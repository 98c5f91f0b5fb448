/*!
 * Scheduler Queues
 * Pending arrivals ordered by arrival time and the FIFO ready queue
 */

use crate::core::types::{Pid, SimTime};
use crate::process::{Process, ProcessSummary};
use std::collections::VecDeque;

/// Processes that have not arrived yet
///
/// Kept sorted by `(arrival_time, submission order)`, so the front is always
/// the next process to admit.
#[derive(Debug, Default, Clone)]
pub struct PendingArrivals {
    queue: VecDeque<Process>,
    next_seq: u64,
}

impl PendingArrivals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping arrival order; equal arrival times keep submission order
    pub fn insert(&mut self, mut process: Process) {
        process.seq = self.next_seq;
        self.next_seq += 1;

        let key = process.arrival_key();
        let pos = self.queue.partition_point(|p| p.arrival_key() <= key);
        self.queue.insert(pos, process);
    }

    pub fn remove(&mut self, pid: Pid) -> Option<Process> {
        let pos = self.queue.iter().position(|p| p.pid == pid)?;
        self.queue.remove(pos)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.queue.iter().any(|p| p.pid == pid)
    }

    /// Pop the front process if it has arrived by `clock`
    pub fn pop_arrived(&mut self, clock: SimTime) -> Option<Process> {
        match self.queue.front() {
            Some(p) if p.arrival_time <= clock => self.queue.pop_front(),
            _ => None,
        }
    }

    pub fn next_arrival(&self) -> Option<SimTime> {
        self.queue.front().map(|p| p.arrival_time)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.queue.iter()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn summaries(&self) -> Vec<ProcessSummary> {
        self.queue.iter().map(Process::summary).collect()
    }
}

impl FromIterator<Process> for PendingArrivals {
    fn from_iter<T: IntoIterator<Item = Process>>(iter: T) -> Self {
        let mut pending = Self::new();
        for process in iter {
            pending.insert(process);
        }
        pending
    }
}

/// Admitted processes eligible to run, FIFO with re-insertion at the tail
#[derive(Debug, Default, Clone)]
pub struct ReadyQueue {
    queue: VecDeque<Process>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, process: Process) {
        self.queue.push_back(process);
    }

    pub fn pop_front(&mut self) -> Option<Process> {
        self.queue.pop_front()
    }

    pub fn front(&self) -> Option<&Process> {
        self.queue.front()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.queue.iter().any(|p| p.pid == pid)
    }

    /// Burst times in queue order, the input of quantum selection
    pub fn burst_times(&self) -> impl Iterator<Item = SimTime> + '_ {
        self.queue.iter().map(|p| p.burst_time)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.queue.iter()
    }

    pub fn summaries(&self) -> Vec<ProcessSummary> {
        self.queue.iter().map(Process::summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn process(pid: Pid, arrival: u64, burst: u64) -> Process {
        Process::new(pid, SimTime::from_units(arrival), SimTime::from_units(burst))
    }

    fn pids<'a>(iter: impl Iterator<Item = &'a Process>) -> Vec<Pid> {
        iter.map(|p| p.pid).collect()
    }

    #[test]
    fn test_pending_sorted_by_arrival() {
        let pending: PendingArrivals = vec![process(1, 5, 1), process(2, 0, 1), process(3, 2, 1)]
            .into_iter()
            .collect();
        assert_eq!(pids(pending.iter()), vec![2, 3, 1]);
        assert_eq!(pending.next_arrival(), Some(SimTime::ZERO));
    }

    #[test]
    fn test_pending_ties_keep_submission_order() {
        let mut pending = PendingArrivals::new();
        pending.insert(process(9, 1, 1));
        pending.insert(process(4, 1, 1));
        pending.insert(process(7, 0, 1));
        pending.insert(process(1, 1, 1));
        assert_eq!(pids(pending.iter()), vec![7, 9, 4, 1]);
    }

    #[test]
    fn test_pop_arrived_respects_clock() {
        let mut pending: PendingArrivals =
            vec![process(1, 0, 1), process(2, 1, 1)].into_iter().collect();

        assert_eq!(pending.pop_arrived(SimTime::ZERO).map(|p| p.pid), Some(1));
        assert!(pending.pop_arrived(SimTime::from_ticks(9)).is_none());
        assert_eq!(pending.pop_arrived(SimTime::from_units(1)).map(|p| p.pid), Some(2));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_pending_remove() {
        let mut pending: PendingArrivals =
            vec![process(1, 0, 1), process(2, 1, 1)].into_iter().collect();
        assert!(pending.contains(2));
        assert_eq!(pending.remove(2).map(|p| p.pid), Some(2));
        assert!(pending.remove(2).is_none());
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_ready_queue_fifo() {
        let mut ready = ReadyQueue::new();
        ready.push_back(process(1, 0, 4));
        ready.push_back(process(2, 0, 6));

        let burst: Vec<SimTime> = ready.burst_times().collect();
        assert_eq!(burst, vec![SimTime::from_units(4), SimTime::from_units(6)]);

        let first = ready.pop_front().unwrap();
        ready.push_back(first);
        assert_eq!(pids(ready.iter()), vec![2, 1]);
    }
}
