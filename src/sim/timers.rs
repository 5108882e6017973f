//! Single-threaded virtual-time scheduler
//!
//! Every simulation timer (drift tick, discovery spawn/expiry, autocollect
//! sweep) is a one-shot task on this queue; recurring cadences re-arm
//! themselves when handled. The session advances virtual time explicitly, so
//! wall-clock time spent anchored never produces catch-up work.
//!
//! Cancellation is by task id and idempotent: cancelling twice, or after the
//! task fired, is a no-op.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashSet;

use crate::core::types::DiscoveryId;

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// What to do when a task fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Fixed-rate progression tick
    DriftTick,
    /// Self-rescheduling randomized spawn
    DiscoverySpawn,
    /// Per-discovery expiry, guarded by id
    DiscoveryExpire(DiscoveryId),
    /// Fixed-rate autocollector sweep
    AutocollectSweep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    fire_at: u64,
    seq: u64,
    id: TaskId,
    kind: TaskKind,
}

// Min-heap on (fire_at, seq): earlier fire time first, FIFO among equals.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The timer queue. Time only moves forward, driven by `pop_due`.
#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<Entry>,
    cancelled: AHashSet<TaskId>,
    next_seq: u64,
    now_ms: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Schedule a one-shot task `delay_ms` from now
    pub fn schedule_in(&mut self, delay_ms: u64, kind: TaskKind) -> TaskId {
        let id = TaskId(self.next_seq);
        self.heap.push(Entry {
            fire_at: self.now_ms + delay_ms,
            seq: self.next_seq,
            id,
            kind,
        });
        self.next_seq += 1;
        id
    }

    /// Cancel a pending task. Idempotent; unknown or already-fired ids are
    /// silently ignored.
    pub fn cancel(&mut self, id: TaskId) {
        self.cancelled.insert(id);
    }

    /// Pop the next task due at or before `deadline_ms`, advancing `now` to
    /// its fire time. When nothing more is due, advances `now` to the
    /// deadline and returns None.
    pub fn pop_due(&mut self, deadline_ms: u64) -> Option<(TaskId, TaskKind)> {
        while let Some(entry) = self.heap.peek().copied() {
            if self.cancelled.contains(&entry.id) {
                self.heap.pop();
                self.cancelled.remove(&entry.id);
                continue;
            }
            if entry.fire_at > deadline_ms {
                break;
            }
            self.heap.pop();
            self.now_ms = self.now_ms.max(entry.fire_at);
            return Some((entry.id, entry.kind));
        }
        self.now_ms = self.now_ms.max(deadline_ms);
        None
    }

    /// Number of live (uncancelled) pending tasks
    pub fn pending(&self) -> usize {
        self.heap
            .iter()
            .filter(|e| !self.cancelled.contains(&e.id))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_fire_in_time_order() {
        let mut sched = Scheduler::new();
        sched.schedule_in(300, TaskKind::DriftTick);
        sched.schedule_in(100, TaskKind::AutocollectSweep);
        sched.schedule_in(200, TaskKind::DiscoverySpawn);

        assert_eq!(
            sched.pop_due(1000).map(|(_, k)| k),
            Some(TaskKind::AutocollectSweep)
        );
        assert_eq!(sched.now(), 100);
        assert_eq!(
            sched.pop_due(1000).map(|(_, k)| k),
            Some(TaskKind::DiscoverySpawn)
        );
        assert_eq!(
            sched.pop_due(1000).map(|(_, k)| k),
            Some(TaskKind::DriftTick)
        );
        assert_eq!(sched.pop_due(1000), None);
        assert_eq!(sched.now(), 1000);
    }

    #[test]
    fn test_same_fire_time_is_fifo() {
        let mut sched = Scheduler::new();
        sched.schedule_in(50, TaskKind::DriftTick);
        sched.schedule_in(50, TaskKind::DiscoverySpawn);

        assert_eq!(
            sched.pop_due(100).map(|(_, k)| k),
            Some(TaskKind::DriftTick)
        );
        assert_eq!(
            sched.pop_due(100).map(|(_, k)| k),
            Some(TaskKind::DiscoverySpawn)
        );
    }

    #[test]
    fn test_deadline_leaves_future_tasks_pending() {
        let mut sched = Scheduler::new();
        sched.schedule_in(500, TaskKind::DriftTick);

        assert_eq!(sched.pop_due(100), None);
        assert_eq!(sched.now(), 100);
        assert_eq!(sched.pending(), 1);

        assert_eq!(
            sched.pop_due(600).map(|(_, k)| k),
            Some(TaskKind::DriftTick)
        );
        assert_eq!(sched.now(), 500);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut sched = Scheduler::new();
        let id = sched.schedule_in(100, TaskKind::DriftTick);
        sched.cancel(id);
        sched.cancel(id);

        assert_eq!(sched.pop_due(1000), None);
        assert_eq!(sched.pending(), 0);

        // Cancelling after the queue drained is still a no-op
        sched.cancel(id);
        assert_eq!(sched.pop_due(2000), None);
    }

    #[test]
    fn test_rearm_relative_to_fire_time() {
        let mut sched = Scheduler::new();
        sched.schedule_in(100, TaskKind::DriftTick);

        let (_, kind) = sched.pop_due(1000).unwrap();
        assert_eq!(kind, TaskKind::DriftTick);
        // Re-arm from the fire time, as recurring handlers do
        sched.schedule_in(100, TaskKind::DriftTick);
        let (_, _) = sched.pop_due(1000).unwrap();
        assert_eq!(sched.now(), 200);
    }
}
