//! Virtual time for deterministic sessions.
//!
//! `TestClock` only moves when told to, so deferred renders and notification
//! expiries can be stepped through in tests and in `minipen simulate`
//! without real waiting.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use chrono::{DateTime, Duration, Utc};

use crate::clock::{Clock, TimerJob};

#[derive(Debug, Clone)]
struct Scheduled {
    /// Virtual deadline in ms
    due_ms: u64,
    /// Ties on `due_ms` fire first-in first-out
    seq: u64,
    job: TimerJob,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for BinaryHeap: the earliest deadline sits on top
        (other.due_ms, other.seq).cmp(&(self.due_ms, self.seq))
    }
}

/// Virtual clock anchored at a fixed wall-clock `origin`.
#[derive(Debug)]
pub struct TestClock {
    origin: DateTime<Utc>,
    elapsed_ms: u64,
    queue: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl TestClock {
    /// Starts at the Unix epoch.
    pub fn new() -> Self {
        Self::starting_at(DateTime::<Utc>::default())
    }

    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            elapsed_ms: 0,
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Milliseconds elapsed since `origin`.
    pub fn now_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Pops the next job due at or before `target_ms`, moving virtual time to
    /// its deadline. Jobs scheduled while handling it are measured from there.
    pub fn pop_due(&mut self, target_ms: u64) -> Option<TimerJob> {
        if self.queue.peek()?.due_ms > target_ms {
            return None;
        }
        let scheduled = self.queue.pop()?;
        self.elapsed_ms = self.elapsed_ms.max(scheduled.due_ms);
        Some(scheduled.job)
    }

    /// Moves time forward by `ms` and returns the jobs that came due, in
    /// deadline order. Use [`Self::pop_due`] when handling a job may schedule
    /// further jobs.
    pub fn advance_by(&mut self, ms: u64) -> Vec<TimerJob> {
        let target_ms = self.elapsed_ms.saturating_add(ms);
        let due = std::iter::from_fn(|| self.pop_due(target_ms)).collect();
        self.elapsed_ms = target_ms;
        due
    }

    /// Moves time forward to `target_ms` without firing anything.
    pub fn set_time(&mut self, target_ms: u64) {
        self.elapsed_ms = self.elapsed_ms.max(target_ms);
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending jobs in deadline order.
    pub fn pending_jobs(&self) -> Vec<TimerJob> {
        let mut queued: Vec<_> = self.queue.iter().cloned().collect();
        queued.sort_by(|a, b| b.cmp(a));
        queued.into_iter().map(|scheduled| scheduled.job).collect()
    }

    pub fn next_due_in(&self) -> Option<u64> {
        self.queue
            .peek()
            .map(|scheduled| scheduled.due_ms.saturating_sub(self.elapsed_ms))
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = i64::try_from(self.elapsed_ms).unwrap_or(i64::MAX);
        self.origin
            .checked_add_signed(Duration::milliseconds(elapsed))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn schedule(&mut self, delay_ms: u64, job: TimerJob) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled {
            due_ms: self.elapsed_ms.saturating_add(delay_ms),
            seq,
            job,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pane;

    #[test]
    fn wall_clock_follows_virtual_time() {
        let origin = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut clock = TestClock::starting_at(origin);
        assert_eq!(clock.now(), origin);

        clock.advance_by(1_500);
        clock.advance_by(250);
        assert_eq!(clock.now_ms(), 1_750);
        assert_eq!(clock.now() - origin, Duration::milliseconds(1_750));
        assert_eq!(TestClock::new().now().timestamp(), 0);
    }

    #[test]
    fn job_fires_once_at_its_deadline() {
        let mut clock = TestClock::new();
        clock.schedule(500, TimerJob::AutoRun(Pane::Html));
        assert!(!clock.is_idle());

        assert!(clock.advance_by(499).is_empty());
        assert_eq!(clock.advance_by(1), vec![TimerJob::AutoRun(Pane::Html)]);

        assert!(clock.advance_by(10_000).is_empty());
        assert!(clock.is_idle());
    }

    #[test]
    fn equal_deadlines_fire_in_scheduling_order() {
        let mut clock = TestClock::new();
        clock.schedule(100, TimerJob::RefreshLines(Pane::Css));
        clock.schedule(100, TimerJob::LoadRun);
        clock.schedule(50, TimerJob::ExpireNotification(3));
        let expected = vec![
            TimerJob::ExpireNotification(3),
            TimerJob::RefreshLines(Pane::Css),
            TimerJob::LoadRun,
        ];
        assert_eq!(clock.pending_jobs(), expected);
        assert_eq!(clock.advance_by(100), expected);
    }

    #[test]
    fn pop_due_moves_time_to_each_deadline() {
        let mut clock = TestClock::new();
        clock.schedule(200, TimerJob::LoadRun);
        assert_eq!(clock.pop_due(1000), Some(TimerJob::LoadRun));
        assert_eq!(clock.now_ms(), 200);

        // Scheduled while handling the job: measured from 200
        clock.schedule(300, TimerJob::ExpireNotification(1));
        assert_eq!(clock.next_due_in(), Some(300));
        assert_eq!(clock.pop_due(1000), Some(TimerJob::ExpireNotification(1)));
        assert_eq!(clock.now_ms(), 500);
        assert_eq!(clock.pop_due(1000), None);
        clock.set_time(1000);
        assert_eq!(clock.now_ms(), 1000);
    }

    #[test]
    fn far_future_deadlines_saturate() {
        let mut clock = TestClock::new();
        clock.advance_by(10);
        clock.schedule(u64::MAX, TimerJob::LoadRun);
        assert_eq!(clock.next_due_in(), Some(u64::MAX - 10));

        assert_eq!(clock.advance_by(u64::MAX), vec![TimerJob::LoadRun]);
        assert_eq!(clock.now_ms(), u64::MAX);
        assert_eq!(clock.now(), DateTime::<Utc>::MAX_UTC);
    }
}
