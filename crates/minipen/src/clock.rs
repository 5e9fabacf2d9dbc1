//! Time port: wall-clock reads and one-shot deferred jobs.
//!
//! The controller never sleeps. It asks the clock to deliver a [`TimerJob`]
//! after a delay and the host hands fired jobs back through
//! [`EditorController::fire`](crate::EditorController::fire). Jobs are never
//! cancelled once scheduled.

use chrono::{DateTime, Utc};

use crate::Pane;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerJob {
    /// Deferred render requested by an edit in `Pane` while auto-run was on.
    AutoRun(Pane),
    /// Render following a successful load while auto-run was on.
    LoadRun,
    /// Line-number refresh shortly after Enter was pressed in `Pane`.
    RefreshLines(Pane),
    /// End of the display window of the notification with this generation.
    ExpireNotification(u64),
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    /// Delivers `job` once, `delay_ms` from now.
    fn schedule(&mut self, delay_ms: u64, job: TimerJob);
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn schedule(&mut self, delay_ms: u64, job: TimerJob) {
        (**self).schedule(delay_ms, job)
    }
}
