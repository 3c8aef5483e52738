//! Deadline reminders
//!
//! A task becomes due for its one-shot reminder `lead` before its deadline
//! and stays due until `grace` after it. Past that the reminder is missed and
//! never fires.
//!
//! Deadlines are local wall-clock times. The window is measured in real
//! elapsed time, so a reminder next to a daylight saving change still opens
//! `lead` before the deadline.
//!
//! - [`ReminderWindow`] holds the firing rule
//! - [`ReminderScheduler`] keeps pending tasks in a wake-time heap
//! - [`ReminderPoller`] drives the scheduler on a fixed period

pub mod poller;
pub mod scheduler;

pub use poller::ReminderPoller;
pub use scheduler::ReminderScheduler;

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};

use crate::task::Task;

/// Receives each reminder exactly once per task
pub trait ReminderSink {
    fn on_reminder_fired(&self, task: &Task);
}

impl<F> ReminderSink for F
where
    F: Fn(&Task),
{
    fn on_reminder_fired(&self, task: &Task) {
        self(task)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    /// How long before the deadline the reminder opens
    pub lead: Duration,
    /// How long after the deadline it still fires
    pub grace: Duration,
}

impl Default for ReminderWindow {
    fn default() -> Self {
        Self {
            lead: Duration::minutes(15),
            grace: Duration::hours(1),
        }
    }
}

impl ReminderWindow {
    pub fn new(lead: Duration, grace: Duration) -> Self {
        Self { lead, grace }
    }

    /// `-grace < deadline - now <= lead`, both local wall-clock times
    pub fn contains(&self, deadline: NaiveDateTime, now: NaiveDateTime) -> bool {
        self.contains_span(local_span(now, deadline))
    }

    /// Same rule for zone-aware times
    pub fn contains_at<Tz: TimeZone>(&self, deadline: DateTime<Tz>, now: DateTime<Tz>) -> bool {
        self.contains_span(deadline.signed_duration_since(now))
    }

    fn contains_span(&self, diff: Duration) -> bool {
        diff <= self.lead && diff > -self.grace
    }

    /// Too late to fire
    pub fn is_missed(&self, deadline: NaiveDateTime, now: NaiveDateTime) -> bool {
        local_span(now, deadline) <= -self.grace
    }

    /// Earliest local wall-clock moment the reminder can fire
    pub fn wake_at(&self, deadline: NaiveDateTime) -> NaiveDateTime {
        match Local.from_local_datetime(&deadline).earliest() {
            Some(local) => local
                .checked_sub_signed(self.lead)
                .map(|wake| wake.naive_local())
                .unwrap_or(NaiveDateTime::MIN),
            None => deadline
                .checked_sub_signed(self.lead)
                .unwrap_or(NaiveDateTime::MIN),
        }
    }
}

/// Real time from `from` to `to`, both local wall-clock readings. Readings
/// that do not exist locally (skipped by a clock change) are taken as-is.
fn local_span(from: NaiveDateTime, to: NaiveDateTime) -> Duration {
    let zoned = |t: &NaiveDateTime| Local.from_local_datetime(t).earliest();
    match (zoned(&from), zoned(&to)) {
        (Some(from), Some(to)) => to.signed_duration_since(from),
        _ => to - from,
    }
}
