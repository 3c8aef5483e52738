//! Fixed-period reminder polling
//!
//! Other `chronos` processes write the same tasks file, so every tick first
//! checks whether storage changed and reloads before firing.

use chrono::{Local, NaiveDateTime};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{ReminderScheduler, ReminderSink};
use crate::store::storage::Revision;
use crate::store::{LoadReport, TaskStorage, TaskStore};
use crate::task::TaskId;

pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(60);

pub struct ReminderPoller<S: TaskStorage> {
    store: TaskStore<S>,
    scheduler: ReminderScheduler,
    sink: Box<dyn ReminderSink>,
    period: Duration,
    seen_revision: Option<Revision>,
}

impl<S: TaskStorage> ReminderPoller<S> {
    pub fn new(store: TaskStore<S>, sink: Box<dyn ReminderSink>) -> Self {
        let scheduler = ReminderScheduler::for_store(&store);
        let seen_revision = store.storage().revision();
        Self {
            store,
            scheduler,
            sink,
            period: DEFAULT_POLL_PERIOD,
            seen_revision,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    /// One poll at `now`. Storage errors are logged, never returned.
    pub fn poll_once(&mut self, now: NaiveDateTime) -> Vec<TaskId> {
        self.retry_unsaved();
        self.refresh_if_changed();

        match self
            .scheduler
            .fire_due(&mut self.store, now, self.sink.as_ref())
        {
            Ok(fired) => {
                if !fired.is_empty() {
                    self.adopt_own_write();
                }
                fired
            }
            Err(e) => {
                warn!("Failed to save reminder state: {}", e);
                // Popped entries that did not fire must be tracked again
                self.scheduler.rebuild(self.store.tasks());
                Vec::new()
            }
        }
    }

    fn retry_unsaved(&mut self) {
        if !self.store.has_unsaved_reminders() {
            return;
        }
        match self.store.save_pending() {
            Ok(()) => self.adopt_own_write(),
            Err(e) => warn!("Reminder state still unsaved: {}", e),
        }
    }

    /// Our own write merged whatever was stored; no reload needed
    fn adopt_own_write(&mut self) {
        self.scheduler.rebuild(self.store.tasks());
        self.seen_revision = self.store.storage().revision();
    }

    fn refresh_if_changed(&mut self) {
        let current = self.store.storage().revision();
        if current == self.seen_revision {
            return;
        }

        let report = self.store.reload();
        if let LoadReport::Restored { count } = report {
            debug!("Tasks changed on disk, reloaded {} tasks", count);
        }
        self.scheduler.rebuild(self.store.tasks());
        self.seen_revision = self.store.storage().revision();
    }

    /// Poll on a fixed period until `shutdown` resolves
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut tick = tokio::time::interval(self.period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "Watching {} pending reminders every {}s",
            self.scheduler.len(),
            self.period.as_secs()
        );

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let fired = self.poll_once(Local::now().naive_local());
                    if !fired.is_empty() {
                        info!("Fired {} reminders", fired.len());
                    }
                    if let Some(next) = self.scheduler.next_wake() {
                        debug!("Next reminder opens at {}", next);
                    }
                }
                _ = &mut shutdown => {
                    info!("Reminder poller stopping");
                    break;
                }
            }
        }
    }
}
