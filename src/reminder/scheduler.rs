//! Wake-time heap over pending reminders
//!
//! Each poll only pops the tasks whose reminder window has opened instead of
//! rescanning the whole list. Entries are not removed when a task is completed
//! or deleted; they are dropped when popped.

use chrono::NaiveDateTime;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::debug;

use super::{ReminderSink, ReminderWindow};
use crate::store::error::Result;
use crate::store::{TaskStorage, TaskStore};
use crate::task::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct WakeEntry {
    wake_at: NaiveDateTime,
    id: TaskId,
}

#[derive(Debug, Default)]
pub struct ReminderScheduler {
    window: ReminderWindow,
    queue: BinaryHeap<Reverse<WakeEntry>>,
}

impl ReminderScheduler {
    pub fn new(window: ReminderWindow) -> Self {
        Self {
            window,
            queue: BinaryHeap::new(),
        }
    }

    /// Scheduler tracking every pending task of `store`
    pub fn for_store<S: TaskStorage>(store: &TaskStore<S>) -> Self {
        let mut scheduler = Self::new(store.window());
        scheduler.rebuild(store.tasks());
        scheduler
    }

    /// Forget everything and track the pending tasks in `tasks`
    pub fn rebuild(&mut self, tasks: &[Task]) {
        self.queue.clear();
        for task in tasks {
            self.track(task);
        }
        debug!("Reminder heap rebuilt with {} entries", self.queue.len());
    }

    /// Start tracking a task. Completed or notified tasks are ignored.
    pub fn track(&mut self, task: &Task) {
        if !task.awaits_reminder() {
            return;
        }
        self.queue.push(Reverse(WakeEntry {
            wake_at: self.window.wake_at(task.deadline),
            id: task.id,
        }));
    }

    /// When the earliest tracked reminder opens
    pub fn next_wake(&self) -> Option<NaiveDateTime> {
        self.queue.peek().map(|Reverse(entry)| entry.wake_at)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pop every entry whose wake time has passed
    fn pop_due(&mut self, now: NaiveDateTime) -> Vec<TaskId> {
        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.queue.peek() {
            if entry.wake_at > now {
                break;
            }
            due.push(entry.id);
            self.queue.pop();
        }
        due
    }

    /// Fire the reminders that are due at `now`.
    ///
    /// Same outcome as [`TaskStore::check_reminders`] for tasks this scheduler
    /// tracks. Popped tasks that are already past the grace period are
    /// dropped without firing; popped tasks not yet due are tracked again.
    pub fn fire_due<S: TaskStorage>(
        &mut self,
        store: &mut TaskStore<S>,
        now: NaiveDateTime,
        sink: &dyn ReminderSink,
    ) -> Result<Vec<TaskId>> {
        let due = self.pop_due(now);
        if due.is_empty() {
            return Ok(Vec::new());
        }

        let fired = store.fire_reminders_for(&due, now, sink)?;
        for id in due.iter().filter(|id| !fired.contains(id)) {
            // Popped early, e.g. next to a clock change
            if let Some(task) = store.get(*id) {
                if !self.window.is_missed(task.deadline, now) {
                    self.track(task);
                }
            }
        }
        debug!(
            "Popped {} due reminders, fired {}",
            due.len(),
            fired.len()
        );
        Ok(fired)
    }
}
