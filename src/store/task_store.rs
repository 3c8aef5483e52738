//! The authoritative in-memory task list

use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::error::{Result, StorageError};
use super::projection::DisplayProjection;
use super::storage::TaskStorage;
use crate::reminder::{ReminderSink, ReminderWindow};
use crate::task::{IdGenerator, NewTask, Task, TaskId};

/// Called with the fresh projection after every user mutation
type ChangeCallback = Box<dyn Fn(&DisplayProjection) + Send>;

/// What `initialize` / `reload` found in storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadReport {
    /// Nothing stored yet
    Fresh,
    /// Stored tasks loaded
    Restored { count: usize },
    /// Storage could not be read; the store started empty
    Recovered {
        reason: String,
        quarantined: Option<PathBuf>,
    },
}

pub struct TaskStore<S: TaskStorage> {
    storage: S,
    tasks: Vec<Task>,
    ids: IdGenerator,
    window: ReminderWindow,
    /// Reminders that fired but whose latch could not be saved yet
    unsaved_latches: Vec<TaskId>,
    on_change: Option<ChangeCallback>,
}

impl<S: TaskStorage> TaskStore<S> {
    /// Load the stored tasks. Never fails: unreadable storage yields an empty
    /// store and a `LoadReport::Recovered`.
    pub fn initialize(storage: S) -> (Self, LoadReport) {
        let mut store = Self {
            storage,
            tasks: Vec::new(),
            ids: IdGenerator::default(),
            window: ReminderWindow::default(),
            unsaved_latches: Vec::new(),
            on_change: None,
        };
        let report = store.reload();
        (store, report)
    }

    pub fn with_window(mut self, window: ReminderWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_on_change(mut self, callback: impl Fn(&DisplayProjection) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn window(&self) -> ReminderWindow {
        self.window
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Replace the in-memory list with what storage holds now
    pub fn reload(&mut self) -> LoadReport {
        let (mut tasks, report) = match self.storage.load() {
            Ok(tasks) if tasks.is_empty() => (tasks, LoadReport::Fresh),
            Ok(tasks) => {
                let count = tasks.len();
                (tasks, LoadReport::Restored { count })
            }
            Err(err) => (Vec::new(), self.recover(err)),
        };
        apply_latches(&mut tasks, &self.unsaved_latches);

        let mut ids = IdGenerator::seeded(tasks.iter().map(|t| &t.id));
        let repaired = repair_duplicate_ids(&mut tasks, &mut ids);
        self.tasks = tasks;
        self.ids = ids;

        if repaired > 0 {
            warn!("Reassigned {} duplicate task ids", repaired);
            if let Err(e) = self.write(|stored, ids| repair_duplicate_ids(stored, ids) > 0) {
                warn!("Failed to save repaired task ids: {}", e);
            }
        }

        debug!("Loaded task store: {:?}", report);
        report
    }

    fn recover(&self, err: StorageError) -> LoadReport {
        let quarantined = match &err {
            StorageError::Corrupt { .. } => match self.storage.quarantine() {
                Ok(path) => path,
                Err(e) => {
                    warn!("Failed to move corrupt tasks aside: {}", e);
                    None
                }
            },
            _ => None,
        };

        match &quarantined {
            Some(path) => warn!(
                "Could not load tasks ({}); starting empty, old data kept at {}",
                err,
                path.display()
            ),
            None => warn!("Could not load tasks ({}); starting empty", err),
        }

        LoadReport::Recovered {
            reason: err.to_string(),
            quarantined,
        }
    }

    pub fn add_task(&mut self, fields: NewTask) -> Result<&Task> {
        let mut index = 0;
        self.write(|tasks, ids| {
            index = tasks.len();
            tasks.push(Task::new(ids.next_id(), fields));
            true
        })?;
        self.changed();

        let task = &self.tasks[index];
        info!("Added {} task {} ({})", task.kind, task.id, task.priority);
        Ok(task)
    }

    /// Mark a task completed. Returns false when the id is unknown.
    pub fn complete_task(&mut self, id: TaskId) -> Result<bool> {
        let completed = self.write(|tasks, _| match tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.complete();
                true
            }
            None => false,
        })?;

        if completed {
            info!("Completed task {}", id);
            self.changed();
        } else {
            debug!("complete: no task {}", id);
        }
        Ok(completed)
    }

    /// Remove a task. Returns false when the id is unknown.
    pub fn delete_task(&mut self, id: TaskId) -> Result<bool> {
        let deleted = self.write(|tasks, _| {
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            tasks.len() != before
        })?;

        if deleted {
            info!("Deleted task {}", id);
            self.changed();
        } else {
            debug!("delete: no task {}", id);
        }
        Ok(deleted)
    }

    pub fn display_projection(&self) -> DisplayProjection {
        DisplayProjection::from_tasks(&self.tasks)
    }

    /// Fire every pending reminder whose deadline falls inside the window.
    /// Returns the ids that fired.
    ///
    /// When the latches cannot be saved the error is returned, but the fired
    /// tasks stay notified in memory and are saved with the next write.
    pub fn check_reminders(
        &mut self,
        now: NaiveDateTime,
        sink: &dyn ReminderSink,
    ) -> Result<Vec<TaskId>> {
        self.fire_where(now, sink, |_| true)
    }

    /// Like `check_reminders`, limited to the given ids
    pub(crate) fn fire_reminders_for(
        &mut self,
        ids: &[TaskId],
        now: NaiveDateTime,
        sink: &dyn ReminderSink,
    ) -> Result<Vec<TaskId>> {
        self.fire_where(now, sink, |id| ids.contains(&id))
    }

    /// Whether fired reminders are still waiting to be saved
    pub fn has_unsaved_reminders(&self) -> bool {
        !self.unsaved_latches.is_empty()
    }

    /// Retry saving reminder latches an earlier failed write left behind
    pub fn save_pending(&mut self) -> Result<()> {
        if self.unsaved_latches.is_empty() {
            return Ok(());
        }
        let count = self.unsaved_latches.len();
        self.write(|_, _| false)?;
        info!("Saved {} pending reminder latches", count);
        Ok(())
    }

    fn fire_where(
        &mut self,
        now: NaiveDateTime,
        sink: &dyn ReminderSink,
        wanted: impl Fn(TaskId) -> bool,
    ) -> Result<Vec<TaskId>> {
        let window = self.window;
        let mut fired = Vec::new();
        let result = self.write(|tasks, _| {
            for task in tasks.iter_mut().filter(|t| wanted(t.id)) {
                if fire_if_due(task, window, now, sink) {
                    fired.push(task.id);
                }
            }
            !fired.is_empty()
        });

        match result {
            Ok(_) => Ok(fired),
            Err(err) => {
                if !fired.is_empty() {
                    warn!(
                        "Could not save {} reminder latches, will retry: {}",
                        fired.len(),
                        err
                    );
                    apply_latches(&mut self.tasks, &fired);
                    for id in fired {
                        if !self.unsaved_latches.contains(&id) {
                            self.unsaved_latches.push(id);
                        }
                    }
                }
                Err(err)
            }
        }
    }

    /// Run `change` on the stored list under the storage lock and adopt the
    /// result. Returns what `change` returned. Pending reminder latches are
    /// saved along with it.
    fn write<F>(&mut self, change: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<Task>, &mut IdGenerator) -> bool,
    {
        let ids = &mut self.ids;
        let latches = &self.unsaved_latches;
        let mut changed = false;
        let stored = self.storage.update(|tasks| {
            ids.observe(tasks.iter().map(|t| &t.id));
            let latched = apply_latches(tasks, latches);
            changed = change(tasks, ids);
            changed || latched
        })?;

        self.tasks = stored;
        self.unsaved_latches.clear();
        Ok(changed)
    }

    fn changed(&self) {
        if let Some(callback) = &self.on_change {
            callback(&self.display_projection());
        }
    }
}

fn fire_if_due(
    task: &mut Task,
    window: ReminderWindow,
    now: NaiveDateTime,
    sink: &dyn ReminderSink,
) -> bool {
    if !task.awaits_reminder() || !window.contains(task.deadline, now) {
        return false;
    }

    info!("Reminder due for task {}: {}", task.id, task.text);
    sink.on_reminder_fired(task);
    task.mark_notified();
    true
}

/// Mark the listed tasks notified. Returns whether anything changed.
fn apply_latches(tasks: &mut [Task], latches: &[TaskId]) -> bool {
    let mut applied = false;
    for task in tasks.iter_mut() {
        if !task.notified && latches.contains(&task.id) {
            task.mark_notified();
            applied = true;
        }
    }
    applied
}

/// Give every task after the first with a given id a fresh one
fn repair_duplicate_ids(tasks: &mut [Task], ids: &mut IdGenerator) -> usize {
    let mut seen = HashSet::new();
    let mut repaired = 0;
    for task in tasks.iter_mut() {
        if !seen.insert(task.id) {
            task.id = ids.next_id();
            seen.insert(task.id);
            repaired += 1;
        }
    }
    repaired
}
