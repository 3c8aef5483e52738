//! Display ordering for the two task lists

use serde::Serialize;
use std::cmp::Ordering;

use crate::task::{Task, TaskKind};

/// Active tasks split by kind, each list in urgency order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayProjection {
    pub daily: Vec<Task>,
    pub monthly: Vec<Task>,
}

impl DisplayProjection {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut active: Vec<&Task> = tasks.into_iter().filter(|t| t.is_active()).collect();
        // Stable: equal keys keep insertion order
        active.sort_by(|a, b| urgency_order(a, b));

        let mut projection = Self::default();
        for task in active {
            match task.kind {
                TaskKind::Daily => projection.daily.push(task.clone()),
                TaskKind::Monthly => projection.monthly.push(task.clone()),
            }
        }
        projection
    }

    pub fn list(&self, kind: TaskKind) -> &[Task] {
        match kind {
            TaskKind::Daily => &self.daily,
            TaskKind::Monthly => &self.monthly,
        }
    }

    pub fn len(&self) -> usize {
        self.daily.len() + self.monthly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty() && self.monthly.is_empty()
    }
}

/// Higher priority first, then earlier deadline first
pub fn urgency_order(a: &Task, b: &Task) -> Ordering {
    b.priority
        .rank()
        .cmp(&a.priority.rank())
        .then_with(|| a.deadline.cmp(&b.deadline))
}
