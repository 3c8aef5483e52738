//! Task data model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::deadline;

/// Task ID: a millisecond timestamp, unique within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl TaskId {
    /// Parse task ID from string
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse().ok().map(Self)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parse priority from text
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Some(Self::Low),
            "medium" | "med" | "m" => Some(Self::Medium),
            "high" | "h" => Some(Self::High),
            _ => None,
        }
    }

    /// Sort rank: high 3, medium 2, low 1
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which list a task is shown in. Has no behavioral effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    #[default]
    Daily,
    Monthly,
}

impl TaskKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Some(Self::Daily),
            "monthly" | "month" | "m" => Some(Self::Monthly),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }

    /// Heading used when the list is rendered
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Daily => "Daily Tasks",
            Self::Monthly => "Monthly Goals",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User-supplied fields for a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub text: String,
    pub priority: Priority,
    pub deadline: NaiveDateTime,
    pub kind: TaskKind,
}

impl NewTask {
    pub fn new(
        text: impl Into<String>,
        priority: Priority,
        deadline: NaiveDateTime,
        kind: TaskKind,
    ) -> Self {
        Self {
            text: text.into(),
            priority,
            deadline,
            kind,
        }
    }
}

/// A task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    pub text: String,

    pub priority: Priority,

    /// Local wall-clock deadline, no timezone attached
    #[serde(with = "deadline::serde_local")]
    pub deadline: NaiveDateTime,

    #[serde(rename = "type")]
    pub kind: TaskKind,

    #[serde(default)]
    pub completed: bool,

    /// Set once the reminder has fired; never reset
    #[serde(default)]
    pub notified: bool,
}

impl Task {
    pub fn new(id: TaskId, fields: NewTask) -> Self {
        Self {
            id,
            text: fields.text,
            priority: fields.priority,
            deadline: fields.deadline,
            kind: fields.kind,
            completed: false,
            notified: false,
        }
    }

    /// Shown in the lists
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Still eligible for a reminder
    pub fn awaits_reminder(&self) -> bool {
        !self.completed && !self.notified
    }

    pub fn complete(&mut self) {
        self.completed = true;
    }

    pub fn mark_notified(&mut self) {
        self.notified = true;
    }

    /// Deadline formatted for display
    pub fn due_label(&self) -> String {
        deadline::display(&self.deadline)
    }
}
