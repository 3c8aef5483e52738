//! Task ID allocation

use chrono::Utc;

use super::TaskId;

/// Hands out millisecond-timestamp ids that never repeat.
///
/// Two tasks created within the same millisecond (or after the clock steps
/// backwards) get consecutive ids instead of colliding.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Seed from the ids already present so new ids sort after them
    pub fn seeded<'a>(existing: impl IntoIterator<Item = &'a TaskId>) -> Self {
        let last = existing.into_iter().map(|id| id.0).max().unwrap_or(0);
        Self { last }
    }

    /// Make sure later ids sort after `existing` too
    pub fn observe<'a>(&mut self, existing: impl IntoIterator<Item = &'a TaskId>) {
        if let Some(max) = existing.into_iter().map(|id| id.0).max() {
            self.last = self.last.max(max);
        }
    }

    pub fn next_id(&mut self) -> TaskId {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&mut self, now_ms: i64) -> TaskId {
        self.last = now_ms.max(self.last.saturating_add(1));
        TaskId(self.last)
    }
}
