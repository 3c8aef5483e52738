//! CLI command implementations

pub mod add;
pub mod check;
pub mod definition;
pub mod done;
pub mod list;
pub mod remove;
pub mod sounds;
pub mod watch;

pub use definition::{Cli, Commands};

use anyhow::{anyhow, Result};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::Config;
use crate::store::{JsonFileStorage, LoadReport, TaskStore};
use crate::task::TaskId;

/// Open the profile's task store with the configured reminder window
pub fn open_store(profile: &str, config: &Config) -> Result<TaskStore<JsonFileStorage>> {
    let storage = JsonFileStorage::new(profile)?;
    let (store, report) = TaskStore::initialize(storage);

    if let LoadReport::Recovered { reason, quarantined } = &report {
        eprintln!("Warning: could not read saved tasks ({}).", reason);
        if let Some(path) = quarantined {
            eprintln!("The unreadable file was kept at {}", path.display());
        }
    }

    Ok(store.with_window(config.reminder.window()))
}

pub fn parse_task_id(s: &str) -> Result<TaskId> {
    TaskId::parse(s).ok_or_else(|| anyhow!("Invalid task id: {}", s))
}

/// Truncate to at most `max` display columns
pub fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }

    let (budget, ellipsis) = if max <= 3 { (max, "") } else { (max - 3, "...") };
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(ellipsis);
    out
}

/// Left-align to `width` display columns
pub fn pad(s: &str, width: usize) -> String {
    let w = s.width();
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}
