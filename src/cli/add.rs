//! `chronos add` command implementation

use anyhow::Result;
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use clap::Args;

use super::list::render_board;
use crate::config::Config;
use crate::task::{deadline, NewTask, Priority, TaskKind};

#[derive(Args)]
pub struct AddArgs {
    /// What needs doing
    text: String,

    /// Priority (low, medium, high)
    #[arg(short, long, default_value = "medium", value_parser = parse_priority)]
    priority: Priority,

    /// Deadline: "YYYY-MM-DD HH:MM", "HH:MM", "YYYY-MM-DD" or "+30m"/"+2h"/"+1d"
    /// (defaults to one hour from now)
    #[arg(short, long)]
    deadline: Option<String>,

    /// Task kind (daily, monthly)
    #[arg(short, long, default_value = "daily", value_parser = parse_kind)]
    kind: TaskKind,
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("unknown priority '{s}' (low, medium, high)"))
}

fn parse_kind(s: &str) -> Result<TaskKind, String> {
    TaskKind::parse(s).ok_or_else(|| format!("unknown kind '{s}' (daily, monthly)"))
}

/// Default deadline: one hour from now, on the minute
fn default_deadline(now: NaiveDateTime) -> NaiveDateTime {
    let deadline = now + Duration::hours(1);
    deadline
        .with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(deadline)
}

fn resolve_deadline(input: Option<&str>, now: NaiveDateTime) -> Result<NaiveDateTime> {
    match input {
        Some(input) => Ok(deadline::parse_input(input, now)?),
        None => Ok(default_deadline(now)),
    }
}

pub async fn run(profile: &str, config: &Config, args: AddArgs) -> Result<()> {
    let now = Local::now().naive_local();
    let due = resolve_deadline(args.deadline.as_deref(), now)?;

    let today = now.date();
    let mut store = super::open_store(profile, config)?
        .with_on_change(move |projection| print!("{}", render_board(projection, today)));

    let task = store.add_task(NewTask::new(args.text, args.priority, due, args.kind))?;

    println!(
        "\n✓ Added {} task {} (due {})",
        task.kind,
        task.id,
        task.due_label()
    );
    if due < now {
        println!("  Note: that deadline has already passed.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 1)
            .unwrap()
            .and_hms_milli_opt(8, 12, 45, 300)
            .unwrap()
    }

    #[test]
    fn test_default_deadline_is_an_hour_out() {
        let expected = NaiveDate::from_ymd_opt(2026, 5, 1)
            .unwrap()
            .and_hms_opt(9, 12, 0)
            .unwrap();
        assert_eq!(default_deadline(now()), expected);
        assert_eq!(resolve_deadline(None, now()).unwrap(), expected);
    }

    #[test]
    fn test_resolve_explicit_deadline() {
        let due = resolve_deadline(Some("2026-05-03 17:30"), now()).unwrap();
        assert_eq!(due.to_string(), "2026-05-03 17:30:00");
        assert!(resolve_deadline(Some("next tuesday"), now()).is_err());
    }

    #[test]
    fn test_value_parsers() {
        assert_eq!(parse_priority("HIGH"), Ok(Priority::High));
        assert!(parse_priority("urgent").is_err());
        assert_eq!(parse_kind("monthly"), Ok(TaskKind::Monthly));
        assert!(parse_kind("weekly").is_err());
    }
}
