//! `chronos list` command implementation

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;

use super::{pad, truncate};
use crate::config::Config;
use crate::store::DisplayProjection;
use crate::task::{Task, TaskKind};

const TABLE_COL_ID: usize = 14;
const TABLE_COL_PRIORITY: usize = 7;
const TABLE_COL_DUE: usize = 17;
const TABLE_COL_TEXT: usize = 40;

#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn table_header(out: &mut String) {
    out.push_str(&format!(
        "{} {} {} TASK\n",
        pad("ID", TABLE_COL_ID),
        pad("PRI", TABLE_COL_PRIORITY),
        pad("DUE", TABLE_COL_DUE),
    ));
    let width = TABLE_COL_ID + TABLE_COL_PRIORITY + TABLE_COL_DUE + TABLE_COL_TEXT + 3;
    out.push_str(&"-".repeat(width));
    out.push('\n');
}

fn table_row(out: &mut String, task: &Task) {
    out.push_str(&format!(
        "{} {} {} {}\n",
        pad(&task.id.to_string(), TABLE_COL_ID),
        pad(task.priority.label(), TABLE_COL_PRIORITY),
        pad(&task.due_label(), TABLE_COL_DUE),
        truncate(&task.text, TABLE_COL_TEXT),
    ));
}

/// The date header followed by one table per task kind
pub fn render_board(projection: &DisplayProjection, today: NaiveDate) -> String {
    let mut out = format!("{}\n", today.format("%A, %B %-d, %Y"));

    for kind in [TaskKind::Daily, TaskKind::Monthly] {
        out.push_str(&format!("\n{}\n", kind.heading()));
        let tasks = projection.list(kind);
        if tasks.is_empty() {
            out.push_str("  (nothing here)\n");
            continue;
        }
        table_header(&mut out);
        for task in tasks {
            table_row(&mut out, task);
        }
    }
    out
}

pub async fn run(profile: &str, config: &Config, args: ListArgs) -> Result<()> {
    let store = super::open_store(profile, config)?;
    let projection = store.display_projection();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&projection)?);
        return Ok(());
    }

    print!("{}", render_board(&projection, Local::now().date_naive()));
    println!(
        "\nProfile: {}  Active: {}",
        store.storage().profile(),
        projection.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, Priority, TaskId};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn task(id: i64, text: &str, priority: Priority, hour: u32, kind: TaskKind) -> Task {
        let deadline = date().and_hms_opt(hour, 0, 0).unwrap();
        Task::new(TaskId(id), NewTask::new(text, priority, deadline, kind))
    }

    #[test]
    fn test_render_board_sections_in_order() {
        let tasks = vec![
            task(1, "water plants", Priority::Low, 9, TaskKind::Daily),
            task(2, "ship release", Priority::High, 17, TaskKind::Daily),
            task(3, "read two books", Priority::Medium, 23, TaskKind::Monthly),
        ];
        let board = render_board(&DisplayProjection::from_tasks(&tasks), date());

        assert!(board.starts_with("Monday, October 19, 2026\n"));
        let daily = board.find("Daily Tasks").unwrap();
        let monthly = board.find("Monthly Goals").unwrap();
        let ship = board.find("ship release").unwrap();
        let water = board.find("water plants").unwrap();
        let books = board.find("read two books").unwrap();
        assert!(daily < ship && ship < water && water < monthly);
        assert!(monthly < books);
    }

    #[test]
    fn test_render_board_hides_completed() {
        let mut done = task(1, "finished", Priority::High, 9, TaskKind::Daily);
        done.complete();
        let board = render_board(&DisplayProjection::from_tasks(&[done]), date());
        assert!(!board.contains("finished"));
        assert_eq!(board.matches("(nothing here)").count(), 2);
    }

    #[test]
    fn test_row_shows_due_and_priority() {
        let mut out = String::new();
        table_row(&mut out, &task(7, "call mom", Priority::High, 18, TaskKind::Daily));
        assert!(out.starts_with("7 "));
        assert!(out.contains("high"));
        assert!(out.contains("2026-10-19 18:00"));
        assert!(out.trim_end().ends_with("call mom"));
    }

    #[test]
    fn test_table_header_layout() {
        let mut out = String::new();
        table_header(&mut out);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ID "));
        assert!(lines[0].ends_with("TASK"));
        assert_eq!(lines[1], "-".repeat(81));
        assert!(out.ends_with('\n'));
    }
}
