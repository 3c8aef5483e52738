//! `chronos done` command implementation

use anyhow::Result;
use chrono::Local;
use clap::Args;

use super::list::render_board;
use crate::config::Config;

#[derive(Args)]
pub struct DoneArgs {
    /// Task ID (as shown by `chronos list`)
    id: String,
}

pub async fn run(profile: &str, config: &Config, args: DoneArgs) -> Result<()> {
    let id = super::parse_task_id(&args.id)?;
    let today = Local::now().date_naive();
    let mut store = super::open_store(profile, config)?
        .with_on_change(move |projection| print!("{}", render_board(projection, today)));

    if store.complete_task(id)? {
        println!("\n✓ Completed task {}", id);
    } else {
        println!("No task with id {} in profile '{}'.", id, store.storage().profile());
    }
    Ok(())
}
