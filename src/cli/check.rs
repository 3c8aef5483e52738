//! `chronos check` command implementation

use anyhow::Result;
use chrono::Local;
use clap::Args;

use crate::alert::{reminder_message, AlertDispatcher};
use crate::config::Config;
use crate::reminder::ReminderSink;
use crate::task::Task;

#[derive(Args)]
pub struct CheckArgs {
    /// Only print reminders; no desktop notification or alarm
    #[arg(long)]
    quiet: bool,
}

/// Print each reminder, then hand it to the alert dispatcher if any
pub(crate) fn console_sink(dispatcher: Option<AlertDispatcher>) -> impl Fn(&Task) {
    move |task: &Task| {
        let (title, body) = reminder_message(task);
        println!("⏰ {} - {}", title, body);
        if let Some(dispatcher) = &dispatcher {
            dispatcher.on_reminder_fired(task);
        }
    }
}

pub(crate) fn dispatcher_for(config: &Config, quiet: bool) -> Option<AlertDispatcher> {
    if quiet {
        return None;
    }
    let mut dispatcher = AlertDispatcher::from_config(config);
    dispatcher.request_permission();
    Some(dispatcher)
}

pub async fn run(profile: &str, config: &Config, args: CheckArgs) -> Result<()> {
    let mut store = super::open_store(profile, config)?;
    let sink = console_sink(dispatcher_for(config, args.quiet));

    let fired = store.check_reminders(Local::now().naive_local(), &sink)?;
    if fired.is_empty() {
        println!("No reminders due.");
    }
    Ok(())
}
