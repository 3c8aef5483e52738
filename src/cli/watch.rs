//! `chronos watch` command implementation

use anyhow::Result;
use clap::Args;
use std::time::Duration;
use tracing::info;

use super::check::{console_sink, dispatcher_for};
use crate::config::Config;
use crate::reminder::ReminderPoller;

#[derive(Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (overrides config)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Only print reminders; no desktop notification or alarm
    #[arg(long)]
    quiet: bool,
}

pub async fn run(profile: &str, config: &Config, args: WatchArgs) -> Result<()> {
    let store = super::open_store(profile, config)?;
    let period = match args.interval {
        Some(secs) => Duration::from_secs(secs.max(1)),
        None => config.reminder.poll_period(),
    };

    let sink = console_sink(dispatcher_for(config, args.quiet));
    let poller = ReminderPoller::new(store, Box::new(sink)).with_period(period);

    println!(
        "Watching profile '{}' for reminders. Press Ctrl-C to stop.",
        poller.store().storage().profile()
    );

    poller
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                info!("Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    println!("Stopped watching.");
    Ok(())
}
