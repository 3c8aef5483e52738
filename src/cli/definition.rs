//! Command-line interface definition

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use super::add::AddArgs;
use super::check::CheckArgs;
use super::done::DoneArgs;
use super::list::ListArgs;
use super::remove::RemoveArgs;
use super::sounds::SoundsCommands;
use super::watch::WatchArgs;

/// Chronos - daily and monthly tasks with deadline reminders
#[derive(Parser)]
#[command(name = "chronos", version, about, long_about = None)]
pub struct Cli {
    /// Profile to use (defaults to the configured default profile)
    #[arg(short = 'P', long, global = true, env = "CHRONOS_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task
    Add(AddArgs),

    /// Show active tasks, most urgent first
    #[command(alias = "ls")]
    List(ListArgs),

    /// Mark a task as completed
    Done(DoneArgs),

    /// Delete a task
    #[command(alias = "remove")]
    Rm(RemoveArgs),

    /// Fire any reminders that are due right now
    Check(CheckArgs),

    /// Run the reminder daemon until interrupted
    Watch(WatchArgs),

    /// Manage alarm sounds
    Sounds {
        #[command(subcommand)]
        command: SoundsCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
