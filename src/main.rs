//! Chronos - daily and monthly task tracking with deadline reminders

use anyhow::Result;
use chronos::cli::{self, Cli, Commands};
use chronos::config::Config;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

fn init_logging(daemon: bool) {
    let filter = if std::env::var("CHRONOS_DEBUG").is_ok() {
        "chronos=debug"
    } else if daemon {
        "chronos=info"
    } else {
        "chronos=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(matches!(cli.command, Commands::Watch(_)));

    // Commands that don't need the app directory
    match cli.command {
        Commands::Completion { shell } => {
            generate(shell, &mut Cli::command(), "chronos", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Sounds { command } => return cli::sounds::run(command).await,
        _ => {}
    }

    let config = Config::load()?;
    let profile = config.profile_or_default(cli.profile.as_deref());

    match cli.command {
        Commands::Add(args) => cli::add::run(&profile, &config, args).await,
        Commands::List(args) => cli::list::run(&profile, &config, args).await,
        Commands::Done(args) => cli::done::run(&profile, &config, args).await,
        Commands::Rm(args) => cli::remove::run(&profile, &config, args).await,
        Commands::Check(args) => cli::check::run(&profile, &config, args).await,
        Commands::Watch(args) => cli::watch::run(&profile, &config, args).await,
        Commands::Completion { .. } | Commands::Sounds { .. } => Ok(()),
    }
}
