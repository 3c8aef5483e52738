//! xtask - Development tasks for chronos

use clap::{Parser, Subcommand};
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for chronos")]
struct Xtask {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the CLI reference from the clap definitions
    GenDocs,
    /// Write the default config.toml to docs/config.sample.toml
    SampleConfig,
}

fn main() {
    let args = Xtask::parse();
    match args.command {
        Commands::GenDocs => generate_cli_docs(),
        Commands::SampleConfig => write_sample_config(),
    }
}

fn generate_cli_docs() {
    let markdown = clap_markdown::help_markdown::<chronos::cli::Cli>();

    let docs_dir = Path::new("docs/cli");
    fs::create_dir_all(docs_dir).expect("Failed to create docs/cli directory");

    let output_path = docs_dir.join("reference.md");
    fs::write(&output_path, markdown).expect("Failed to write CLI reference");

    println!("Generated CLI reference at {}", output_path.display());
}

fn write_sample_config() {
    let sample = chronos::config::sample_config().expect("Failed to render default config");

    let docs_dir = Path::new("docs");
    fs::create_dir_all(docs_dir).expect("Failed to create docs directory");

    let output_path = docs_dir.join("config.sample.toml");
    fs::write(&output_path, sample).expect("Failed to write sample config");

    println!("Wrote sample config to {}", output_path.display());
}
