//! `chronos sounds` subcommands implementation

use anyhow::Result;
use clap::Subcommand;

use crate::sound;

#[derive(Subcommand)]
pub enum SoundsCommands {
    /// List installed alarm sounds
    #[command(alias = "ls")]
    List,

    /// Test a sound by playing it
    Test {
        /// Sound file name (without extension)
        name: String,
    },
}

pub async fn run(command: SoundsCommands) -> Result<()> {
    match command {
        SoundsCommands::List => list_sounds(),
        SoundsCommands::Test { name } => test_sound(&name),
    }
}

fn list_sounds() -> Result<()> {
    let sounds = sound::list_available_sounds();
    let dir = sound::get_sounds_dir();

    if sounds.is_empty() {
        println!("No sounds installed yet.");
        if let Some(dir) = dir {
            println!("\nCopy .wav or .ogg files into {}", dir.display());
        }
        return Ok(());
    }

    println!("Installed sounds:");
    for sound_name in &sounds {
        println!("  • {}", sound_name);
    }
    println!("\nTotal: {} sounds", sounds.len());

    if let Some(dir) = dir {
        println!("Location: {}", dir.display());
    }
    println!("\nTest a sound: chronos sounds test <name>");

    Ok(())
}

fn test_sound(name: &str) -> Result<()> {
    let sounds = sound::list_available_sounds();

    if !sounds.iter().any(|s| s == name) {
        println!("Sound '{}' not found.", name);
        if !sounds.is_empty() {
            println!("\nAvailable sounds:");
            for sound_name in sounds {
                println!("  • {}", sound_name);
            }
        }
        return Ok(());
    }

    print!("Playing '{}'... ", name);
    std::io::Write::flush(&mut std::io::stdout())?;

    match sound::play_sound_blocking(name) {
        Ok(()) => {
            println!("✓");
            Ok(())
        }
        Err(e) => {
            println!("✗");
            if cfg!(target_os = "linux") {
                eprintln!("Make sure aplay (alsa-utils) or paplay (pulseaudio-utils) is installed.");
            }
            Err(e.into())
        }
    }
}
