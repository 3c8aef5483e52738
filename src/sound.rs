//! Alarm sounds for reminders
//!
//! Users place .wav/.ogg files in the sounds directory:
//!   - Linux: ~/.config/chronos/sounds/
//!   - macOS: ~/.chronos/sounds/
//!
//! The alarm is either a specific file (by name, without extension) or a
//! random pick among the installed files.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::alert::{Alarm, AlertError};
use crate::store::get_app_dir;

/// How to select which sound file to play
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SoundMode {
    /// Pick a random sound from available files
    #[default]
    Random,
    /// Always play a specific sound file (by name, without extension)
    Specific(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub mode: SoundMode,

    /// Sound to play for reminders (overrides mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm: Option<String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: SoundMode::default(),
            alarm: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Get the directory where sound files are stored
pub fn get_sounds_dir() -> Option<PathBuf> {
    get_app_dir().ok().map(|d| d.join("sounds"))
}

/// List available sound files (names without extensions)
pub fn list_available_sounds() -> Vec<String> {
    match get_sounds_dir() {
        Some(dir) => list_sounds_in(&dir),
        None => Vec::new(),
    }
}

fn list_sounds_in(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut sounds = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("ogg") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    sounds.push(stem.to_string());
                }
            }
        }
    }
    sounds.sort();
    sounds.dedup();
    sounds
}

/// Find the full path for a sound by name (checks .wav then .ogg)
fn find_sound_file(name: &str) -> Option<PathBuf> {
    find_sound_in(&get_sounds_dir()?, name)
}

fn find_sound_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let wav = dir.join(format!("{name}.wav"));
    if wav.exists() {
        return Some(wav);
    }
    let ogg = dir.join(format!("{name}.ogg"));
    if ogg.exists() {
        return Some(ogg);
    }
    None
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "macos")] {
        /// Player command for a sound file
        fn player_command(path: &Path) -> Command {
            let mut cmd = Command::new("afplay");
            cmd.arg(path);
            cmd
        }
    } else {
        /// Player command for a sound file. paplay (PulseAudio) handles ogg,
        /// aplay (ALSA) only wav.
        fn player_command(path: &Path) -> Command {
            let is_ogg = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ogg"));
            let mut cmd = Command::new(if is_ogg { "paplay" } else { "aplay" });
            cmd.arg(path);
            cmd
        }
    }
}

fn run_player(path: &Path) -> Result<(), AlertError> {
    let mut cmd = player_command(path);
    let program = cmd.get_program().to_string_lossy().to_string();

    let output = cmd
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| AlertError::ToolMissing {
            tool: program.clone(),
            source,
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(AlertError::ToolFailed {
            tool: program,
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Play a sound file by name (fire-and-forget, non-blocking)
pub fn play_sound(name: &str) -> Result<(), AlertError> {
    let path = find_sound_file(name).ok_or_else(|| AlertError::SoundNotFound(name.to_string()))?;
    debug!("Playing sound {} from {}", name, path.display());

    std::thread::spawn(move || {
        if let Err(e) = run_player(&path) {
            warn!("Alarm playback failed: {}", e);
        }
    });
    Ok(())
}

/// Play a sound file by name and wait for the player to finish
pub fn play_sound_blocking(name: &str) -> Result<(), AlertError> {
    let path = find_sound_file(name).ok_or_else(|| AlertError::SoundNotFound(name.to_string()))?;
    run_player(&path)
}

/// Resolve which sound name to play for the given config
fn resolve_sound_name(config: &SoundConfig, available: &[String]) -> Option<String> {
    if let Some(name) = config.alarm.as_deref() {
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }

    match &config.mode {
        SoundMode::Specific(name) => Some(name.clone()),
        SoundMode::Random => available.choose(&mut rand::rng()).cloned(),
    }
}

/// Reminder alarm backed by the sounds directory
#[derive(Debug, Clone, Default)]
pub struct SoundAlarm {
    config: SoundConfig,
}

impl SoundAlarm {
    pub fn new(config: SoundConfig) -> Self {
        Self { config }
    }
}

impl Alarm for SoundAlarm {
    fn play(&self) -> Result<(), AlertError> {
        if !self.config.enabled {
            return Ok(());
        }

        let name = resolve_sound_name(&self.config, &list_available_sounds())
            .ok_or(AlertError::NoSounds)?;
        play_sound(&name)
    }
}
