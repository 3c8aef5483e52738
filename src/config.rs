//! User configuration management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::reminder::ReminderWindow;
use crate::sound::SoundConfig;
use crate::store::{get_app_dir, DEFAULT_PROFILE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_profile")]
    pub default_profile: String,

    #[serde(default)]
    pub reminder: ReminderConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub sound: SoundConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: default_profile(),
            reminder: ReminderConfig::default(),
            notifications: NotificationConfig::default(),
            sound: SoundConfig::default(),
        }
    }
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: u32,

    #[serde(default = "default_grace_minutes")]
    pub grace_minutes: u32,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            lead_minutes: default_lead_minutes(),
            grace_minutes: default_grace_minutes(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

fn default_lead_minutes() -> u32 {
    15
}

fn default_grace_minutes() -> u32 {
    60
}

fn default_poll_interval() -> u64 {
    60
}

impl ReminderConfig {
    pub fn window(&self) -> ReminderWindow {
        ReminderWindow::new(
            chrono::Duration::minutes(i64::from(self.lead_minutes)),
            chrono::Duration::minutes(i64::from(self.grace_minutes)),
        )
    }

    /// Poll period, never shorter than one second
    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

pub fn config_path() -> Result<PathBuf> {
    Ok(get_app_dir()?.join("config.toml"))
}

impl Config {
    /// Load the config file, falling back to defaults when it is missing
    pub fn load() -> Result<Self> {
        Ok(load_config()?.unwrap_or_default())
    }

    /// Profile to use when none is given on the command line
    pub fn profile_or_default(&self, profile: Option<&str>) -> String {
        match profile {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => self.default_profile.clone(),
        }
    }
}

pub fn load_config() -> Result<Option<Config>> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(Some(config))
}

pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path()?;
    let content = toml::to_string_pretty(config)?;
    fs::write(&path, content)?;
    Ok(())
}

/// The default config rendered as TOML
pub fn sample_config() -> Result<String> {
    Ok(toml::to_string_pretty(&Config::default())?)
}
