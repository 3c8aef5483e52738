//! Task store: persistence, in-memory state and the display projection

pub mod error;
pub mod projection;
pub mod storage;
pub mod task_store;

pub use error::StorageError;
pub use projection::DisplayProjection;
pub use storage::{JsonFileStorage, MemoryStorage, TaskStorage};
pub use task_store::{LoadReport, TaskStore};

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_PROFILE: &str = "default";

const APP_DIR_ENV: &str = "CHRONOS_HOME";

/// Root directory for config, profiles and sounds
pub fn get_app_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(APP_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => default_app_dir()?,
    };

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

#[cfg(target_os = "linux")]
fn default_app_dir() -> Result<PathBuf> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Cannot find config directory"))?;
    Ok(config_dir.join("chronos"))
}

#[cfg(not(target_os = "linux"))]
fn default_app_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?;
    Ok(home.join(".chronos"))
}

pub fn get_profile_dir(profile: &str) -> Result<PathBuf> {
    let dir = get_app_dir()?.join("profiles").join(profile);
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

pub fn list_profiles() -> Result<Vec<String>> {
    let profiles_dir = get_app_dir()?.join("profiles");
    if !profiles_dir.exists() {
        return Ok(Vec::new());
    }

    let mut profiles = Vec::new();
    for entry in fs::read_dir(&profiles_dir)?.flatten() {
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                profiles.push(name.to_string());
            }
        }
    }
    profiles.sort();
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn test_app_dir_env_override() -> Result<()> {
        let temp = tempdir()?;
        let root = temp.path().join("chronos-home");
        std::env::set_var(APP_DIR_ENV, &root);

        let dir = get_app_dir()?;
        assert_eq!(dir, root);
        assert!(dir.exists());

        std::env::remove_var(APP_DIR_ENV);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_list_profiles_sorted() -> Result<()> {
        let temp = tempdir()?;
        std::env::set_var(APP_DIR_ENV, temp.path());

        assert!(list_profiles()?.is_empty());

        get_profile_dir("work")?;
        get_profile_dir("home")?;
        assert_eq!(list_profiles()?, vec!["home".to_string(), "work".to_string()]);

        std::env::remove_var(APP_DIR_ENV);
        Ok(())
    }
}
