//! Task storage - JSON file persistence
//!
//! The whole task list is written as one JSON array after every mutation and
//! read back wholesale on start-up.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;
use tracing::{debug, warn};

use super::error::{Result, StorageError};
use super::{get_profile_dir, DEFAULT_PROFILE};
use crate::task::Task;

const TASKS_FILE: &str = "tasks.json";

/// Identifies one version of the stored blob, used to notice writes made by
/// another process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    Modified { at: SystemTime, len: u64 },
    Generation(u64),
}

/// Backend the task store persists through
pub trait TaskStorage {
    /// Read every stored task. Missing or blank storage is an empty list.
    fn load(&self) -> Result<Vec<Task>>;

    /// Replace the stored list
    fn save(&self, tasks: &[Task]) -> Result<()>;

    /// Load, apply `change` and save as one step, so a concurrent writer
    /// cannot slip in between. Saves only when `change` returns true.
    /// Returns the list as stored afterwards.
    fn update<F>(&self, change: F) -> Result<Vec<Task>>
    where
        F: FnOnce(&mut Vec<Task>) -> bool,
    {
        let mut tasks = self.load()?;
        if change(&mut tasks) {
            self.save(&tasks)?;
        }
        Ok(tasks)
    }

    /// Move an unreadable blob aside. Returns where it went, if anywhere.
    fn quarantine(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    /// Current revision of the stored blob, `None` when nothing is stored.
    fn revision(&self) -> Option<Revision> {
        None
    }
}

pub struct JsonFileStorage {
    profile: String,
    tasks_path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(profile: &str) -> anyhow::Result<Self> {
        let profile_name = if profile.is_empty() {
            DEFAULT_PROFILE.to_string()
        } else {
            profile.to_string()
        };

        let profile_dir = get_profile_dir(&profile_name)?;
        let tasks_path = profile_dir.join(TASKS_FILE);

        Ok(Self {
            profile: profile_name,
            tasks_path,
        })
    }

    /// Storage backed by an explicit file, outside any profile
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            profile: DEFAULT_PROFILE.to_string(),
            tasks_path: path.into(),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn path(&self) -> &Path {
        &self.tasks_path
    }

    fn backup_path(&self) -> PathBuf {
        self.tasks_path.with_extension("json.bak")
    }

    fn corrupt_path(&self) -> PathBuf {
        self.tasks_path.with_extension("json.corrupt")
    }

    fn lock(&self, exclusive: bool) -> Result<File> {
        let lock_path = self.tasks_path.with_extension("json.lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)?;

        let locked = if exclusive {
            FileExt::lock_exclusive(&file)
        } else {
            FileExt::lock_shared(&file)
        };
        locked.map_err(|source| StorageError::Lock {
            path: lock_path,
            source,
        })?;

        // Released when the handle drops
        Ok(file)
    }
}

impl JsonFileStorage {
    fn read_unlocked(&self) -> Result<Vec<Task>> {
        if !self.tasks_path.exists() {
            return Ok(Vec::new());
        }

        // Raw bytes: invalid UTF-8 is corrupt data, not an I/O failure
        let content = fs::read(&self.tasks_path)?;
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&content).map_err(|source| StorageError::Corrupt {
            path: self.tasks_path.clone(),
            source,
        })
    }

    fn write_unlocked(&self, tasks: &[Task]) -> Result<()> {
        let dir = match self.tasks_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        if self.tasks_path.exists() {
            if let Err(e) = fs::copy(&self.tasks_path, self.backup_path()) {
                warn!("Failed to create backup: {}", e);
            }
        }

        let content = serde_json::to_string_pretty(tasks).map_err(StorageError::Serialize)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.tasks_path).map_err(|e| e.error)?;

        debug!("Saved {} tasks to {}", tasks.len(), self.tasks_path.display());
        Ok(())
    }
}

impl TaskStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Task>> {
        if !self.tasks_path.exists() {
            return Ok(Vec::new());
        }

        let _guard = self.lock(false)?;
        self.read_unlocked()
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        let _guard = self.lock(true)?;
        self.write_unlocked(tasks)
    }

    fn update<F>(&self, change: F) -> Result<Vec<Task>>
    where
        F: FnOnce(&mut Vec<Task>) -> bool,
    {
        let _guard = self.lock(true)?;
        let mut tasks = self.read_unlocked()?;
        if change(&mut tasks) {
            self.write_unlocked(&tasks)?;
        }
        Ok(tasks)
    }

    fn quarantine(&self) -> Result<Option<PathBuf>> {
        if !self.tasks_path.exists() {
            return Ok(None);
        }

        let _guard = self.lock(true)?;
        let target = self.corrupt_path();
        fs::rename(&self.tasks_path, &target)?;
        Ok(Some(target))
    }

    fn revision(&self) -> Option<Revision> {
        let meta = fs::metadata(&self.tasks_path).ok()?;
        let at = meta.modified().ok()?;
        Some(Revision::Modified {
            at,
            len: meta.len(),
        })
    }
}

/// In-memory storage holding the serialized blob. Clones share the blob.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryBlob>>,
}

#[derive(Debug, Default)]
struct MemoryBlob {
    raw: Option<String>,
    generation: u64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with an arbitrary blob
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.replace_raw(raw);
        storage
    }

    /// Overwrite the blob as another writer would
    pub fn replace_raw(&self, raw: impl Into<String>) {
        let mut blob = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        blob.raw = Some(raw.into());
        blob.generation += 1;
    }

    pub fn raw(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .raw
            .clone()
    }
}

impl MemoryBlob {
    fn parse(&self) -> Result<Vec<Task>> {
        match self.raw.as_deref() {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(raw).map_err(|source| StorageError::Corrupt {
                path: PathBuf::from("<memory>"),
                source,
            }),
        }
    }

    fn store(&mut self, tasks: &[Task]) -> Result<()> {
        self.raw = Some(serde_json::to_string(tasks).map_err(StorageError::Serialize)?);
        self.generation += 1;
        Ok(())
    }
}

impl TaskStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Task>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .parse()
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .store(tasks)
    }

    fn update<F>(&self, change: F) -> Result<Vec<Task>>
    where
        F: FnOnce(&mut Vec<Task>) -> bool,
    {
        let mut blob = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut tasks = blob.parse()?;
        if change(&mut tasks) {
            blob.store(&tasks)?;
        }
        Ok(tasks)
    }

    fn quarantine(&self) -> Result<Option<PathBuf>> {
        let mut blob = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        blob.raw = None;
        blob.generation += 1;
        Ok(None)
    }

    fn revision(&self) -> Option<Revision> {
        let blob = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        blob.raw.as_ref().map(|_| Revision::Generation(blob.generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, Priority, TaskId, TaskKind};
    use chrono::NaiveDate;
    use serial_test::serial;
    use tempfile::tempdir;

    fn task(id: i64, text: &str) -> Task {
        let deadline = NaiveDate::from_ymd_opt(2026, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Task::new(
            TaskId(id),
            NewTask::new(text, Priority::Medium, deadline, TaskKind::Daily),
        )
    }

    #[test]
    fn test_storage_roundtrip() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));

        storage.save(&[task(1, "test1"), task(2, "test2")])?;
        let loaded = storage.load()?;

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "test1");
        assert_eq!(loaded[1].text, "test2");
        Ok(())
    }

    #[test]
    #[serial]
    fn test_storage_new_with_empty_profile() -> anyhow::Result<()> {
        let temp = tempdir()?;
        std::env::set_var("CHRONOS_HOME", temp.path());

        let storage = JsonFileStorage::new("")?;
        assert_eq!(storage.profile(), "default");
        assert!(storage.path().ends_with("profiles/default/tasks.json"));

        std::env::remove_var("CHRONOS_HOME");
        Ok(())
    }

    #[test]
    #[serial]
    fn test_storage_profiles_are_isolated() -> anyhow::Result<()> {
        let temp = tempdir()?;
        std::env::set_var("CHRONOS_HOME", temp.path());

        let alpha = JsonFileStorage::new("profile-alpha")?;
        let beta = JsonFileStorage::new("profile-beta")?;
        assert_eq!(alpha.profile(), "profile-alpha");
        assert_ne!(alpha.path(), beta.path());

        std::env::remove_var("CHRONOS_HOME");
        Ok(())
    }

    #[test]
    fn test_storage_load_nonexistent_file() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));
        assert!(storage.load()?.is_empty());
        assert!(storage.revision().is_none());
        Ok(())
    }

    #[test]
    fn test_storage_load_whitespace_only_file() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));
        fs::write(storage.path(), "   \n  \t  ")?;

        assert!(storage.load()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_storage_load_invalid_json_is_corrupt() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));
        fs::write(storage.path(), "{ invalid json }")?;

        let result = storage.load();
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
        Ok(())
    }

    #[test]
    fn test_storage_load_invalid_utf8_is_corrupt() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));
        fs::write(storage.path(), b"[{\"id\":1,\"text\":\"precious \xff\xfe\"}]")?;

        let result = storage.load();
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
        Ok(())
    }

    #[test]
    fn test_storage_update_applies_change() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));
        storage.save(&[task(1, "a")])?;

        let stored = storage.update(|tasks| {
            tasks.push(task(2, "b"));
            true
        })?;
        assert_eq!(stored.len(), 2);
        assert_eq!(storage.load()?, stored);
        Ok(())
    }

    #[test]
    fn test_storage_update_without_change_does_not_write() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));

        let stored = storage.update(|_| false)?;
        assert!(stored.is_empty());
        assert!(!storage.path().exists());
        Ok(())
    }

    #[test]
    fn test_storage_update_refuses_unreadable_file() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));
        fs::write(storage.path(), "{ invalid json }")?;

        let result = storage.update(|tasks| {
            tasks.push(task(1, "would clobber"));
            true
        });
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
        assert_eq!(fs::read_to_string(storage.path())?, "{ invalid json }");
        assert!(!storage.backup_path().exists());
        Ok(())
    }

    #[test]
    fn test_storage_save_creates_backup() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));

        storage.save(&[task(1, "first save")])?;
        storage.save(&[task(2, "second save")])?;

        let backup_content = fs::read_to_string(storage.backup_path())?;
        assert!(backup_content.contains("first save"));
        assert!(!backup_content.contains("second save"));
        Ok(())
    }

    #[test]
    fn test_storage_save_empty_array() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));
        storage.save(&[])?;

        let content = fs::read_to_string(storage.path())?;
        assert_eq!(content.trim(), "[]");
        Ok(())
    }

    #[test]
    fn test_storage_quarantine_moves_file_aside() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));
        fs::write(storage.path(), "not json")?;

        let moved = storage.quarantine()?;
        assert_eq!(moved.as_deref(), Some(storage.corrupt_path().as_path()));
        assert!(!storage.path().exists());
        assert_eq!(fs::read_to_string(storage.corrupt_path())?, "not json");
        Ok(())
    }

    #[test]
    fn test_storage_revision_tracks_writes() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let storage = JsonFileStorage::at(temp.path().join("tasks.json"));

        storage.save(&[task(1, "a")])?;
        let first = storage.revision();
        assert!(first.is_some());

        storage.save(&[task(1, "a"), task(2, "a much longer description")])?;
        assert_ne!(storage.revision(), first);
        Ok(())
    }

    #[test]
    fn test_memory_storage_shares_blob_between_clones() -> anyhow::Result<()> {
        let storage = MemoryStorage::new();
        let handle = storage.clone();
        assert!(storage.revision().is_none());

        storage.save(&[task(7, "shared")])?;
        let loaded = handle.load()?;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, TaskId(7));
        assert_eq!(handle.revision(), Some(Revision::Generation(1)));
        Ok(())
    }

    #[test]
    fn test_memory_storage_update_is_one_step() -> anyhow::Result<()> {
        let storage = MemoryStorage::new();
        storage.save(&[task(1, "a")])?;

        let stored = storage.update(|tasks| {
            tasks[0].complete();
            true
        })?;
        assert!(stored[0].completed);
        assert!(storage.load()?[0].completed);
        assert_eq!(storage.revision(), Some(Revision::Generation(2)));
        Ok(())
    }

    #[test]
    fn test_memory_storage_corrupt_blob() {
        let storage = MemoryStorage::with_raw("[{\"id\": ");
        assert!(matches!(storage.load(), Err(StorageError::Corrupt { .. })));
    }
}
