use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, atomic_write, log_recovery};
use crate::model::task::Task;

/// Error type for key-value slot access
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    /// The slot holds bytes that are not UTF-8. `lossy` is the readable
    /// rendition; the exact bytes are copied next to the slot as `.bak`.
    #[error("{path} is not valid UTF-8 (original bytes kept in {backup})")]
    InvalidUtf8 {
        path: PathBuf,
        backup: PathBuf,
        lossy: String,
    },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not encode tasks: {0}")]
    EncodeError(#[from] serde_json::Error),
}

/// Durable string storage addressed by key.
pub trait SlotStore {
    /// Read a slot. A slot that was never written is `Ok(None)`.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's contents.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One JSON file per key inside a data directory
#[derive(Debug, Clone)]
pub struct DirSlotStore {
    dir: PathBuf,
}

impl DirSlotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirSlotStore { dir: dir.into() }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Where the exact bytes of an undecodable slot are copied
    pub fn backup_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json.bak", key))
    }
}

impl SlotStore for DirSlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::ReadError { path, source: e }),
        };

        match String::from_utf8(bytes) {
            Ok(content) => Ok(Some(content)),
            Err(e) => {
                let backup = self.backup_path(key);
                if let Err(copy_err) = atomic_write(&backup, e.as_bytes()) {
                    eprintln!(
                        "warning: could not back up {}: {}",
                        path.display(),
                        copy_err
                    );
                }
                let lossy = String::from_utf8_lossy(e.as_bytes()).into_owned();
                Err(StorageError::InvalidUtf8 { path, backup, lossy })
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);
        let result = fs::create_dir_all(&self.dir)
            .and_then(|()| atomic_write(&path, value.as_bytes()));
        if let Err(e) = result {
            log_recovery(
                &self.dir,
                RecoveryEntry::new(RecoveryCategory::Write, "slot write failed")
                    .field("Slot", key)
                    .field("Error", e.to_string())
                    .body(value),
            );
            return Err(StorageError::WriteError { path, source: e });
        }
        Ok(())
    }
}

/// In-memory slots, for headless use and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    slots: HashMap<String, String>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot
    pub fn with_slot(mut self, key: &str, value: &str) -> Self {
        self.slots.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(|s| s.as_str())
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Serialize the collection in order as a JSON array of task records
pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string(tasks)
}

/// Parse a slot's contents. Blank content is an empty collection.
pub fn decode_tasks(raw: &str) -> Result<Vec<Task>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
}
