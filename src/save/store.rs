//! Where save blobs live. The core only needs string blobs by slot name.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::core::constants::SAVE_DIR_NAME;
use crate::error::SaveError;

pub trait SaveStore {
    fn write(&mut self, slot: &str, contents: &str) -> Result<(), SaveError>;
    /// `Ok(None)` when the slot has never been written.
    fn read(&self, slot: &str) -> Result<Option<String>, SaveError>;
    fn delete(&mut self, slot: &str) -> Result<(), SaveError>;
    fn list(&self) -> Result<Vec<String>, SaveError>;
}

/// Slot names become file names: lowercase, spaces to underscores, anything
/// other than letters, digits, `_` and `-` dropped.
pub fn sanitize_slot(slot: &str) -> String {
    slot.trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// One pretty-printed JSON file per slot under `~/.saga/`.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Store in `~/.saga/`, creating it if needed.
    pub fn new() -> Result<Self, SaveError> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine home directory",
            )
        })?;
        Self::at(home_dir.join(SAVE_DIR_NAME))
    }

    pub fn at(dir: PathBuf) -> Result<Self, SaveError> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_slot(slot)))
    }
}

impl SaveStore for JsonDirStore {
    fn write(&mut self, slot: &str, contents: &str) -> Result<(), SaveError> {
        fs::write(self.path(slot), contents)?;
        Ok(())
    }

    fn read(&self, slot: &str) -> Result<Option<String>, SaveError> {
        match fs::read_to_string(self.path(slot)) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&mut self, slot: &str) -> Result<(), SaveError> {
        match fs::remove_file(self.path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SaveError::SlotEmpty(slot.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>, SaveError> {
        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                slots.push(stem.to_string());
            }
        }
        slots.sort();
        Ok(slots)
    }
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn write(&mut self, slot: &str, contents: &str) -> Result<(), SaveError> {
        self.slots.insert(sanitize_slot(slot), contents.to_string());
        Ok(())
    }

    fn read(&self, slot: &str) -> Result<Option<String>, SaveError> {
        Ok(self.slots.get(&sanitize_slot(slot)).cloned())
    }

    fn delete(&mut self, slot: &str) -> Result<(), SaveError> {
        self.slots
            .remove(&sanitize_slot(slot))
            .map(|_| ())
            .ok_or_else(|| SaveError::SlotEmpty(slot.to_string()))
    }

    fn list(&self) -> Result<Vec<String>, SaveError> {
        Ok(self.slots.keys().cloned().collect())
    }
}
