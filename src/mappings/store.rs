//! Durable tag-to-target mapping store
//!
//! A flat, human-editable JSON object on disk, loaded once at startup and
//! fully re-persisted after every mutation, so in-memory state and durable
//! state are never observably divergent to callers. The store itself is not
//! synchronized; callers serialize mutations (the application keeps the
//! store behind a single `tokio::sync::Mutex`).

use crate::mappings::error::{MappingError, MappingResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Sample entries written on first run when no mapping file exists yet.
const DEFAULT_ENTRIES: [(&str, &str); 2] = [
    ("0123456789", "/home/pi/Videos/movie1.mp4"),
    ("9876543210", "/home/pi/Videos/movie2.mp4"),
];

pub struct MappingStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl MappingStore {
    /// Load the store from its durable file.
    ///
    /// A missing file seeds the documented sample entries and persists them
    /// immediately (first-run convenience). A file that exists but does not
    /// parse degrades to an empty in-memory store for this run; the durable
    /// file is replaced on the next successful save. Neither case fails the
    /// caller: mapping resolution must never take the host process down.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        match Self::read_entries(&path) {
            Ok(Some(entries)) => {
                log::info!(
                    "Loaded {} tag mappings from {}",
                    entries.len(),
                    path.display()
                );
                Self { path, entries }
            }
            Ok(None) => {
                // First run: seed sample entries so the file format is
                // discoverable by editing it
                let entries: HashMap<String, String> = DEFAULT_ENTRIES
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                let store = Self { path, entries };
                match store.save() {
                    Ok(()) => log::info!(
                        "Created default mapping file at {}",
                        store.path.display()
                    ),
                    Err(e) => log::warn!(
                        "Could not create default mapping file at {}: {}",
                        store.path.display(),
                        e
                    ),
                }
                store
            }
            Err(e) => {
                log::error!(
                    "Ignoring unreadable mapping file {}: {}",
                    path.display(),
                    e
                );
                Self {
                    path,
                    entries: HashMap::new(),
                }
            }
        }
    }

    /// Read and parse the durable file. `Ok(None)` means the file is absent.
    fn read_entries(path: &Path) -> MappingResult<Option<HashMap<String, String>>> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MappingError::Io(e)),
        };

        let entries = serde_json::from_str(&json).map_err(|e| MappingError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(Some(entries))
    }

    /// Persist the full mapping set, pretty-printed.
    ///
    /// Writes to a temporary file in the same directory and renames it over
    /// the previous file, so a crash mid-write never corrupts the last valid
    /// file.
    pub fn save(&self) -> MappingResult<()> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| MappingError::Io(std::io::Error::other(e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Add or overwrite a mapping, then persist.
    ///
    /// An existing tag id is overwritten silently. Blank inputs are rejected
    /// before any state changes. Persist failures propagate, but the
    /// in-memory entry stays authoritative for the running process.
    pub fn add(&mut self, tag_id: &str, target: &str) -> MappingResult<()> {
        let tag_id = tag_id.trim();
        let target = target.trim();

        if tag_id.is_empty() {
            return Err(MappingError::EmptyTag);
        }
        if target.is_empty() {
            return Err(MappingError::EmptyTarget);
        }

        self.entries.insert(tag_id.to_string(), target.to_string());
        self.save()
    }

    /// Remove a mapping; returns whether an entry existed and was removed.
    ///
    /// Blank or absent tag ids are a no-op. Persists only when something was
    /// actually removed; a persist failure is logged and the removal stays
    /// effective in memory.
    pub fn remove(&mut self, tag_id: &str) -> bool {
        let tag_id = tag_id.trim();
        if tag_id.is_empty() {
            return false;
        }

        let removed = self.entries.remove(tag_id).is_some();
        if removed {
            if let Err(e) = self.save() {
                log::error!(
                    "Removed mapping for '{}' but could not persist {}: {}",
                    tag_id,
                    self.path.display(),
                    e
                );
            }
        }

        removed
    }

    /// Resolve a tag id to its target. Pure read, no I/O.
    pub fn lookup(&self, tag_id: &str) -> Option<&str> {
        self.entries.get(tag_id.trim()).map(String::as_str)
    }

    /// Snapshot of all entries for display; order is arbitrary.
    pub fn list(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
