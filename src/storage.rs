//! Durable key/value storage backing the persisted session.
//!
//! `FileStorage` keeps a JSON object on disk and rewrites it atomically (temp
//! file + rename) on every mutation. `MemoryStorage` is an in-process map for
//! tests and throwaway sessions.

use crate::error::{AppError, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// A small string key/value store.
///
/// Multi-key writes apply as a unit: a reader never observes only part of a
/// `set_many` or `remove_many`.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set_many(&self, entries: &[(&str, String)]) -> Result<()>;
    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}

fn lock(entries: &Mutex<BTreeMap<String, String>>) -> Result<MutexGuard<'_, BTreeMap<String, String>>> {
    entries
        .lock()
        .map_err(|_| AppError::Storage("session storage lock poisoned".into()))
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = lock(&self.entries)?;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = lock(&self.entries)?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// JSON-file storage that survives process restarts.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store. A file that cannot be read or parsed
    /// is also treated as empty (and overwritten on the next write).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Could not read session file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        debug!("Opened session file {} ({} keys)", path.display(), entries.len());

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Applies `change` to a copy of the map, writes it, then swaps it in, so
    /// a failed write leaves memory and disk in agreement.
    fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut map = lock(&self.entries)?;
        let mut next = map.clone();
        change(&mut next);
        if next == *map {
            return Ok(());
        }
        self.flush(&next)?;
        *map = next;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert((*key).to_string(), value.clone());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.update(|map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }
}
