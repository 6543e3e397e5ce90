//! Small persistent string store for user preferences.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub const KEY_BACKGROUND: &str = "background";
pub const KEY_FILTER: &str = "filter";

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to read preferences from {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("preferences at {path} are not a JSON string map: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write preferences to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Key to string map persisted as a flat JSON object. An in-memory store
/// (no path) never touches the disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl PreferenceStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store at `path`. A missing file yields an empty store that
    /// will be created on the first `set`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| PrefsError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PrefsError::Read { path, source }),
        };
        debug!(path = %path.display(), entries = values.len(), "preferences loaded");
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Store `value` under `key` and write the whole map back.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value.into());
        self.save()
    }

    pub fn save(&self) -> Result<(), PrefsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let write_err = |source| PrefsError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let raw = serde_json::to_string_pretty(&self.values)
            .map_err(io::Error::from)
            .map_err(write_err)?;
        std::fs::write(path, raw).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty_and_set_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let mut store = PreferenceStore::load(&path).unwrap();
        assert_eq!(store.get(KEY_FILTER), None);
        store.set(KEY_FILTER, "both").unwrap();
        store.set(KEY_BACKGROUND, "amber").unwrap();

        let reloaded = PreferenceStore::load(&path).unwrap();
        assert_eq!(reloaded.get(KEY_FILTER), Some("both"));
        assert_eq!(reloaded.get(KEY_BACKGROUND), Some("amber"));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            PreferenceStore::load(&path),
            Err(PrefsError::Parse { .. })
        ));
    }

    #[test]
    fn in_memory_store_never_writes() {
        let mut store = PreferenceStore::in_memory();
        store.set(KEY_FILTER, "on").unwrap();
        assert_eq!(store.get(KEY_FILTER), Some("on"));
        assert!(store.path().is_none());
    }
}
