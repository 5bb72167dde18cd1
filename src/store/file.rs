//! Key/value store persisted as a flat JSON object on disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use super::{KeyValueStore, StoreError, StoreResult};

/// A string map loaded once and written back atomically on every `set`.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl FileKeyValueStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            if contents.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            Map::new()
        };
        debug!(path = %path.display(), entries = entries.len(), "Opened key/value store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> StoreResult<()> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let parent = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(io_err)?;
        }

        let contents =
            serde_json::to_string_pretty(&self.entries).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(io_err)?;

        temp_file.write_all(contents.as_bytes()).map_err(io_err)?;
        temp_file.as_file_mut().sync_all().map_err(io_err)?;
        temp_file
            .persist(&self.path)
            .map_err(|err| io_err(err.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(match self.entries.get(key) {
            Some(Value::String(value)) => Some(value.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .insert(key.to_string(), Value::String(value.to_string()));
        self.persist()
    }
}
