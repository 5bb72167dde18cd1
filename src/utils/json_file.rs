//! Atomic JSON file output for exports.

use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug)]
pub enum WriteError {
    /// The target exists and overwriting was not requested.
    Exists(PathBuf),
    Serialize(serde_json::Error),
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Exists(path) => write!(
                f,
                "{} already exists (use --force to overwrite)",
                path.display()
            ),
            WriteError::Serialize(source) => write!(f, "Failed to serialize export: {source}"),
            WriteError::Io { path, source } => {
                write!(f, "Failed to write {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriteError::Exists(_) => None,
            WriteError::Serialize(source) => Some(source),
            WriteError::Io { source, .. } => Some(source),
        }
    }
}

/// Pretty-print `value` (two-space indent) to `path` through a temp file in
/// the same directory. Without `overwrite`, an existing file is left alone.
pub fn write_pretty_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    overwrite: bool,
) -> Result<(), WriteError> {
    let mut contents = serde_json::to_vec_pretty(value).map_err(WriteError::Serialize)?;
    contents.push(b'\n');

    let io_err = |source: std::io::Error| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    let mut temp_file = match parent {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new_in("."),
    }
    .map_err(io_err)?;
    temp_file.write_all(&contents).map_err(io_err)?;
    temp_file.as_file_mut().sync_all().map_err(io_err)?;

    let persisted = if overwrite {
        temp_file.persist(path)
    } else {
        temp_file.persist_noclobber(path)
    };
    match persisted {
        Ok(_) => Ok(()),
        Err(err) if !overwrite && err.error.kind() == std::io::ErrorKind::AlreadyExists => {
            Err(WriteError::Exists(path.to_path_buf()))
        }
        Err(err) => Err(io_err(err.error)),
    }
}
