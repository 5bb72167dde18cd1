//! Storage collaborators used by the codecs.
//!
//! The codecs never reach for ambient state. Every operation receives the
//! handles it touches:
//! - [`KeyValueStore`] holds flat string settings (the cookie-like namespace,
//!   and a second instance for the local namespace that carries the theme).
//! - [`ChatStore`] holds chat records keyed by id and is accessed
//!   asynchronously.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::archive::ChatRecord;

pub mod chat_dir;
pub mod file;
pub mod memory;

pub use chat_dir::DirChatStore;
pub use file::FileKeyValueStore;
pub use memory::{MemoryChatStore, MemoryKeyValueStore};

/// Errors raised by store backends.
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    Io { path: PathBuf, source: std::io::Error },
    /// The backing file exists but does not hold the expected JSON.
    Corrupt { path: PathBuf, source: serde_json::Error },
    /// The platform keyring refused the operation.
    Keyring(crate::core::keyring::KeyringAccessError),
    /// A chat id cannot be mapped onto the backend.
    InvalidId(String),
    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => {
                write!(f, "Storage I/O failed at {}: {}", path.display(), source)
            }
            StoreError::Corrupt { path, source } => {
                write!(f, "Storage file {} is not valid JSON: {}", path.display(), source)
            }
            StoreError::Keyring(err) => write!(f, "Keyring error: {err}"),
            StoreError::InvalidId(id) => write!(f, "Invalid chat id: {id:?}"),
            StoreError::Backend(msg) => write!(f, "Storage error: {msg}"),
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Corrupt { source, .. } => Some(source),
            StoreError::Keyring(err) => Some(err),
            StoreError::InvalidId(_) | StoreError::Backend(_) => None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A stored entry that exists but could not be read back as a chat record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableChat {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for UnreadableChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_else(|| self.path.to_string_lossy());
        write!(f, "{name} ({})", self.reason)
    }
}

/// Everything a chat store holds: the readable records and the entries it
/// had to leave out.
#[derive(Debug, Default)]
pub struct ChatScan {
    pub records: Vec<ChatRecord>,
    pub unreadable: Vec<UnreadableChat>,
}

impl ChatScan {
    pub fn is_complete(&self) -> bool {
        self.unreadable.is_empty()
    }
}

/// Flat string settings storage.
///
/// There is no iteration contract: callers only ever read the keys they
/// already know about.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// Keyed chat record storage.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Return every readable stored record.
    async fn get_all(&self) -> StoreResult<Vec<ChatRecord>>;

    /// Return every readable record along with the entries that could not
    /// be read. Backends that cannot hold unreadable entries keep the default.
    async fn scan(&self) -> StoreResult<ChatScan> {
        Ok(ChatScan {
            records: self.get_all().await?,
            unreadable: Vec::new(),
        })
    }

    /// Delete one record. Deleting an unknown id is not an error.
    async fn delete_by_id(&self, id: &str) -> StoreResult<()>;

    /// Insert or replace the record stored under `id`.
    async fn upsert(
        &self,
        id: &str,
        messages: &[Value],
        url_id: Option<&str>,
        description: &str,
    ) -> StoreResult<()>;
}
