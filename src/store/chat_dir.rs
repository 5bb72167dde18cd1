//! Chat store keeping one JSON document per chat in a directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use super::{ChatScan, ChatStore, StoreError, StoreResult, UnreadableChat};
use crate::archive::ChatRecord;

const RECORD_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct DirChatStore {
    root: PathBuf,
}

impl DirChatStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn record_path(&self, id: &str) -> StoreResult<PathBuf> {
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\', '\0']);
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.{RECORD_EXTENSION}")))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl ChatStore for DirChatStore {
    async fn get_all(&self) -> StoreResult<Vec<ChatRecord>> {
        Ok(self.scan().await?.records)
    }

    /// A record is only readable when it parses and its id matches the file
    /// stem, since deletes and upserts address records by that path.
    async fn scan(&self) -> StoreResult<ChatScan> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(ChatScan::default()),
            Err(err) => return Err(Self::io_error(&self.root, err)),
        };

        let mut scan = ChatScan::default();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| Self::io_error(&self.root, err))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let contents = fs::read_to_string(&path)
                .await
                .map_err(|err| Self::io_error(&path, err))?;
            let stem = path.file_stem().and_then(|stem| stem.to_str());
            let reason = match serde_json::from_str::<ChatRecord>(&contents) {
                Ok(record) if stem == Some(record.id.as_str()) => {
                    scan.records.push(record);
                    continue;
                }
                Ok(record) => format!("holds chat id {:?}", record.id),
                Err(err) => format!("invalid chat record: {err}"),
            };
            warn!(path = %path.display(), reason = %reason, "Unreadable chat record");
            scan.unreadable.push(UnreadableChat { path, reason });
        }

        scan.records.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });
        scan.unreadable.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(scan)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let path = self.record_path(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(id, "Deleted chat record");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::io_error(&path, err)),
        }
    }

    async fn upsert(
        &self,
        id: &str,
        messages: &[Value],
        url_id: Option<&str>,
        description: &str,
    ) -> StoreResult<()> {
        let path = self.record_path(id)?;
        fs::create_dir_all(&self.root)
            .await
            .map_err(|err| Self::io_error(&self.root, err))?;

        let record = ChatRecord {
            id: id.to_string(),
            messages: messages.to_vec(),
            description: description.to_string(),
            url_id: url_id.map(str::to_string),
            timestamp: Some(Utc::now()),
        };
        let contents = serde_json::to_vec_pretty(&record).map_err(|err| {
            StoreError::Backend(format!("failed to encode chat {id}: {err}"))
        })?;

        // Write beside the target and rename so readers never see a partial record.
        let staging = self.root.join(format!(".{id}.{RECORD_EXTENSION}.tmp"));
        fs::write(&staging, contents)
            .await
            .map_err(|err| Self::io_error(&staging, err))?;
        fs::rename(&staging, &path)
            .await
            .map_err(|err| Self::io_error(&path, err))?;
        debug!(id, messages = messages.len(), "Stored chat record");
        Ok(())
    }
}
