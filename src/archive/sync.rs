//! Replaying decoded chats into a store and bulk deletion.

use std::error::Error as StdError;
use std::fmt;

use futures_util::future::join_all;
use tracing::{debug, warn};

use super::{ArchiveError, ChatRecord};
use crate::store::{ChatStore, StoreError, UnreadableChat};

/// A replay that stopped partway through.
///
/// Records before `failed_id` stay committed.
#[derive(Debug)]
pub struct ReplayError {
    pub committed: usize,
    pub failed_id: String,
    pub source: StoreError,
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to store chat {} after {} imported: {}",
            self.failed_id, self.committed, self.source
        )
    }
}

impl StdError for ReplayError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}

/// Upsert every record in input order. Returns the number stored.
pub async fn replay(records: &[ChatRecord], store: &dyn ChatStore) -> Result<usize, ReplayError> {
    for (committed, record) in records.iter().enumerate() {
        if let Err(source) = store
            .upsert(
                &record.id,
                &record.messages,
                record.url_id.as_deref(),
                &record.description,
            )
            .await
        {
            return Err(ReplayError {
                committed,
                failed_id: record.id.clone(),
                source,
            });
        }
        debug!(id = %record.id, "Replayed chat");
    }
    Ok(records.len())
}

/// Outcome of a bulk delete. Deletions are independent, so some may fail
/// while the rest succeed.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, StoreError)>,
    /// Stored entries that could not be read, and so were left in place.
    pub unreadable: Vec<UnreadableChat>,
}

impl DeleteReport {
    pub fn total(&self) -> usize {
        self.deleted.len() + self.failed.len() + self.unreadable.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.unreadable.is_empty()
    }
}

/// Delete every stored chat, issuing all deletions concurrently.
///
/// An absent store fails before anything is read or deleted.
pub async fn delete_all(store: Option<&dyn ChatStore>) -> Result<DeleteReport, ArchiveError> {
    let store = store.ok_or(ArchiveError::StoreUnavailable)?;
    let scan = store.scan().await?;
    let ids: Vec<String> = scan.records.into_iter().map(|record| record.id).collect();

    let outcomes = join_all(ids.iter().map(|id| store.delete_by_id(id))).await;

    let mut report = DeleteReport {
        unreadable: scan.unreadable,
        ..DeleteReport::default()
    };
    for (id, outcome) in ids.into_iter().zip(outcomes) {
        match outcome {
            Ok(()) => report.deleted.push(id),
            Err(err) => {
                warn!(id = %id, error = %err, "Failed to delete chat");
                report.failed.push((id, err));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DirChatStore, MemoryChatStore};
    use serde_json::json;

    fn record(id: &str) -> ChatRecord {
        ChatRecord {
            id: id.to_string(),
            messages: vec![json!({"role": "user", "content": id})],
            description: format!("chat {id}"),
            url_id: Some(format!("{id}-url")),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn replay_stores_in_order() {
        let store = MemoryChatStore::new();
        let records = vec![record("a"), record("b"), record("c")];

        let count = replay(&records, &store).await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(store.ids(), vec!["a", "b", "c"]);

        let stored = store.get_all().await.unwrap();
        assert_eq!(stored[1].url_id.as_deref(), Some("b-url"));
        assert_eq!(stored[1].description, "chat b");
        assert_eq!(stored[1].messages, records[1].messages);
    }

    #[tokio::test]
    async fn replay_upserts_existing_ids() {
        let store = MemoryChatStore::with_records(vec![record("a")]);
        let mut updated = record("a");
        updated.description = "renamed".to_string();

        replay(&[updated], &store).await.unwrap();
        let stored = store.get_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].description, "renamed");
    }

    #[tokio::test]
    async fn replay_keeps_committed_records_on_failure() {
        let store = MemoryChatStore::new();
        store.fail_upsert_for("b");

        let err = replay(&[record("a"), record("b"), record("c")], &store)
            .await
            .unwrap_err();
        assert_eq!(err.committed, 1);
        assert_eq!(err.failed_id, "b");
        assert_eq!(store.ids(), vec!["a"]);
    }

    #[tokio::test]
    async fn delete_all_without_store_is_unavailable() {
        assert!(matches!(
            delete_all(None).await,
            Err(ArchiveError::StoreUnavailable)
        ));
    }

    #[tokio::test]
    async fn delete_all_removes_everything() {
        let store = MemoryChatStore::with_records(vec![record("a"), record("b")]);
        let report = delete_all(Some(&store)).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.deleted.len(), 2);
        assert!(store.ids().is_empty());
    }

    #[tokio::test]
    async fn delete_all_tolerates_one_failure() {
        let store =
            MemoryChatStore::with_records(vec![record("a"), record("b"), record("c")]);
        store.fail_delete_for("b");

        let report = delete_all(Some(&store)).await.unwrap();
        assert_eq!(report.total(), 3);
        assert_eq!(report.deleted, vec!["a", "c"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "b");
        assert_eq!(store.ids(), vec!["b"]);
    }

    #[tokio::test]
    async fn delete_all_reports_unreadable_files_left_in_place() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = DirChatStore::new(dir.path());
        store.upsert("good", &[], None, "ok").await.unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        std::fs::write(
            dir.path().join("renamed.json"),
            json!({"id": "orig", "messages": []}).to_string(),
        )
        .unwrap();

        let report = delete_all(Some(&store)).await.unwrap();
        assert_eq!(report.deleted, vec!["good"]);
        assert_eq!(report.unreadable.len(), 2);
        assert_eq!(report.total(), 3);
        assert!(!report.is_complete());
        assert!(!dir.path().join("good.json").exists());
        assert!(dir.path().join("renamed.json").exists());
    }
}
