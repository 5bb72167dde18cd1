//! Chat archive actions: export, import, delete-all, list.

use std::path::Path;

use chrono::{DateTime, Utc};

use super::{DataContext, ExportTarget, Notice};
use crate::archive::sync::{delete_all, replay};
use crate::archive::{decode_str, encode, ArchiveError};
use crate::core::events::DataEvent;
use crate::store::UnreadableChat;
use crate::utils::json_file::write_pretty_json;

const DB_UNAVAILABLE: &str = "Database is not available";

/// One line of `chats list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: String,
    pub description: String,
    pub message_count: usize,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Default name for a chat export: `all-chats-<timestamp>.json`.
///
/// Colons are replaced so the name is valid on every platform.
pub fn chat_export_file_name(at: DateTime<Utc>) -> String {
    format!("all-chats-{}.json", at.format("%Y-%m-%dT%H-%M-%S%.3fZ"))
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn unreadable_list(unreadable: &[UnreadableChat]) -> String {
    unreadable
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl DataContext {
    /// Write every stored chat to one export document.
    pub async fn export_chats(&self, target: &ExportTarget) -> Notice {
        let Some(store) = self.chat_store() else {
            return self.fail(
                "Failed to export chats - DB unavailable",
                &ArchiveError::StoreUnavailable,
                Notice::error(DB_UNAVAILABLE),
            );
        };

        let scan = match store.scan().await {
            Ok(scan) => scan,
            Err(err) => {
                return self.fail(
                    "Failed to export chats",
                    &err,
                    Notice::error("Failed to export chats"),
                )
            }
        };

        let count = scan.records.len();
        let path = target.resolve(&chat_export_file_name(Utc::now()));
        if let Err(err) = write_pretty_json(&path, &encode(scan.records), target.overwrite) {
            return self.fail(
                "Failed to export chats",
                &err,
                Notice::error(format!("Failed to export chats: {err}")),
            );
        }

        if !scan.unreadable.is_empty() {
            let skipped = unreadable_list(&scan.unreadable);
            return self.partial(
                &format!(
                    "Chats exported with {} unreadable record(s) left out (count: {count}): {skipped}",
                    scan.unreadable.len()
                ),
                Notice::warning(format!(
                    "Exported {count} chat{} to {}, but {} stored record{} could not be read and {} left out: {skipped}",
                    plural(count),
                    path.display(),
                    scan.unreadable.len(),
                    plural(scan.unreadable.len()),
                    if scan.unreadable.len() == 1 { "was" } else { "were" },
                )),
            );
        }

        self.succeed(
            &format!("Chats exported successfully (count: {count})"),
            Notice::success(format!(
                "Chats exported successfully to {} ({count} chat{})",
                path.display(),
                plural(count)
            )),
        )
    }

    /// Import a single-chat or multi-chat document from `path`.
    pub async fn import_chats(&self, path: &Path) -> Notice {
        let Some(store) = self.chat_store() else {
            return self.fail(
                "Failed to import chats - DB unavailable",
                &ArchiveError::StoreUnavailable,
                Notice::error(DB_UNAVAILABLE),
            );
        };

        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(err) => {
                return self.fail(
                    "Failed to import chats",
                    &err,
                    Notice::error(format!("Failed to import chats: {err}")),
                )
            }
        };

        let records = match decode_str(&text) {
            Ok(records) => records,
            Err(err) => {
                return self.fail(
                    "Failed to import chats",
                    &err,
                    Notice::error(format!("Failed to import chats: {err}")),
                )
            }
        };

        match replay(&records, store).await {
            Ok(count) => {
                self.events.publish(DataEvent::ChatsChanged { count });
                self.succeed(
                    &format!("Chats imported successfully (count: {count})"),
                    Notice::success(format!(
                        "Successfully imported {count} chat{}",
                        plural(count)
                    )),
                )
            }
            Err(err) => {
                if err.committed > 0 {
                    self.events.publish(DataEvent::ChatsChanged {
                        count: err.committed,
                    });
                }
                self.fail(
                    "Failed to import chats",
                    &err,
                    Notice::error(format!("Failed to import chats: {err}")),
                )
            }
        }
    }

    /// Delete every stored chat once `confirm` agrees.
    ///
    /// Confirmation comes first: a declined prompt touches nothing, not even
    /// the store check.
    pub async fn delete_all_chats<F>(&self, confirm: F) -> Notice
    where
        F: FnOnce() -> bool,
    {
        if !confirm() {
            return Notice::warning("Deletion cancelled; no chats were removed");
        }

        let report = match delete_all(self.chat_store()).await {
            Ok(report) => report,
            Err(ArchiveError::StoreUnavailable) => {
                return self.fail(
                    "Failed to delete chats - DB unavailable",
                    &ArchiveError::StoreUnavailable,
                    Notice::error(DB_UNAVAILABLE),
                )
            }
            Err(err) => {
                return self.fail(
                    "Failed to delete chats",
                    &err,
                    Notice::error("Failed to delete chats"),
                )
            }
        };

        let deleted = report.deleted.len();
        if deleted > 0 {
            self.events
                .publish(DataEvent::ChatsChanged { count: deleted });
        }

        let mut summary = format!(
            "Failed to delete chats: deleted {deleted} of {}",
            report.total()
        );
        if !report.unreadable.is_empty() {
            summary.push_str(&format!(
                "; unreadable records left in place: {}",
                unreadable_list(&report.unreadable)
            ));
        }

        match report.failed.first() {
            None if report.unreadable.is_empty() => self.succeed(
                &format!("All chats deleted successfully (count: {deleted})"),
                Notice::success("All chats deleted successfully"),
            ),
            None => self.partial(
                &format!(
                    "Failed to delete chats ({} unreadable record(s) left in place)",
                    report.unreadable.len()
                ),
                Notice::error(summary),
            ),
            Some((id, err)) => self.fail(
                &format!(
                    "Failed to delete chats ({} of {} failed, first: {id})",
                    report.failed.len(),
                    report.total()
                ),
                err,
                Notice::error(summary),
            ),
        }
    }

    /// Summaries of every stored chat, oldest first.
    pub async fn list_chats(&self) -> Result<Vec<ChatSummary>, Notice> {
        let Some(store) = self.chat_store() else {
            return Err(self.fail(
                "Failed to list chats - DB unavailable",
                &ArchiveError::StoreUnavailable,
                Notice::error(DB_UNAVAILABLE),
            ));
        };

        match store.get_all().await {
            Ok(records) => Ok(records
                .into_iter()
                .map(|record| ChatSummary {
                    message_count: record.messages.len(),
                    id: record.id,
                    description: record.description,
                    timestamp: record.timestamp,
                })
                .collect()),
            Err(err) => Err(self.fail(
                "Failed to list chats",
                &err,
                Notice::error("Failed to list chats"),
            )),
        }
    }
}
