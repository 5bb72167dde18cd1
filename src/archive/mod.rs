//! Chat archive codec.
//!
//! Converts between stored chat records and portable JSON documents. Two
//! input shapes are understood:
//! - a single chat, `{ "messages": [...], "description"?: "..." }`
//! - a multi-chat export, `{ "chats": [...], "exportDate": "..." }`
//!
//! Exports always use the multi-chat shape and always cover every stored
//! chat.

use std::error::Error as StdError;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::StoreError;

pub mod decode;
pub mod sync;

pub use decode::{decode, decode_str, ImportDocument};
pub use sync::{delete_all, replay, DeleteReport, ReplayError};

/// Description given to imported chats that do not carry one.
pub const DEFAULT_CHAT_DESCRIPTION: &str = "Imported Chat";

/// One persisted conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
    pub id: String,
    /// Opaque message objects, kept verbatim and in order.
    pub messages: Vec<Value>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// The multi-chat export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExport {
    pub chats: Vec<ChatRecord>,
    pub export_date: String,
}

/// Wrap every stored record into an export document stamped with the
/// current time.
pub fn encode(records: Vec<ChatRecord>) -> ChatExport {
    encode_at(records, Utc::now())
}

pub fn encode_at(records: Vec<ChatRecord>, exported_at: DateTime<Utc>) -> ChatExport {
    ChatExport {
        chats: records,
        export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Errors raised by archive operations.
#[derive(Debug)]
pub enum ArchiveError {
    /// No chat store handle is available.
    StoreUnavailable,
    /// The document matches neither supported chat shape.
    Format(String),
    /// The uploaded text is not valid JSON.
    Parse(serde_json::Error),
    /// The chat store failed.
    Store(StoreError),
}

impl ArchiveError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        ArchiveError::Format(message.into())
    }
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::StoreUnavailable => write!(f, "Chat storage is not available"),
            ArchiveError::Format(msg) => write!(f, "Unsupported chat format: {msg}"),
            ArchiveError::Parse(err) => write!(f, "Invalid JSON: {err}"),
            ArchiveError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for ArchiveError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ArchiveError::Parse(err) => Some(err),
            ArchiveError::Store(err) => Some(err),
            ArchiveError::StoreUnavailable | ArchiveError::Format(_) => None,
        }
    }
}

impl From<StoreError> for ArchiveError {
    fn from(err: StoreError) -> Self {
        ArchiveError::Store(err)
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(err: serde_json::Error) -> Self {
        ArchiveError::Parse(err)
    }
}
