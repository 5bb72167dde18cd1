//! Shape detection and normalization of chat import documents.

use std::collections::HashSet;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::{ArchiveError, ChatRecord, DEFAULT_CHAT_DESCRIPTION};

/// A chat import document after shape classification.
///
/// Classification only checks shape membership; field validation happens
/// when the document is normalized into records.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportDocument {
    /// `{ "messages": [...], "description"?: "..." }`
    Single {
        messages: Vec<Value>,
        description: Option<String>,
    },
    /// `{ "chats": [...] }`
    Multi { chats: Vec<Value> },
}

impl ImportDocument {
    /// Classify a parsed document.
    ///
    /// A `messages` array takes precedence over a `chats` array when a
    /// document carries both.
    pub fn classify(document: Value) -> Result<Self, ArchiveError> {
        let mut fields = match document {
            Value::Object(fields) => fields,
            other => {
                return Err(ArchiveError::format(format!(
                    "expected a JSON object, found {}",
                    kind_of(&other)
                )))
            }
        };

        if let Some(Value::Array(messages)) = fields.remove("messages") {
            return Ok(ImportDocument::Single {
                messages,
                description: non_empty_string(fields.get("description")),
            });
        }

        if let Some(Value::Array(chats)) = fields.remove("chats") {
            return Ok(ImportDocument::Multi { chats });
        }

        Err(ArchiveError::format(
            "expected a \"messages\" array or a \"chats\" array",
        ))
    }

    /// Normalize into canonical records, generating ids where needed.
    pub fn into_records(self) -> Result<Vec<ChatRecord>, ArchiveError> {
        match self {
            ImportDocument::Single {
                messages,
                description,
            } => {
                let id = Uuid::new_v4().to_string();
                Ok(vec![ChatRecord {
                    url_id: Some(id.clone()),
                    id,
                    messages,
                    description: description
                        .unwrap_or_else(|| DEFAULT_CHAT_DESCRIPTION.to_string()),
                    timestamp: None,
                }])
            }
            ImportDocument::Multi { chats } => {
                let mut seen = HashSet::with_capacity(chats.len());
                let mut records = Vec::with_capacity(chats.len());
                for (index, chat) in chats.into_iter().enumerate() {
                    let record = chat_entry(index, chat)?;
                    if !seen.insert(record.id.clone()) {
                        return Err(ArchiveError::format(format!(
                            "chat id {:?} appears more than once",
                            record.id
                        )));
                    }
                    records.push(record);
                }
                Ok(records)
            }
        }
    }
}

/// Decode a parsed import document into chat records.
pub fn decode(document: Value) -> Result<Vec<ChatRecord>, ArchiveError> {
    ImportDocument::classify(document)?.into_records()
}

/// Parse and decode the text of an uploaded import file.
pub fn decode_str(text: &str) -> Result<Vec<ChatRecord>, ArchiveError> {
    let document: Value = serde_json::from_str(text)?;
    decode(document)
}

fn chat_entry(index: usize, chat: Value) -> Result<ChatRecord, ArchiveError> {
    let mut fields = match chat {
        Value::Object(fields) => fields,
        other => {
            return Err(ArchiveError::format(format!(
                "chats[{index}] is {}, expected an object",
                kind_of(&other)
            )))
        }
    };

    let messages = match fields.remove("messages") {
        Some(Value::Array(messages)) => messages,
        Some(other) => {
            return Err(ArchiveError::format(format!(
                "chats[{index}].messages is {}, expected an array",
                kind_of(&other)
            )))
        }
        None => {
            return Err(ArchiveError::format(format!(
                "chats[{index}] has no messages"
            )))
        }
    };

    let id = non_empty_string(fields.get("id")).unwrap_or_else(|| Uuid::new_v4().to_string());

    Ok(ChatRecord {
        id,
        messages,
        description: non_empty_string(fields.get("description"))
            .unwrap_or_else(|| DEFAULT_CHAT_DESCRIPTION.to_string()),
        url_id: url_id(&fields),
        timestamp: None,
    })
}

fn url_id(fields: &Map<String, Value>) -> Option<String> {
    match fields.get("urlId") {
        Some(Value::String(value)) => Some(value.clone()),
        Some(Value::Number(value)) => Some(value.to_string()),
        _ => None,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
