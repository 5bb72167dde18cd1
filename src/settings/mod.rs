//! Settings snapshot codec.
//!
//! A snapshot is a flat map of named settings gathered from two namespaces:
//! the key/value store holds everything except [`THEME_KEY`], which lives in
//! the local store. Importing a snapshot writes each non-empty value back to
//! the namespace it came from.

use std::error::Error as StdError;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::constants::{SNAPSHOT_KEYS, THEME_KEY};
use crate::store::{KeyValueStore, StoreError};

pub mod api_keys;

pub use api_keys::{api_key_template, import_api_keys, ApiKeyImport};

/// Errors raised while importing settings documents.
#[derive(Debug)]
pub enum SettingsError {
    /// The uploaded text is not a JSON object.
    Parse(String),
    /// Writing to a store failed.
    Store { key: String, source: StoreError },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Parse(msg) => write!(f, "Invalid settings file: {msg}"),
            SettingsError::Store { key, source } => {
                write!(f, "Failed to store {key}: {source}")
            }
        }
    }
}

impl StdError for SettingsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SettingsError::Parse(_) => None,
            SettingsError::Store { source, .. } => Some(source),
        }
    }
}

/// An exported settings bag. Absent settings keep their slot but are left
/// out of the serialized document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsSnapshot {
    entries: Vec<(String, Option<String>)>,
}

impl SettingsSnapshot {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|(_, value)| value.is_some()).count()
    }
}

impl Serialize for SettingsSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.present_count()))?;
        for (key, value) in &self.entries {
            if let Some(value) = value {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// Read the fixed snapshot keys from `kv` and the theme from `local`.
pub fn export_snapshot(
    kv: &dyn KeyValueStore,
    local: &dyn KeyValueStore,
) -> Result<SettingsSnapshot, StoreError> {
    let mut entries = Vec::with_capacity(SNAPSHOT_KEYS.len() + 1);
    for key in SNAPSHOT_KEYS {
        entries.push((key.to_string(), kv.get(key)?));
    }
    entries.push((THEME_KEY.to_string(), local.get(THEME_KEY)?));
    Ok(SettingsSnapshot { entries })
}

/// Result of a successful snapshot import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportedSettings {
    /// Keys written, in document order.
    pub written: Vec<String>,
    /// Keys present in the document with an empty value.
    pub skipped: Vec<String>,
}

impl ImportedSettings {
    /// Imported values only take effect once consumers re-read their settings.
    pub fn requires_reinitialize(&self) -> bool {
        !self.written.is_empty()
    }
}

/// Apply an uploaded settings document.
///
/// Unknown keys are written through unchanged so newer exports still import.
pub fn import_snapshot(
    text: &str,
    kv: &mut dyn KeyValueStore,
    local: &mut dyn KeyValueStore,
) -> Result<ImportedSettings, SettingsError> {
    let document = parse_object(text)?;
    let mut outcome = ImportedSettings::default();

    for (key, value) in &document {
        let Some(value) = storable_value(value) else {
            outcome.skipped.push(key.clone());
            continue;
        };
        let written = if key == THEME_KEY {
            local.set(key, &value)
        } else {
            kv.set(key, &value)
        };
        written.map_err(|source| SettingsError::Store {
            key: key.clone(),
            source,
        })?;
        outcome.written.push(key.clone());
    }

    debug!(
        written = outcome.written.len(),
        skipped = outcome.skipped.len(),
        "Imported settings snapshot"
    );
    Ok(outcome)
}

/// Parse uploaded text as a JSON object.
pub(crate) fn parse_object(text: &str) -> Result<Map<String, Value>, SettingsError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(SettingsError::Parse("expected a JSON object".to_string())),
        Err(err) => Err(SettingsError::Parse(err.to_string())),
    }
}

/// The string to store for a document value, or `None` when the value is
/// empty and must not overwrite anything.
pub(crate) fn storable_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKeyValueStore;
    use serde_json::json;

    fn populated_stores() -> (MemoryKeyValueStore, MemoryKeyValueStore) {
        let mut kv = MemoryKeyValueStore::new();
        kv.set("providers", r#"{"Ollama":{"enabled":true}}"#).unwrap();
        kv.set("isDebugEnabled", "true").unwrap();
        kv.set("selectedModel", "claude-3-5-sonnet-latest").unwrap();
        kv.set("githubUsername", "octocat").unwrap();
        let mut local = MemoryKeyValueStore::new();
        local.set(THEME_KEY, "dark").unwrap();
        (kv, local)
    }

    #[test]
    fn export_reads_fixed_keys_and_theme() {
        let (kv, local) = populated_stores();
        let snapshot = export_snapshot(&kv, &local).unwrap();

        assert_eq!(snapshot.entries().count(), SNAPSHOT_KEYS.len() + 1);
        assert_eq!(snapshot.get("selectedModel"), Some("claude-3-5-sonnet-latest"));
        assert_eq!(snapshot.get(THEME_KEY), Some("dark"));
        assert_eq!(snapshot.get("commitHash"), None);
        assert_eq!(snapshot.present_count(), 5);
    }

    #[test]
    fn export_ignores_theme_in_wrong_namespace() {
        let mut kv = MemoryKeyValueStore::new();
        kv.set(THEME_KEY, "light").unwrap();
        let snapshot = export_snapshot(&kv, &MemoryKeyValueStore::new()).unwrap();
        assert_eq!(snapshot.get(THEME_KEY), None);
    }

    #[test]
    fn serialized_snapshot_omits_absent_keys_in_order() {
        let (kv, local) = populated_stores();
        let snapshot = export_snapshot(&kv, &local).unwrap();
        let value = serde_json::to_value(&snapshot).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();

        assert_eq!(
            keys,
            ["providers", "isDebugEnabled", "selectedModel", "githubUsername", "theme"]
        );
    }

    #[test]
    fn import_skips_empty_values() {
        let mut kv = MemoryKeyValueStore::new();
        let mut local = MemoryKeyValueStore::new();
        let text = json!({"theme": "", "apiKeys": "{\"OpenAI\":\"sk-x\"}"}).to_string();

        let outcome = import_snapshot(&text, &mut kv, &mut local).unwrap();

        assert_eq!(outcome.written, ["apiKeys"]);
        assert_eq!(outcome.skipped, ["theme"]);
        assert!(local.is_empty());
        assert_eq!(kv.len(), 1);
        assert_eq!(kv.get("apiKeys").unwrap().as_deref(), Some("{\"OpenAI\":\"sk-x\"}"));
    }

    #[test]
    fn import_routes_theme_to_local_store() {
        let mut kv = MemoryKeyValueStore::new();
        let mut local = MemoryKeyValueStore::new();
        let text = json!({"theme": "light", "selectedProvider": "Anthropic"}).to_string();

        let outcome = import_snapshot(&text, &mut kv, &mut local).unwrap();
        assert!(outcome.requires_reinitialize());
        assert_eq!(local.get(THEME_KEY).unwrap().as_deref(), Some("light"));
        assert_eq!(kv.get(THEME_KEY).unwrap(), None);
        assert_eq!(kv.get("selectedProvider").unwrap().as_deref(), Some("Anthropic"));
    }

    #[test]
    fn import_writes_unknown_keys_through() {
        let mut kv = MemoryKeyValueStore::new();
        let mut local = MemoryKeyValueStore::new();
        let text = json!({"futureToggle": "on", "retries": 3, "flag": true}).to_string();

        import_snapshot(&text, &mut kv, &mut local).unwrap();
        assert_eq!(kv.get("futureToggle").unwrap().as_deref(), Some("on"));
        assert_eq!(kv.get("retries").unwrap().as_deref(), Some("3"));
        assert_eq!(kv.get("flag").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn import_never_overwrites_with_falsy_values() {
        let mut kv: MemoryKeyValueStore = [("promptId".to_string(), "default".to_string())]
            .into_iter()
            .collect();
        let mut local = MemoryKeyValueStore::new();
        let text = json!({"promptId": null, "isDebugEnabled": false, "count": 0}).to_string();

        let outcome = import_snapshot(&text, &mut kv, &mut local).unwrap();
        assert!(outcome.written.is_empty());
        assert!(!outcome.requires_reinitialize());
        assert_eq!(kv.get("promptId").unwrap().as_deref(), Some("default"));
        assert_eq!(kv.len(), 1);
    }

    #[test]
    fn import_rejects_invalid_json() {
        let mut kv = MemoryKeyValueStore::new();
        let mut local = MemoryKeyValueStore::new();
        for text in ["{ broken", "[1, 2]", "\"text\""] {
            assert!(matches!(
                import_snapshot(text, &mut kv, &mut local),
                Err(SettingsError::Parse(_))
            ));
        }
        assert!(kv.is_empty());
    }

    #[test]
    fn export_then_import_restores_identical_contents() {
        let (kv, local) = populated_stores();
        let text = serde_json::to_string(&export_snapshot(&kv, &local).unwrap()).unwrap();

        let mut restored_kv = MemoryKeyValueStore::new();
        let mut restored_local = MemoryKeyValueStore::new();
        import_snapshot(&text, &mut restored_kv, &mut restored_local).unwrap();
        assert_eq!(restored_kv.entries(), kv.entries());
        assert_eq!(restored_local.entries(), local.entries());

        // A second import over the same stores changes nothing.
        import_snapshot(&text, &mut restored_kv, &mut restored_local).unwrap();
        assert_eq!(restored_kv.entries(), kv.entries());
        assert_eq!(restored_local.entries(), local.entries());
    }
}
