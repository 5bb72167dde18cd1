//! Helper functions for settings operations.

use crate::store::{KeyValueStore, StoreError};

use super::error::SettingError;

/// Parse a boolean value from user input.
///
/// Accepts: on/off, true/false, yes/no (case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Format a boolean value for display.
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Boolean toggles are stored as the text the application reads back.
pub fn stored_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

pub fn success_set(key: &str, value: &str) -> String {
    format!("✅ Set {key} to: {value}")
}

pub fn success_unset(key: &str, default_display: &str) -> String {
    format!("✅ Unset {key} (will use default: {default_display})")
}

pub fn read_store(kv: &dyn KeyValueStore, key: &str) -> Result<Option<String>, SettingError> {
    kv.get(key).map_err(store_error)
}

pub fn write_store(kv: &mut dyn KeyValueStore, key: &str, value: &str) -> Result<(), SettingError> {
    kv.set(key, value).map_err(store_error)
}

fn store_error(err: StoreError) -> SettingError {
    SettingError::StoreError(err.to_string())
}
