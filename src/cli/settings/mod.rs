//! Handlers behind `config set|unset|show` and `features set|unset|show`.
//!
//! Two kinds of settings share the [`SettingHandler`] trait:
//!
//! - Config settings (e.g., `data-dir`, `secrets-backend`) live in the TOML
//!   config file.
//! - Feature toggles (e.g., `debug`, `prompt-id`) live in the key/value store
//!   next to the exported settings, where the application reads them.

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::data::Config;
use crate::store::KeyValueStore;

/// Context provided to setting handlers.
pub struct SetContext<'a> {
    pub config: &'a mut Config,
    pub kv: &'a mut dyn KeyValueStore,
}

/// Trait for handling one named setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the value from the words given after the key.
    ///
    /// Returns a success message to display.
    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError>;

    /// Reset the value to its default.
    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError>;

    /// Format the current value as an indented `key: value` line.
    fn format(&self, ctx: &SetContext<'_>) -> Result<String, SettingError>;
}
