//! Registries of setting handlers.

use std::collections::HashMap;

use super::handlers::{
    auto_select_template_handler, context_optimization_handler, data_dir_handler, debug_handler,
    event_log_handler, latest_branch_handler, local_models_handler, AppNameHandler,
    PromptIdHandler, ReloadDelayHandler, SecretsBackendHandler,
};
use super::{SetContext, SettingError, SettingHandler};

/// A named set of setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `show` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        }
    }

    /// Keys persisted in the TOML config file.
    pub fn config_settings() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(data_dir_handler()));
        registry.register(Box::new(SecretsBackendHandler));
        registry.register(Box::new(ReloadDelayHandler));
        registry.register(Box::new(event_log_handler()));
        registry.register(Box::new(AppNameHandler));
        registry
    }

    /// Feature toggles kept in the key/value store.
    pub fn feature_settings() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(debug_handler()));
        registry.register(Box::new(latest_branch_handler()));
        registry.register(Box::new(auto_select_template_handler()));
        registry.register(Box::new(context_optimization_handler()));
        registry.register(Box::new(local_models_handler()));
        registry.register(Box::new(PromptIdHandler));
        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key.
    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// Look up `key` or fail with [`SettingError::UnknownKey`].
    pub fn require(&self, key: &str) -> Result<&dyn SettingHandler, SettingError> {
        self.get(key)
            .ok_or_else(|| SettingError::UnknownKey(key.to_string()))
    }

    /// Get all keys in sorted order.
    pub fn keys_sorted(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.handlers.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }

    /// One formatted line per key, in display order.
    pub fn format_all(&self, ctx: &SetContext<'_>) -> Result<Vec<String>, SettingError> {
        self.display_order
            .iter()
            .filter_map(|key| self.get(key))
            .map(|handler| handler.format(ctx))
            .collect()
    }
}
