//! Boolean feature toggles stored in the key/value store.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{
    format_bool, parse_bool, read_store, stored_bool, success_set, success_unset, write_store,
};
use crate::cli::settings::{SetContext, SettingHandler};

/// Data-driven handler for on/off feature toggles.
///
/// A toggle may mirror its value into several store keys; the first one is
/// read back for display.
pub struct BooleanHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default: bool,
    store_keys: &'static [&'static str],
}

impl BooleanHandler {
    fn write(&self, ctx: &mut SetContext<'_>, value: bool) -> Result<(), SettingError> {
        for store_key in self.store_keys {
            write_store(ctx.kv, store_key, stored_bool(value))?;
        }
        Ok(())
    }
}

impl SettingHandler for BooleanHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let input = args.join(" ");
        let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
        self.write(ctx, value)?;
        Ok(success_set(self.key, format_bool(value)))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        self.write(ctx, self.default)?;
        Ok(success_unset(self.key, format_bool(self.default)))
    }

    fn format(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let Some(primary) = self.store_keys.first() else {
            return Ok(format!("  {}: (no storage key)", self.key));
        };
        let stored = read_store(&*ctx.kv, primary)?;
        Ok(match stored.as_deref().and_then(parse_bool) {
            Some(value) => format!("  {}: {}", self.key, format_bool(value)),
            None => format!(
                "  {}: (unset, default: {})",
                self.key,
                format_bool(self.default)
            ),
        })
    }
}

/// Debug mode also switches event logging, matching the settings UI.
pub fn debug_handler() -> BooleanHandler {
    BooleanHandler {
        key: "debug",
        hint: "To toggle debug features, specify on or off:",
        example: "chatkeep features set debug on",
        default: false,
        store_keys: &["isDebugEnabled", "isEventLogsEnabled"],
    }
}

pub fn latest_branch_handler() -> BooleanHandler {
    BooleanHandler {
        key: "latest-branch",
        hint: "To follow the main branch for updates, specify on or off:",
        example: "chatkeep features set latest-branch on",
        default: false,
        store_keys: &["isLatestBranch"],
    }
}

pub fn local_models_handler() -> BooleanHandler {
    BooleanHandler {
        key: "local-models",
        hint: "To enable experimental local providers, specify on or off:",
        example: "chatkeep features set local-models on",
        default: false,
        store_keys: &["isLocalModelsEnabled"],
    }
}

pub fn auto_select_template_handler() -> BooleanHandler {
    BooleanHandler {
        key: "auto-select-template",
        hint: "To let the assistant pick a starter template, specify on or off:",
        example: "chatkeep features set auto-select-template off",
        default: false,
        store_keys: &["autoSelectTemplate"],
    }
}

pub fn context_optimization_handler() -> BooleanHandler {
    BooleanHandler {
        key: "context-optimization",
        hint: "To enable context optimization, specify on or off:",
        example: "chatkeep features set context-optimization on",
        default: false,
        store_keys: &["contextOptimizationEnabled"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::store::{KeyValueStore, MemoryKeyValueStore};

    #[test]
    fn debug_toggle_writes_both_flags() {
        let mut config = Config::default();
        let mut kv = MemoryKeyValueStore::new();
        let mut ctx = SetContext {
            config: &mut config,
            kv: &mut kv,
        };

        let handler = debug_handler();
        let message = handler.set(&["on".to_string()], &mut ctx).unwrap();
        assert_eq!(message, "✅ Set debug to: on");
        assert_eq!(handler.format(&ctx).unwrap(), "  debug: on");

        let message = handler.unset(&mut ctx).unwrap();
        assert_eq!(message, "✅ Unset debug (will use default: off)");
        assert_eq!(kv.get("isDebugEnabled").unwrap().as_deref(), Some("false"));
        assert_eq!(kv.get("isEventLogsEnabled").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn unset_toggle_reports_default() {
        let mut config = Config::default();
        let mut kv = MemoryKeyValueStore::new();
        let ctx = SetContext {
            config: &mut config,
            kv: &mut kv,
        };
        assert_eq!(
            local_models_handler().format(&ctx).unwrap(),
            "  local-models: (unset, default: off)"
        );
    }

    #[test]
    fn rejects_missing_and_invalid_values() {
        let mut config = Config::default();
        let mut kv = MemoryKeyValueStore::new();
        let mut ctx = SetContext {
            config: &mut config,
            kv: &mut kv,
        };
        let handler = latest_branch_handler();

        assert!(matches!(
            handler.set(&[], &mut ctx),
            Err(SettingError::MissingArgs { .. })
        ));
        assert!(matches!(
            handler.set(&["sometimes".to_string()], &mut ctx),
            Err(SettingError::InvalidBoolean(_))
        ));
        assert!(kv.is_empty());
    }
}
