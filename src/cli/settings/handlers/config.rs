//! Handlers for keys in the TOML config file.

use std::path::{Path, PathBuf};

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{success_set, success_unset};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::data::{path_display, Config, SecretsBackend};
use crate::core::config::defaults::DEFAULT_APP_NAME;
use crate::core::constants::DEFAULT_RELOAD_DELAY;

/// Data-driven handler for optional path settings.
pub struct PathHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: &'static str,
    get: fn(&Config) -> Option<&Path>,
    set_field: fn(&mut Config, Option<PathBuf>),
}

impl SettingHandler for PathHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let input = args.join(" ");
        if input.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let path = PathBuf::from(input.trim());
        let message = success_set(self.key, &path_display(&path));
        (self.set_field)(ctx.config, Some(path));
        Ok(message)
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        (self.set_field)(ctx.config, None);
        Ok(success_unset(self.key, self.default_display))
    }

    fn format(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        Ok(match (self.get)(&*ctx.config) {
            Some(path) => format!("  {}: {}", self.key, path_display(path)),
            None => format!("  {}: (unset, default: {})", self.key, self.default_display),
        })
    }
}

pub fn data_dir_handler() -> PathHandler {
    PathHandler {
        key: "data-dir",
        hint: "To move the stores, specify a directory:",
        example: "chatkeep config set data-dir ~/backups/assistant",
        default_display: "platform data directory",
        get: |c| c.data_dir.as_deref(),
        set_field: |c, v| c.data_dir = v,
    }
}

pub fn event_log_handler() -> PathHandler {
    PathHandler {
        key: "event-log",
        hint: "To record data operations, specify a log file:",
        example: "chatkeep config set event-log ~/chatkeep-events.log",
        default_display: "disabled",
        get: |c| c.event_log.as_deref(),
        set_field: |c, v| c.event_log = v,
    }
}

/// Handler for the `secrets-backend` setting.
pub struct SecretsBackendHandler;

impl SettingHandler for SecretsBackendHandler {
    fn key(&self) -> &'static str {
        "secrets-backend"
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To choose where API keys are stored, specify file or keyring:",
                example: "chatkeep config set secrets-backend keyring",
            });
        }

        let backend: SecretsBackend =
            args.join(" ")
                .parse()
                .map_err(|reason| SettingError::InvalidValue {
                    key: "secrets-backend",
                    reason,
                })?;
        ctx.config.secrets_backend = Some(backend);
        Ok(success_set("secrets-backend", backend.as_str()))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        ctx.config.secrets_backend = None;
        Ok(success_unset(
            "secrets-backend",
            SecretsBackend::default().as_str(),
        ))
    }

    fn format(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        Ok(match ctx.config.secrets_backend {
            Some(backend) => format!("  secrets-backend: {backend}"),
            None => format!(
                "  secrets-backend: (unset, default: {})",
                SecretsBackend::default()
            ),
        })
    }
}

/// Handler for the `reload-delay` setting, in milliseconds.
pub struct ReloadDelayHandler;

impl SettingHandler for ReloadDelayHandler {
    fn key(&self) -> &'static str {
        "reload-delay"
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let Some(input) = args.first() else {
            return Err(SettingError::MissingArgs {
                hint: "To change the re-initialization delay, give milliseconds:",
                example: "chatkeep config set reload-delay 500",
            });
        };

        let millis: u64 = input
            .trim()
            .trim_end_matches("ms")
            .parse()
            .map_err(|_| SettingError::InvalidValue {
                key: "reload-delay",
                reason: format!("expected milliseconds, got '{input}'"),
            })?;
        ctx.config.reload_delay_ms = Some(millis);
        Ok(success_set("reload-delay", &format!("{millis}ms")))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        ctx.config.reload_delay_ms = None;
        Ok(success_unset(
            "reload-delay",
            &format!("{}ms", DEFAULT_RELOAD_DELAY.as_millis()),
        ))
    }

    fn format(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        Ok(match ctx.config.reload_delay_ms {
            Some(millis) => format!("  reload-delay: {millis}ms"),
            None => format!(
                "  reload-delay: (unset, default: {}ms)",
                DEFAULT_RELOAD_DELAY.as_millis()
            ),
        })
    }
}

/// Handler for the `app-name` setting.
pub struct AppNameHandler;

impl SettingHandler for AppNameHandler {
    fn key(&self) -> &'static str {
        "app-name"
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let name = args.join(" ");
        let name = name.trim();
        if name.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To name exported settings files, specify an application name:",
                example: "chatkeep config set app-name terretacode",
            });
        }
        if name.contains(['/', '\\']) {
            return Err(SettingError::InvalidValue {
                key: "app-name",
                reason: "must not contain path separators".to_string(),
            });
        }

        ctx.config.app_name = Some(name.to_string());
        Ok(success_set("app-name", name))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        ctx.config.app_name = None;
        Ok(success_unset("app-name", DEFAULT_APP_NAME))
    }

    fn format(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        Ok(match &ctx.config.app_name {
            Some(name) => format!("  app-name: {name}"),
            None => format!("  app-name: (unset, default: {DEFAULT_APP_NAME})"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKeyValueStore;

    fn words(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn config_handlers_update_fields() {
        let mut config = Config::default();
        let mut kv = MemoryKeyValueStore::new();
        let mut ctx = SetContext {
            config: &mut config,
            kv: &mut kv,
        };

        data_dir_handler()
            .set(&words(&["/tmp/chatkeep"]), &mut ctx)
            .unwrap();
        SecretsBackendHandler
            .set(&words(&["keyring"]), &mut ctx)
            .unwrap();
        ReloadDelayHandler.set(&words(&["250ms"]), &mut ctx).unwrap();
        AppNameHandler
            .set(&words(&["terreta", "code"]), &mut ctx)
            .unwrap();

        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/chatkeep")));
        assert_eq!(config.secrets_backend, Some(SecretsBackend::Keyring));
        assert_eq!(config.reload_delay_ms, Some(250));
        assert_eq!(config.app_name.as_deref(), Some("terreta code"));
    }

    #[test]
    fn unset_restores_defaults_in_display() {
        let mut config = Config {
            reload_delay_ms: Some(10),
            ..Default::default()
        };
        let mut kv = MemoryKeyValueStore::new();
        let mut ctx = SetContext {
            config: &mut config,
            kv: &mut kv,
        };

        let message = ReloadDelayHandler.unset(&mut ctx).unwrap();
        assert_eq!(message, "✅ Unset reload-delay (will use default: 1500ms)");
        assert_eq!(
            ReloadDelayHandler.format(&ctx).unwrap(),
            "  reload-delay: (unset, default: 1500ms)"
        );
        assert_eq!(
            event_log_handler().format(&ctx).unwrap(),
            "  event-log: (unset, default: disabled)"
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = Config::default();
        let mut kv = MemoryKeyValueStore::new();
        let mut ctx = SetContext {
            config: &mut config,
            kv: &mut kv,
        };

        assert!(matches!(
            SecretsBackendHandler.set(&words(&["vault"]), &mut ctx),
            Err(SettingError::InvalidValue { .. })
        ));
        assert!(matches!(
            ReloadDelayHandler.set(&words(&["soon"]), &mut ctx),
            Err(SettingError::InvalidValue { .. })
        ));
        assert!(matches!(
            AppNameHandler.set(&words(&["a/b"]), &mut ctx),
            Err(SettingError::InvalidValue { .. })
        ));
        assert_eq!(config, Config::default());
    }
}
