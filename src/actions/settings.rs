//! Settings snapshot and API key actions.

use std::path::Path;

use super::{DataContext, ExportTarget, Notice};
use crate::core::events::DataEvent;
use crate::settings::{api_key_template, export_snapshot, import_api_keys, import_snapshot};
use crate::store::KeyValueStore;
use crate::utils::json_file::write_pretty_json;

pub const API_KEY_TEMPLATE_FILE_NAME: &str = "api-keys-template.json";

pub fn settings_file_name(app_name: &str) -> String {
    format!("{app_name}-settings.json")
}

impl DataContext {
    pub async fn export_settings(&self, target: &ExportTarget) -> Notice {
        let snapshot = match export_snapshot(self.kv.as_ref(), self.local.as_ref()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                return self.fail(
                    "Failed to export settings",
                    &err,
                    Notice::error("Failed to export settings"),
                )
            }
        };

        let path = target.resolve(&settings_file_name(&self.app_name));
        if let Err(err) = write_pretty_json(&path, &snapshot, target.overwrite) {
            return self.fail(
                "Failed to export settings",
                &err,
                Notice::error(format!("Failed to export settings: {err}")),
            );
        }

        self.succeed(
            &format!(
                "Settings exported successfully (count: {})",
                snapshot.present_count()
            ),
            Notice::success(format!(
                "Settings exported successfully to {}",
                path.display()
            )),
        )
    }

    pub async fn import_settings(&mut self, path: &Path) -> Notice {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(err) => {
                return self.fail(
                    "Failed to import settings",
                    &err,
                    Notice::error(format!("Failed to import settings: {err}")),
                )
            }
        };

        match import_snapshot(&text, self.kv.as_mut(), self.local.as_mut()) {
            Ok(outcome) => {
                if outcome.requires_reinitialize() {
                    self.events.publish(DataEvent::SettingsChanged {
                        keys: outcome.written.clone(),
                    });
                }
                self.succeed(
                    &format!(
                        "Settings imported successfully (written: {}, skipped: {})",
                        outcome.written.len(),
                        outcome.skipped.len()
                    ),
                    Notice::success(
                        "Settings imported successfully. Restart running sessions for changes to take effect.",
                    ),
                )
            }
            Err(err) => self.fail(
                "Failed to import settings",
                &err,
                Notice::error(
                    "Failed to import settings. Make sure the file is a valid JSON file.",
                ),
            ),
        }
    }

    pub async fn export_api_key_template(&self, target: &ExportTarget) -> Notice {
        let path = target.resolve(API_KEY_TEMPLATE_FILE_NAME);
        match write_pretty_json(&path, &api_key_template(), target.overwrite) {
            Ok(()) => self.succeed(
                "API keys template exported successfully",
                Notice::success(format!(
                    "API keys template exported successfully to {}",
                    path.display()
                )),
            ),
            Err(err) => self.fail(
                "Failed to export API keys template",
                &err,
                Notice::error(format!("Failed to export API keys template: {err}")),
            ),
        }
    }

    /// Import provider keys, then schedule a re-initialization request after
    /// the configured delay.
    pub async fn import_api_keys(&mut self, path: &Path) -> Notice {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(err) => {
                return self.fail(
                    "Failed to import API keys",
                    &err,
                    Notice::error(format!("Failed to import API keys: {err}")),
                )
            }
        };

        let secrets: &mut dyn KeyValueStore = match self.secrets.as_mut() {
            Some(secrets) => secrets.as_mut(),
            None => self.kv.as_mut(),
        };
        let outcome = match import_api_keys(&text, secrets) {
            Ok(outcome) => outcome,
            Err(err) => {
                return self.fail(
                    "Failed to import API keys",
                    &err,
                    Notice::error(
                        "Failed to import API keys. Make sure the file is a valid JSON file.",
                    ),
                )
            }
        };

        let count = outcome.imported_count();
        if count == 0 {
            return Notice::warning("No valid API keys found in the file");
        }

        self.schedule(
            DataEvent::ReinitializeRequested {
                reason: format!("imported {count} API key(s)"),
            },
            self.reload_delay,
        );
        self.succeed(
            &format!(
                "API keys imported successfully (providers: {}, base URLs: {})",
                outcome.providers.join(", "),
                outcome.base_urls.len()
            ),
            Notice::success(format!(
                "Successfully imported {count} API keys/URLs. Re-initializing to apply changes..."
            )),
        )
    }
}
