use crate::core::config::data::{Config, SecretsBackend};
use crate::core::config::io::ConfigError;
use crate::core::constants::DEFAULT_RELOAD_DELAY;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_APP_NAME: &str = "chatkeep";

const KEY_VALUE_FILE: &str = "cookies.json";
const LOCAL_STORE_FILE: &str = "local-storage.json";
const CHATS_DIR: &str = "chats";

/// On-disk locations of the three stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub key_value: PathBuf,
    pub local: PathBuf,
    pub chats: PathBuf,
}

impl Config {
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    pub fn store_paths(&self) -> Result<StorePaths, ConfigError> {
        let root = self.data_dir()?;
        Ok(StorePaths {
            key_value: root.join(KEY_VALUE_FILE),
            local: root.join(LOCAL_STORE_FILE),
            chats: root.join(CHATS_DIR),
        })
    }

    pub fn secrets_backend(&self) -> SecretsBackend {
        self.secrets_backend.unwrap_or_default()
    }

    pub fn reload_delay(&self) -> Duration {
        self.reload_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RELOAD_DELAY)
    }

    pub fn app_name(&self) -> &str {
        self.app_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_APP_NAME)
    }
}
