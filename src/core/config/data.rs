use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where imported API keys are written.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SecretsBackend {
    /// The same key/value file as every other setting.
    #[default]
    File,
    /// The platform keyring.
    Keyring,
}

impl SecretsBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            SecretsBackend::File => "file",
            SecretsBackend::Keyring => "keyring",
        }
    }
}

impl fmt::Display for SecretsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretsBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SecretsBackend::File),
            "keyring" => Ok(SecretsBackend::Keyring),
            other => Err(format!("unknown secrets backend: {other}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the settings stores and the chat archive.
    pub data_dir: Option<PathBuf>,
    /// Where `keys import` stores provider keys.
    pub secrets_backend: Option<SecretsBackend>,
    /// Delay before re-initialization is requested after a key import.
    pub reload_delay_ms: Option<u64>,
    /// Append-only event log of data operations.
    pub event_log: Option<PathBuf>,
    /// Prefix for exported settings file names.
    pub app_name: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.local/share/chatkeep` → `~/.local/share/chatkeep`
/// - Windows: paths are displayed unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
