use super::data::{path_display, Config, SecretsBackend};
use super::defaults::DEFAULT_APP_NAME;
use super::io::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        data_dir: Some(PathBuf::from("/srv/chatkeep")),
        secrets_backend: Some(SecretsBackend::Keyring),
        ..Default::default()
    };
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");
    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);

    let mut config = loaded;
    config.secrets_backend = None;
    config.reload_delay_ms = Some(250);
    config
        .save_to_path(&config_path)
        .expect("Failed to save modified config");
    let loaded = Config::load_from_path(&config_path).expect("Failed to load modified config");
    assert_eq!(loaded.secrets_backend, None);
    assert_eq!(loaded.reload_delay_ms, Some(250));
    assert_eq!(loaded.data_dir, Some(PathBuf::from("/srv/chatkeep")));
}

#[test]
fn test_secrets_backend_serializes_lowercase() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "secrets_backend = \"keyring\"\n").unwrap();

    let config = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(config.secrets_backend(), SecretsBackend::Keyring);
    assert_eq!("FILE".parse::<SecretsBackend>(), Ok(SecretsBackend::File));
    assert!("vault".parse::<SecretsBackend>().is_err());
}

#[test]
fn test_invalid_toml_reports_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "reload_delay_ms = \"soon\"\n").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config at "));
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.reload_delay(), Duration::from_millis(1500));
    assert_eq!(config.secrets_backend(), SecretsBackend::File);
    assert_eq!(config.app_name(), DEFAULT_APP_NAME);

    let blank_name = Config {
        app_name: Some("  ".to_string()),
        ..Default::default()
    };
    assert_eq!(blank_name.app_name(), DEFAULT_APP_NAME);
}

#[test]
fn test_store_paths_follow_data_dir() {
    let config = Config {
        data_dir: Some(PathBuf::from("/data")),
        ..Default::default()
    };
    let paths = config.store_paths().expect("paths");
    assert_eq!(paths.key_value, PathBuf::from("/data/cookies.json"));
    assert_eq!(paths.local, PathBuf::from("/data/local-storage.json"));
    assert_eq!(paths.chats, PathBuf::from("/data/chats"));
}

#[cfg(unix)]
#[test]
fn test_path_display_uses_tilde_under_home() {
    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".local/share/chatkeep");
        assert_eq!(path_display(&path), "~/.local/share/chatkeep");
    }
    assert_eq!(path_display("/etc/chatkeep"), "/etc/chatkeep");
}
