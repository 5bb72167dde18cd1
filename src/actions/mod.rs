//! User-facing data operations.
//!
//! Every action returns a [`Notice`] instead of an error: failures are
//! logged to tracing and the event log, then reported as an error notice.
//! Nothing in here panics on bad input or a broken store.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::config::{Config, ConfigError, SecretsBackend};
use crate::core::events::{DataEvent, EventBus};
use crate::core::keyring::KeyringStore;
use crate::store::{ChatStore, DirChatStore, FileKeyValueStore, KeyValueStore, StoreError};
use crate::utils::logging::EventLog;

pub mod chats;
pub mod settings;

pub use chats::ChatSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// Outcome of an action, shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    pub fn icon(&self) -> &'static str {
        match self.kind {
            NoticeKind::Success => "✅",
            NoticeKind::Warning => "⚠️ ",
            NoticeKind::Error => "❌",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.message)
    }
}

/// Where an export is written.
#[derive(Debug, Clone, Default)]
pub struct ExportTarget {
    /// File or directory; the working directory when absent.
    pub out: Option<PathBuf>,
    pub overwrite: bool,
}

impl ExportTarget {
    pub fn resolve(&self, default_name: &str) -> PathBuf {
        match &self.out {
            Some(path) if path.is_dir() => path.join(default_name),
            Some(path) => path.clone(),
            None => PathBuf::from(default_name),
        }
    }
}

/// Store handles and sinks shared by every action.
pub struct DataContext {
    pub kv: Box<dyn KeyValueStore>,
    pub local: Box<dyn KeyValueStore>,
    /// Destination for imported API keys; `kv` when absent.
    pub secrets: Option<Box<dyn KeyValueStore>>,
    pub chats: Option<Arc<dyn ChatStore>>,
    pub events: EventBus,
    pub event_log: EventLog,
    pub reload_delay: Duration,
    pub app_name: String,
    pending: Vec<JoinHandle<usize>>,
}

/// Failure to open the stores named by the config.
#[derive(Debug)]
pub enum OpenError {
    Config(ConfigError),
    Store(StoreError),
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::Config(err) => write!(f, "{err}"),
            OpenError::Store(err) => write!(f, "Failed to open settings store: {err}"),
            OpenError::Io { path, source } => {
                write!(f, "Failed to prepare {}: {source}", path.display())
            }
        }
    }
}

impl StdError for OpenError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            OpenError::Config(err) => Some(err),
            OpenError::Store(err) => Some(err),
            OpenError::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for OpenError {
    fn from(err: ConfigError) -> Self {
        OpenError::Config(err)
    }
}

impl From<StoreError> for OpenError {
    fn from(err: StoreError) -> Self {
        OpenError::Store(err)
    }
}

impl DataContext {
    /// Build a context around explicit handles. Used by tests and embedders.
    pub fn new(
        kv: Box<dyn KeyValueStore>,
        local: Box<dyn KeyValueStore>,
        chats: Option<Arc<dyn ChatStore>>,
    ) -> Self {
        Self {
            kv,
            local,
            secrets: None,
            chats,
            events: EventBus::new(),
            event_log: EventLog::disabled(),
            reload_delay: crate::core::constants::DEFAULT_RELOAD_DELAY,
            app_name: crate::core::config::defaults::DEFAULT_APP_NAME.to_string(),
            pending: Vec::new(),
        }
    }

    /// Open the on-disk stores under the configured data directory.
    pub fn open(config: &Config, log_override: Option<PathBuf>) -> Result<Self, OpenError> {
        let paths = config.store_paths()?;
        if let Some(dir) = paths.key_value.parent() {
            std::fs::create_dir_all(dir).map_err(|source| OpenError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let kv = FileKeyValueStore::open(&paths.key_value)?;
        let local = FileKeyValueStore::open(&paths.local)?;
        let chats: Arc<dyn ChatStore> = Arc::new(DirChatStore::new(&paths.chats));
        debug!(data_dir = %paths.chats.display(), "Opened data stores");

        let mut context = Self::new(Box::new(kv), Box::new(local), Some(chats));
        if config.secrets_backend() == SecretsBackend::Keyring {
            context.secrets = Some(Box::new(KeyringStore::new()));
        }
        context.reload_delay = config.reload_delay();
        context.app_name = config.app_name().to_string();

        let log_path = log_override.or_else(|| config.event_log.clone());
        if let Some(path) = log_path {
            match context.event_log.set_log_file(path.clone()) {
                Ok(message) => debug!("{message}"),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Event log unavailable")
                }
            }
        }
        debug!(
            event_log = %context.event_log.get_status_string(),
            "Data context ready"
        );
        Ok(context)
    }

    pub fn with_event_log(mut self, event_log: EventLog) -> Self {
        self.event_log = event_log;
        self
    }

    pub(crate) fn chat_store(&self) -> Option<&dyn ChatStore> {
        self.chats.as_deref()
    }

    pub(crate) fn schedule(&mut self, event: DataEvent, delay: Duration) {
        let handle = self.events.publish_after(event, delay);
        self.pending.push(handle);
    }

    /// Wait for scheduled events to go out. Returns how many were delivered
    /// to at least one subscriber.
    pub async fn flush_events(&mut self) -> usize {
        let mut delivered = 0;
        for handle in self.pending.drain(..) {
            match handle.await {
                Ok(receivers) if receivers > 0 => delivered += 1,
                Ok(_) => {}
                Err(err) => warn!(error = %err, "Scheduled event task failed"),
            }
        }
        delivered
    }

    pub(crate) fn succeed(&self, log_message: &str, notice: Notice) -> Notice {
        info!("{log_message}");
        if let Err(err) = self.event_log.log_system(log_message) {
            warn!(error = %err, "Failed to write event log");
        }
        notice
    }

    /// Log an operation that finished but left something behind.
    pub(crate) fn partial(&self, log_message: &str, notice: Notice) -> Notice {
        warn!("{log_message}");
        if let Err(err) = self.event_log.log_error(log_message) {
            warn!(error = %err, "Failed to write event log");
        }
        notice
    }

    pub(crate) fn fail(&self, log_message: &str, err: &dyn StdError, notice: Notice) -> Notice {
        let chain = error_chain(err);
        error!(error = %chain, "{log_message}");
        if let Err(write_err) = self
            .event_log
            .log_error(&format!("{log_message}\n{chain}"))
        {
            warn!(error = %write_err, "Failed to write event log");
        }
        notice
    }
}

/// Render an error and its sources, one per line.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str("\ncaused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryChatStore, MemoryKeyValueStore};
    use tempfile::TempDir;

    #[test]
    fn notice_display_uses_icons() {
        assert_eq!(Notice::success("done").to_string(), "✅ done");
        assert_eq!(Notice::warning("hm").to_string(), "⚠️  hm");
        assert!(Notice::error("no").is_error());
    }

    #[test]
    fn export_target_resolves_directories() {
        let dir = TempDir::new().unwrap();
        let target = ExportTarget {
            out: Some(dir.path().to_path_buf()),
            overwrite: false,
        };
        assert_eq!(target.resolve("a.json"), dir.path().join("a.json"));
        assert_eq!(
            ExportTarget::default().resolve("a.json"),
            PathBuf::from("a.json")
        );
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = StoreError::Io {
            path: PathBuf::from("/x"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(
            error_chain(&err),
            "Storage I/O failed at /x: disk full\ncaused by: disk full"
        );
    }

    #[test]
    fn open_uses_configured_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: Some(dir.path().join("data")),
            reload_delay_ms: Some(10),
            app_name: Some("terretacode".to_string()),
            ..Default::default()
        };

        let context = DataContext::open(&config, None).unwrap();
        assert!(dir.path().join("data").is_dir());
        assert!(context.chat_store().is_some());
        assert!(context.secrets.is_none());
        assert_eq!(context.reload_delay, Duration::from_millis(10));
        assert_eq!(context.app_name, "terretacode");
        assert!(!context.event_log.is_active());
    }

    #[test]
    fn open_enables_event_log_and_tolerates_bad_path() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: Some(dir.path().join("data")),
            event_log: Some(dir.path().join("missing").join("events.log")),
            ..Default::default()
        };

        let context = DataContext::open(&config, None).unwrap();
        assert_eq!(context.event_log.get_status_string(), "disabled");

        let log_path = dir.path().join("events.log");
        let context = DataContext::open(&config, Some(log_path.clone())).unwrap();
        assert_eq!(context.event_log.get_status_string(), "active (events.log)");
        assert!(log_path.exists());
    }

    #[tokio::test]
    async fn flush_counts_delivered_events() {
        let mut context = DataContext::new(
            Box::new(MemoryKeyValueStore::new()),
            Box::new(MemoryKeyValueStore::new()),
            Some(Arc::new(MemoryChatStore::new())),
        );
        let _rx = context.events.subscribe();
        context.schedule(DataEvent::ChatsChanged { count: 1 }, Duration::ZERO);
        assert_eq!(context.flush_events().await, 1);
        assert_eq!(context.flush_events().await, 0);
    }
}
