use std::error::Error;
use std::fmt;

use keyring::Entry;
use tracing::debug;

use crate::store::{KeyValueStore, StoreError, StoreResult};

/// Service name under which every secret is filed in the platform keyring.
pub const KEYRING_SERVICE: &str = "chatkeep";

/// Describes failures when attempting to access the system keyring.
///
/// Recoverable errors indicate that the credential backend was
/// temporarily unavailable (for example when the keychain service is
/// locked or inaccessible). Permanent errors surface the underlying
/// cause directly so callers can report them to the user.
#[derive(Debug)]
pub enum KeyringAccessError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl KeyringAccessError {
    fn inner(&self) -> &keyring::Error {
        match self {
            KeyringAccessError::Recoverable(err) | KeyringAccessError::Permanent(err) => err,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeyringAccessError::Recoverable(_))
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner())
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

impl From<KeyringAccessError> for StoreError {
    fn from(err: KeyringAccessError) -> Self {
        StoreError::Keyring(err)
    }
}

/// Key/value store backed by the platform keyring.
///
/// Each key becomes one keyring entry. Keyrings cannot be enumerated, which
/// is fine because callers only read keys they already know.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
        }
    }

    fn entry(&self, key: &str) -> StoreResult<Entry> {
        Entry::new(&self.service, key).map_err(|err| KeyringAccessError::from(err).into())
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => {
                let err = KeyringAccessError::from(err);
                debug!(key, recoverable = err.is_recoverable(), "Keyring lookup failed");
                Err(err.into())
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|err| KeyringAccessError::from(err).into())
    }
}
