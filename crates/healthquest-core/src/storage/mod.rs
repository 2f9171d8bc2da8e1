mod config;
pub mod database;
pub mod memory;

pub use config::{Config, InsightsConfig, LedgerConfig, RewardsConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{ConfigError, StorageError};

/// Keys the session reads and writes.
pub mod keys {
    pub const HEALTH_DATA: &str = "healthData";
    pub const GOALS: &str = "goals";
    pub const TOTAL_POINTS: &str = "totalPoints";
    pub const TOKEN_REWARDS: &str = "bnyRewards";
}

/// Returns `~/.config/healthquest[-dev]/` based on HEALTHQUEST_ENV.
///
/// Set HEALTHQUEST_ENV=dev to use the development data directory, or
/// HEALTHQUEST_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HEALTHQUEST_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HEALTHQUEST_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("healthquest-dev")
            } else {
                base_dir.join("healthquest")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Durable local key-value store holding JSON-encoded values.
///
/// Implementors provide the raw string operations; the typed helpers
/// serialize through serde_json. Reads never fail on bad data: a value that
/// does not deserialize is reported as absent.
pub trait KeyValueStore {
    /// Raw read. `Ok(None)` when the key was never written.
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Raw write, overwriting any previous value.
    fn put_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Write all entries or none of them.
    fn put_raw_batch(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    /// Serialize `value` and store it under `key`.
    fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = encode(key, value)?;
        self.put_raw(key, &encoded)
    }

    /// Read and deserialize `key`; corrupt entries read as `None`.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "ignoring undecodable stored value");
                Ok(None)
            }
        }
    }

    /// Serialize several values and write them as one unit.
    fn put_batch(&self, entries: &[(&str, serde_json::Value)]) -> Result<(), StorageError> {
        let encoded = entries
            .iter()
            .map(|(key, value)| -> Result<_, StorageError> { Ok((*key, encode(key, value)?)) })
            .collect::<Result<Vec<_>, _>>()?;
        self.put_raw_batch(&encoded)
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })
}
