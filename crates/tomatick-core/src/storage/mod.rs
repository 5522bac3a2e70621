mod config;
pub mod kv;
pub mod preferences;
pub mod sessions;
pub mod sqlite;

pub use config::{Config, NotificationsConfig, StorageBackend, StorageConfig};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore, SharedStore};
pub use preferences::Preferences;
pub use sessions::{format_duration_ms, DayBucket, NewSession, Session, SessionStore};
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/tomatick/`, creating it if needed.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tomatick");

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

/// Open the key-value backend selected in `config`, rooted at `dir`.
///
/// # Errors
/// Returns an error if the SQLite database cannot be opened.
pub fn open_store(
    config: &Config,
    dir: &std::path::Path,
) -> Result<SharedStore, crate::error::StorageError> {
    let store: SharedStore = match config.storage.backend {
        StorageBackend::Sqlite => std::rc::Rc::new(SqliteStore::open(dir.join("tomatick.db"))?),
        StorageBackend::Json => std::rc::Rc::new(JsonFileStore::open(dir.join("tomatick.json"))),
    };
    Ok(store)
}
