//! User preferences kept in the key-value store.

use tracing::warn;

use super::kv::KeyValueStore;
use crate::error::{ConfigError, CoreError};

pub const LONG_BREAK_KEY: &str = "longBreakDuration";

pub const DEFAULT_LONG_BREAK_MIN: u64 = 15;
/// Largest long break a user may choose, in minutes.
pub const MAX_LONG_BREAK_MIN: u64 = 120;

pub struct Preferences<K> {
    kv: K,
}

impl<K: KeyValueStore> Preferences<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Long break length in minutes. Missing or unreadable values fall back
    /// to the default.
    pub fn long_break_minutes(&self) -> u64 {
        match self.kv.get(LONG_BREAK_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<u64>() {
                Ok(n) if (1..=MAX_LONG_BREAK_MIN).contains(&n) => n,
                _ => {
                    warn!(value = %raw, "ignoring invalid long break preference");
                    DEFAULT_LONG_BREAK_MIN
                }
            },
            Ok(None) => DEFAULT_LONG_BREAK_MIN,
            Err(e) => {
                warn!("failed to read long break preference: {e}");
                DEFAULT_LONG_BREAK_MIN
            }
        }
    }

    /// # Errors
    /// Returns an error if `minutes` is out of range or the write fails.
    pub fn set_long_break_minutes(&self, minutes: u64) -> Result<(), CoreError> {
        if !(1..=MAX_LONG_BREAK_MIN).contains(&minutes) {
            return Err(ConfigError::InvalidValue {
                key: LONG_BREAK_KEY.to_string(),
                message: format!("must be between 1 and {MAX_LONG_BREAK_MIN} minutes"),
            }
            .into());
        }
        self.kv.set(LONG_BREAK_KEY, &minutes.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_to_fifteen() {
        let prefs = Preferences::new(MemoryStore::new());
        assert_eq!(prefs.long_break_minutes(), 15);
    }

    #[test]
    fn set_then_get() {
        let prefs = Preferences::new(MemoryStore::new());
        prefs.set_long_break_minutes(30).unwrap();
        assert_eq!(prefs.long_break_minutes(), 30);
    }

    #[test]
    fn rejects_zero() {
        let prefs = Preferences::new(MemoryStore::new());
        assert!(prefs.set_long_break_minutes(0).is_err());
        assert_eq!(prefs.long_break_minutes(), 15);
    }

    #[test]
    fn garbage_falls_back() {
        let kv = MemoryStore::new();
        kv.set(LONG_BREAK_KEY, "thirty").unwrap();
        assert_eq!(Preferences::new(kv).long_break_minutes(), 15);
    }
}
