use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StorageError;
use crate::storage::KeyValueStore;

pub const PENDING_KEY: &str = "pendingNotification";

/// How long a deferred notification stays worth showing.
pub const PENDING_MAX_AGE_SECS: i64 = 5 * 60;

/// A notification that could not be shown when it was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNotification {
    pub title: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

impl PendingNotification {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.timestamp < Duration::seconds(PENDING_MAX_AGE_SECS)
    }
}

/// The single transient slot holding at most one pending notification.
pub struct PendingSlot<K> {
    kv: K,
}

impl<K: KeyValueStore> PendingSlot<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Replace whatever is pending with `pending`.
    pub fn store(&self, pending: &PendingNotification) -> Result<(), StorageError> {
        let json = serde_json::to_string(pending).map_err(|source| StorageError::Encode {
            key: PENDING_KEY.to_string(),
            source,
        })?;
        self.kv.set(PENDING_KEY, &json)
    }

    /// Remove and return the pending record, if any. The slot is emptied
    /// even when its content does not parse.
    pub fn take(&self) -> Option<PendingNotification> {
        let raw = match self.kv.get(PENDING_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("failed to read pending notification: {e}");
                return None;
            }
        };
        if let Err(e) = self.kv.remove(PENDING_KEY) {
            warn!("failed to clear pending notification: {e}");
        }
        serde_json::from_str(&raw)
            .map_err(|e| warn!("dropping malformed pending notification: {e}"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn pending_at(ts: DateTime<Utc>) -> PendingNotification {
        PendingNotification {
            title: "Pomodoro Timer".into(),
            body: "Take a 5-minute short break!".into(),
            timestamp: ts,
        }
    }

    #[test]
    fn take_consumes_once() {
        let slot = PendingSlot::new(MemoryStore::new());
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap();
        slot.store(&pending_at(ts)).unwrap();
        assert_eq!(slot.take(), Some(pending_at(ts)));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn freshness_window() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap();
        let pending = pending_at(ts);
        assert!(pending.is_fresh(ts + Duration::seconds(299)));
        assert!(!pending.is_fresh(ts + Duration::seconds(300)));
    }

    #[test]
    fn malformed_record_is_cleared() {
        let kv = std::rc::Rc::new(MemoryStore::new());
        kv.set(PENDING_KEY, "nope").unwrap();
        let slot = PendingSlot::new(kv.clone());
        assert_eq!(slot.take(), None);
        assert!(kv.get(PENDING_KEY).unwrap().is_none());
    }
}
