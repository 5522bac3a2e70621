//! Completed work sessions.
//!
//! The full session list lives as one JSON array in a single key-value slot
//! and is rewritten whole on every save. Reads never fail on bad data: a
//! slot that does not parse is reported and treated as empty.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::kv::KeyValueStore;
use crate::error::StorageError;

pub const SESSIONS_KEY: &str = "pomodoro_sessions";

/// A finished work interval, before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub task_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Elapsed milliseconds, `end_time - start_time`.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub task_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
}

/// Sessions sharing one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    /// Newest first.
    pub sessions: Vec<Session>,
}

impl DayBucket {
    pub fn total_duration_ms(&self) -> u64 {
        self.sessions.iter().map(|s| s.duration_ms).sum()
    }
}

pub struct SessionStore<K> {
    kv: K,
}

impl<K: KeyValueStore> SessionStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Assign an id, append, and persist the whole set.
    ///
    /// # Errors
    /// Returns an error if the slot cannot be read or written.
    pub fn save(&self, session: NewSession) -> Result<Session, StorageError> {
        let mut sessions = self.load()?;
        let id = next_id(&sessions, session.end_time);
        let saved = Session {
            id,
            task_name: session.task_name,
            start_time: session.start_time,
            end_time: session.end_time,
            duration_ms: session.duration_ms,
        };
        sessions.push(saved.clone());

        let json = serde_json::to_string(&sessions).map_err(|source| StorageError::Encode {
            key: SESSIONS_KEY.to_string(),
            source,
        })?;
        self.kv.set(SESSIONS_KEY, &json)?;
        info!(id = %saved.id, task = %saved.task_name, duration_ms = saved.duration_ms, "session saved");
        Ok(saved)
    }

    /// Every stored session. Unreadable or malformed data yields an empty list.
    pub fn get_all(&self) -> Vec<Session> {
        self.load().unwrap_or_else(|e| {
            error!("failed to read sessions: {e}");
            Vec::new()
        })
    }

    /// Sessions bucketed by device-local day, newest day first.
    pub fn get_grouped_by_day(&self) -> Vec<DayBucket> {
        self.get_grouped_by_day_in(&Local)
    }

    /// Sessions bucketed by calendar day in `tz`, newest day first.
    pub fn get_grouped_by_day_in<Tz: TimeZone>(&self, tz: &Tz) -> Vec<DayBucket> {
        let mut by_day: BTreeMap<NaiveDate, Vec<Session>> = BTreeMap::new();
        for session in self.get_all() {
            let date = session.start_time.with_timezone(tz).date_naive();
            by_day.entry(date).or_default().push(session);
        }

        by_day
            .into_iter()
            .rev()
            .map(|(date, mut sessions)| {
                sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
                DayBucket { date, sessions }
            })
            .collect()
    }

    /// Number of sessions that started on the local day of `reference`.
    pub fn get_completed_today(&self, reference: DateTime<Utc>) -> usize {
        self.get_completed_on_in(reference, &Local)
    }

    pub fn get_completed_on_in<Tz: TimeZone>(&self, reference: DateTime<Utc>, tz: &Tz) -> usize {
        let day = reference.with_timezone(tz).date_naive();
        self.get_all()
            .iter()
            .filter(|s| s.start_time.with_timezone(tz).date_naive() == day)
            .count()
    }

    /// Remove every session.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the removal.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        self.kv.remove(SESSIONS_KEY)?;
        info!("session history cleared");
        Ok(())
    }

    fn load(&self) -> Result<Vec<Session>, StorageError> {
        let Some(json) = self.kv.get(SESSIONS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&json) {
            Ok(sessions) => Ok(sessions),
            Err(e) => {
                warn!("ignoring malformed session data: {e}");
                Ok(Vec::new())
            }
        }
    }
}

/// Epoch milliseconds of `created`, bumped past any id already in use.
fn next_id(existing: &[Session], created: DateTime<Utc>) -> String {
    let candidate = created.timestamp_millis();
    let newest = existing
        .iter()
        .filter_map(|s| s.id.parse::<i64>().ok())
        .max();
    match newest {
        Some(n) if n >= candidate => (n + 1).to_string(),
        _ => candidate.to_string(),
    }
}

/// Compact rendering of a duration: `"1h 5m"` or `"25m"`.
pub fn format_duration_ms(duration_ms: u64) -> String {
    let minutes = duration_ms / 60_000;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else {
        format!("{minutes}m")
    }
}
