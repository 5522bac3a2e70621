use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::NewSession;
use crate::timer::{Phase, TimerStatus};

/// Every state change of the timer produces an Event.
/// The controller reacts to `SessionFinished` and `PhaseChanged`; hosts may
/// render or log the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        cycle: u8,
        task_name: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimeAdded {
        added_secs: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    /// A work session ended and should be persisted.
    SessionFinished {
        session: NewSession,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
        cycle: u8,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        status: TimerStatus,
        cycle: u8,
        task_name: String,
        remaining_secs: u64,
        total_secs: u64,
        display: String,
        at: DateTime<Utc>,
    },
}
