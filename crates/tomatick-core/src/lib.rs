//! # Tomatick Core Library
//!
//! Core logic for the Tomatick Pomodoro timer: one countdown cycling through
//! work, short-break and long-break phases, a local history of finished work
//! sessions, and notifications on every phase change. The CLI binary is a
//! thin host over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine; the caller invokes
//!   `tick()` once per second and passes the current instant to every command
//! - **Timer Controller**: wires the engine to storage and notifications
//! - **Storage**: a key-value slot abstraction (SQLite, JSON file, memory),
//!   the session history on top of it, and TOML-based host configuration
//! - **Notifications**: native / in-app / deferred delivery with audio cues
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerController`]: The engine plus its side effects
//! - [`SessionStore`]: Session persistence and per-day grouping
//! - [`NotificationDispatcher`]: Channel selection and delivery
//! - [`Config`]: Host configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AudioError, ConfigError, CoreError, NotifyError, StorageError};
pub use events::Event;
pub use notify::{
    AudioPlayer, Channel, InAppSurface, NotificationAction, NotificationDispatcher,
    NotificationPlatform, NotificationRequest, PendingNotification, Permission,
};
pub use storage::{
    Config, DayBucket, JsonFileStore, KeyValueStore, MemoryStore, NewSession, Preferences,
    Session, SessionStore, SharedStore, SqliteStore,
};
pub use timer::{Phase, PhaseDurations, TimerController, TimerEngine, TimerStatus};
