mod controller;
mod engine;
mod phase;

pub use controller::{phase_message, TimerController, NOTIFICATION_TITLE};
pub use engine::{format_clock, ActiveSession, TimerEngine, TimerStatus, ADD_TIME_SECS};
pub use phase::{next_phase, Phase, PhaseDurations, CYCLES_PER_ROUND};
