//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use internal
//! threads or read the clock itself: the caller passes the current instant to
//! every command and is responsible for calling `tick()` once per second.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           +-- remaining hits 0 --> next phase, Running again
//! stop: any -> Idle (work, cycle 1, full duration)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(PhaseDurations::default());
//! engine.start("Write report", now);
//! // Once per second:
//! let events = engine.tick(now); // SessionFinished / PhaseChanged on completion
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::phase::{next_phase, Phase, PhaseDurations};
use crate::events::Event;
use crate::storage::NewSession;

/// Seconds granted by one `add_time` call.
pub const ADD_TIME_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// The work interval currently being timed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub task_name: String,
    pub started_at: DateTime<Utc>,
}

/// Core timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    durations: PhaseDurations,
    phase: Phase,
    status: TimerStatus,
    cycle: u8,
    remaining_secs: u64,
    /// Seconds granted through `add_time` during the current phase.
    #[serde(default)]
    added_secs: u64,
    /// Seconds the current phase has actually progressed.
    #[serde(default)]
    elapsed_secs: u64,
    #[serde(default)]
    task_name: String,
    #[serde(default)]
    active: Option<ActiveSession>,
    /// Set while the host is in the background and the timer was running.
    #[serde(default)]
    backgrounded_at: Option<DateTime<Utc>>,
}

impl TimerEngine {
    /// Create an idle engine at the start of a work phase, cycle 1.
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            durations,
            phase: Phase::Work,
            status: TimerStatus::Idle,
            cycle: 1,
            remaining_secs: durations.secs(Phase::Work),
            added_secs: 0,
            elapsed_secs: 0,
            task_name: String::new(),
            active: None,
            backgrounded_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn cycle(&self) -> u8 {
        self.cycle
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn added_secs(&self) -> u64 {
        self.added_secs
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    pub fn active_session(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn is_backgrounded(&self) -> bool {
        self.backgrounded_at.is_some()
    }

    /// Nominal length of the current phase.
    pub fn total_secs(&self) -> u64 {
        self.durations.secs(self.phase)
    }

    /// True while a timer is running or paused.
    pub fn is_active(&self) -> bool {
        self.status != TimerStatus::Idle
    }

    /// A work phase that has a start stamp and has progressed at least once.
    pub fn is_mid_work_session(&self) -> bool {
        self.phase == Phase::Work && self.active.is_some() && self.elapsed_secs > 0
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            status: self.status,
            cycle: self.cycle,
            task_name: self.task_name.clone(),
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            display: format_clock(self.remaining_secs),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, task_name: &str, now: DateTime<Utc>) -> Vec<Event> {
        let task_name = task_name.trim();
        if task_name.is_empty() {
            debug!("start ignored: no task name");
            return Vec::new();
        }
        if self.status == TimerStatus::Running {
            return Vec::new();
        }

        self.task_name = task_name.to_string();
        self.status = TimerStatus::Running;
        if self.phase == Phase::Work && self.elapsed_secs == 0 && self.added_secs == 0 {
            self.active = Some(ActiveSession {
                task_name: self.task_name.clone(),
                started_at: now,
            });
        }

        vec![Event::TimerStarted {
            phase: self.phase,
            cycle: self.cycle,
            task_name: self.task_name.clone(),
            remaining_secs: self.remaining_secs,
            at: now,
        }]
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.flush_background(now);
        if self.status != TimerStatus::Running {
            return events;
        }
        self.status = TimerStatus::Paused;
        events.push(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: now,
        });
        events
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.status != TimerStatus::Paused {
            return Vec::new();
        }
        self.status = TimerStatus::Running;
        if self.backgrounded_at.is_some() {
            self.backgrounded_at = Some(now);
        }
        vec![Event::TimerResumed {
            remaining_secs: self.remaining_secs,
            at: now,
        }]
    }

    /// Grant one more minute. Only while running or paused.
    pub fn add_time(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.flush_background(now);
        if !self.is_active() {
            debug!("add_time ignored: timer idle");
            return events;
        }
        self.remaining_secs = self.remaining_secs.saturating_add(ADD_TIME_SECS);
        self.added_secs = self.added_secs.saturating_add(ADD_TIME_SECS);
        events.push(Event::TimeAdded {
            added_secs: ADD_TIME_SECS,
            remaining_secs: self.remaining_secs,
            at: now,
        });
        events
    }

    /// Halt, finalize an in-progress work session, and reset to work / cycle 1.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.flush_background(now);
        if self.is_mid_work_session() {
            events.extend(self.finalize(now));
        }
        self.reset();
        events.push(Event::TimerStopped { at: now });
        events
    }

    /// Finalize an in-progress work session and complete the phase now.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.flush_background(now);
        if self.is_mid_work_session() {
            events.extend(self.finalize(now));
        } else {
            self.active = None;
        }
        events.extend(self.complete_phase(now));
        events
    }

    /// Call once per second. Returns the completion events when the phase ends.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.status != TimerStatus::Running || self.backgrounded_at.is_some() {
            return Vec::new();
        }
        self.apply_elapsed(1, now)
    }

    /// The host went to the background.
    pub fn enter_background(&mut self, now: DateTime<Utc>) {
        if self.status == TimerStatus::Running && self.backgrounded_at.is_none() {
            self.backgrounded_at = Some(now);
        }
    }

    /// The host came back; subtract the wall-clock time spent away.
    pub fn enter_foreground(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let Some(since) = self.backgrounded_at.take() else {
            return Vec::new();
        };
        if self.status != TimerStatus::Running {
            return Vec::new();
        }
        let away = whole_secs_between(since, now);
        debug!(away_secs = away, "compensating for background time");
        self.apply_elapsed(away, now)
    }

    /// Change phase lengths. Takes effect the next time a phase begins.
    pub fn set_durations(&mut self, durations: PhaseDurations) {
        self.durations = durations;
        if !self.is_active() && self.phase == Phase::Work && self.elapsed_secs == 0 {
            self.remaining_secs = durations.secs(Phase::Work);
            self.added_secs = 0;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply background time accrued so far, keeping the background marker.
    fn flush_background(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let Some(since) = self.backgrounded_at else {
            return Vec::new();
        };
        self.backgrounded_at = Some(now);
        if self.status != TimerStatus::Running {
            return Vec::new();
        }
        let away = whole_secs_between(since, now);
        self.apply_elapsed(away, now)
    }

    fn apply_elapsed(&mut self, secs: u64, now: DateTime<Utc>) -> Vec<Event> {
        let step = secs.min(self.remaining_secs);
        self.remaining_secs -= step;
        self.elapsed_secs = self.elapsed_secs.saturating_add(step);
        if self.remaining_secs == 0 {
            return self.complete_phase(now);
        }
        Vec::new()
    }

    fn complete_phase(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        let from = self.phase;
        if from == Phase::Work {
            events.extend(self.finalize(now));
        }

        let (to, cycle) = next_phase(from, self.cycle);
        self.phase = to;
        self.cycle = cycle;
        self.remaining_secs = self.durations.secs(to);
        self.added_secs = 0;
        self.elapsed_secs = 0;
        if self.backgrounded_at.is_some() {
            self.backgrounded_at = Some(now);
        }
        if to == Phase::Work {
            self.active = Some(ActiveSession {
                task_name: self.task_name.clone(),
                started_at: now,
            });
        }

        info!(from = from.label(), to = to.label(), cycle, "phase complete");
        events.push(Event::PhaseChanged {
            from,
            to,
            cycle,
            remaining_secs: self.remaining_secs,
            at: now,
        });

        // Ticking continues on its own into the new phase.
        if self.task_name.is_empty() {
            self.status = TimerStatus::Idle;
            self.active = None;
        } else {
            self.status = TimerStatus::Running;
        }
        events
    }

    fn finalize(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let active = self.active.take()?;
        let duration_ms = (now - active.started_at).num_milliseconds().max(0) as u64;
        Some(Event::SessionFinished {
            session: NewSession {
                task_name: active.task_name,
                start_time: active.started_at,
                end_time: now,
                duration_ms,
            },
            at: now,
        })
    }

    fn reset(&mut self) {
        self.status = TimerStatus::Idle;
        self.phase = Phase::Work;
        self.cycle = 1;
        self.remaining_secs = self.durations.secs(Phase::Work);
        self.added_secs = 0;
        self.elapsed_secs = 0;
        self.active = None;
        self.backgrounded_at = None;
    }
}

fn whole_secs_between(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - since).num_seconds().max(0) as u64
}

/// `MM:SS` rendering of a second count.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
