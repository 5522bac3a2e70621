//! The timer as the application sees it.
//!
//! [`TimerController`] owns a [`TimerEngine`] and carries out what the
//! engine's events ask for: finished work sessions go to the
//! [`SessionStore`], phase changes go to the [`NotificationDispatcher`].
//! All commands read the injected [`Clock`].
//!
//! Dropping a controller while a timer is running or paused stops it the
//! same way a manual stop would, so an in-progress session is never lost.

use std::rc::Rc;

use tracing::error;

use super::engine::TimerEngine;
use super::phase::{Phase, PhaseDurations};
use crate::clock::Clock;
use crate::error::CoreError;
use crate::events::Event;
use crate::notify::{NotificationAction, NotificationDispatcher, NotificationRequest};
use crate::storage::{Preferences, SessionStore, SharedStore};

pub const NOTIFICATION_TITLE: &str = "Pomodoro Timer";

/// Notification body announcing the phase that just began.
pub fn phase_message(phase: Phase, durations: &PhaseDurations) -> String {
    match phase {
        Phase::Work => "Time to work! Focus on your task.".to_string(),
        Phase::ShortBreak => format!("Take a {}-minute short break!", durations.short_break_min),
        Phase::LongBreak => format!("Take a {}-minute long break!", durations.long_break_min),
    }
}

pub struct TimerController {
    engine: TimerEngine,
    sessions: SessionStore<SharedStore>,
    preferences: Preferences<SharedStore>,
    dispatcher: NotificationDispatcher,
    clock: Rc<dyn Clock>,
    completed_today: usize,
    /// Set once the engine has been handed back through `into_engine`.
    released: bool,
}

impl TimerController {
    /// A fresh idle timer using the stored long-break preference.
    pub fn new(store: SharedStore, dispatcher: NotificationDispatcher, clock: Rc<dyn Clock>) -> Self {
        Self::with_engine(
            TimerEngine::new(PhaseDurations::default()),
            store,
            dispatcher,
            clock,
        )
    }

    /// Continue from a previously saved engine.
    pub fn with_engine(
        mut engine: TimerEngine,
        store: SharedStore,
        dispatcher: NotificationDispatcher,
        clock: Rc<dyn Clock>,
    ) -> Self {
        dispatcher.initialize();

        let preferences = Preferences::new(store.clone());
        engine.set_durations(PhaseDurations {
            long_break_min: preferences.long_break_minutes(),
            ..engine.durations()
        });

        let sessions = SessionStore::new(store);
        let completed_today = sessions.get_completed_today(clock.now());
        Self {
            engine,
            sessions,
            preferences,
            dispatcher,
            clock,
            completed_today,
            released: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn sessions(&self) -> &SessionStore<SharedStore> {
        &self.sessions
    }

    /// Work sessions started today, refreshed after every save.
    pub fn completed_today(&self) -> usize {
        self.completed_today
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot(self.clock.now())
    }

    /// Whether the host should swallow back navigation instead of leaving
    /// the timer view.
    pub fn intercepts_back_navigation(&self) -> bool {
        self.engine.is_active()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, task_name: &str) -> Vec<Event> {
        let events = self.engine.start(task_name, self.clock.now());
        self.apply(events)
    }

    pub fn pause(&mut self) -> Vec<Event> {
        let events = self.engine.pause(self.clock.now());
        self.apply(events)
    }

    pub fn resume(&mut self) -> Vec<Event> {
        let events = self.engine.resume(self.clock.now());
        self.apply(events)
    }

    pub fn add_time(&mut self) -> Vec<Event> {
        let events = self.engine.add_time(self.clock.now());
        self.apply(events)
    }

    pub fn stop(&mut self) -> Vec<Event> {
        let events = self.engine.stop(self.clock.now());
        self.apply(events)
    }

    pub fn skip(&mut self) -> Vec<Event> {
        let events = self.engine.skip(self.clock.now());
        self.apply(events)
    }

    /// One-second tick from the host's interval.
    pub fn tick(&mut self) -> Vec<Event> {
        let events = self.engine.tick(self.clock.now());
        self.apply(events)
    }

    /// The host moved to the background.
    pub fn app_paused(&mut self) {
        self.engine.enter_background(self.clock.now());
    }

    /// The host is back in the foreground: show a fresh pending
    /// notification, then catch the timer up on the time spent away.
    pub fn app_resumed(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        self.dispatcher.deliver_pending(now);
        let events = self.engine.enter_foreground(now);
        self.apply(events)
    }

    /// A button was pressed on a native notification.
    pub fn on_notification_action(&mut self, action_id: &str) -> Vec<Event> {
        match self.dispatcher.resolve_action(action_id) {
            Some(NotificationAction::Pause) => self.pause(),
            Some(NotificationAction::Skip) => self.skip(),
            None => Vec::new(),
        }
    }

    /// Store the long-break preference and use it from the next long break on.
    ///
    /// # Errors
    /// Returns an error if the value is out of range or cannot be stored.
    pub fn set_long_break_minutes(&mut self, minutes: u64) -> Result<(), CoreError> {
        self.preferences.set_long_break_minutes(minutes)?;
        self.engine.set_durations(PhaseDurations {
            long_break_min: minutes,
            ..self.engine.durations()
        });
        Ok(())
    }

    /// Stop an active timer as a manual stop would. Safe to call repeatedly.
    pub fn shutdown(&mut self) -> Vec<Event> {
        if self.released || !self.engine.is_active() {
            return Vec::new();
        }
        self.stop()
    }

    /// Hand the engine back for persistence without finalizing anything.
    /// A running timer is marked as backgrounded so the next
    /// `app_resumed` accounts for the time in between.
    pub fn into_engine(mut self) -> TimerEngine {
        self.engine.enter_background(self.clock.now());
        self.released = true;
        let durations = self.engine.durations();
        std::mem::replace(&mut self.engine, TimerEngine::new(durations))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply(&mut self, events: Vec<Event>) -> Vec<Event> {
        let now = self.clock.now();
        for event in &events {
            match event {
                Event::SessionFinished { session, .. } => {
                    match self.sessions.save(session.clone()) {
                        Ok(_) => self.completed_today = self.sessions.get_completed_today(now),
                        Err(e) => error!(task = %session.task_name, "failed to save session: {e}"),
                    }
                }
                Event::PhaseChanged {
                    to, remaining_secs, ..
                } => {
                    let request = NotificationRequest::new(
                        NOTIFICATION_TITLE,
                        phase_message(*to, &self.engine.durations()),
                    )
                    .with_remaining(*remaining_secs)
                    .with_source("timer");
                    self.dispatcher.notify(&request, now);
                }
                _ => {}
            }
        }
        events
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_messages() {
        let durations = PhaseDurations::with_long_break(30);
        assert_eq!(
            phase_message(Phase::Work, &durations),
            "Time to work! Focus on your task."
        );
        assert_eq!(
            phase_message(Phase::ShortBreak, &durations),
            "Take a 5-minute short break!"
        );
        assert_eq!(
            phase_message(Phase::LongBreak, &durations),
            "Take a 30-minute long break!"
        );
    }
}
