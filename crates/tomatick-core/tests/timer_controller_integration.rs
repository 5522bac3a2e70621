//! Integration tests for the timer controller.
//!
//! Drive the controller with a manual clock and check what lands in the
//! session store and which notification channel fired.

mod common;

use std::rc::Rc;

use common::{dispatcher, t0, Harness};
use tomatick_core::notify::PENDING_KEY;
use tomatick_core::{
    Event, KeyValueStore, MemoryStore, Permission, Phase, SessionStore, SharedStore,
    TimerController, TimerStatus,
};

fn finished_count(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::SessionFinished { .. }))
        .count()
}

#[test]
fn uninterrupted_work_phase_records_one_session() {
    let mut h = Harness::new();
    h.controller.start("Write report");
    let events = h.run_secs(1500);

    assert_eq!(finished_count(&events), 1);
    let sessions = h.controller.sessions().get_all();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].task_name, "Write report");
    assert_eq!(sessions[0].duration_ms, 1_500_000);
    assert_eq!(sessions[0].start_time, t0());

    let engine = h.controller.engine();
    assert_eq!(engine.phase(), Phase::ShortBreak);
    assert_eq!(engine.remaining_secs(), 300);
    assert_eq!(engine.cycle(), 2);
    assert_eq!(engine.status(), TimerStatus::Running);
    assert_eq!(h.controller.completed_today(), 1);

    assert_eq!(
        h.recorder.banners.borrow().as_slice(),
        ["Take a 5-minute short break! (05:00 left)"]
    );
    assert_eq!(h.recorder.sounds.get(), 1);
}

#[test]
fn empty_task_name_is_ignored() {
    let mut h = Harness::new();
    assert!(h.controller.start("").is_empty());
    assert!(h.run_secs(5).is_empty());
    assert_eq!(h.controller.engine().remaining_secs(), 1500);
    assert!(!h.controller.intercepts_back_navigation());
}

#[test]
fn stopping_or_skipping_breaks_creates_no_session() {
    let mut h = Harness::new();
    h.controller.start("Write");
    h.run_secs(1500);
    assert_eq!(h.controller.sessions().get_all().len(), 1);

    h.run_secs(10);
    let events = h.controller.skip();
    assert_eq!(finished_count(&events), 0);
    assert_eq!(h.controller.engine().phase(), Phase::Work);

    // Let work finish again, then stop during the break.
    h.run_secs(1500);
    assert_eq!(h.controller.engine().phase(), Phase::ShortBreak);
    let events = h.controller.stop();
    assert_eq!(finished_count(&events), 0);
    assert_eq!(h.controller.sessions().get_all().len(), 2);
}

#[test]
fn stop_mid_work_saves_elapsed_time() {
    let mut h = Harness::new();
    h.controller.start("Write");
    h.run_secs(600);
    h.controller.stop();

    let sessions = h.controller.sessions().get_all();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].duration_ms, 600_000);
    assert_eq!(h.controller.engine().remaining_secs(), 1500);
    assert_eq!(h.controller.engine().status(), TimerStatus::Idle);
}

#[test]
fn skip_mid_work_saves_once_and_continues() {
    let mut h = Harness::new();
    h.controller.start("Write");
    h.run_secs(90);
    let events = h.controller.skip();
    assert_eq!(finished_count(&events), 1);
    assert_eq!(h.controller.sessions().get_all().len(), 1);
    assert_eq!(h.controller.engine().phase(), Phase::ShortBreak);
    assert_eq!(h.controller.engine().status(), TimerStatus::Running);
}

#[test]
fn long_break_uses_configured_minutes() {
    let mut h = Harness::new();
    h.controller.set_long_break_minutes(30).unwrap();
    h.controller.start("Write");
    for _ in 0..3 {
        h.run_secs(1500 + 300);
    }
    h.run_secs(1500);

    let engine = h.controller.engine();
    assert_eq!(engine.phase(), Phase::LongBreak);
    assert_eq!(engine.remaining_secs(), 1800);
    assert_eq!(engine.cycle(), 1);
    assert_eq!(h.controller.sessions().get_all().len(), 4);
    assert!(h
        .recorder
        .banners
        .borrow()
        .iter()
        .any(|b| b.starts_with("Take a 30-minute long break!")));

    h.run_secs(1800);
    assert_eq!(h.controller.engine().phase(), Phase::Work);
    assert_eq!(h.controller.engine().cycle(), 1);
}

#[test]
fn long_break_preference_is_read_at_startup() {
    let store: SharedStore = Rc::new(MemoryStore::new());
    store.set("longBreakDuration", "30").unwrap();
    let h = Harness::with_store(store);
    assert_eq!(h.controller.engine().durations().long_break_min, 30);
}

#[test]
fn background_exhausting_phase_completes_immediately() {
    let mut h = Harness::new();
    h.controller.start("Write");
    h.run_secs(1400);

    h.controller.app_paused();
    h.foreground.set(false);
    h.clock.advance_secs(400);
    h.foreground.set(true);
    let events = h.controller.app_resumed();

    assert_eq!(finished_count(&events), 1);
    let sessions = h.controller.sessions().get_all();
    assert_eq!(sessions[0].duration_ms, 1_800_000);
    assert_eq!(h.controller.engine().phase(), Phase::ShortBreak);
}

#[test]
fn background_notification_is_deferred_then_shown() {
    let mut h = Harness::new();
    h.controller.start("Write");
    h.run_secs(1499);

    // The last second elapses while a tick still fires in the background.
    h.foreground.set(false);
    h.run_secs(1);
    assert!(h.recorder.banners.borrow().is_empty());
    assert!(h.store.get(PENDING_KEY).unwrap().is_some());

    h.clock.advance_secs(60);
    h.foreground.set(true);
    h.controller.app_resumed();
    assert_eq!(h.recorder.modals.borrow().len(), 1);
    assert!(h.store.get(PENDING_KEY).unwrap().is_none());
}

#[test]
fn stale_pending_notification_is_discarded() {
    let mut h = Harness::new();
    h.controller.start("Write");
    h.foreground.set(false);
    h.run_secs(1500);
    assert!(h.store.get(PENDING_KEY).unwrap().is_some());

    h.controller.pause();
    h.clock.advance_secs(6 * 60);
    h.foreground.set(true);
    h.controller.app_resumed();
    assert!(h.recorder.modals.borrow().is_empty());
    assert!(h.store.get(PENDING_KEY).unwrap().is_none());
}

#[test]
fn native_channel_and_actions() {
    let mut h = Harness::with_native(Permission::Granted);
    h.controller.start("Write");
    h.run_secs(1500);
    assert_eq!(h.recorder.native.borrow().len(), 1);
    assert!(h.recorder.banners.borrow().is_empty());

    h.controller.on_notification_action("pause");
    assert_eq!(h.controller.engine().status(), TimerStatus::Paused);

    h.controller.resume();
    h.controller.on_notification_action("skip");
    assert_eq!(h.controller.engine().phase(), Phase::Work);

    assert!(h.controller.on_notification_action("snooze").is_empty());
}

#[test]
fn denied_permission_uses_in_app_banner() {
    let mut h = Harness::with_native(Permission::Denied);
    h.controller.start("Write");
    h.run_secs(1500);
    assert!(h.recorder.native.borrow().is_empty());
    assert_eq!(h.recorder.banners.borrow().len(), 1);
}

#[test]
fn dropping_controller_finalizes_running_session() {
    let store: SharedStore = Rc::new(MemoryStore::new());
    {
        let mut h = Harness::with_store(store.clone());
        h.controller.start("Write");
        h.run_secs(120);
        assert!(h.controller.intercepts_back_navigation());
    }
    let sessions = SessionStore::new(store).get_all();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].duration_ms, 120_000);
}

#[test]
fn into_engine_detaches_without_saving() {
    let store: SharedStore = Rc::new(MemoryStore::new());
    let h = Harness::with_store(store.clone());
    let Harness {
        mut controller,
        clock,
        recorder,
        foreground,
        ..
    } = h;
    controller.start("Write");
    clock.advance_secs(30);
    controller.tick();

    let engine = controller.into_engine();
    assert!(SessionStore::new(store.clone()).get_all().is_empty());
    assert!(engine.is_backgrounded());

    // Pick the engine up again later and let the time away count.
    clock.advance_secs(1500);
    let mut resumed = TimerController::with_engine(
        engine,
        store.clone(),
        dispatcher(&recorder, &foreground, None, store.clone()),
        clock.clone(),
    );
    let events = resumed.app_resumed();
    assert_eq!(finished_count(&events), 1);
    assert_eq!(resumed.engine().phase(), Phase::ShortBreak);
}

#[test]
fn add_time_extends_phase() {
    let mut h = Harness::new();
    assert!(h.controller.add_time().is_empty());
    h.controller.start("Write");
    h.controller.add_time();
    h.run_secs(1500);
    assert_eq!(h.controller.engine().phase(), Phase::Work);
    assert_eq!(h.controller.engine().remaining_secs(), 60);
    h.run_secs(60);
    assert_eq!(h.controller.engine().phase(), Phase::ShortBreak);
    assert_eq!(h.controller.sessions().get_all()[0].duration_ms, 1_560_000);
}
