//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use tomatick_core::{
    AudioError, AudioPlayer, InAppSurface, ManualClock, MemoryStore, NotificationAction,
    NotificationDispatcher, NotificationPlatform, NotifyError, Permission, SharedStore,
    TimerController,
};

/// Everything the fakes saw.
#[derive(Default)]
pub struct Recorder {
    pub native: RefCell<Vec<String>>,
    pub banners: RefCell<Vec<String>>,
    pub modals: RefCell<Vec<String>>,
    pub sounds: Cell<u32>,
}

pub struct FakePlatform {
    pub recorder: Rc<Recorder>,
    pub permission: Permission,
}

impl NotificationPlatform for FakePlatform {
    fn check_permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&self) -> Result<Permission, NotifyError> {
        Ok(self.permission)
    }

    fn register_action_types(
        &self,
        _type_id: &str,
        _actions: &[NotificationAction],
    ) -> Result<(), NotifyError> {
        Ok(())
    }

    fn schedule_notification(
        &self,
        _id: u32,
        _title: &str,
        body: &str,
        _actions: Option<&[NotificationAction]>,
    ) -> Result<(), NotifyError> {
        self.recorder.native.borrow_mut().push(body.to_string());
        Ok(())
    }
}

pub struct FakeSurface {
    pub recorder: Rc<Recorder>,
    pub foreground: Rc<Cell<bool>>,
}

impl InAppSurface for FakeSurface {
    fn is_foreground(&self) -> bool {
        self.foreground.get()
    }

    fn show_banner(&self, _title: &str, body: &str) {
        self.recorder.banners.borrow_mut().push(body.to_string());
    }

    fn show_modal(&self, _title: &str, body: &str) {
        self.recorder.modals.borrow_mut().push(body.to_string());
    }
}

pub struct FakeAudio {
    pub recorder: Rc<Recorder>,
}

impl AudioPlayer for FakeAudio {
    fn play(&self, _resource: &str) -> Result<(), AudioError> {
        self.recorder.sounds.set(self.recorder.sounds.get() + 1);
        Ok(())
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap()
}

/// A controller over an in-memory store with handles to poke at it.
pub struct Harness {
    pub controller: TimerController,
    pub clock: Rc<ManualClock>,
    pub store: SharedStore,
    pub recorder: Rc<Recorder>,
    pub foreground: Rc<Cell<bool>>,
}

impl Harness {
    /// No native platform: delivery is in-app or deferred.
    pub fn new() -> Self {
        Self::build(None, Rc::new(MemoryStore::new()))
    }

    pub fn with_native(permission: Permission) -> Self {
        Self::build(Some(permission), Rc::new(MemoryStore::new()))
    }

    pub fn with_store(store: SharedStore) -> Self {
        Self::build(None, store)
    }

    fn build(permission: Option<Permission>, store: SharedStore) -> Self {
        let recorder = Rc::new(Recorder::default());
        let foreground = Rc::new(Cell::new(true));
        let clock = Rc::new(ManualClock::new(t0()));
        let dispatcher = dispatcher(&recorder, &foreground, permission, store.clone());
        let controller = TimerController::new(store.clone(), dispatcher, clock.clone());
        Self {
            controller,
            clock,
            store,
            recorder,
            foreground,
        }
    }

    /// Advance the clock one second and tick, `secs` times.
    pub fn run_secs(&mut self, secs: u64) -> Vec<tomatick_core::Event> {
        let mut events = Vec::new();
        for _ in 0..secs {
            self.clock.advance_secs(1);
            events.extend(self.controller.tick());
        }
        events
    }
}

pub fn dispatcher(
    recorder: &Rc<Recorder>,
    foreground: &Rc<Cell<bool>>,
    permission: Option<Permission>,
    store: SharedStore,
) -> NotificationDispatcher {
    let platform = permission.map(|permission| {
        Box::new(FakePlatform {
            recorder: recorder.clone(),
            permission,
        }) as Box<dyn NotificationPlatform>
    });
    NotificationDispatcher::new(
        platform,
        Box::new(FakeSurface {
            recorder: recorder.clone(),
            foreground: foreground.clone(),
        }),
        Box::new(FakeAudio {
            recorder: recorder.clone(),
        }),
        store,
        "assets/sounds/alert.mp3",
    )
}
