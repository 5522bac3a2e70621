//! Phase-change notifications.
//!
//! The [`NotificationDispatcher`] picks a delivery [`Channel`] on every call:
//!
//! 1. **Native**: the host has a notification platform and permission is
//!    granted. Notifications carry `pause` / `skip` buttons.
//! 2. **InApp**: the application is in the foreground; a transient banner.
//! 3. **Deferred**: neither; a [`PendingNotification`] is stored and shown as
//!    a modal on the next foreground resume if it is still fresh.
//!
//! Nothing here fails the caller. Missing permission downgrades the channel
//! and audio problems are only logged.

mod pending;

pub use pending::{PendingNotification, PendingSlot, PENDING_KEY, PENDING_MAX_AGE_SECS};

use std::cell::Cell;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{AudioError, NotifyError};
use crate::storage::kv::SharedStore;
use crate::timer::format_clock;

/// Action type registered with the platform for phase notifications.
pub const PHASE_ACTION_TYPE: &str = "POMODORO_PHASE";

const PHASE_ACTIONS: [NotificationAction; 2] = [NotificationAction::Pause, NotificationAction::Skip];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The user has not been asked yet.
    Prompt,
}

/// Buttons offered on native notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Pause,
    Skip,
}

impl NotificationAction {
    pub fn id(self) -> &'static str {
        match self {
            NotificationAction::Pause => "pause",
            NotificationAction::Skip => "skip",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            NotificationAction::Pause => "Pause",
            NotificationAction::Skip => "Skip",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "pause" => Some(NotificationAction::Pause),
            "skip" => Some(NotificationAction::Skip),
            _ => None,
        }
    }
}

/// The host's native notification facility.
pub trait NotificationPlatform {
    fn check_permission(&self) -> Permission;
    fn request_permission(&self) -> Result<Permission, NotifyError>;
    fn register_action_types(
        &self,
        type_id: &str,
        actions: &[NotificationAction],
    ) -> Result<(), NotifyError>;
    fn schedule_notification(
        &self,
        id: u32,
        title: &str,
        body: &str,
        actions: Option<&[NotificationAction]>,
    ) -> Result<(), NotifyError>;
}

/// Whatever the application draws itself.
pub trait InAppSurface {
    fn is_foreground(&self) -> bool;
    fn show_banner(&self, title: &str, body: &str);
    fn show_modal(&self, title: &str, body: &str);
}

pub trait AudioPlayer {
    fn play(&self, resource: &str) -> Result<(), AudioError>;
}

/// How a notification reached (or will reach) the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Native,
    InApp,
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub remaining_secs: Option<u64>,
    /// Who raised the notification, for logs.
    pub source: Option<String>,
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            remaining_secs: None,
            source: None,
        }
    }

    pub fn with_remaining(mut self, secs: u64) -> Self {
        self.remaining_secs = Some(secs);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn rendered_body(&self) -> String {
        match self.remaining_secs {
            Some(secs) => format!("{} ({} left)", self.body, format_clock(secs)),
            None => self.body.clone(),
        }
    }
}

pub struct NotificationDispatcher {
    platform: Option<Box<dyn NotificationPlatform>>,
    surface: Box<dyn InAppSurface>,
    audio: Box<dyn AudioPlayer>,
    pending: PendingSlot<SharedStore>,
    sound: String,
    next_id: Cell<u32>,
    initialized: Cell<bool>,
}

impl NotificationDispatcher {
    pub fn new(
        platform: Option<Box<dyn NotificationPlatform>>,
        surface: Box<dyn InAppSurface>,
        audio: Box<dyn AudioPlayer>,
        store: SharedStore,
        sound: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            surface,
            audio,
            pending: PendingSlot::new(store),
            sound: sound.into(),
            next_id: Cell::new(1),
            initialized: Cell::new(false),
        }
    }

    /// Ask for permission and register the action buttons. Runs once.
    pub fn initialize(&self) {
        if self.initialized.replace(true) {
            return;
        }
        let Some(platform) = &self.platform else {
            debug!("no native notification platform");
            return;
        };

        let permission = match platform.check_permission() {
            Permission::Prompt => platform.request_permission().unwrap_or_else(|e| {
                warn!("notification permission request failed: {e}");
                Permission::Denied
            }),
            other => other,
        };
        if permission != Permission::Granted {
            info!("notification permission not granted; using in-app delivery");
            return;
        }
        if let Err(e) = platform.register_action_types(PHASE_ACTION_TYPE, &PHASE_ACTIONS) {
            warn!("failed to register notification actions: {e}");
        }
    }

    /// Best channel right now. Evaluated fresh on every call.
    pub fn select_channel(&self) -> Channel {
        let native = self
            .platform
            .as_ref()
            .is_some_and(|p| p.check_permission() == Permission::Granted);
        if native {
            Channel::Native
        } else if self.surface.is_foreground() {
            Channel::InApp
        } else {
            Channel::Deferred
        }
    }

    pub fn notify(&self, request: &NotificationRequest, now: DateTime<Utc>) -> Channel {
        let body = request.rendered_body();
        let mut channel = self.select_channel();

        if channel == Channel::Native {
            if let Err(e) = self.show_native(&request.title, &body) {
                warn!("native notification failed, falling back: {e}");
                channel = if self.surface.is_foreground() {
                    Channel::InApp
                } else {
                    Channel::Deferred
                };
            }
        }

        match channel {
            Channel::Native => {}
            Channel::InApp => self.surface.show_banner(&request.title, &body),
            Channel::Deferred => {
                let pending = PendingNotification {
                    title: request.title.clone(),
                    body: body.clone(),
                    timestamp: now,
                };
                if let Err(e) = self.pending.store(&pending) {
                    warn!("failed to store pending notification: {e}");
                }
            }
        }

        debug!(?channel, source = request.source.as_deref().unwrap_or("-"), "notification dispatched");
        if channel != Channel::Deferred {
            self.play_alert();
        }
        channel
    }

    /// Show the deferred notification, if one is waiting and still fresh.
    /// The record is discarded either way.
    pub fn deliver_pending(&self, now: DateTime<Utc>) -> Option<PendingNotification> {
        let pending = self.pending.take()?;
        if !pending.is_fresh(now) {
            debug!(raised_at = %pending.timestamp, "discarding stale pending notification");
            return None;
        }
        self.surface.show_modal(&pending.title, &pending.body);
        self.play_alert();
        Some(pending)
    }

    /// Map a platform action id back to the action it stands for.
    pub fn resolve_action(&self, action_id: &str) -> Option<NotificationAction> {
        let action = NotificationAction::from_id(action_id);
        if action.is_none() {
            debug!(action_id, "ignoring unknown notification action");
        }
        action
    }

    fn show_native(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        let platform = self.platform.as_ref().ok_or(NotifyError::PermissionDenied)?;
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        platform.schedule_notification(id, title, body, Some(&PHASE_ACTIONS))
    }

    fn play_alert(&self) {
        if let Err(e) = self.audio.play(&self.sound) {
            warn!("failed to play alert sound: {e}");
        }
    }
}
