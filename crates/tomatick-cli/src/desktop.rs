//! Desktop implementations of the notification collaborators.

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::process::{Command, Stdio};
use std::rc::Rc;

use notify_rust::Notification;
use tokio::sync::mpsc::UnboundedSender;
use tomatick_core::{
    AudioError, AudioPlayer, InAppSurface, NotificationAction, NotificationPlatform, NotifyError,
    Permission,
};

/// Native notifications through the desktop notification daemon.
///
/// Action buttons are only offered when there is someone to hear them:
/// with an `actions` sender, the identifier of every clicked button is
/// sent there from a waiter thread.
pub struct DesktopNotifier {
    registered: RefCell<Vec<NotificationAction>>,
    actions: Option<UnboundedSender<String>>,
}

impl DesktopNotifier {
    pub fn new(actions: Option<UnboundedSender<String>>) -> Self {
        Self {
            registered: RefCell::default(),
            actions,
        }
    }

    #[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
    fn buttons(&self, requested: Option<&[NotificationAction]>) -> Vec<NotificationAction> {
        if self.actions.is_none() {
            return Vec::new();
        }
        match requested {
            Some(actions) => actions.to_vec(),
            None => self.registered.borrow().clone(),
        }
    }
}

impl NotificationPlatform for DesktopNotifier {
    fn check_permission(&self) -> Permission {
        // Desktop notification servers do not gate senders.
        Permission::Granted
    }

    fn request_permission(&self) -> Result<Permission, NotifyError> {
        Ok(Permission::Granted)
    }

    fn register_action_types(
        &self,
        _type_id: &str,
        actions: &[NotificationAction],
    ) -> Result<(), NotifyError> {
        *self.registered.borrow_mut() = actions.to_vec();
        Ok(())
    }

    fn schedule_notification(
        &self,
        id: u32,
        title: &str,
        body: &str,
        actions: Option<&[NotificationAction]>,
    ) -> Result<(), NotifyError> {
        let mut notification = Notification::new();
        notification
            .summary(title)
            .body(body)
            .appname("tomatick")
            .icon("alarm-clock");

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            notification
                .id(id)
                .urgency(notify_rust::Urgency::Critical);
            if let Some(tx) = &self.actions {
                let buttons = self.buttons(actions);
                if !buttons.is_empty() {
                    for action in &buttons {
                        notification.action(action.id(), action.title());
                    }
                    return show_and_wait(notification, tx.clone());
                }
            }
        }
        #[cfg(not(all(unix, not(target_os = "macos"))))]
        let _ = (id, actions);

        notification
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Platform(e.to_string()))
    }
}

/// Show on a waiter thread that stays parked until a button is clicked or
/// the notification closes. Only the show result is waited for here.
#[cfg(all(unix, not(target_os = "macos")))]
fn show_and_wait(notification: Notification, tx: UnboundedSender<String>) -> Result<(), NotifyError> {
    let (shown_tx, shown_rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || match notification.show() {
        Ok(handle) => {
            let _ = shown_tx.send(Ok(()));
            handle.wait_for_action(|action| {
                let _ = tx.send(action.to_string());
            });
        }
        Err(e) => {
            let _ = shown_tx.send(Err(e.to_string()));
        }
    });

    shown_rx
        .recv()
        .map_err(|e| NotifyError::Platform(e.to_string()))?
        .map_err(NotifyError::Platform)
}

/// Banners and modals drawn on the terminal.
pub struct TerminalSurface {
    foreground: Rc<Cell<bool>>,
}

impl TerminalSurface {
    pub fn new(foreground: Rc<Cell<bool>>) -> Self {
        Self { foreground }
    }
}

impl InAppSurface for TerminalSurface {
    fn is_foreground(&self) -> bool {
        self.foreground.get()
    }

    fn show_banner(&self, title: &str, body: &str) {
        eprintln!("\n[{title}] {body}");
    }

    fn show_modal(&self, title: &str, body: &str) {
        let width = title.len().max(body.len()) + 4;
        let rule = "=".repeat(width);
        eprintln!("\n{rule}\n  {title}\n  {body}\n{rule}");
    }
}

/// Plays a sound file by spawning the first available command-line player.
pub struct CommandAudioPlayer {
    players: Vec<&'static str>,
}

impl Default for CommandAudioPlayer {
    fn default() -> Self {
        Self {
            players: vec!["paplay", "aplay", "afplay"],
        }
    }
}

impl AudioPlayer for CommandAudioPlayer {
    fn play(&self, resource: &str) -> Result<(), AudioError> {
        if !Path::new(resource).exists() {
            return Err(AudioError::Unavailable(resource.to_string()));
        }

        let mut last_err = None;
        for player in &self.players {
            match Command::new(player)
                .arg(resource)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(mut child) => {
                    // Reap the player once it finishes.
                    std::thread::spawn(move || {
                        let _ = child.wait();
                    });
                    return Ok(());
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err
            .map(AudioError::Io)
            .unwrap_or_else(|| AudioError::Unavailable(resource.to_string())))
    }
}

#[cfg(test)]
impl CommandAudioPlayer {
    fn with_players(players: Vec<&'static str>) -> Self {
        Self { players }
    }
}
