//! Everything a command needs: the data directory, its config and store.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use tokio::sync::mpsc::UnboundedSender;
use tomatick_core::storage::{self, SessionStore};
use tomatick_core::{
    Config, NotificationDispatcher, NotificationPlatform, SharedStore, SystemClock,
    TimerController, TimerEngine,
};

use crate::desktop::{CommandAudioPlayer, DesktopNotifier, TerminalSurface};

pub struct AppContext {
    pub dir: PathBuf,
    pub config: Config,
    pub store: SharedStore,
}

impl AppContext {
    /// Open the given data directory, or the default one.
    pub fn open(data_dir: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let dir = match data_dir {
            Some(dir) => {
                std::fs::create_dir_all(&dir)?;
                dir
            }
            None => storage::data_dir()?,
        };
        let config = Config::load(&dir)?;
        let store = storage::open_store(&config, &dir)?;
        tracing::debug!(dir = %dir.display(), backend = ?config.storage.backend, "opened data directory");
        Ok(Self { dir, config, store })
    }

    pub fn sessions(&self) -> SessionStore<SharedStore> {
        SessionStore::new(self.store.clone())
    }

    /// A dispatcher whose in-app surface follows `foreground`. Clicked
    /// notification buttons are sent to `actions`; without it none are shown.
    pub fn dispatcher(
        &self,
        foreground: Rc<Cell<bool>>,
        actions: Option<UnboundedSender<String>>,
    ) -> NotificationDispatcher {
        let platform = if self.config.notifications.enabled {
            Some(Box::new(DesktopNotifier::new(actions)) as Box<dyn NotificationPlatform>)
        } else {
            None
        };
        NotificationDispatcher::new(
            platform,
            Box::new(TerminalSurface::new(foreground)),
            Box::new(CommandAudioPlayer::default()),
            self.store.clone(),
            &self.config.notifications.sound,
        )
    }

    /// A controller on the wall clock, continuing `engine` when given.
    pub fn controller(
        &self,
        engine: Option<TimerEngine>,
        foreground: Rc<Cell<bool>>,
        actions: Option<UnboundedSender<String>>,
    ) -> TimerController {
        let dispatcher = self.dispatcher(foreground, actions);
        let clock = Rc::new(SystemClock);
        match engine {
            Some(engine) => {
                TimerController::with_engine(engine, self.store.clone(), dispatcher, clock)
            }
            None => TimerController::new(self.store.clone(), dispatcher, clock),
        }
    }
}
