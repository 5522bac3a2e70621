use std::cell::Cell;
use std::io::IsTerminal;
use std::rc::Rc;

use clap::Subcommand;
use tomatick_core::{Event, KeyValueStore, SharedStore, TimerEngine};

use crate::context::AppContext;

const ENGINE_KEY: &str = "timer_engine";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a work phase for a task
    Start {
        /// Task name
        task: String,
    },
    /// Pause the countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Add one minute to the current phase
    AddTime,
    /// Stop and reset to an idle work phase
    Stop,
    /// Skip to the next phase
    Skip,
    /// Print current timer state as JSON
    Status,
}

fn load_engine(store: &SharedStore) -> Option<TimerEngine> {
    let json = store.get(ENGINE_KEY).ok().flatten()?;
    match serde_json::from_str::<TimerEngine>(&json) {
        Ok(engine) => Some(engine),
        Err(e) => {
            tracing::warn!("discarding unreadable timer state: {e}");
            None
        }
    }
}

fn save_engine(store: &SharedStore, engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    store.set(ENGINE_KEY, &json)?;
    Ok(())
}

/// Prints one JSON object per line: the events, then the resulting state.
pub fn run(ctx: &AppContext, action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    if let TimerAction::Start { task } = &action {
        if task.trim().is_empty() {
            return Err("task name must not be empty".into());
        }
    }

    let foreground = Rc::new(Cell::new(std::io::stdout().is_terminal()));
    let mut controller = ctx.controller(load_engine(&ctx.store), foreground, None);

    // Time between invocations counts as time in the background.
    let mut events: Vec<Event> = controller.app_resumed();
    events.extend(match action {
        TimerAction::Start { task } => controller.start(&task),
        TimerAction::Pause => controller.pause(),
        TimerAction::Resume => controller.resume(),
        TimerAction::AddTime => controller.add_time(),
        TimerAction::Stop => controller.stop(),
        TimerAction::Skip => controller.skip(),
        TimerAction::Status => Vec::new(),
    });

    for event in &events {
        println!("{}", serde_json::to_string(event)?);
    }
    println!("{}", serde_json::to_string(&controller.snapshot())?);

    let engine = controller.into_engine();
    save_engine(&ctx.store, &engine)
}
