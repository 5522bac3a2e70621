use std::cell::Cell;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::time::MissedTickBehavior;
use tomatick_core::storage::format_duration_ms;
use tomatick_core::timer::{format_clock, CYCLES_PER_ROUND};
use tomatick_core::{Event, TimerController};

use crate::context::AppContext;

const HELP: &str =
    "keys: p pause, r resume, + add a minute, k skip, s stop, b/f background/foreground, q quit";

/// Something the user did, either at the terminal or on a notification.
enum Input {
    Key(String),
    Action(String),
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub fn run(ctx: &AppContext, task: &str) -> Result<(), Box<dyn std::error::Error>> {
    if task.trim().is_empty() {
        return Err("task name must not be empty".into());
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(ctx, task))
}

/// Blocking stdin reads live on their own detached thread so nothing waits
/// for a pending read on the way out.
fn spawn_stdin_reader(tx: UnboundedSender<String>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
}

async fn drive(ctx: &AppContext, task: &str) -> Result<(), Box<dyn std::error::Error>> {
    let foreground = Rc::new(Cell::new(true));
    let (action_tx, mut actions) = mpsc::unbounded_channel();
    let mut controller = ctx.controller(None, foreground.clone(), Some(action_tx));
    let events = controller.start(task);
    report(&controller, &events);
    eprintln!("{HELP}");

    let (key_tx, mut keys) = mpsc::unbounded_channel();
    spawn_stdin_reader(key_tx);
    let mut stdin_open = true;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let input = tokio::select! {
            _ = ticker.tick() => {
                let events = controller.tick();
                report(&controller, &events);
                continue;
            }
            line = keys.recv(), if stdin_open => match line {
                Some(line) => Input::Key(line),
                None => {
                    stdin_open = false;
                    continue;
                }
            },
            Some(id) = actions.recv() => Input::Action(id),
            _ = &mut ctrl_c => break,
        };

        let (flow, events) = handle(&mut controller, &foreground, input);
        report(&controller, &events);
        if flow == Flow::Quit {
            break;
        }
    }

    let events = controller.shutdown();
    report(&controller, &events);
    println!();
    Ok(())
}

fn handle(
    controller: &mut TimerController,
    foreground: &Cell<bool>,
    input: Input,
) -> (Flow, Vec<Event>) {
    let key = match input {
        Input::Action(id) => {
            tracing::debug!(action = %id, "notification action");
            return (Flow::Continue, controller.on_notification_action(&id));
        }
        Input::Key(key) => key,
    };

    let events = match key.trim() {
        "p" => controller.pause(),
        "r" => controller.resume(),
        "+" => controller.add_time(),
        "k" => controller.skip(),
        "s" => controller.stop(),
        "q" => return (Flow::Quit, Vec::new()),
        "b" => {
            foreground.set(false);
            controller.app_paused();
            Vec::new()
        }
        "f" => {
            foreground.set(true);
            controller.app_resumed()
        }
        "" => Vec::new(),
        other => {
            eprintln!("\nunknown key {other:?}; {HELP}");
            Vec::new()
        }
    };
    (Flow::Continue, events)
}

/// Print phase changes and saved sessions, then redraw the status line.
fn report(controller: &TimerController, events: &[Event]) {
    for event in events {
        match event {
            Event::SessionFinished { session, .. } => println!(
                "\nsaved \"{}\" ({})",
                session.task_name,
                format_duration_ms(session.duration_ms)
            ),
            Event::PhaseChanged { to, cycle, .. } => {
                println!("\n{} (cycle {cycle}/{CYCLES_PER_ROUND})", to.label())
            }
            other => tracing::debug!(event = ?other, "timer event"),
        }
    }

    let engine = controller.engine();
    print!(
        "\r{:<12} {}  {:?}  today: {}   ",
        engine.phase().label(),
        format_clock(engine.remaining_secs()),
        engine.status(),
        controller.completed_today()
    );
    let _ = std::io::stdout().flush();
}
