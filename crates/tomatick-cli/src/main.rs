use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod desktop;

use context::AppContext;

#[derive(Parser)]
#[command(name = "tomatick", version, about = "Tomatick Pomodoro timer")]
struct Cli {
    /// Directory holding config.toml and the session store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer in the foreground until quit
    Run {
        /// What you are working on
        #[arg(long)]
        task: String,
    },
    /// One-shot timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Completed sessions grouped by day
    History {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Number of sessions started today
    Today,
    /// Delete the whole session history
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Show or set the long-break length in minutes
    LongBreak {
        minutes: Option<u64>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = AppContext::open(cli.data_dir).and_then(|ctx| match cli.command {
        Commands::Run { task } => commands::run::run(&ctx, &task),
        Commands::Timer { action } => commands::timer::run(&ctx, action),
        Commands::History { json } => commands::history::history(&ctx, json),
        Commands::Today => commands::history::today(&ctx),
        Commands::Clear { yes } => commands::history::clear(&ctx, yes),
        Commands::Config { action } => commands::config::run(ctx, action),
        Commands::LongBreak { minutes } => commands::config::long_break(&ctx, minutes),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
