use clap::Subcommand;
use tomatick_core::{Config, Preferences};

use crate::context::AppContext;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "notifications.sound", "storage.backend")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(ctx: AppContext, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let AppContext { dir, mut config, .. } = ctx;
    match action {
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            config.set(&dir, &key, &value)?;
            println!("ok");
        }
        ConfigAction::List => {
            for (key, value) in config.entries() {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Reset => {
            Config::default().save(&dir)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

/// Print the long-break length, or store a new one.
pub fn long_break(ctx: &AppContext, minutes: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let preferences = Preferences::new(ctx.store.clone());
    match minutes {
        Some(minutes) => {
            preferences.set_long_break_minutes(minutes)?;
            println!("ok");
        }
        None => println!("{}", preferences.long_break_minutes()),
    }
    Ok(())
}
