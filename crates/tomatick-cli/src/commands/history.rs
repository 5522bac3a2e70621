use chrono::{Local, Utc};
use tomatick_core::storage::format_duration_ms;

use crate::context::AppContext;

pub fn history(ctx: &AppContext, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let days = ctx.sessions().get_grouped_by_day();

    if json {
        println!("{}", serde_json::to_string_pretty(&days)?);
        return Ok(());
    }

    if days.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }

    for day in &days {
        let count = day.sessions.len();
        println!(
            "{}  {} session{}, {}",
            day.date.format("%a %Y-%m-%d"),
            count,
            if count == 1 { "" } else { "s" },
            format_duration_ms(day.total_duration_ms())
        );
        for session in &day.sessions {
            println!(
                "  {}-{}  {:<30} {}",
                session.start_time.with_timezone(&Local).format("%H:%M"),
                session.end_time.with_timezone(&Local).format("%H:%M"),
                session.task_name,
                format_duration_ms(session.duration_ms)
            );
        }
    }
    Ok(())
}

pub fn today(ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", ctx.sessions().get_completed_today(Utc::now()));
    Ok(())
}

pub fn clear(ctx: &AppContext, yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !yes {
        return Err("refusing to clear history without --yes".into());
    }
    ctx.sessions().clear_all()?;
    println!("History cleared.");
    Ok(())
}
