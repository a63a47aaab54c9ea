use anyhow::Result;
use chrono::{DateTime, Local};
use ticktasks_core::CLEANUP_SCHEDULE;

use super::open;

fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub async fn run() -> Result<()> {
    let (settings, service) = open().await?;

    let Some(schedule) = service.store().get_schedule(CLEANUP_SCHEDULE).await? else {
        println!("No cleanup scheduled.");
        println!("  Run `ticktasks daemon start` or change a setting with `ticktasks config`.");
        return Ok(());
    };

    println!("Cleanup schedule '{}'", schedule.name);
    println!("  Request:   {}", schedule.request_id);
    println!("  Every:     {} hour(s)", schedule.interval_secs / 3600);
    println!("  Keeping:   {} day(s)", settings.auto_delete_days().await);
    println!("  Next run:  {}", format_millis(schedule.next_run_at));

    match (schedule.last_run_at, schedule.last_status) {
        (Some(at), Some(status)) => {
            print!("  Last run:  {} ({})", format_millis(at), status);
            match schedule.last_message {
                Some(message) => println!(": {}", message),
                None => println!(),
            }
        }
        _ => println!("  Last run:  never"),
    }
    Ok(())
}
