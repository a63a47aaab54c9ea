//! Show detailed view of a single task.

use anyhow::Result;
use chrono::{DateTime, Local, TimeDelta};
use ticktasks_core::{Task, TickTasksError};

use super::{open, parse_id};

/// Run the show command to display detailed info about a task.
pub async fn run(id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let (settings, service) = open().await?;

    let task = match service.get(id).await {
        Ok(task) => task,
        Err(TickTasksError::NotFound(_)) => {
            println!("No task found with ID {}", id);
            println!("Hint: Use 'ticktasks list' to see all tasks.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let days = settings.auto_delete_days().await;
    print_detailed_task(&task, days);
    Ok(())
}

fn print_detailed_task(task: &Task, auto_delete_days: u32) {
    let status_display = if task.checked {
        "\x1b[32mChecked\x1b[0m"
    } else {
        "\x1b[33mOpen\x1b[0m"
    };

    println!("\x1b[1m{}\x1b[0m", task.title);
    println!("  ID:       {}", task.id);
    println!("  Status:   {}", status_display);

    if let Some(checked_at) = task.checked_at_utc() {
        let local = checked_at.with_timezone(&Local);
        println!("  Checked:  {}", local.format("%Y-%m-%d %H:%M"));

        let purge_at = purge_time(local, auto_delete_days)
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "  Cleanup:  after {} (keeping {} day(s))",
            purge_at, auto_delete_days
        );
    }

    if !task.description.is_empty() {
        println!();
        for line in task.description.lines() {
            println!("  {}", line);
        }
    }
}

/// When a task checked at `checked_at` becomes eligible for cleanup, or
/// `None` if that lies beyond the representable calendar.
fn purge_time(checked_at: DateTime<Local>, auto_delete_days: u32) -> Option<DateTime<Local>> {
    TimeDelta::try_days(i64::from(auto_delete_days))
        .and_then(|keep| checked_at.checked_add_signed(keep))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked_task() -> Task {
        let mut task = Task::new("Water plants".to_string(), String::new());
        task.id = 7;
        task.mark_checked(1_700_000_000_000);
        task
    }

    #[test]
    fn test_purge_time_adds_retention_days() {
        let checked_at = checked_task().checked_at_utc().unwrap().with_timezone(&Local);
        let purge_at = purge_time(checked_at, 3).unwrap();
        assert_eq!(purge_at - checked_at, TimeDelta::days(3));
    }

    #[test]
    fn test_purge_time_is_none_past_calendar_limit() {
        let checked_at = checked_task().checked_at_utc().unwrap().with_timezone(&Local);
        assert!(purge_time(checked_at, u32::MAX).is_none());
    }

    #[test]
    fn test_print_detailed_task_handles_any_retention() {
        let task = checked_task();
        print_detailed_task(&task, 0);
        print_detailed_task(&task, 3);
        print_detailed_task(&task, u32::MAX);
        print_detailed_task(&Task::new("Open".to_string(), "note".to_string()), u32::MAX);
    }
}
