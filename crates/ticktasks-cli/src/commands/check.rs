use anyhow::Result;
use ticktasks_core::TickTasksError;

use super::{open, parse_id};

pub async fn run(id: &str, checked: bool) -> Result<()> {
    let id = parse_id(id)?;
    let (_, service) = open().await?;

    let task = match service.get(id).await {
        Ok(task) => task,
        Err(TickTasksError::NotFound(_)) => {
            eprintln!("No task found with ID {}", id);
            eprintln!("Hint: Use 'ticktasks list' to see all tasks.");
            anyhow::bail!("Task not found");
        }
        Err(e) => return Err(e.into()),
    };

    if task.checked == checked {
        let state = if checked { "checked" } else { "open" };
        println!("Task '{}' is already {}.", task.title, state);
        return Ok(());
    }

    let task = service.check(&task, checked).await?;
    if task.checked {
        println!("\u{2713} Checked: {}", task.title);
    } else {
        println!("\u{21a9} Reopened: {}", task.title);
    }
    Ok(())
}
