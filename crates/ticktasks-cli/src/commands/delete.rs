use anyhow::Result;
use ticktasks_core::TickTasksError;

use super::{open, parse_id};

pub async fn run(id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let (_, service) = open().await?;

    let task = match service.get(id).await {
        Ok(task) => task,
        Err(TickTasksError::NotFound(_)) => {
            eprintln!("No task found with ID {}", id);
            anyhow::bail!("Task not found");
        }
        Err(e) => return Err(e.into()),
    };

    let Some(removed) = service.delete(&task).await? else {
        println!("Task {} was already deleted.", id);
        return Ok(());
    };

    service.store().save_undo_batch(std::slice::from_ref(&removed)).await?;
    println!("\u{2717} Deleted: {}", removed.title);
    println!("  Run `ticktasks undo` to bring it back.");
    Ok(())
}
