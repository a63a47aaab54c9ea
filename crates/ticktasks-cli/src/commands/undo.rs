use anyhow::Result;

use super::{format_task_line, open};

/// Restore the last deleted batch. Restored tasks get new IDs.
pub async fn run() -> Result<()> {
    let (_, service) = open().await?;

    let batch = service.store().take_undo_batch().await?;
    if batch.is_empty() {
        println!("Nothing to undo");
        return Ok(());
    }

    let restored = service.restore_all(&batch).await?;
    for task in &restored {
        println!("\u{21a9} Restored {}", format_task_line(task));
    }
    Ok(())
}
