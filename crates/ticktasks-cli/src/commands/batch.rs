//! Bulk deletion of several tasks with one combined undo.

use std::collections::HashSet;

use anyhow::Result;

use super::{format_task_line, open, parse_id};

pub async fn run(ids: &[String]) -> Result<()> {
    let ids = unique_ids(ids)?;

    let (_, service) = open().await?;
    let removed = service.bulk_delete(&ids).await?;

    if removed.is_empty() {
        println!("No tasks selected.");
        return Ok(());
    }

    for task in &removed {
        println!("\u{2717} {}", format_task_line(task));
    }

    let skipped = ids.len() - removed.len();
    if skipped > 0 {
        println!("Skipped {} unknown ID(s)", skipped);
    }

    service.store().save_undo_batch(&removed).await?;
    println!("\nDeleted {} task(s). Run `ticktasks undo` to restore them.", removed.len());
    Ok(())
}

/// Parse the given IDs, dropping repeats while keeping first-seen order.
fn unique_ids(ids: &[String]) -> Result<Vec<i64>> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        let id = parse_id(id)?;
        if seen.insert(id) {
            unique.push(id);
        }
    }
    Ok(unique)
}
