//! Manual run of the retention cleanup.

use anyhow::Result;
use ticktasks_core::{now_millis, retention_cutoff};
use tracing::debug;

use super::open;

pub async fn run(days: Option<u32>, dry_run: bool) -> Result<()> {
    let (settings, service) = open().await?;
    let days = match days {
        Some(days) => days,
        None => settings.auto_delete_days().await,
    };
    let cutoff = retention_cutoff(now_millis(), days);
    debug!("cleanup command: days={}, cutoff={}, dry_run={}", days, cutoff, dry_run);

    let tasks = service.tasks().current();
    let checked = tasks.iter().filter(|t| t.checked).count();

    println!("Task stats:");
    println!("  Total:    {}", tasks.len());
    println!("  Open:     {}", tasks.len() - checked);
    println!("  Checked:  {}", checked);
    println!();

    if dry_run {
        let expired = service.store().count_checked_before(cutoff).await?;
        println!("Dry run - keeping checked tasks for {} day(s)", days);
        println!("Would delete {} checked task(s)", expired);
        return Ok(());
    }

    let deleted = service.cleanup(cutoff).await?;
    println!("Cleanup complete:");
    println!("  Deleted {} checked task(s) older than {} day(s)", deleted, days);
    Ok(())
}
