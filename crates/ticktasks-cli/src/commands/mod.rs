pub mod add;
pub mod batch;
pub mod check;
pub mod cleanup;
pub mod config;
pub mod daemon;
pub mod delete;
pub mod list;
pub mod schedule;
pub mod show;
pub mod undo;

pub use add::run as add;
pub use batch::run as bulk_delete;
pub use check::run as check;
pub use cleanup::run as cleanup;
pub use config::run as config;
pub use delete::run as delete;
pub use list::run as list;
pub use schedule::run as schedule;
pub use show::run as show;
pub use undo::run as undo;

use std::fs;

use anyhow::{Context, Result};
use ticktasks_core::{Config, LocalDb, Settings, Task, TaskService};

/// Load settings and open the local database, creating its directory if needed.
pub async fn open() -> Result<(Settings, TaskService)> {
    let settings = Settings::load().context("Failed to load configuration")?;
    let config = settings.snapshot().await;
    let db = open_db(&config).await?;
    Ok((settings, TaskService::new(db)))
}

async fn open_db(config: &Config) -> Result<LocalDb> {
    let db_path = config.local_db_path()?;

    if let Some(parent) = db_path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let db = LocalDb::new(&db_path)
        .await
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    db.run_migrations().await?;
    Ok(db)
}

/// Parse a task ID given on the command line.
pub fn parse_id(id: &str) -> Result<i64> {
    let trimmed = id.trim().trim_start_matches('#');
    match trimmed.parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => anyhow::bail!("Invalid task ID '{}': expected a positive number", id),
    }
}

/// One-line rendering used by list, delete and undo output.
pub fn format_task_line(task: &Task) -> String {
    let status = if task.checked { "[x]" } else { "[ ]" };
    format!("{} #{:<4} {}", status, task.id, task.title)
}
