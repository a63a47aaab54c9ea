use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use notify_rust::Notification;
use ticktasks_core::{
    Config, LocalDb, RetentionScheduler, RunOutcome, Schedule, Settings, TaskService,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("ticktasks-daemon starting...");

    let settings = Settings::load().context("Failed to load configuration")?;
    let config = settings.snapshot().await;

    let db_path = config.local_db_path()?;
    if let Some(parent) = db_path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let db = LocalDb::new(&db_path).await?;
    db.run_migrations().await?;
    let service = TaskService::new(db);

    let (result_tx, mut result_rx) = mpsc::unbounded_channel();
    let scheduler = RetentionScheduler::new(service, settings.clone()).with_results(result_tx);

    let (schedule, pid_file) = register(&scheduler, Config::pid_path()?).await?;
    info!(
        "Daemon running. Cleanup every {} hour(s), keeping checked tasks for {} day(s).",
        schedule.interval_secs / 3600,
        settings.auto_delete_days().await
    );

    let handle = scheduler.run();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    error!("could not listen for shutdown signal: {}", e);
                }
                info!("shutting down");
                break;
            }
            outcome = result_rx.recv() => {
                let Some(outcome) = outcome else {
                    error!("scheduler stopped unexpectedly");
                    break;
                };
                report(&settings, &outcome).await;
            }
        }
    }

    handle.abort();
    drop(pid_file);

    Ok(())
}

/// Process id file, removed again when dropped.
struct PidFile {
    path: PathBuf,
}

impl PidFile {
    fn create(path: PathBuf) -> Result<Self> {
        fs::write(&path, std::process::id().to_string())
            .with_context(|| format!("Failed to write pid file: {}", path.display()))?;
        Ok(Self { path })
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("could not remove pid file {}: {}", self.path.display(), e);
        }
    }
}

/// Re-register the cleanup cadence, replacing the previous one, and only then
/// write the pid file.
async fn register(scheduler: &RetentionScheduler, pid_path: PathBuf) -> Result<(Schedule, PidFile)> {
    let schedule = scheduler.schedule().await?;
    let pid_file = PidFile::create(pid_path)?;
    Ok((schedule, pid_file))
}

async fn report(settings: &Settings, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Success { deleted, .. } => {
            info!("cleanup removed {} task(s)", deleted);

            let config = settings.snapshot().await;
            if *deleted > 0
                && config.notifications.enabled
                && let Err(e) = send_notification(*deleted, &config)
            {
                warn!("could not show notification: {}", e);
            }
        }
        RunOutcome::Failed(message) => {
            // Not retried; the next period is the retry.
            warn!("cleanup failed: {}", message);
        }
    }
}

fn send_notification(deleted: u64, config: &Config) -> Result<()> {
    let mut notification = Notification::new();

    notification
        .summary("TickTasks")
        .body(&format!("Cleaned up {} checked task(s)", deleted))
        .appname("ticktasks")
        .timeout(notify_rust::Timeout::Milliseconds(10000));

    if config.notifications.sound {
        notification.sound_name("message-new-instant");
    }

    notification.show()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn scheduler() -> (RetentionScheduler, LocalDb) {
        let db = LocalDb::new_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        let scheduler =
            RetentionScheduler::new(TaskService::new(db.clone()), Settings::in_memory(Config::default()));
        (scheduler, db)
    }

    #[tokio::test]
    async fn test_register_writes_pid_after_schedule() {
        let temp_dir = TempDir::new().unwrap();
        let pid_path = temp_dir.path().join("daemon.pid");
        let (scheduler, _db) = scheduler().await;

        let (schedule, pid_file) = register(&scheduler, pid_path.clone()).await.unwrap();
        assert_eq!(schedule.interval_secs, 24 * 3600);
        assert_eq!(
            fs::read_to_string(&pid_path).unwrap(),
            std::process::id().to_string()
        );

        drop(pid_file);
        assert!(!pid_path.exists());
    }

    #[tokio::test]
    async fn test_failed_schedule_leaves_no_pid_file() {
        let temp_dir = TempDir::new().unwrap();
        let pid_path = temp_dir.path().join("daemon.pid");
        let (scheduler, db) = scheduler().await;
        db.close().await;

        assert!(register(&scheduler, pid_path.clone()).await.is_err());
        assert!(!pid_path.exists());
    }
}
