//! Retention scheduler.
//!
//! Periodically purges checked tasks older than the configured number of
//! days. The cadence is persisted in the `schedules` table under a single
//! name, so it survives restarts and re-scheduling replaces rather than
//! duplicates. A failed run is recorded and not retried until the next
//! period comes around.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::db::LocalDb;
use crate::error::{Result, TickTasksError};
use crate::models::{RunStatus, Schedule, now_millis, retention_cutoff};
use crate::service::TaskService;

/// Name the cleanup cadence is registered under.
pub const CLEANUP_SCHEDULE: &str = "cleanup";

/// Interval between checks of the persisted schedule (seconds).
const TICK_INTERVAL_SECS: u64 = 60;

/// Result of one cleanup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success { deleted: u64, cutoff_millis: i64 },
    Failed(String),
}

impl RunOutcome {
    pub fn status(&self) -> RunStatus {
        match self {
            RunOutcome::Success { .. } => RunStatus::Succeeded,
            RunOutcome::Failed(_) => RunStatus::Failed,
        }
    }

    /// Number of deleted tasks, or [`TickTasksError::SchedulerRun`] for a failed run.
    pub fn into_result(self) -> Result<u64> {
        match self {
            RunOutcome::Success { deleted, .. } => Ok(deleted),
            RunOutcome::Failed(message) => Err(TickTasksError::SchedulerRun(message)),
        }
    }
}

/// Where the scheduler is in its run cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle { last: Option<RunOutcome> },
    Running,
}

/// Drives [`TaskService::cleanup`] on a persisted periodic schedule.
pub struct RetentionScheduler {
    service: TaskService,
    settings: Settings,
    tick_interval: Duration,
    state_tx: Arc<watch::Sender<RunState>>,
    result_tx: Option<mpsc::UnboundedSender<RunOutcome>>,
}

impl RetentionScheduler {
    pub fn new(service: TaskService, settings: Settings) -> Self {
        let (state_tx, _) = watch::channel(RunState::Idle { last: None });
        Self {
            service,
            settings,
            tick_interval: Duration::from_secs(TICK_INTERVAL_SECS),
            state_tx: Arc::new(state_tx),
            result_tx: None,
        }
    }

    /// Forward every run outcome to `result_tx`.
    pub fn with_results(mut self, result_tx: mpsc::UnboundedSender<RunOutcome>) -> Self {
        self.result_tx = Some(result_tx);
        self
    }

    /// Override how often the background loop checks whether a run is due.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    fn store(&self) -> &LocalDb {
        self.service.store()
    }

    /// Observe run state transitions.
    pub fn state(&self) -> watch::Receiver<RunState> {
        self.state_tx.subscribe()
    }

    /// (Re)register the cleanup cadence using the current interval setting.
    ///
    /// Any existing cleanup schedule is replaced, and the new one is due
    /// immediately. Calling this repeatedly never yields more than one schedule.
    pub async fn schedule(&self) -> Result<Schedule> {
        let interval = self.settings.retention_interval().await;
        let interval_secs = i64::try_from(interval.as_secs()).unwrap_or(i64::MAX);
        let schedule = self
            .store()
            .upsert_schedule(CLEANUP_SCHEDULE, interval_secs, now_millis())
            .await?;

        info!(
            request_id = %schedule.request_id,
            interval_secs,
            "cleanup scheduled"
        );
        Ok(schedule)
    }

    /// Remove the cleanup schedule. Returns whether one existed.
    pub async fn cancel(&self) -> Result<bool> {
        Ok(self.store().remove_schedule(CLEANUP_SCHEDULE).await? > 0)
    }

    pub async fn current_schedule(&self) -> Result<Option<Schedule>> {
        self.store().get_schedule(CLEANUP_SCHEDULE).await
    }

    /// Run cleanup now regardless of the schedule. The outcome is recorded on
    /// the schedule if one exists.
    pub async fn run_once(&self) -> RunOutcome {
        let schedule = match self.current_schedule().await {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!("could not read cleanup schedule: {e}");
                None
            }
        };
        self.execute(schedule.as_ref()).await
    }

    /// Run cleanup if the persisted schedule says it is due.
    pub async fn tick(&self) -> Option<RunOutcome> {
        let schedule = match self.current_schedule().await {
            Ok(Some(schedule)) => schedule,
            Ok(None) => return None,
            Err(e) => {
                warn!("could not read cleanup schedule: {e}");
                return None;
            }
        };

        if !schedule.is_due(now_millis()) {
            return None;
        }

        Some(self.execute(Some(&schedule)).await)
    }

    async fn execute(&self, schedule: Option<&Schedule>) -> RunOutcome {
        self.state_tx.send_replace(RunState::Running);
        let started_at = now_millis();

        self.settings.reload_or_keep().await;
        let days = self.settings.auto_delete_days().await;
        let cutoff_millis = retention_cutoff(started_at, days);

        let outcome = match self.service.cleanup(cutoff_millis).await {
            Ok(deleted) => {
                info!(deleted, days, "scheduled cleanup succeeded");
                RunOutcome::Success {
                    deleted,
                    cutoff_millis,
                }
            }
            Err(e) => {
                warn!("{}", TickTasksError::SchedulerRun(e.to_string()));
                RunOutcome::Failed(e.to_string())
            }
        };

        if let Some(schedule) = schedule {
            let message = match &outcome {
                RunOutcome::Success { deleted, .. } => format!("deleted {}", deleted),
                RunOutcome::Failed(message) => message.clone(),
            };

            match self
                .store()
                .record_schedule_run(
                    &schedule.name,
                    schedule.request_id,
                    started_at,
                    outcome.status(),
                    Some(&message),
                )
                .await
            {
                Ok(0) => debug!("cleanup schedule was replaced during the run"),
                Ok(_) => {}
                Err(e) => warn!("could not record cleanup run: {e}"),
            }
        }

        self.state_tx.send_replace(RunState::Idle {
            last: Some(outcome.clone()),
        });

        if let Some(tx) = &self.result_tx
            && tx.send(outcome.clone()).is_err()
        {
            debug!("cleanup result channel closed");
        }

        outcome
    }

    /// Start the scheduler background loop.
    pub fn run(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "retention scheduler started, checking every {:?}",
                self.tick_interval
            );
            let mut interval = tokio::time::interval(self.tick_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }
}
