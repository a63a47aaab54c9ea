use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Milliseconds in one day, the unit the retention setting is expressed in.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Retention cutoff for "keep checked tasks for `days` days", relative to `now_millis`.
pub fn retention_cutoff(now_millis: i64, days: u32) -> i64 {
    now_millis.saturating_sub(i64::from(days).saturating_mul(MILLIS_PER_DAY))
}

/// A single to-do item.
///
/// `id == 0` means the task has not been persisted yet; the store assigns
/// the real id on insert and ignores whatever value is passed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub checked: bool,
    /// Epoch millis of the last unchecked -> checked transition.
    pub checked_at: Option<i64>,
}

impl Task {
    pub fn new(title: String, description: String) -> Self {
        Self {
            id: 0,
            title,
            description,
            checked: false,
            checked_at: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    pub fn mark_checked(&mut self, at_millis: i64) {
        self.checked = true;
        self.checked_at = Some(at_millis);
    }

    pub fn mark_unchecked(&mut self) {
        self.checked = false;
        self.checked_at = None;
    }

    /// Same field values without an identity, ready to be inserted as a new row.
    pub fn detached(&self) -> Self {
        Self {
            id: 0,
            ..self.clone()
        }
    }

    pub fn checked_at_utc(&self) -> Option<DateTime<Utc>> {
        self.checked_at.and_then(DateTime::from_timestamp_millis)
    }

    /// Whether the retention policy would remove this task at `cutoff_millis`.
    pub fn is_expired(&self, cutoff_millis: i64) -> bool {
        self.checked && self.checked_at.is_some_and(|at| at <= cutoff_millis)
    }
}

/// Outcome recorded for the most recent run of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Succeeded,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Succeeded => write!(f, "succeeded"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "succeeded" => Ok(RunStatus::Succeeded),
            "failed" => Ok(RunStatus::Failed),
            other => Err(format!("unknown run status '{}'", other)),
        }
    }
}

/// A persisted periodic trigger, unique by `name`.
///
/// Re-scheduling under the same name replaces the row and mints a fresh
/// `request_id`, so at most one cadence per name is ever active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub name: String,
    pub request_id: Uuid,
    pub interval_secs: i64,
    pub next_run_at: i64,
    pub last_run_at: Option<i64>,
    pub last_status: Option<RunStatus>,
    pub last_message: Option<String>,
}

impl Schedule {
    pub fn is_due(&self, now_millis: i64) -> bool {
        now_millis >= self.next_run_at
    }

    pub fn interval_millis(&self) -> i64 {
        self.interval_secs.saturating_mul(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_new_is_unchecked_and_unpersisted() {
        let task = Task::new("Buy milk".to_string(), String::new());

        assert_eq!(task.title, "Buy milk");
        assert!(!task.checked);
        assert!(task.checked_at.is_none());
        assert!(!task.is_persisted());
    }

    #[test]
    fn test_check_and_uncheck_keep_timestamp_in_step() {
        let mut task = Task::new("Walk dog".to_string(), String::new());

        task.mark_checked(1_000);
        assert!(task.checked);
        assert_eq!(task.checked_at, Some(1_000));

        task.mark_unchecked();
        assert!(!task.checked);
        assert!(task.checked_at.is_none());
    }

    #[test]
    fn test_detached_drops_identity_only() {
        let mut task = Task::new("Pay rent".to_string(), "before the 5th".to_string());
        task.id = 42;
        task.mark_checked(500);

        let copy = task.detached();
        assert_eq!(copy.id, 0);
        assert_eq!(copy.title, task.title);
        assert_eq!(copy.description, task.description);
        assert_eq!(copy.checked_at, Some(500));
    }

    #[test]
    fn test_is_expired_boundary_is_inclusive() {
        let mut task = Task::new("A".to_string(), String::new());
        assert!(!task.is_expired(i64::MAX));

        task.mark_checked(100);
        assert!(task.is_expired(100));
        assert!(task.is_expired(150));
        assert!(!task.is_expired(99));
    }

    #[test]
    fn test_retention_cutoff() {
        let now = 10 * MILLIS_PER_DAY;
        assert_eq!(retention_cutoff(now, 3), 7 * MILLIS_PER_DAY);
        assert_eq!(retention_cutoff(now, 0), now);
        assert_eq!(retention_cutoff(i64::MIN + 1, u32::MAX), i64::MIN);
    }

    #[test]
    fn test_run_status_round_trip() {
        for status in [RunStatus::Succeeded, RunStatus::Failed] {
            let parsed: RunStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("paused".parse::<RunStatus>().is_err());
    }
}
