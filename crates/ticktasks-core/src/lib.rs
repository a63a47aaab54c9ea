pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod service;

pub use config::{Config, DatabaseConfig, DisplayConfig, NotificationConfig, RetentionConfig, Settings, Theme};
pub use db::{LocalDb, TaskListWatcher};
pub use error::{Result, TickTasksError};
pub use models::*;
pub use scheduler::{CLEANUP_SCHEDULE, RetentionScheduler, RunOutcome, RunState};
pub use service::TaskService;
