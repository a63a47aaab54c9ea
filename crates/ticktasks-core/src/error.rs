use thiserror::Error;

#[derive(Error, Debug)]
pub enum TickTasksError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "Storage error: {0}\n\nThe task database could not be used. Check that the data directory exists and the disk is not full; nothing was changed."
    )]
    Storage(#[from] sqlx::Error),

    #[error("Corrupt task row: {0}")]
    CorruptRow(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Scheduled cleanup failed: {0}")]
    SchedulerRun(String),
}

impl TickTasksError {
    /// True for failures of the underlying storage medium.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::CorruptRow(_))
    }
}

pub type Result<T> = std::result::Result<T, TickTasksError>;
