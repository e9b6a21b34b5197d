use crate::domain::TaskStatus;
use thiserror::Error;

/// Errors surfaced by the key-value store layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write was rejected because the backing store is out of space
    #[error("storage quota exceeded while writing '{key}'")]
    QuotaExceeded { key: String },

    /// A stored value could not be decoded (or a record failed to encode)
    #[error("malformed stored value: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the time accounting engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested transition is not legal from the task's current status.
    /// The task is left untouched; callers decide whether to surface this.
    #[error("cannot {action} a task that is {from}")]
    InvalidTransition {
        from: TaskStatus,
        action: &'static str,
    },

    #[error("task not found in its date collection")]
    TaskNotFound,

    #[error("backlog task not found")]
    TodoNotFound,

    #[error("category '{name}' already exists")]
    DuplicateCategory { name: String },

    #[error("category not found")]
    CategoryNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}
