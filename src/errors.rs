//! Typed error hierarchy for the task board.
//!
//! `BoardError` covers the domain and store failures. The HTTP layer maps it
//! onto status codes in `board::api::ApiError`; external commit lookups never
//! produce one (they degrade to `CommitLookup::Unavailable`).

use thiserror::Error;

/// Errors from the board aggregate, store and configuration.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Project {id} not found")]
    ProjectNotFound { id: i64 },

    #[error("Task {task_id} not found in project {project_id}")]
    TaskNotFound { project_id: i64, task_id: String },

    #[error("Invalid status '{0}'. Valid values: Open, In Progress, Completed, Archived")]
    InvalidStatus(String),

    #[error("Invalid priority '{0}'. Valid values: low, medium, high, critical")]
    InvalidPriority(String),

    #[error("Invalid issue type '{0}'. Valid values: task, bug, feature, improvement")]
    InvalidIssueType(String),

    #[error("Invalid project key '{0}': expected 2-10 ASCII letters or digits")]
    InvalidProjectKey(String),

    #[error("Project key {key} is already in use")]
    DuplicateProjectKey { key: String },

    #[error("Project {id} was modified concurrently (expected version {expected}, found {found})")]
    VersionConflict { id: i64, expected: i64, found: i64 },

    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BoardError {
    /// True for the "target does not exist" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BoardError::ProjectNotFound { .. } | BoardError::TaskNotFound { .. }
        )
    }

    /// True for errors caused by bad caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            BoardError::InvalidStatus(_)
                | BoardError::InvalidPriority(_)
                | BoardError::InvalidIssueType(_)
                | BoardError::InvalidProjectKey(_)
                | BoardError::BadRequest(_)
        )
    }
}
