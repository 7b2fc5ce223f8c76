use crate::domain::TaskId;
use thiserror::Error;

/// Failures a tracker operation can report back to the view
#[derive(Debug, Error)]
pub enum TrackerError {
    /// User input rejected (empty text, malformed duration, unknown status)
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Re-entrant edit guard. Views treat this as a no-op.
    #[error("task {0} is already being edited")]
    AlreadyEditing(TaskId),

    /// Persisting the collection failed; the in-memory state is kept
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl TrackerError {
    /// Whether the view should swallow this error instead of reporting it
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::AlreadyEditing(_))
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
