use thiserror::Error;

/// Failures surfaced by the tracker service.
///
/// `NotFound` and `InvalidInput` are the caller's problem and carry a message
/// safe to show to a user. `Storage` wraps backend faults.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl TrackerError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
