use thiserror::Error;

/// Recoverable failures surfaced to the user as a notice.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// Required input missing or out of range.
    #[error("{0}")]
    Validation(String),

    /// A class occurrence that already has a mark.
    #[error("Attendance already marked for {key}")]
    DuplicateMarking { key: String },

    /// The store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TrackerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TrackerError::Validation(msg.into())
    }

    pub fn storage(err: anyhow::Error) -> Self {
        TrackerError::Storage(format!("{:#}", err))
    }
}
