use thiserror::Error;

/// Errors produced by the timeline engine and its loaders.
#[derive(Error, Debug)]
pub enum TimelineError {
    /// A raw record is missing a required field or carries a malformed value.
    #[error("Validation error in record '{record}', field '{field}': {message}")]
    Validation {
        record: String,
        field: &'static str,
        message: String,
    },
    /// The caller passed an argument outside the accepted domain
    /// (unknown view mode, non-positive zoom, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl TimelineError {
    pub(crate) fn validation(
        record: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            record: record.into(),
            field,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, TimelineError>;
