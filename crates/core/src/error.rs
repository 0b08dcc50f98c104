// Central Error Type for the Gateway

use serde::Serialize;
use thiserror::Error;

/// Machine-readable error classification.
///
/// Transport layers translate this into their own status codes; business
/// logic never deals with transport codes directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidArgument,
    UnknownService,
    MissingDependency,
    Unimplemented,
    Internal,
    AlreadyRunning,
    NotRunning,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::UnknownService => "UNKNOWN_SERVICE",
            ErrorKind::MissingDependency => "MISSING_DEPENDENCY",
            ErrorKind::Unimplemented => "UNIMPLEMENTED",
            ErrorKind::Internal => "INTERNAL",
            ErrorKind::AlreadyRunning => "ALREADY_RUNNING",
            ErrorKind::NotRunning => "NOT_RUNNING",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unrecognized service requested: {0}")]
    UnknownService(String),

    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("not implemented: {0}")]
    Unimplemented(String),

    #[error("already running: {0}")]
    AlreadyRunning(String),

    #[error("not running: {0}")]
    NotRunning(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AppError::UnknownService(_) => ErrorKind::UnknownService,
            AppError::MissingDependency(_) => ErrorKind::MissingDependency,
            AppError::Unimplemented(_) => ErrorKind::Unimplemented,
            AppError::AlreadyRunning(_) => ErrorKind::AlreadyRunning,
            AppError::NotRunning(_) => ErrorKind::NotRunning,
            AppError::Io(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
