//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes. This is the only place
//! where an [`ErrorKind`] becomes a wire code.

use jsonrpsee::types::ErrorObjectOwned;
use meshgate_core::error::{AppError, ErrorKind};
use serde::Serialize;

/// RPC Error Codes
pub mod code {
    pub const INVALID_ARGUMENT: i32 = 4000;
    pub const ALREADY_RUNNING: i32 = 4002;
    pub const NOT_RUNNING: i32 = 4004;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const UNIMPLEMENTED: i32 = 5001;
    pub const CONFIG_ERROR: i32 = 5003;
}

/// Structured payload carried in `error.data`
#[derive(Debug, Serialize)]
struct ErrorData {
    kind: ErrorKind,
}

/// Wire code for an error kind
pub fn code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InvalidArgument => code::INVALID_ARGUMENT,
        ErrorKind::AlreadyRunning => code::ALREADY_RUNNING,
        ErrorKind::NotRunning => code::NOT_RUNNING,
        ErrorKind::Internal => code::INTERNAL_ERROR,
        ErrorKind::Unimplemented => code::UNIMPLEMENTED,
        ErrorKind::UnknownService | ErrorKind::MissingDependency => code::CONFIG_ERROR,
    }
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let kind = err.kind();
    let message = match &err {
        AppError::InvalidArgument(msg)
        | AppError::UnknownService(msg)
        | AppError::MissingDependency(msg)
        | AppError::Unimplemented(msg)
        | AppError::AlreadyRunning(msg)
        | AppError::NotRunning(msg)
        | AppError::Internal(msg) => msg.clone(),
        AppError::Io(e) => e.to_string(),
        AppError::Serialization(e) => e.to_string(),
    };
    ErrorObjectOwned::owned(code_for(kind), message, Some(ErrorData { kind }))
}

/// Shorthand for handlers rejecting a request before touching any subsystem
pub fn invalid_argument(msg: impl Into<String>) -> ErrorObjectOwned {
    to_rpc_error(AppError::InvalidArgument(msg.into()))
}

pub fn unimplemented(method: &str) -> ErrorObjectOwned {
    to_rpc_error(AppError::Unimplemented(format!("{} is not supported", method)))
}
