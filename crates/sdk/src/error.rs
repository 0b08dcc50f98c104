//! SDK Error Types

use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error returned by the gateway; `kind` mirrors `error.data.kind`
    #[error("RPC error ({code}): {message}")]
    Rpc {
        code: i32,
        message: String,
        kind: Option<String>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl SdkError {
    /// Gateway error kind, e.g. `INVALID_ARGUMENT` or `UNIMPLEMENTED`
    pub fn kind(&self) -> Option<&str> {
        match self {
            SdkError::Rpc { kind, .. } => kind.as_deref(),
            _ => None,
        }
    }
}

impl From<jsonrpsee::core::ClientError> for SdkError {
    fn from(e: jsonrpsee::core::ClientError) -> Self {
        match e {
            jsonrpsee::core::ClientError::Call(call_err) => {
                let kind = call_err
                    .data()
                    .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw.get()).ok())
                    .and_then(|data| data.get("kind")?.as_str().map(str::to_string));
                SdkError::Rpc {
                    code: call_err.code(),
                    message: call_err.message().to_string(),
                    kind,
                }
            }
            jsonrpsee::core::ClientError::Transport(e) => {
                SdkError::Transport(format!("Transport error: {}", e))
            }
            jsonrpsee::core::ClientError::RestartNeeded(_) => {
                SdkError::Connection("Connection restart needed".to_string())
            }
            jsonrpsee::core::ClientError::ParseError(e) => SdkError::Serialization(e),
            _ => SdkError::Other(e.to_string()),
        }
    }
}
