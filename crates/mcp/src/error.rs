//! MCP error types.

use crate::protocol::{JsonRpcError, codes};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),
}

impl Error {
    /// The JSON-RPC error sent back to the client for this failure.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let code = match self {
            Self::ToolNotFound(_) | Self::InvalidParams(_) => codes::INVALID_PARAMS,
            Self::Io(_) | Self::Serialize(_) => codes::INTERNAL_ERROR,
        };
        JsonRpcError::new(code, self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
