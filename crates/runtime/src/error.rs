use crate::model::ModelError;
use thiserror::Error;

/// Errors surfaced to callers of the runtime.
///
/// Tool failures never show up here: they are folded into the conversation
/// as tool output (see [`ToolOutcome`](crate::ToolOutcome)).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The tool server could not be reached, the handshake failed or timed
    /// out, or the channel could not be released cleanly.
    #[error("connection error: {0}")]
    Connection(String),

    /// The tool server advertised a malformed catalog.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// The completion backend failed. Never retried.
    #[error("model backend error: {0}")]
    ModelBackend(#[from] ModelError),

    /// An operation was attempted in a state that does not allow it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
