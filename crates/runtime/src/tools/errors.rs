use thiserror::Error;

/// Errors that can occur while executing a tool call.
///
/// These never abort a query: the gateway turns them into
/// [`ToolOutcome::Error`](super::ToolOutcome) so the model sees the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("execution failed: {0}")]
    Execution(String),
    #[error("tool returned no text content")]
    EmptyResult,
}
