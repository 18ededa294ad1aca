//! Tool server trait.

use super::{RemoteTool, RemoteToolResult};
use crate::mcp::McpError;
use serde_json::{Map, Value};
use std::future::Future;

/// The remote side of a session: something that advertises a catalog and
/// executes tool calls.
///
/// This is the boundary between the query loop and side effects. The live
/// implementation is [`McpClient`](crate::McpClient).
pub trait ToolServer: Send + Sync {
    /// Fetch the current catalog.
    fn list_tools(&self) -> impl Future<Output = Result<Vec<RemoteTool>, McpError>> + Send;

    /// Execute a tool with already-parsed arguments.
    fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> impl Future<Output = Result<RemoteToolResult, McpError>> + Send;

    /// Release the channel.
    fn close(self) -> impl Future<Output = Result<(), McpError>> + Send
    where
        Self: Sized;
}
