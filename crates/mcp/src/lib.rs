//! MCP (Model Context Protocol) server library.
//!
//! This crate hosts tools for MCP clients over newline-delimited JSON-RPC on
//! stdio. Implement [`ToolHandler`] and hand it to a [`Server`].
//!
//! # Example
//!
//! ```no_run
//! use mcp::{CallToolResult, Server, ServerInfo, Tool, ToolHandler};
//! use serde_json::{Value, json};
//!
//! struct Clock;
//!
//! impl ToolHandler for Clock {
//!     fn tools(&self) -> Vec<Tool> {
//!         vec![Tool {
//!             name: "now".to_string(),
//!             description: Some("Current time".to_string()),
//!             input_schema: json!({"type": "object"}),
//!         }]
//!     }
//!
//!     async fn call(&self, name: &str, _args: Option<Value>) -> mcp::Result<CallToolResult> {
//!         match name {
//!             "now" => Ok(CallToolResult::text("noon")),
//!             other => Err(mcp::Error::ToolNotFound(other.to_string())),
//!         }
//!     }
//! }
//!
//! # async fn example() -> mcp::Result<()> {
//! let server = Server::new(ServerInfo::new("clock", "0.1.0"), Clock);
//! server.serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod protocol;
mod server;

pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, RequestId,
    ServerCapabilities, ServerInfo, Tool, ToolContent, ToolsCapability, codes,
};
pub use server::{MAX_MESSAGE_SIZE, Server, ToolHandler};
