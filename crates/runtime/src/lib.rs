//! Tether runtime: the tool-augmented query loop.
//!
//! This crate connects a chat-completions model to the tools exposed by an
//! MCP server and answers queries with at most one round of tool use.
//!
//! # Overview
//!
//! The runtime is organized around these concepts:
//!
//! - **Session**: the owned connection to a tool server plus the model
//!   backend handle. Closed exactly once, on every exit path.
//! - **Registry** ([`list_tools`]): fetches the live catalog and normalizes
//!   it into [`ToolSpec`]s, rejecting malformed catalogs outright.
//! - **Gateway**: executes tool calls; every failure becomes tool output the
//!   model can react to.
//! - **Conversation**: the append-only message log sent with each completion.
//! - **Orchestrator**: drives a query from the first completion, through tool
//!   dispatch, to the final answer.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{Config, Endpoint, Orchestrator};
//!
//! # async fn example() -> runtime::Result<()> {
//! let endpoint = Endpoint::process("tether-kb", ["--data", "company_policies.json"]);
//! let config = Config::new("csk-...", endpoint);
//!
//! let answer = Orchestrator::connect(&config)
//!     .await?
//!     .scoped(async |orchestrator| {
//!         orchestrator
//!             .process_query("What is the company policy on remote work?")
//!             .await
//!     })
//!     .await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

mod config;
mod conversation;
mod error;
mod mcp;
pub mod model;
mod orchestrator;
pub mod providers;
mod session;
pub mod tools;

#[cfg(test)]
mod testing;

pub use config::{
    Config, DEFAULT_BASE_URL, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_MODEL, Endpoint,
};
pub use conversation::Conversation;
pub use error::{Error, Result};
pub use mcp::{McpClient, McpError};
pub use model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Role, ToolCall, ToolSpec, Usage,
};
pub use orchestrator::{Orchestrator, SYSTEM_PROMPT};
pub use providers::ChatCompletionsBackend;
pub use session::Session;
pub use tools::{
    Gateway, RemoteContent, RemoteTool, RemoteToolResult, ToolArguments, ToolError, ToolOutcome,
    ToolServer, list_tools,
};
