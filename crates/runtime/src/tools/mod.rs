//! Tool discovery and execution.

pub mod errors;
pub mod gateway;
pub mod registry;
mod server;
mod types;

pub use errors::ToolError;
pub use gateway::Gateway;
pub use registry::list_tools;
pub use server::ToolServer;
pub use types::{RemoteContent, RemoteTool, RemoteToolResult, ToolArguments, ToolOutcome};
