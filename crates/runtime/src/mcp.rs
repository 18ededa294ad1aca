//! MCP (Model Context Protocol) client integration.
//!
//! This module provides the live [`ToolServer`] using the official rmcp SDK,
//! over either a spawned child process (stdio) or streamable HTTP.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{Endpoint, McpClient, ToolServer};
//!
//! # async fn example() -> Result<(), runtime::McpError> {
//! let endpoint = Endpoint::process("tether-kb", ["--data", "company_policies.json"]);
//! let client = McpClient::connect(&endpoint).await?;
//!
//! for tool in client.list_tools().await? {
//!     println!("Tool: {}", tool.name);
//! }
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

use rmcp::{
    RoleClient, ServiceExt,
    model::CallToolRequestParams,
    service::RunningService,
    transport::{ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::process::Command;

use crate::config::Endpoint;
use crate::tools::{RemoteTool, RemoteToolResult, ToolServer};

/// Error type for MCP operations.
#[derive(Debug, Error)]
pub enum McpError {
    /// Transport setup or handshake failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A request failed after the handshake.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server sent something we could not interpret.
    #[error("unexpected server payload: {0}")]
    Decode(String),
}

/// An MCP client connected to a tool server.
pub struct McpClient {
    service: RunningService<RoleClient, ()>,
}

impl McpClient {
    /// Connect to the endpoint and complete the MCP handshake.
    pub async fn connect(endpoint: &Endpoint) -> Result<Self, McpError> {
        let service = match endpoint {
            Endpoint::Process { command, args } => {
                let transport = TokioChildProcess::new(Command::new(command).configure(|cmd| {
                    for arg in args {
                        cmd.arg(arg);
                    }
                }))
                .map_err(|e| McpError::Connection(format!("failed to spawn {command}: {e}")))?;

                ().serve(transport)
                    .await
                    .map_err(|e| McpError::Connection(e.to_string()))?
            }
            Endpoint::Http { url } => {
                let transport = StreamableHttpClientTransport::from_uri(url.as_str());
                ().serve(transport)
                    .await
                    .map_err(|e| McpError::Connection(e.to_string()))?
            }
        };

        if let Some(info) = service.peer_info() {
            tracing::info!(
                server = %info.server_info.name,
                version = %info.server_info.version,
                %endpoint,
                "connected to tool server"
            );
        }

        Ok(Self { service })
    }
}

impl ToolServer for McpClient {
    async fn list_tools(&self) -> Result<Vec<RemoteTool>, McpError> {
        // Follows `nextCursor` until the catalog is complete.
        let tools = self
            .service
            .list_all_tools()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        tools.iter().map(convert).collect()
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<RemoteToolResult, McpError> {
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: Some(arguments),
            task: None,
        };

        let result = self
            .service
            .call_tool(params)
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        convert(&result)
    }

    async fn close(self) -> Result<(), McpError> {
        self.service
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

/// Re-read an rmcp model value as one of our boundary types.
fn convert<T: serde::Serialize, R: DeserializeOwned>(value: &T) -> Result<R, McpError> {
    let json = serde_json::to_value(value).map_err(|e| McpError::Decode(e.to_string()))?;
    serde_json::from_value(json).map_err(|e| McpError::Decode(e.to_string()))
}
