//! Session lifecycle.

use crate::config::Config;
use crate::mcp::McpClient;
use crate::model::{Backend, ToolSpec};
use crate::providers::ChatCompletionsBackend;
use crate::tools::{self, ToolServer};
use crate::{Error, Result};

/// A live connection to a tool server plus the model backend handle.
///
/// The session is the only owner of the channel. Release it with
/// [`close`](Self::close); if a session is dropped without being closed
/// (e.g. the owning future was cancelled), dropping the server handle
/// releases the channel.
pub struct Session<S, B> {
    server: Option<S>,
    backend: B,
    model: String,
    announced: Vec<ToolSpec>,
}

impl Session<McpClient, ChatCompletionsBackend> {
    /// Connect to the configured tool server and complete the handshake.
    pub async fn open(config: &Config) -> Result<Self> {
        tracing::info!(endpoint = %config.endpoint, "opening session");

        let server = tokio::time::timeout(
            config.handshake_timeout,
            McpClient::connect(&config.endpoint),
        )
        .await
        .map_err(|_| {
            Error::Connection(format!(
                "handshake with {} timed out after {:?}",
                config.endpoint, config.handshake_timeout
            ))
        })?
        .map_err(|e| Error::Connection(e.to_string()))?;

        let backend = ChatCompletionsBackend::builder(&config.api_key)
            .base_url(&config.base_url)
            .build();

        Self::start(server, backend, &config.model_id).await
    }
}

impl<S: ToolServer, B: Backend> Session<S, B> {
    /// Take ownership of a connected server and fetch its catalog.
    ///
    /// If the catalog fetch fails the server is closed before the error is
    /// returned.
    pub async fn start(server: S, backend: B, model: impl Into<String>) -> Result<Self> {
        let announced = match tools::list_tools(&server).await {
            Ok(specs) => specs,
            Err(e) => {
                if let Err(close_err) = server.close().await {
                    tracing::warn!(
                        error = %close_err,
                        "failed to close tool server after catalog error"
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(tools = announced.len(), "session established");
        Ok(Self {
            server: Some(server),
            backend,
            model: model.into(),
            announced,
        })
    }

    /// Catalog snapshot taken when the session was established.
    pub fn announced_tools(&self) -> &[ToolSpec] {
        &self.announced
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The tool server, unless the session has been closed.
    pub fn server(&self) -> Result<&S> {
        self.server
            .as_ref()
            .ok_or_else(|| Error::InvalidState("session is closed".into()))
    }

    pub fn is_open(&self) -> bool {
        self.server.is_some()
    }

    /// Release the channel. Calling this more than once is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        let Some(server) = self.server.take() else {
            return Ok(());
        };

        server
            .close()
            .await
            .map_err(|e| Error::Connection(format!("failed to close tool server: {e}")))?;
        tracing::info!("session closed");
        Ok(())
    }
}

impl<S, B> Drop for Session<S, B> {
    fn drop(&mut self) {
        if self.server.is_some() {
            tracing::warn!("session dropped without close; releasing tool server channel");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoint;
    use crate::testing::{FakeServer, ScriptedBackend, remote};
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn start_snapshots_catalog() {
        let server = FakeServer::new().with_tool(remote("lookup"));

        let session = Session::start(server, ScriptedBackend::new(), "m").await.unwrap();

        assert!(session.is_open());
        assert_eq!(session.model(), "m");
        assert_eq!(session.announced_tools().len(), 1);
        assert_eq!(session.announced_tools()[0].name, "lookup");
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let server = FakeServer::new();
        let probe = server.probe();
        let mut session = Session::start(server, ScriptedBackend::new(), "m").await.unwrap();

        session.close().await.unwrap();
        session.close().await.unwrap();

        assert!(!session.is_open());
        assert_eq!(probe.closes(), 1);
        assert!(matches!(session.server(), Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn catalog_failure_releases_server() {
        let server = FakeServer::new().with_tool(crate::tools::RemoteTool {
            name: String::new(),
            description: None,
            input_schema: serde_json::json!({"type": "object"}),
        });
        let probe = server.probe();

        let result = Session::start(server, ScriptedBackend::new(), "m").await;

        assert!(matches!(result, Err(Error::Catalog(_))));
        assert_eq!(probe.closes(), 1);
        assert_eq!(probe.drops(), 1);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_connection_error() {
        let config = Config::new(
            "csk-test",
            Endpoint::process("/nonexistent/tool-server", Vec::<String>::new()),
        );

        let Err(Error::Connection(msg)) = Session::open(&config).await else {
            panic!("expected a connection error");
        };
        assert!(msg.contains("/nonexistent/tool-server"), "{msg}");
    }

    #[tokio::test]
    async fn silent_server_times_out_handshake() {
        let config = Config::new("csk-test", Endpoint::process("sleep", ["30"]))
            .with_handshake_timeout(Duration::from_millis(300));

        let started = Instant::now();
        let Err(Error::Connection(msg)) = Session::open(&config).await else {
            panic!("expected a connection error");
        };
        assert!(msg.contains("timed out"), "{msg}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn drop_without_close_releases_server() {
        let server = FakeServer::new();
        let probe = server.probe();
        let session = Session::start(server, ScriptedBackend::new(), "m").await.unwrap();

        drop(session);

        assert_eq!(probe.closes(), 0);
        assert_eq!(probe.drops(), 1);
    }
}
