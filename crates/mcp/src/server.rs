//! Line-delimited JSON-RPC server loop for hosting tools over stdio.

use std::future::Future;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, ServerCapabilities,
    ServerInfo, Tool, ToolsCapability, codes,
};

/// Maximum accepted request size (1MB).
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Something that exposes tools to MCP clients.
pub trait ToolHandler: Send + Sync {
    /// The current catalog.
    fn tools(&self) -> Vec<Tool>;

    /// Execute a tool. Return [`Error::ToolNotFound`] for unknown names.
    fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> impl Future<Output = Result<CallToolResult>> + Send;
}

/// An MCP server answering requests for a single client.
pub struct Server<H> {
    info: ServerInfo,
    handler: H,
}

impl<H: ToolHandler> Server<H> {
    pub fn new(info: ServerInfo, handler: H) -> Self {
        Self { info, handler }
    }

    /// Serve on the process's stdin/stdout until the client hangs up.
    pub async fn serve_stdio(&self) -> Result<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve one newline-delimited request stream until EOF.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(server = %self.info.name, version = %self.info.version, "serving MCP");

        let mut line = Vec::new();
        loop {
            match read_line_bounded(&mut reader, &mut line).await? {
                Line::Eof => {
                    tracing::info!("client disconnected");
                    return Ok(());
                }
                Line::Oversized(size) => {
                    tracing::warn!(size, max = MAX_MESSAGE_SIZE, "dropping oversized message");
                    continue;
                }
                Line::Complete => {}
            }

            let Ok(text) = std::str::from_utf8(&line) else {
                tracing::warn!("dropping message that is not UTF-8");
                continue;
            };
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping unparsable message");
                    continue;
                }
            };

            if let Some(response) = self.handle(request).await {
                let json = serde_json::to_string(&response)?;
                writer.write_all(json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
    }

    /// Answer one message. Notifications get no response.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            tracing::debug!(method = %request.method, "notification");
            return None;
        };

        tracing::debug!(method = %request.method, ?id, "request");
        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                tracing::warn!(method = %request.method, error = %error, "request failed");
                JsonRpcResponse::failure(id, error)
            }
        };
        Some(response)
    }

    async fn dispatch(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> std::result::Result<Value, JsonRpcError> {
        match method {
            "initialize" => {
                let params: InitializeParams = parse_params(params)?;
                let result = InitializeResult {
                    protocol_version: params
                        .protocol_version
                        .unwrap_or_else(|| PROTOCOL_VERSION.to_string()),
                    capabilities: ServerCapabilities {
                        tools: Some(ToolsCapability::default()),
                    },
                    server_info: self.info.clone(),
                };
                to_value(result)
            }
            "ping" => Ok(Value::Object(Default::default())),
            "tools/list" => to_value(ListToolsResult {
                tools: self.handler.tools(),
            }),
            "tools/call" => {
                let params: CallToolParams = require_params(params)?;
                let result = self
                    .handler
                    .call(&params.name, params.arguments)
                    .await
                    .map_err(|e| e.to_rpc_error())?;
                to_value(result)
            }
            other => Err(JsonRpcError::new(
                codes::METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            )),
        }
    }
}

enum Line {
    Eof,
    Complete,
    Oversized(usize),
}

/// Read one `\n`-terminated line into `buf`, holding at most
/// [`MAX_MESSAGE_SIZE`] bytes. Longer lines are consumed and discarded.
async fn read_line_bounded<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Line>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut total = 0;
    let mut oversized = false;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(match (total, oversized) {
                (0, _) => Line::Eof,
                (_, true) => Line::Oversized(total),
                (_, false) => Line::Complete,
            });
        }

        let (len, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        total += len;
        if !oversized && buf.len() + len > MAX_MESSAGE_SIZE {
            oversized = true;
            buf.clear();
        }
        if !oversized {
            buf.extend_from_slice(&available[..len]);
        }
        reader.consume(len);

        if done {
            return Ok(if oversized {
                Line::Oversized(total)
            } else {
                Line::Complete
            });
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned + Default>(
    params: Option<Value>,
) -> std::result::Result<T, JsonRpcError> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| Error::InvalidParams(e.to_string()).to_rpc_error()),
    }
}

fn require_params<T: serde::de::DeserializeOwned>(
    params: Option<Value>,
) -> std::result::Result<T, JsonRpcError> {
    let value =
        params.ok_or_else(|| Error::InvalidParams("missing params".into()).to_rpc_error())?;
    serde_json::from_value(value)
        .map_err(|e| Error::InvalidParams(e.to_string()).to_rpc_error())
}

fn to_value(value: impl serde::Serialize) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| Error::Serialize(e).to_rpc_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RequestId;
    use serde_json::json;

    struct EchoHandler;

    impl ToolHandler for EchoHandler {
        fn tools(&self) -> Vec<Tool> {
            vec![Tool {
                name: "echo".into(),
                description: Some("Echo the message back".into()),
                input_schema: json!({
                    "type": "object",
                    "properties": {"message": {"type": "string"}}
                }),
            }]
        }

        async fn call(&self, name: &str, arguments: Option<Value>) -> Result<CallToolResult> {
            if name != "echo" {
                return Err(Error::ToolNotFound(name.to_string()));
            }
            let message = arguments
                .as_ref()
                .and_then(|args| args.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("default");
            Ok(CallToolResult::text(message))
        }
    }

    fn server() -> Server<EchoHandler> {
        Server::new(ServerInfo::new("echo-server", "0.1.0"), EchoHandler)
    }

    async fn exchange(input: &str) -> Vec<Value> {
        let mut out = Vec::new();
        server().serve(input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn handshake_echoes_protocol_version() {
        let responses = exchange(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"c","version":"1"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
        ))
        .await;

        assert_eq!(responses.len(), 1);
        let result = &responses[0]["result"];
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "echo-server");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn lists_and_calls_tools() {
        let responses = exchange(concat!(
            r#"{"jsonrpc":"2.0","id":"a","method":"tools/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":"b","method":"tools/call","params":{"name":"echo","arguments":{"message":"hi \"there\""}}}"#,
            "\n",
        ))
        .await;

        assert_eq!(responses[0]["result"]["tools"][0]["name"], "echo");
        assert_eq!(
            responses[0]["result"]["tools"][0]["inputSchema"]["type"],
            "object"
        );
        assert_eq!(
            responses[1]["result"],
            json!({"content": [{"type": "text", "text": "hi \"there\""}], "isError": false})
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let responses = exchange(
            "{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"tools/call\",\"params\":{\"name\":\"nope\"}}\n",
        )
        .await;

        assert_eq!(responses[0]["error"]["code"], codes::INVALID_PARAMS);
        assert!(
            responses[0]["error"]["message"]
                .as_str()
                .unwrap()
                .contains("tool not found: nope")
        );
    }

    #[tokio::test]
    async fn unknown_method_and_garbage_lines() {
        let responses = exchange(concat!(
            "not json at all\n",
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":4,"method":"ping"}"#,
            "\n",
        ))
        .await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], codes::METHOD_NOT_FOUND);
        assert_eq!(responses[1]["result"], json!({}));
    }

    #[tokio::test]
    async fn oversized_line_is_skipped_without_buffering_it() {
        let ping = r#"{"jsonrpc":"2.0","id":5,"method":"ping"}"#;
        let input = format!("{}\n{ping}\n", "x".repeat(MAX_MESSAGE_SIZE + 10));
        let mut reader = tokio::io::BufReader::with_capacity(4096, input.as_bytes());
        let mut line = Vec::new();

        let first = read_line_bounded(&mut reader, &mut line).await.unwrap();
        assert!(matches!(first, Line::Oversized(size) if size == MAX_MESSAGE_SIZE + 11));
        assert!(line.capacity() <= MAX_MESSAGE_SIZE + 4096);

        let second = read_line_bounded(&mut reader, &mut line).await.unwrap();
        assert!(matches!(second, Line::Complete));
        assert_eq!(line, format!("{ping}\n").into_bytes());

        let third = read_line_bounded(&mut reader, &mut line).await.unwrap();
        assert!(matches!(third, Line::Eof));

        let responses = exchange(&input).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 5);
    }

    #[tokio::test]
    async fn line_at_the_limit_is_accepted() {
        let ping = r#"{"jsonrpc":"2.0","id":6,"method":"ping"}"#;
        let padded = format!("{ping}{}\n", " ".repeat(MAX_MESSAGE_SIZE - ping.len() - 1));
        assert_eq!(padded.len(), MAX_MESSAGE_SIZE);

        let responses = exchange(&padded).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 6);
    }

    #[tokio::test]
    async fn last_line_without_newline_is_served() {
        let responses = exchange(r#"{"jsonrpc":"2.0","id":8,"method":"ping"}"#).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 8);
    }

    #[tokio::test]
    async fn call_without_params_is_invalid_params() {
        let response = server()
            .handle(JsonRpcRequest {
                jsonrpc: "2.0".into(),
                id: Some(RequestId::from(9)),
                method: "tools/call".into(),
                params: None,
            })
            .await
            .unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.code, codes::INVALID_PARAMS);
        assert!(error.message.contains("missing params"));
    }
}
