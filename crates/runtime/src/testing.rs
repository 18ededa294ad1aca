//! In-crate fakes for the tool server and the completion backend.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value, json};

use crate::mcp::McpError;
use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, ToolCall, ToolSpec, Usage,
};
use crate::tools::{RemoteTool, RemoteToolResult, ToolServer};

/// A catalog entry with an empty object schema.
pub fn remote(name: &str) -> RemoteTool {
    RemoteTool {
        name: name.into(),
        description: Some(format!("{name} tool")),
        input_schema: json!({"type": "object", "properties": {}}),
    }
}

/// A backend tool spec for `name`.
pub fn spec(name: &str) -> ToolSpec {
    ToolSpec {
        name: name.into(),
        description: String::new(),
        parameters: json!({"type": "object"}),
        strict: true,
    }
}

/// Lifecycle counters that outlive the server they observe.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    lists: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    drops: Arc<AtomicUsize>,
}

impl Probe {
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }
}

enum Reply {
    Result(RemoteToolResult),
    Fail(String),
}

/// Tool server that answers from fixed replies and records every call.
#[derive(Default)]
pub struct FakeServer {
    catalog: Mutex<Vec<RemoteTool>>,
    list_error: Option<String>,
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
    probe: Probe,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(self, tool: RemoteTool) -> Self {
        self.catalog.lock().unwrap().push(tool);
        self
    }

    pub fn with_result(mut self, name: &str, result: RemoteToolResult) -> Self {
        self.replies.insert(name.into(), Reply::Result(result));
        self
    }

    pub fn failing_call(mut self, name: &str, message: &str) -> Self {
        self.replies.insert(name.into(), Reply::Fail(message.into()));
        self
    }

    pub fn failing_list(mut self, message: &str) -> Self {
        self.list_error = Some(message.into());
        self
    }

    pub fn replace_catalog(&self, tools: Vec<RemoteTool>) {
        *self.catalog.lock().unwrap() = tools;
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.probe.lists.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ToolServer for FakeServer {
    async fn list_tools(&self) -> Result<Vec<RemoteTool>, McpError> {
        self.probe.lists.fetch_add(1, Ordering::SeqCst);
        match &self.list_error {
            Some(message) => Err(McpError::Protocol(message.clone())),
            None => Ok(self.catalog.lock().unwrap().clone()),
        }
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<RemoteToolResult, McpError> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));
        match self.replies.get(name) {
            Some(Reply::Result(result)) => Ok(result.clone()),
            Some(Reply::Fail(message)) => Err(McpError::Protocol(message.clone())),
            None => Err(McpError::Protocol(format!("no reply scripted for {name}"))),
        }
    }

    async fn close(self) -> Result<(), McpError> {
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.probe.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// An owned copy of a request the backend received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolSpec>>,
    pub parallel_tool_calls: bool,
}

/// Backend that replays scripted responses in order and records requests.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<Message, ModelError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, message: Message) -> Self {
        self.script.lock().unwrap().push_back(Ok(message));
        self
    }

    /// Queue a plain-text answer.
    pub fn answer(self, text: &str) -> Self {
        self.respond(Message::assistant(text))
    }

    /// Queue a turn that requests tools.
    pub fn tool_calls(self, calls: Vec<ToolCall>) -> Self {
        self.respond(Message::assistant_tool_calls(None, calls))
    }

    pub fn fail(self, error: ModelError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Backend for ScriptedBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            model: request.model.to_string(),
            messages: request.messages.to_vec(),
            tools: request.tools.map(<[ToolSpec]>::to_vec),
            parallel_tool_calls: request.parallel_tool_calls,
        });

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::InvalidResponse("script exhausted".into())));

        next.map(|message| ModelResponse {
            message,
            usage: Usage::default(),
        })
    }
}
