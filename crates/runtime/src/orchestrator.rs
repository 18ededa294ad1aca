//! The tool-augmented query loop.
//!
//! A query runs through a fixed sequence:
//!
//! 1. build the conversation (system preamble + user query) and fetch the
//!    live catalog;
//! 2. ask the model, offering the catalog with parallel tool calls disabled;
//! 3. if the model answered directly, return that answer;
//! 4. otherwise run every requested tool call in listed order and append one
//!    `tool` message per call;
//! 5. ask the model once more, without tools, and return its answer.
//!
//! Exactly one round of tool use happens per query.

use std::collections::HashSet;

use crate::config::Config;
use crate::conversation::Conversation;
use crate::mcp::McpClient;
use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, ToolCall, ToolSpec,
};
use crate::providers::ChatCompletionsBackend;
use crate::session::Session;
use crate::tools::{self, Gateway, ToolServer};
use crate::{Error, Result};

/// Default system preamble.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant with access to tools. \
Use the available tools when needed to answer questions.";

/// Runs queries against one session.
pub struct Orchestrator<S, B> {
    session: Session<S, B>,
    system_prompt: String,
}

impl Orchestrator<McpClient, ChatCompletionsBackend> {
    /// Open a session for `config` and wrap it.
    pub async fn connect(config: &Config) -> Result<Self> {
        Ok(Self::new(Session::open(config).await?))
    }
}

impl<S: ToolServer, B: Backend> Orchestrator<S, B> {
    pub fn new(session: Session<S, B>) -> Self {
        Self {
            session,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the system preamble.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn session(&self) -> &Session<S, B> {
        &self.session
    }

    /// Answer a query, using at most one round of tool calls.
    pub async fn process_query(&self, query: &str) -> Result<String> {
        let server = self.session.server()?;

        let mut conversation = Conversation::new(&self.system_prompt, query);
        let catalog = tools::list_tools(server).await?;

        let response = self.complete(&conversation, Some(catalog.as_slice())).await?;
        let message = response.message;

        if !message.has_tool_calls() {
            tracing::debug!("model answered without tools");
            return content_of(message);
        }

        let calls = message.tool_calls.clone();
        check_call_ids(&calls)?;
        conversation.append(message)?;
        self.dispatch_tools(server, &catalog, &calls, &mut conversation)
            .await?;

        let pending = conversation.unanswered();
        if !pending.is_empty() {
            return Err(Error::InvalidState(format!(
                "unanswered tool calls: {}",
                pending.join(", ")
            )));
        }

        let final_response = self.complete(&conversation, None).await?;
        content_of(final_response.message)
    }

    /// Run every call sequentially, in the order the model listed them.
    async fn dispatch_tools(
        &self,
        server: &S,
        catalog: &[ToolSpec],
        calls: &[ToolCall],
        conversation: &mut Conversation,
    ) -> Result<()> {
        let gateway = Gateway::new(server, catalog);

        for call in calls {
            tracing::info!(
                tool = %call.name,
                id = %call.id,
                arguments = %call.arguments,
                "executing tool"
            );
            let outcome = gateway.dispatch(call).await;
            tracing::info!(
                tool = %call.name,
                id = %call.id,
                error = outcome.is_error(),
                "tool finished"
            );

            conversation.append(Message::tool(&call.id, outcome.to_message_content()))?;
        }
        Ok(())
    }

    async fn complete(
        &self,
        conversation: &Conversation,
        tools: Option<&[ToolSpec]>,
    ) -> Result<ModelResponse> {
        let request = ModelRequest {
            model: self.session.model(),
            messages: conversation.messages(),
            tools,
            parallel_tool_calls: false,
        };
        Ok(self.session.backend().call(request).await?)
    }

    /// Close the session. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        self.session.close().await
    }

    /// Run `f` with this orchestrator and close the session afterwards,
    /// whether `f` succeeded or not.
    ///
    /// An error from `f` takes precedence over an error from closing.
    pub async fn scoped<R, F>(mut self, f: F) -> Result<R>
    where
        F: AsyncFnOnce(&Self) -> Result<R>,
    {
        let outcome = f(&self).await;
        let closed = self.close().await;

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "failed to close session after error");
                }
                Err(e)
            }
            (Ok(_), Err(close_err)) => Err(close_err),
        }
    }
}

/// Every call must carry a distinct, non-empty id so each result can be
/// matched to it. Checked before any tool runs.
fn check_call_ids(calls: &[ToolCall]) -> Result<()> {
    let mut seen = HashSet::new();
    for call in calls {
        if call.id.is_empty() {
            return Err(ModelError::InvalidResponse(format!(
                "tool call to {} has no id",
                call.name
            ))
            .into());
        }
        if !seen.insert(call.id.as_str()) {
            return Err(ModelError::InvalidResponse(format!(
                "duplicate tool call id {}",
                call.id
            ))
            .into());
        }
    }
    Ok(())
}

fn content_of(message: Message) -> Result<String> {
    message.content.ok_or_else(|| {
        ModelError::InvalidResponse("completion carried neither content nor tool calls".into())
            .into()
    })
}
