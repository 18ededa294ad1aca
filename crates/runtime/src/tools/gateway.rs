//! Tool execution gateway.

use super::{ToolArguments, ToolError, ToolOutcome, ToolServer};
use crate::model::{ToolCall, ToolSpec};

/// Executes tool calls against a server, restricted to a catalog.
///
/// Every failure (bad arguments, unknown tool, transport trouble, empty
/// result) comes back as [`ToolOutcome::Error`]; nothing here is fatal and
/// nothing is retried.
pub struct Gateway<'a, S> {
    server: &'a S,
    catalog: &'a [ToolSpec],
}

impl<'a, S: ToolServer> Gateway<'a, S> {
    pub fn new(server: &'a S, catalog: &'a [ToolSpec]) -> Self {
        Self { server, catalog }
    }

    /// Parse a model-issued call's arguments and invoke it.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
        match call.arguments.parse::<ToolArguments>() {
            Ok(arguments) => self.invoke(&call.name, arguments).await,
            Err(e) => {
                tracing::warn!(
                    tool = %call.name,
                    id = %call.id,
                    error = %e,
                    "rejected tool arguments"
                );
                e.into()
            }
        }
    }

    /// Invoke a tool by name.
    pub async fn invoke(&self, name: &str, arguments: ToolArguments) -> ToolOutcome {
        match self.execute(name, arguments).await {
            Ok(text) => ToolOutcome::ok(text),
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool call failed");
                e.into()
            }
        }
    }

    async fn execute(&self, name: &str, arguments: ToolArguments) -> Result<String, ToolError> {
        if !self.catalog.iter().any(|spec| spec.name == name) {
            return Err(ToolError::NotFound(name.to_string()));
        }

        let result = self
            .server
            .call_tool(name, arguments.0)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        if result.is_error {
            let message = result
                .content
                .iter()
                .filter_map(|c| c.as_text())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(ToolError::Execution(message));
        }

        result
            .first_text()
            .map(str::to_string)
            .ok_or(ToolError::EmptyResult)
    }
}
