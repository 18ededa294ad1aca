//! Tool-related types.

use super::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// A catalog entry as advertised by the tool server, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTool {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

/// A content item of a remote tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RemoteContent {
    Text {
        text: String,
    },
    /// Images, audio, resources and anything newer.
    #[serde(other)]
    Other,
}

impl RemoteContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Other => None,
        }
    }
}

/// What the tool server returned for a `call_tool`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteToolResult {
    #[serde(default)]
    pub content: Vec<RemoteContent>,
    #[serde(default)]
    pub is_error: bool,
}

impl RemoteToolResult {
    /// A successful result with a single text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![RemoteContent::text(text)],
            is_error: false,
        }
    }

    /// The first text item, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(RemoteContent::as_text)
    }
}

/// Parsed tool-call arguments: always a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(pub Map<String, Value>);

impl TryFrom<Value> for ToolArguments {
    type Error = ToolError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(ToolError::InvalidInput(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}

impl FromStr for ToolArguments {
    type Err = ToolError;

    /// Parse the argument string a model emitted. Blank means no arguments.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(s)
            .map_err(|e| ToolError::InvalidInput(format!("malformed JSON: {e}")))?;
        Self::try_from(value)
    }
}

/// Outcome of a single tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolOutcome {
    Ok { text: String },
    Error { text: String },
}

impl ToolOutcome {
    pub fn ok(text: impl Into<String>) -> Self {
        Self::Ok { text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error { text: text.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Ok { text } | Self::Error { text } => text,
        }
    }

    /// Content for the `tool` message answering this call: the result text
    /// encoded as a JSON string.
    pub fn to_message_content(&self) -> String {
        let text = match self {
            Self::Ok { text } => text.clone(),
            Self::Error { text } => format!("Error: {text}"),
        };
        Value::String(text).to_string()
    }
}

impl From<ToolError> for ToolOutcome {
    fn from(error: ToolError) -> Self {
        Self::error(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_and_null_arguments_are_empty() {
        assert_eq!("".parse::<ToolArguments>().unwrap(), ToolArguments::default());
        assert_eq!("  ".parse::<ToolArguments>().unwrap(), ToolArguments::default());
        assert_eq!("null".parse::<ToolArguments>().unwrap(), ToolArguments::default());
    }

    #[test]
    fn object_arguments_parse() {
        let args: ToolArguments = r#"{"query": "remote work"}"#.parse().unwrap();
        assert_eq!(args.0.get("query"), Some(&json!("remote work")));
    }

    #[test]
    fn malformed_arguments_are_invalid_input() {
        let err = "{not json".parse::<ToolArguments>().unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(msg) if msg.contains("malformed JSON")));

        let err = "[1, 2]".parse::<ToolArguments>().unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(msg) if msg.contains("expected a JSON object")));
    }

    #[test]
    fn remote_result_decodes_mcp_shape() {
        let result: RemoteToolResult = serde_json::from_value(json!({
            "content": [
                {"type": "image", "data": "aGk=", "mimeType": "image/png"},
                {"type": "text", "text": "first", "annotations": {"priority": 1.0}},
                {"type": "text", "text": "second"}
            ]
        }))
        .unwrap();
        assert!(!result.is_error);
        assert_eq!(result.content.len(), 3);
        assert_eq!(result.first_text(), Some("first"));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(ToolOutcome::ok("fine")).unwrap();
        assert_eq!(value, json!({"status": "ok", "text": "fine"}));
        let value = serde_json::to_value(ToolOutcome::error("boom")).unwrap();
        assert_eq!(value, json!({"status": "error", "text": "boom"}));
    }

    #[test]
    fn message_content_round_trips_special_characters() {
        let original = "He said \"hi\"\nand left\t\\ done";
        let content = ToolOutcome::ok(original).to_message_content();
        assert!(content.starts_with('"'));
        let decoded: String = serde_json::from_str(&content).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn error_content_is_prefixed() {
        let content = ToolOutcome::from(ToolError::NotFound("nope".into())).to_message_content();
        let decoded: String = serde_json::from_str(&content).unwrap();
        assert_eq!(decoded, "Error: tool not found: nope");
    }
}
