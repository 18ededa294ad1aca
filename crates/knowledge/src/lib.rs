//! Company knowledge base exposed as an MCP tool.
//!
//! The document is a JSON file, normally a list of `{question, answer}`
//! objects. It is re-read on every call so edits show up without a restart.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use mcp::{CallToolResult, Tool, ToolHandler};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Name the tool is advertised under.
pub const TOOL_NAME: &str = "get_knowledge_base";

/// Where `tether-kb` looks for the document unless told otherwise: the
/// sample shipped next to this crate, independent of the working directory.
pub const DEFAULT_DATA_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/data/company_policies.json");

const HEADER: &str = "Here is the retrieved knowledge base:\n \n";

#[derive(Debug, Error)]
enum LookupError {
    #[error("Knowledge base file not found")]
    NotFound,

    #[error("Error parsing knowledge base file")]
    Parse(#[source] serde_json::Error),

    #[error("Error retrieving knowledge base: {0}")]
    Read(io::Error),
}

/// A knowledge document on disk.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    path: PathBuf,
}

impl KnowledgeBase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document and render it for the model.
    ///
    /// Never fails: problems with the file are reported as the returned text.
    pub async fn lookup(&self) -> String {
        match self.load().await {
            Ok(document) => render(&document),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "knowledge lookup failed"
                );
                e.to_string()
            }
        }
    }

    async fn load(&self) -> Result<Value, LookupError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => LookupError::NotFound,
                _ => LookupError::Read(e),
            })?;
        serde_json::from_str(&raw).map_err(LookupError::Parse)
    }
}

/// Format a parsed document as numbered question/answer pairs.
pub fn render(document: &Value) -> String {
    let mut text = String::from(HEADER);
    match document {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let n = i + 1;
                let (question, answer) = match item {
                    Value::Object(entry) => (
                        field(entry, "question", "Unknown Question"),
                        field(entry, "answer", "Unknown Answer"),
                    ),
                    other => (format!("Item {n}"), plain(other)),
                };
                let _ = write!(text, "Q{n}: {question}\nA{n}: {answer}\n\n");
            }
        }
        other => {
            let pretty =
                serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string());
            let _ = write!(text, "knowledge base content {pretty}\n\n");
        }
    }
    text
}

fn field(entry: &Map<String, Value>, key: &str, default: &str) -> String {
    entry
        .get(key)
        .map(plain)
        .unwrap_or_else(|| default.to_string())
}

// Strings render bare; anything else in the Python literal style the
// documents are usually written against (`True`, `None`, `[1, 'a']`).
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => literal(other),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quoted(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{}: {}", quoted(key), literal(value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

fn quoted(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

impl ToolHandler for KnowledgeBase {
    fn tools(&self) -> Vec<Tool> {
        vec![Tool {
            name: TOOL_NAME.to_string(),
            description: Some("Get the knowledge base".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The question being answered"
                    }
                }
            }),
        }]
    }

    async fn call(&self, name: &str, arguments: Option<Value>) -> mcp::Result<CallToolResult> {
        if name != TOOL_NAME {
            return Err(mcp::Error::ToolNotFound(name.to_string()));
        }

        let query = match &arguments {
            None | Some(Value::Null) => None,
            Some(Value::Object(args)) => match args.get("query") {
                None | Some(Value::Null) => None,
                Some(Value::String(query)) => Some(query.as_str()),
                Some(_) => {
                    return Err(mcp::Error::InvalidParams("query must be a string".into()));
                }
            },
            Some(_) => {
                return Err(mcp::Error::InvalidParams(
                    "arguments must be an object".into(),
                ));
            }
        };

        // The whole document is returned; the query is only logged.
        tracing::info!(tool = TOOL_NAME, query, "knowledge lookup");
        Ok(CallToolResult::text(self.lookup().await))
    }
}
