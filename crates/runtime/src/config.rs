//! Session configuration.
//!
//! Everything the runtime needs is passed in explicitly; nothing here reads
//! the process environment.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Default completion model.
pub const DEFAULT_MODEL: &str = "llama-4-scout-17b-16e-instruct";

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.cerebras.ai/v1";

/// Default limit for connecting and completing the MCP handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the tool server lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    /// Streamable-HTTP MCP server.
    Http { url: String },
    /// Child process speaking MCP on stdio.
    Process {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl Endpoint {
    pub fn http(url: impl Into<String>) -> Self {
        Self::Http { url: url.into() }
    }

    pub fn process(
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::Process {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { url } => write!(f, "{url}"),
            Self::Process { command, args } if args.is_empty() => write!(f, "{command}"),
            Self::Process { command, args } => write!(f, "{command} {}", args.join(" ")),
        }
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    /// `http://` and `https://` give an HTTP endpoint; anything else is a
    /// whitespace-separated command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(Self::http(s));
        }

        let mut parts = s.split_whitespace();
        let command = parts
            .next()
            .ok_or_else(|| Error::Config("empty tool server endpoint".into()))?;
        Ok(Self::process(command, parts))
    }
}

/// Explicit runtime configuration.
#[derive(Clone)]
pub struct Config {
    /// Credential for the completion backend.
    pub api_key: String,
    pub endpoint: Endpoint,
    pub model_id: String,
    pub base_url: String,
    pub handshake_timeout: Duration,
}

impl Config {
    /// Create a configuration with default model, base URL and timeout.
    pub fn new(api_key: impl Into<String>, endpoint: Endpoint) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint,
            model_id: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

// Keep the credential out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model_id", &self.model_id)
            .field("base_url", &self.base_url)
            .field("handshake_timeout", &self.handshake_timeout)
            .finish()
    }
}
