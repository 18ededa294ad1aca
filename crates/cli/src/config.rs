//! Configuration loading from tether.toml.

use runtime::Endpoint;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Completion backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Tool server configuration.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Completion backend configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Model to use. Defaults to the runtime's default model.
    pub model: Option<String>,

    /// API key for the chat-completions endpoint.
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL.
    pub base_url: Option<String>,
}

/// Tool server configuration.
///
/// Set either `url` (streamable HTTP) or `command` (child process on stdio).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub url: Option<String>,

    pub command: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Limit for connecting and completing the MCP handshake.
    pub handshake_timeout_secs: Option<u64>,
}

impl ServerConfig {
    /// The configured endpoint, if any.
    pub fn endpoint(&self) -> Result<Option<Endpoint>, ConfigError> {
        match (&self.url, &self.command) {
            (Some(url), None) => Ok(Some(Endpoint::http(url.as_str()))),
            (None, Some(command)) => Ok(Some(Endpoint::process(command.as_str(), &self.args))),
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousServer),
            (None, None) => Ok(None),
        }
    }
}

/// Values given on the command line. They win over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<Endpoint>,
}

/// Tool server used when neither the file nor the command line names one.
pub fn default_endpoint() -> Endpoint {
    Endpoint::process("tether-kb", Vec::<String>::new())
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Merge the file with command-line overrides into a runtime config.
    pub fn resolve(&self, overrides: Overrides) -> Result<runtime::Config, ConfigError> {
        let api_key = overrides
            .api_key
            .or_else(|| self.backend.api_key.clone())
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingAuth)?;

        let endpoint = match overrides.endpoint {
            Some(endpoint) => endpoint,
            None => self.server.endpoint()?.unwrap_or_else(default_endpoint),
        };

        let mut config = runtime::Config::new(api_key, endpoint);
        if let Some(model) = overrides.model.or_else(|| self.backend.model.clone()) {
            config = config.with_model(model);
        }
        if let Some(base_url) = &self.backend.base_url {
            config = config.with_base_url(base_url.as_str());
        }
        if let Some(secs) = self.server.handshake_timeout_secs {
            config = config.with_handshake_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("API key not configured: set backend.api_key, --api-key or CEREBRAS_API_KEY")]
    MissingAuth,

    #[error("ambiguous tool server: set either server.url OR server.command, not both")]
    AmbiguousServer,
}
