mod config;
mod error;

use std::path::{Path, PathBuf};

use clap::Parser;
use runtime::{Endpoint, Orchestrator};
use tracing_subscriber::EnvFilter;

use config::{Config, Overrides};
use error::Result;

const CONFIG_FILE: &str = "tether.toml";
const DEFAULT_QUERY: &str = "What is the company policy on remote work?";

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Answer a question with an LLM and the tools of an MCP server", long_about = None)]
#[command(version)]
struct Cli {
    /// The question to answer
    #[arg(default_value = DEFAULT_QUERY)]
    query: String,

    /// Config file (defaults to ./tether.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tool server: an http(s) URL or a command line to spawn
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Model ID
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the chat-completions endpoint
    #[arg(long, env = "CEREBRAS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let file = load_config(cli.config.as_deref())?;
    let endpoint = cli
        .endpoint
        .as_deref()
        .map(str::parse::<Endpoint>)
        .transpose()?;

    let config = file.resolve(Overrides {
        api_key: cli.api_key,
        model: cli.model,
        endpoint,
    })?;
    tracing::debug!(?config, "resolved configuration");

    let query = cli.query;
    let response = Orchestrator::connect(&config)
        .await?
        .scoped(async |orchestrator| {
            println!("Available tools:");
            for tool in orchestrator.session().announced_tools() {
                println!("- {}: {}", tool.name, tool.description);
            }
            println!();

            orchestrator.process_query(&query).await
        })
        .await?;

    println!("Response: {response}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None if Path::new(CONFIG_FILE).exists() => Ok(Config::load(CONFIG_FILE)?),
        None => Ok(Config::default()),
    }
}
