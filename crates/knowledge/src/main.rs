use std::path::PathBuf;

use clap::Parser;
use knowledge::{DEFAULT_DATA_PATH, KnowledgeBase};
use mcp::{Server, ServerInfo};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tether-kb")]
#[command(about = "Serve the company knowledge base as an MCP tool over stdio", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the knowledge base JSON document
    #[arg(long, env = "TETHER_KB_DATA", default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,
}

#[tokio::main]
async fn main() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!(data = %cli.data.display(), "starting knowledge server");

    let server = Server::new(
        ServerInfo::new("knowledge_base", env!("CARGO_PKG_VERSION")),
        KnowledgeBase::new(cli.data),
    );

    if let Err(e) = server.serve_stdio().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
