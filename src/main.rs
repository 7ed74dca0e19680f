use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

mod assistant;
mod cli;
mod command;
mod config;
mod context;
mod conversation;
mod github;
mod http;
mod llm;
mod mcp;
mod session;

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing, so clap's env fallbacks see .env values
    let dotenv = config::load_dotenv();
    let cli = Cli::parse();

    // Initialize logging. RUST_LOG wins; the terminal front ends stay quiet
    // unless asked, the MCP server logs to stderr at info.
    let default_level = match (cli.verbose, cli.mcp) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    config::report_dotenv(&dotenv);

    let config = Config::from_cli(&cli);
    tracing::debug!("{:?}", config);
    if !config.has_api_key() {
        warn!("GEMINI_API_KEY is not set; questions will be refused until it is configured");
    }

    // If --mcp flag is set, run as MCP server
    if cli.mcp {
        return mcp::run_mcp_server(config).await;
    }

    match cli.command {
        Some(Commands::Files { url }) => command::run_files(config, &url).await,
        Some(Commands::Ask {
            url,
            file,
            question,
        }) => command::run_ask(config, &url, file.as_deref(), &question.join(" ")).await,
        Some(Commands::Chat) | None => command::run_chat(config).await,
    }
}
