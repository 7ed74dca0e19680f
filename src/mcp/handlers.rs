//! MCP server handlers.
//!
//! This module contains only the MCP server startup logic.

use anyhow::Result;
use tracing::{error, info};

use crate::config::Config;

use super::server::RepoChatServer;
use super::state::ChatState;

/// Run the MCP server over stdio.
///
/// One chat session lives for the lifetime of the connection.
pub async fn run_mcp_server(config: Config) -> Result<()> {
    info!("🔧 Starting RepoChat MCP Tool Server...");
    info!("📝 Stdio mode (using rmcp), model {}", config.model);

    let state = ChatState::from_config(&config)?;
    let server = RepoChatServer::new(state);

    run_server(server).await
}

/// Run the MCP server with the given server instance.
async fn run_server(server: RepoChatServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("✅ MCP tool server started");
    info!("🔗 Ready for MCP client connections");

    let service = server.serve(stdio()).await.map_err(|e| {
        error!("Failed to start MCP service: {:?}", e);
        anyhow::anyhow!("Failed to start MCP service: {:?}", e)
    })?;

    service.waiting().await.map_err(|e| {
        error!("MCP service error: {:?}", e);
        anyhow::anyhow!("MCP service error: {:?}", e)
    })?;

    info!("MCP server shutting down");
    Ok(())
}
