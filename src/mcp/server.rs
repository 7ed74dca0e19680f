//! MCP server implementation.
//!
//! This module contains the RepoChatServer struct and its tool routing.

use rmcp::{
    handler::server::router::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use tracing::debug;

use super::state::SharedChatState;
use super::tools;
use super::types::*;

/// RepoChat MCP Server
#[derive(Clone)]
pub struct RepoChatServer {
    state: SharedChatState,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RepoChatServer {
    pub fn new(state: SharedChatState) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "load_repository",
        description = "Load a public (or token-accessible) GitHub repository by URL, e.g. https://github.com/owner/name. Resolves the default branch and lists every file. Replaces any previously loaded repository, context and conversation."
    )]
    async fn load_repository(
        &self,
        Parameters(args): Parameters<LoadRepositoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        debug!("load_repository: {}", args.url);
        tools::load_repository(&self.state, args).await
    }

    #[tool(
        name = "list_files",
        description = "List the file paths of the loaded repository."
    )]
    async fn list_files(
        &self,
        Parameters(args): Parameters<ListFilesArgs>,
    ) -> Result<CallToolResult, McpError> {
        tools::list_files(&self.state, args).await
    }

    #[tool(
        name = "select_file",
        description = "Use a single file of the loaded repository as the context for questions. Clears the conversation."
    )]
    async fn select_file(
        &self,
        Parameters(args): Parameters<SelectFileArgs>,
    ) -> Result<CallToolResult, McpError> {
        debug!("select_file: {}", args.path);
        tools::select_file(&self.state, args).await
    }

    #[tool(
        name = "load_full_repository",
        description = "Fetch every file of the loaded repository and use the whole codebase as the context for questions. Files that cannot be fetched are marked in place. Clears the conversation."
    )]
    async fn load_full_repository(
        &self,
        Parameters(args): Parameters<LoadFullRepositoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        tools::load_full_repository(&self.state, args).await
    }

    #[tool(
        name = "ask",
        description = "Ask a question about the active context (a single file or the full repository). Returns the model's complete answer."
    )]
    async fn ask(&self, Parameters(args): Parameters<AskArgs>) -> Result<CallToolResult, McpError> {
        tools::ask(&self.state, args).await
    }

    #[tool(
        name = "get_transcript",
        description = "Return the conversation for the active context as JSON."
    )]
    async fn get_transcript(
        &self,
        Parameters(args): Parameters<GetTranscriptArgs>,
    ) -> Result<CallToolResult, McpError> {
        tools::get_transcript(&self.state, args).await
    }

    #[tool(
        name = "clear",
        description = "Forget the repository, context and conversation."
    )]
    async fn clear(&self, Parameters(args): Parameters<ClearArgs>) -> Result<CallToolResult, McpError> {
        tools::clear(&self.state, args).await
    }
}

#[tool_handler]
impl ServerHandler for RepoChatServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "repochat".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "RepoChat answers questions about a GitHub repository's code. Call load_repository, then select_file or load_full_repository, then ask."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::github::{DEFAULT_API_URL, DEFAULT_RAW_URL};
    use crate::llm::{DEFAULT_GEMINI_URL, DEFAULT_MODEL};
    use crate::mcp::state::ChatState;

    fn server() -> RepoChatServer {
        let config = Config {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            github_token: None,
            github_api_url: DEFAULT_API_URL.to_string(),
            raw_content_url: DEFAULT_RAW_URL.to_string(),
            gemini_api_url: DEFAULT_GEMINI_URL.to_string(),
            timeout_secs: None,
        };
        RepoChatServer::new(ChatState::from_config(&config).unwrap())
    }

    #[test]
    fn test_server_info() {
        let info = server().get_info();
        assert_eq!(info.server_info.name, "repochat");
        assert!(info.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn test_tool_starts_with_empty_session() {
        let server = server();
        let result = server
            .get_transcript(Parameters(GetTranscriptArgs {}))
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true));
        assert!(server.state.session.lock().await.transcript().is_empty());
    }
}
