//! Repository loading tools.

use rmcp::{model::*, ErrorData as McpError};
use tracing::info;

use super::common::{effects_result, tool_error};
use crate::mcp::state::ChatState;
use crate::mcp::types::{LoadFullRepositoryArgs, ListFilesArgs, LoadRepositoryArgs, SelectFileArgs};
use crate::session::Readiness;

/// Load a repository's file list
pub async fn load_repository(
    state: &ChatState,
    args: LoadRepositoryArgs,
) -> Result<CallToolResult, McpError> {
    let token = args
        .github_token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| state.github_token.clone());

    let mut session = state.session.lock().await;
    let outcome = state
        .assistant
        .load_repository(session.clone(), &args.url, token.as_deref())
        .await;
    *session = outcome.session;

    Ok(effects_result(&outcome.effects))
}

/// List the loaded repository's files
pub async fn list_files(state: &ChatState, _args: ListFilesArgs) -> Result<CallToolResult, McpError> {
    let session = state.session.lock().await;
    let Some(repo) = session.repository() else {
        return Ok(tool_error(Readiness::NoRepository.hint()));
    };

    let mut text = format!(
        "{} @ {} ({} files)\n",
        repo,
        session.branch().unwrap_or_default(),
        session.files().len()
    );
    for entry in session.files() {
        text.push('\n');
        text.push_str(&entry.path);
    }

    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Use one file as the question context
pub async fn select_file(
    state: &ChatState,
    args: SelectFileArgs,
) -> Result<CallToolResult, McpError> {
    let mut session = state.session.lock().await;
    let outcome = state
        .assistant
        .select_file(session.clone(), args.path.trim())
        .await;
    *session = outcome.session;

    Ok(effects_result(&outcome.effects))
}

/// Use the whole repository as the question context
pub async fn load_full_repository(
    state: &ChatState,
    _args: LoadFullRepositoryArgs,
) -> Result<CallToolResult, McpError> {
    let mut session = state.session.lock().await;
    info!("Loading full repository over MCP");
    let outcome = state
        .assistant
        .load_full_repository(session.clone())
        .await;
    *session = outcome.session;

    Ok(effects_result(&outcome.effects))
}
