//! Question and transcript tools.

use rmcp::{model::*, ErrorData as McpError};

use super::common::{effects_result, tool_error};
use crate::mcp::state::ChatState;
use crate::mcp::types::{AskArgs, ClearArgs, GetTranscriptArgs};

/// Ask a question about the active context and return the full answer
pub async fn ask(state: &ChatState, args: AskArgs) -> Result<CallToolResult, McpError> {
    let mut session = state.session.lock().await;

    let mut answer = String::new();
    let outcome = state
        .assistant
        .ask(session.clone(), &args.question, |text| {
            answer = text.to_string();
        })
        .await;
    *session = outcome.session;

    if !outcome.effects.is_empty() {
        return Ok(effects_result(&outcome.effects));
    }
    Ok(CallToolResult::success(vec![Content::text(answer)]))
}

/// Return the transcript as JSON
pub async fn get_transcript(
    state: &ChatState,
    _args: GetTranscriptArgs,
) -> Result<CallToolResult, McpError> {
    let session = state.session.lock().await;
    if session.transcript().is_empty() {
        return Ok(CallToolResult::success(vec![Content::text("[]")]));
    }

    match serde_json::to_string_pretty(session.transcript().messages()) {
        Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
        Err(e) => Ok(tool_error(format!("Error: could not serialize transcript: {}", e))),
    }
}

/// Reset the session
pub async fn clear(state: &ChatState, _args: ClearArgs) -> Result<CallToolResult, McpError> {
    let mut session = state.session.lock().await;
    let outcome = state.assistant.clear(session.clone());
    *session = outcome.session;

    Ok(effects_result(&outcome.effects))
}
