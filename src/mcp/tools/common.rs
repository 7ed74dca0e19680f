//! Common utilities for MCP tools.

use rmcp::model::{CallToolResult, Content};

use crate::assistant::Effect;

/// Error result for tool failures
pub fn tool_error(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Render handler effects as one tool result.
///
/// Any error effect makes the whole result an error; warnings alone do too,
/// since they mean the action was refused.
pub fn effects_result(effects: &[Effect]) -> CallToolResult {
    let text = effects
        .iter()
        .map(Effect::message)
        .collect::<Vec<_>>()
        .join("\n");

    let refused = effects
        .iter()
        .all(|e| matches!(e, Effect::Warning(_) | Effect::Error(_)));

    if effects.iter().any(Effect::is_error) || (!effects.is_empty() && refused) {
        tool_error(text)
    } else {
        CallToolResult::success(vec![Content::text(text)])
    }
}
