//! State shared by every MCP tool call.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::config::{Config, RepoAssistant};
use crate::session::Session;

/// One chat session served over MCP.
///
/// Tool calls are serialized on the session lock, so each action sees the
/// session the previous one produced.
pub struct ChatState {
    pub assistant: RepoAssistant,
    pub session: Mutex<Session>,
    /// Token used when a load_repository call does not pass one
    pub github_token: Option<String>,
}

pub type SharedChatState = Arc<ChatState>;

impl ChatState {
    pub fn from_config(config: &Config) -> Result<SharedChatState> {
        Ok(Arc::new(Self {
            assistant: config.build_assistant()?,
            session: Mutex::new(Session::new()),
            github_token: config.github_token.clone(),
        }))
    }
}
