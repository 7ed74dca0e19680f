//! Generation API request and response types.
//!
//! These follow the Gemini `generateContent` JSON shapes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A text part of a content block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Content block (system instruction, user turn or model output)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(ToOwned::to_owned),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

/// Streaming generation request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
}

/// Candidate completion in a streamed chunk
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Prompt feedback, present when the prompt itself was blocked
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Error object the API embeds in failed responses and stream events
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Envelope for an error response body
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorEnvelope {
    pub error: ApiErrorDetail,
}

/// One streamed chunk
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentChunk {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

impl GenerateContentChunk {
    /// Concatenated text of the first candidate, if it has any parts.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        if content.parts.is_empty() {
            return None;
        }
        Some(
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect(),
        )
    }
}

/// Failure generating an answer.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No API key configured. Set GEMINI_API_KEY in the environment or .env file")]
    MissingApiKey,

    #[error("request to the generation API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{} (HTTP {status})", status_hint(.status, .message))]
    Status { status: u16, message: String },

    #[error("generation API error {status}: {message}")]
    Api { status: String, message: String },

    #[error("response was blocked: {0}")]
    Blocked(String),

    #[error("malformed response from the generation API: {0}")]
    Decode(String),

    #[error("response stream interrupted: {0}")]
    Stream(String),
}

impl GenerationError {
    pub(super) fn from_detail(detail: ApiErrorDetail) -> Self {
        let message = detail.message.unwrap_or_else(|| "Unknown error".to_string());
        match (detail.status, detail.code) {
            (Some(status), _) => GenerationError::Api { status, message },
            (None, Some(code)) => GenerationError::Status {
                status: code,
                message,
            },
            (None, None) => GenerationError::Api {
                status: "UNKNOWN".to_string(),
                message,
            },
        }
    }
}

fn status_hint(status: &u16, message: &str) -> String {
    match *status {
        401 | 403 => format!("Invalid API key or permission denied: {}", message),
        429 => format!("Quota exceeded or rate limited: {}", message),
        500..=599 => format!("Generation service unavailable: {}", message),
        _ => message.to_string(),
    }
}
