//! Gemini streaming generation client.

use reqwest::Client;
use tracing::{debug, error};
use url::Url;

use super::types::{ApiErrorEnvelope, Content, GenerateContentRequest, GenerationError};
use super::{fragment_stream, FragmentStream, GenerationRequest, TextGenerator};
use crate::http::{build_client, error_body};

/// Default Gemini API base
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Client for the Gemini `streamGenerateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: Url,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a new client.
    ///
    /// A missing key is not an error here; calls fail with
    /// [`GenerationError::MissingApiKey`] instead.
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| anyhow::anyhow!("Invalid generation API URL {}: {}", base_url, e))?;

        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url,
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn stream_url(&self) -> Result<Url, GenerationError> {
        let mut url = self
            .base_url
            .join(&format!("models/{}:streamGenerateContent", self.model))
            .map_err(|e| GenerationError::Decode(format!("invalid model endpoint: {}", e)))?;
        url.query_pairs_mut().append_pair("alt", "sse");
        Ok(url)
    }
}

impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn stream_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<FragmentStream, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let url = self.stream_url()?;

        let body = GenerateContentRequest {
            system_instruction: Content::text(None, &request.system_instruction),
            contents: vec![Content::text(Some("user"), &request.prompt)],
        };

        debug!("=== Generation Request ===");
        debug!("URL: {}", url);
        debug!(
            "System instruction: {} bytes, prompt: {} bytes",
            request.system_instruction.len(),
            request.prompt.len()
        );

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!("Status: {}", status);

        if !status.is_success() {
            let text = error_body(response).await;
            let err = match serde_json::from_str::<ApiErrorEnvelope>(&text) {
                Ok(envelope) => GenerationError::Status {
                    status: status.as_u16(),
                    message: envelope
                        .error
                        .message
                        .unwrap_or_else(|| "Unknown error".to_string()),
                },
                Err(_) => GenerationError::Status {
                    status: status.as_u16(),
                    message: text,
                },
            };
            error!("Generation request failed: {}", err);
            return Err(err);
        }

        Ok(fragment_stream(response.bytes_stream()))
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
