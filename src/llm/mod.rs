//! Hosted text-generation client.
//!
//! Answers stream back as a [`FragmentStream`]: a lazy, finite sequence of
//! text fragments. It cannot be restarted; once it yields `None` (or an
//! error) the answer is over.

mod gemini;
mod types;

use std::fmt::Display;
use std::future::Future;

use eventsource_stream::Eventsource;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use tracing::debug;

pub use gemini::{GeminiClient, DEFAULT_GEMINI_URL, DEFAULT_MODEL};
pub use types::GenerationError;

use types::GenerateContentChunk;

/// Incremental answer text
pub type FragmentStream = BoxStream<'static, Result<String, GenerationError>>;

/// One generation call: a system instruction plus the user's question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
}

/// A hosted model that can stream an answer.
pub trait TextGenerator {
    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Whether the credential needed to call the API is present.
    fn is_configured(&self) -> bool;

    /// Start a streaming generation.
    fn stream_generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<FragmentStream, GenerationError>> + Send;
}

/// Turn a raw SSE byte stream into a stream of answer fragments.
///
/// Events with empty data and chunks without text parts are skipped. The
/// first error ends the stream.
pub fn fragment_stream<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let events = body.eventsource().boxed();

    stream::unfold(Some(events), |state| async move {
        let mut events = state?;
        loop {
            match events.next().await {
                Some(Ok(event)) => {
                    if event.data.trim().is_empty() {
                        continue;
                    }
                    match parse_event(&event.data) {
                        Ok(Some(text)) => return Some((Ok(text), Some(events))),
                        Ok(None) => continue,
                        Err(e) => return Some((Err(e), None)),
                    }
                }
                Some(Err(e)) => {
                    return Some((Err(GenerationError::Stream(e.to_string())), None));
                }
                None => return None,
            }
        }
    })
    .boxed()
}

/// Parse one SSE data payload into answer text.
fn parse_event(payload: &str) -> Result<Option<String>, GenerationError> {
    let chunk: GenerateContentChunk = serde_json::from_str(payload)
        .map_err(|e| GenerationError::Decode(format!("{}: {}", e, payload)))?;

    if let Some(detail) = chunk.error {
        return Err(GenerationError::from_detail(detail));
    }

    if let Some(reason) = chunk
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
    {
        debug!("Candidate finished: {}", reason);
    }

    if let Some(text) = chunk.text() {
        return Ok(Some(text));
    }

    if chunk.candidates.is_empty() {
        if let Some(reason) = chunk.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GenerationError::Blocked(reason));
        }
    }

    debug!("Skipping chunk without text parts");
    Ok(None)
}
