//! Transcription API client with provider-specific implementations.
//!
//! Routes in-memory WAV audio to the appropriate provider endpoint based on
//! the configured model. The caller doesn't need to know which provider is
//! being used.

mod groq;
mod openai;

use super::model::{TranscriptionModel, TranscriptionProvider};

/// Transcribes in-memory WAV audio using the given model.
///
/// # Errors
/// - If the API request fails due to network issues (connection, timeout)
/// - If the API returns an HTTP error (401 for invalid key, 429 for rate limit, etc.)
/// - If the API response cannot be parsed
pub async fn transcribe(
    model: TranscriptionModel,
    api_key: &str,
    wav_bytes: Vec<u8>,
) -> anyhow::Result<String> {
    tracing::debug!(
        "Transcribing {} bytes with {} ({})",
        wav_bytes.len(),
        model.provider().name(),
        model.id()
    );

    let text = match model.provider() {
        TranscriptionProvider::OpenAI => openai::transcribe(model, api_key, wav_bytes).await,
        TranscriptionProvider::Groq => groq::transcribe(model, api_key, wav_bytes).await,
    }?;

    Ok(text.trim().to_string())
}
