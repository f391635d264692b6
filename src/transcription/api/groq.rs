//! Groq transcription API implementation.
//!
//! Groq hosts Whisper-family models behind an OpenAI-compatible audio
//! transcription endpoint.

use serde::Deserialize;

use crate::transcription::model::TranscriptionModel;

/// Whisper-style response: `{"text": "..."}`
#[derive(Debug, Deserialize)]
struct GroqResponse {
    text: String,
}

/// Transcribes in-memory WAV audio using Groq's transcription API.
pub async fn transcribe(
    model: TranscriptionModel,
    api_key: &str,
    wav_bytes: Vec<u8>,
) -> anyhow::Result<String> {
    let client = reqwest::Client::new();

    let file_part = reqwest::multipart::Part::bytes(wav_bytes)
        .file_name("answer.wav")
        .mime_str("audio/wav")
        .map_err(|e| anyhow::anyhow!("Failed to create file part for upload: {e}"))?;

    let form = reqwest::multipart::Form::new()
        .part("file", file_part)
        .text("model", model.api_model_name().to_string())
        .text("response_format", "json");

    let response = match client
        .post(model.endpoint())
        .bearer_auth(api_key)
        .multipart(form)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            let error_msg = if e.is_connect() {
                "Failed to connect to Groq API server. Check your internet connection.".to_string()
            } else if e.is_timeout() {
                "Request to Groq timed out. The API server is not responding.".to_string()
            } else {
                format!("Groq network error: {e}")
            };
            return Err(anyhow::anyhow!(error_msg));
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let human_readable = match status.as_u16() {
            401 => "Groq API key is invalid or expired. Please run 'terview auth' to update your API key.".to_string(),
            429 => "Too many requests to Groq. You've hit the API rate limit. Please wait and try again.".to_string(),
            500 | 502 | 503 | 504 => "Groq API server is experiencing issues. Please try again later.".to_string(),
            _ => format!("Groq API error (status {status}): {error_body}"),
        };

        return Err(anyhow::anyhow!(human_readable));
    }

    let transcription: GroqResponse = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse Groq response: {e}"))?;

    tracing::debug!(
        "Groq transcription: {} characters",
        transcription.text.len()
    );

    Ok(transcription.text)
}
