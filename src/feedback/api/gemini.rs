//! Google Gemini generateContent API implementation.

use serde::Deserialize;
use serde_json::json;

use crate::feedback::model::FeedbackModel;

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Generates text from a prompt using Gemini's generateContent endpoint.
///
/// The API key is passed as a query parameter per Google's API convention.
pub async fn generate(
    model: FeedbackModel,
    api_key: &str,
    prompt: &str,
) -> anyhow::Result<String> {
    let client = reqwest::Client::new();

    let body = json!({
        "contents": [{
            "parts": [{ "text": prompt }]
        }]
    });

    let url = format!("{}?key={}", model.endpoint(), api_key);

    let response = match client.post(&url).json(&body).send().await {
        Ok(resp) => resp,
        Err(e) => {
            let error_msg = if e.is_connect() {
                "Failed to connect to the Gemini API server. Check your internet connection."
                    .to_string()
            } else if e.is_timeout() {
                "Request to Gemini timed out. The API server is not responding.".to_string()
            } else {
                format!("Gemini network error: {e}")
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
            400 | 401 | 403 => "Gemini API key is invalid or lacks access. Please run 'terview auth' to update your API key.".to_string(),
            429 => "Too many requests to Gemini. You've hit the API rate limit. Please wait and try again.".to_string(),
            500 | 502 | 503 | 504 => "Gemini API server is experiencing issues. Please try again later.".to_string(),
            _ => format!("Gemini API error (status {status}): {error_body}"),
        };

        return Err(anyhow::anyhow!(human_readable));
    }

    let parsed: GeminiResponse = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse Gemini response: {e}"))?;

    let text = parsed
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Gemini returned no feedback text"))?;

    tracing::debug!("Gemini feedback: {} characters", text.len());

    Ok(text)
}
