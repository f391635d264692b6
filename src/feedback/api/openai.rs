//! OpenAI chat completions API implementation for feedback generation.

use serde::Deserialize;
use serde_json::json;

use crate::feedback::model::FeedbackModel;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}

/// Generates text from a prompt using OpenAI's chat completions endpoint.
pub async fn generate(
    model: FeedbackModel,
    api_key: &str,
    prompt: &str,
) -> anyhow::Result<String> {
    let client = reqwest::Client::new();

    let body = json!({
        "model": model.api_model_name(),
        "messages": [{ "role": "user", "content": prompt }]
    });

    let response = match client
        .post(model.endpoint())
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            let error_msg = if e.is_connect() {
                "Failed to connect to OpenAI API server. Check your internet connection."
                    .to_string()
            } else if e.is_timeout() {
                "Request to OpenAI timed out. The API server is not responding.".to_string()
            } else {
                format!("OpenAI network error: {e}")
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
            401 => "OpenAI API key is invalid or expired. Please run 'terview auth' to update your API key.".to_string(),
            403 => "You don't have permission to use OpenAI's API. Check your API key and account status.".to_string(),
            429 => "Too many requests to OpenAI. You've hit the API rate limit. Please wait and try again.".to_string(),
            500 | 502 | 503 | 504 => "OpenAI API server is experiencing issues. Please try again later.".to_string(),
            _ => format!("OpenAI API error (status {status}): {error_body}"),
        };

        return Err(anyhow::anyhow!(human_readable));
    }

    let parsed: ChatResponse = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse OpenAI response: {e}"))?;

    let text = parsed
        .choices
        .first()
        .map(|c| c.message.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow::anyhow!("OpenAI returned no feedback text"))?;

    tracing::debug!("OpenAI feedback: {} characters", text.len());

    Ok(text)
}
