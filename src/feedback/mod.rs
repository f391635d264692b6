//! AI feedback on submitted answers.
//!
//! One best-effort generation call per explicit user request, routed to the
//! configured provider. No retries: a failed call is absorbed at this
//! boundary by the caller substituting `FALLBACK_MESSAGE`.

pub mod api;
pub mod model;

pub use model::{FeedbackModel, FeedbackProvider};

use crate::catalog::QuestionKind;

/// Shown in place of feedback when generation fails.
pub const FALLBACK_MESSAGE: &str =
    "Unable to generate feedback at this time. Please try again later.";

/// Shown when a response is too thin to analyze; no API call is made.
pub const THIN_CONTENT_MESSAGE: &str = "Not enough content to generate feedback. \
Please ensure you have a clear transcript or written response.";

/// Minimum transcript length worth sending for analysis of a spoken answer.
const MIN_SPOKEN_CHARS: usize = 10;

/// Whether a response has enough content to be worth analyzing.
pub fn has_enough_content(kind: QuestionKind, response_text: &str) -> bool {
    match kind {
        QuestionKind::Video => response_text.trim().len() >= MIN_SPOKEN_CHARS,
        QuestionKind::Written => !response_text.trim().is_empty(),
    }
}

/// Builds the admissions-coach prompt for one answer.
pub fn build_prompt(kind: QuestionKind, question_prompt: &str, response_text: &str) -> String {
    match kind {
        QuestionKind::Video => format!(
            "You are an expert university admissions coach.\n\
             A student has provided a spoken response (transcribed below) to the following interview question.\n\n\
             Question: \"{question_prompt}\"\n\n\
             Student's Transcript: \"{response_text}\"\n\n\
             Please provide constructive feedback in the following format:\n\
             1. **Strengths**: What did they do well?\n\
             2. **Areas for Improvement**: What could be better?\n\
             3. **Sample Improved Answer**: A brief example of how to phrase a stronger response.\n\n\
             Keep the tone encouraging but professional. Keep the response concise (under 200 words)."
        ),
        QuestionKind::Written => format!(
            "You are an expert university admissions coach.\n\
             A student has written the following response to an essay question.\n\n\
             Question: \"{question_prompt}\"\n\n\
             Student's Response: \"{response_text}\"\n\n\
             Please provide constructive feedback in the following format:\n\
             1. **Strengths**: What did they do well?\n\
             2. **Areas for Improvement**: What could be better?\n\
             3. **Refinement**: One specific suggestion to make the writing more impactful.\n\n\
             Keep the tone encouraging but professional. Keep the response concise (under 200 words)."
        ),
    }
}

/// Generates feedback for one answer with a single best-effort call.
///
/// # Errors
/// - If the API request fails or returns an error status; callers display
///   `FALLBACK_MESSAGE` instead of propagating further
pub async fn generate(
    model: FeedbackModel,
    api_key: &str,
    kind: QuestionKind,
    question_prompt: &str,
    response_text: &str,
) -> anyhow::Result<String> {
    let prompt = build_prompt(kind, question_prompt, response_text);

    tracing::info!(
        "Requesting feedback from {} ({})",
        model.provider().name(),
        model.id()
    );

    match model.provider() {
        FeedbackProvider::Google => api::gemini::generate(model, api_key, &prompt).await,
        FeedbackProvider::OpenAI => api::openai::generate(model, api_key, &prompt).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thin_content_gate() {
        assert!(!has_enough_content(QuestionKind::Video, ""));
        assert!(!has_enough_content(QuestionKind::Video, "um, hi"));
        assert!(has_enough_content(QuestionKind::Video, "I led the robotics team"));

        assert!(!has_enough_content(QuestionKind::Written, "   "));
        assert!(has_enough_content(QuestionKind::Written, "short"));
    }

    #[test]
    fn prompts_embed_question_and_response() {
        let prompt = build_prompt(QuestionKind::Written, "Why here?", "Because reasons.");
        assert!(prompt.contains("Why here?"));
        assert!(prompt.contains("Because reasons."));
        assert!(prompt.contains("Refinement"));

        let prompt = build_prompt(QuestionKind::Video, "Tell us", "I said things");
        assert!(prompt.contains("Sample Improved Answer"));
    }
}
