//! Feedback model definitions and metadata.

use serde::{Deserialize, Serialize};

/// Represents a supported feedback provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackProvider {
    Google,
    OpenAI,
}

impl FeedbackProvider {
    pub fn id(&self) -> &'static str {
        match self {
            FeedbackProvider::Google => "google",
            FeedbackProvider::OpenAI => "openai",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FeedbackProvider::Google => "Google",
            FeedbackProvider::OpenAI => "OpenAI",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "google" => Some(FeedbackProvider::Google),
            "openai" => Some(FeedbackProvider::OpenAI),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[FeedbackProvider::Google, FeedbackProvider::OpenAI]
    }
}

/// Represents a supported feedback model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackModel {
    /// Google Gemini 2.0 Flash (fast, generous free tier)
    Gemini20Flash,
    /// OpenAI GPT-4o Mini (fast, inexpensive)
    Gpt4oMini,
}

impl FeedbackModel {
    /// Returns the provider for this model
    pub fn provider(&self) -> FeedbackProvider {
        match self {
            FeedbackModel::Gemini20Flash => FeedbackProvider::Google,
            FeedbackModel::Gpt4oMini => FeedbackProvider::OpenAI,
        }
    }

    /// Returns the model identifier as a string
    pub fn id(&self) -> &'static str {
        match self {
            FeedbackModel::Gemini20Flash => "gemini-2.0-flash",
            FeedbackModel::Gpt4oMini => "gpt-4o-mini",
        }
    }

    /// Returns a human-readable description of the model
    pub fn description(&self) -> &'static str {
        match self {
            FeedbackModel::Gemini20Flash => "Gemini 2.0 Flash (fast, generous free tier)",
            FeedbackModel::Gpt4oMini => "GPT-4o Mini (fast, inexpensive)",
        }
    }

    /// Returns the model name to send to the API
    pub fn api_model_name(&self) -> &'static str {
        self.id()
    }

    /// Returns the API endpoint for this model
    pub fn endpoint(&self) -> String {
        match self.provider() {
            FeedbackProvider::Google => format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                self.api_model_name()
            ),
            FeedbackProvider::OpenAI => "https://api.openai.com/v1/chat/completions".to_string(),
        }
    }

    /// Parses a model ID string into a FeedbackModel
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "gemini-2.0-flash" => Some(FeedbackModel::Gemini20Flash),
            "gpt-4o-mini" => Some(FeedbackModel::Gpt4oMini),
            _ => None,
        }
    }

    /// Returns all available models
    pub fn all() -> &'static [Self] {
        &[FeedbackModel::Gemini20Flash, FeedbackModel::Gpt4oMini]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_ids_round_trip() {
        for model in FeedbackModel::all() {
            assert_eq!(FeedbackModel::from_id(model.id()), Some(*model));
        }
        assert_eq!(FeedbackModel::from_id("nope"), None);
    }
}
