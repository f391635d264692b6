//! Transcription model definitions and metadata.
//!
//! Defines supported transcription models with their associated providers,
//! API endpoints, and model names.

use serde::{Deserialize, Serialize};

/// Represents a supported transcription provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranscriptionProvider {
    OpenAI,
    Groq,
}

impl TranscriptionProvider {
    pub fn id(&self) -> &'static str {
        match self {
            TranscriptionProvider::OpenAI => "openai",
            TranscriptionProvider::Groq => "groq",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TranscriptionProvider::OpenAI => "OpenAI",
            TranscriptionProvider::Groq => "Groq",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "openai" => Some(TranscriptionProvider::OpenAI),
            "groq" => Some(TranscriptionProvider::Groq),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[TranscriptionProvider::OpenAI, TranscriptionProvider::Groq]
    }
}

/// Represents a supported transcription model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranscriptionModel {
    /// OpenAI GPT-4o Mini Transcribe model (fast, good accuracy)
    Gpt4oMiniTranscribe,
    /// OpenAI Whisper model (legacy)
    Whisper,
    /// Groq-hosted Whisper Large v3 Turbo (fastest)
    GroqWhisperLargeV3Turbo,
}

impl TranscriptionModel {
    /// Returns the provider for this model
    pub fn provider(&self) -> TranscriptionProvider {
        match self {
            TranscriptionModel::Gpt4oMiniTranscribe | TranscriptionModel::Whisper => {
                TranscriptionProvider::OpenAI
            }
            TranscriptionModel::GroqWhisperLargeV3Turbo => TranscriptionProvider::Groq,
        }
    }

    /// Returns the model identifier as a string
    pub fn id(&self) -> &'static str {
        match self {
            TranscriptionModel::Gpt4oMiniTranscribe => "gpt-4o-mini-transcribe",
            TranscriptionModel::Whisper => "whisper",
            TranscriptionModel::GroqWhisperLargeV3Turbo => "whisper-large-v3-turbo",
        }
    }

    /// Returns a human-readable description of the model
    pub fn description(&self) -> &'static str {
        match self {
            TranscriptionModel::Gpt4oMiniTranscribe => "GPT-4o Mini Transcribe (fast, good accuracy)",
            TranscriptionModel::Whisper => "Whisper (legacy)",
            TranscriptionModel::GroqWhisperLargeV3Turbo => "Whisper Large v3 Turbo via Groq (fastest)",
        }
    }

    /// Returns the API endpoint for this model
    pub fn endpoint(&self) -> &'static str {
        match self {
            TranscriptionModel::Gpt4oMiniTranscribe | TranscriptionModel::Whisper => {
                "https://api.openai.com/v1/audio/transcriptions"
            }
            TranscriptionModel::GroqWhisperLargeV3Turbo => {
                "https://api.groq.com/openai/v1/audio/transcriptions"
            }
        }
    }

    /// Returns the model name to send to the API
    pub fn api_model_name(&self) -> &'static str {
        match self {
            TranscriptionModel::Gpt4oMiniTranscribe => "gpt-4o-mini-transcribe",
            TranscriptionModel::Whisper => "whisper-1",
            TranscriptionModel::GroqWhisperLargeV3Turbo => "whisper-large-v3-turbo",
        }
    }

    /// Parses a model ID string into a TranscriptionModel
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "gpt-4o-mini-transcribe" => Some(TranscriptionModel::Gpt4oMiniTranscribe),
            "whisper" => Some(TranscriptionModel::Whisper),
            "whisper-large-v3-turbo" => Some(TranscriptionModel::GroqWhisperLargeV3Turbo),
            _ => None,
        }
    }

    /// Returns all available models
    pub fn all() -> &'static [Self] {
        &[
            TranscriptionModel::Gpt4oMiniTranscribe,
            TranscriptionModel::Whisper,
            TranscriptionModel::GroqWhisperLargeV3Turbo,
        ]
    }

    /// Returns all models for a given provider
    pub fn models_for_provider(provider: TranscriptionProvider) -> Vec<TranscriptionModel> {
        Self::all()
            .iter()
            .filter(|m| m.provider() == provider)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_ids_round_trip() {
        for model in TranscriptionModel::all() {
            assert_eq!(TranscriptionModel::from_id(model.id()), Some(*model));
        }
        assert_eq!(TranscriptionModel::from_id("nope"), None);
    }

    #[test]
    fn every_provider_has_a_model() {
        for provider in TranscriptionProvider::all() {
            assert!(!TranscriptionModel::models_for_provider(*provider).is_empty());
        }
    }
}
