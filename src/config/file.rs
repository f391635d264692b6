//! Configuration file management for terview.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `terview list-devices`
    /// - device name from `terview list-devices`
    pub device: String,
    /// Recording sample rate in Hz (16000 recommended for speech recognition)
    pub sample_rate: u32,
    /// Reference level in dBFS for 100% meter display (typical: -20 to -6 dBFS)
    #[serde(default = "default_reference_level_db")]
    pub reference_level_db: i8,
}

fn default_reference_level_db() -> i8 {
    -20
}

/// Countdown timer display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Seconds remaining at which prep/recording countdowns turn into a warning
    #[serde(default = "default_warning_seconds")]
    pub warning_seconds: u32,
    /// Seconds remaining at which the written-answer countdown turns into a warning
    #[serde(default = "default_written_warning_seconds")]
    pub written_warning_seconds: u32,
}

fn default_warning_seconds() -> u32 {
    30
}

fn default_written_warning_seconds() -> u32 {
    60
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            warning_seconds: default_warning_seconds(),
            written_warning_seconds: default_written_warning_seconds(),
        }
    }
}

/// Live transcription configuration.
///
/// When enabled and an API key for the model's provider is authorized (see
/// `terview auth`), recorded answers get a live transcript while recording.
/// When disabled or unauthorized the session runs with an empty transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveTranscriptionConfig {
    /// Whether to transcribe recorded answers while recording
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Transcription model id (see `terview auth` for available models)
    #[serde(default = "default_transcription_model")]
    pub model: String,
    /// Seconds between live transcription passes over the recorded audio
    #[serde(default = "default_cadence_seconds")]
    pub cadence_seconds: u64,
}

fn default_true() -> bool {
    true
}

fn default_transcription_model() -> String {
    "gpt-4o-mini-transcribe".to_string()
}

fn default_cadence_seconds() -> u64 {
    5
}

impl Default for LiveTranscriptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_transcription_model(),
            cadence_seconds: default_cadence_seconds(),
        }
    }
}

/// Feedback generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Feedback model id (see `terview auth` for available models)
    #[serde(default = "default_feedback_model")]
    pub model: String,
}

fn default_feedback_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            model: default_feedback_model(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerviewConfig {
    pub audio: AudioConfig,
    #[serde(default)]
    pub timers: TimerConfig,
    #[serde(default)]
    pub transcription: LiveTranscriptionConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

impl TerviewConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> Result<Self, anyhow::Error> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)?;
        let config: TerviewConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }

    /// Returns default configuration values.
    pub fn default() -> Self {
        TerviewConfig {
            audio: AudioConfig {
                device: "default".to_string(),
                sample_rate: 16000,
                reference_level_db: default_reference_level_db(),
            },
            timers: TimerConfig::default(),
            transcription: LiveTranscriptionConfig::default(),
            feedback: FeedbackConfig::default(),
        }
    }
}

/// Retrieves the path to the config file.
///
/// Assumes the config file exists (created by setup if needed).
///
/// # Errors
/// - If the config directory cannot be determined
/// - If the config directory cannot be created
fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let config_dir = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "Could not find home directory")
    })?;
    let config_path = config_dir
        .join(".config")
        .join("terview")
        .join("terview.toml");

    std::fs::create_dir_all(config_path.parent().unwrap())?;

    Ok(config_path)
}

/// Saves the configuration to the config file.
///
/// # Errors
/// - If the config directory cannot be determined or created
/// - If the config file cannot be written
pub fn save_config(config: &TerviewConfig) -> anyhow::Result<()> {
    config.save()
}
