//! Setup module for initial application configuration.
//!
//! Handles first-run setup by creating the config directory and writing a
//! default configuration file stamped with the current version.

pub mod version;

use anyhow::anyhow;

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = r#"
[audio]
# Audio device: "default", a numeric index, or a name from `terview list-devices`
device = "default"
# Recording sample rate in Hz (16000 recommended for speech recognition)
sample_rate = 16000
# Reference level in dBFS for 100% meter display
reference_level_db = -20

[timers]
# Seconds remaining at which prep/recording countdowns turn into a warning
warning_seconds = 30
# Seconds remaining at which the written-answer countdown turns into a warning
written_warning_seconds = 60

[transcription]
# Live transcription of recorded answers (requires `terview auth`)
enabled = true
model = "gpt-4o-mini-transcribe"
# Seconds between live transcription passes over the recorded audio
cadence_seconds = 5

[feedback]
# AI feedback model (requires `terview auth`)
model = "gemini-2.0-flash"
"#;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs the setup process if the main config file is missing or outdated.
///
/// Creates the config directory and writes the default config file with a
/// version prefix as the first line.
///
/// # Errors
/// Returns an error if any file operations fail.
pub fn run_setup() -> anyhow::Result<()> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("terview");
    std::fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join("terview.toml");
    let version_line = format!(r#"config_version = "{}""#, CURRENT_VERSION);
    let full_config = format!("{}\n{}", version_line, DEFAULT_CONFIG);
    std::fs::write(&config_path, full_config)?;

    tracing::info!("Default configuration written to {}", config_path.display());
    Ok(())
}
