//! Configuration management for terview.
//!
//! This module handles loading and saving application configuration from TOML files,
//! as well as secure storage of API credentials. Configuration is stored in the
//! user's config directory, while credentials are stored with restricted permissions
//! in the user's local data directory.

pub mod file;
pub mod secrets;

pub use file::{save_config, AudioConfig, FeedbackConfig, LiveTranscriptionConfig, TerviewConfig, TimerConfig};
pub use secrets::{authorized_providers, get_api_key, save_api_key};
