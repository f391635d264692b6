//! Application command handlers for terview.
//!
//! This module organizes command handling into separate submodules, each responsible
//! for a specific application command.
//!
//! # Commands
//! - `practice`: the interactive assessment flow (default command)
//! - `programs`: list the program catalog
//! - `auth`: provider + model selection and API key management
//! - `config`: open configuration file in user's preferred editor
//! - `list_devices`: list available audio input devices
//! - `logs`: display recent log entries

pub mod auth;
pub mod config;
pub mod list_devices;
pub mod logs;
pub mod practice;
pub mod programs;

pub use auth::handle_auth;
pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use practice::handle_practice;
pub use programs::handle_programs;
