//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use dirs;
use std::io;
use std::process;

/// Checks if setup is needed (version mismatch or missing config) and runs setup if required.
///
/// This is called early in the startup sequence, before command handling.
/// It checks:
/// 1. If config file doesn't exist, runs full setup
/// 2. If config version is older than app version, runs setup and logs migration
/// 3. If config version matches app version, does nothing
fn check_and_run_setup() -> Result<(), anyhow::Error> {
    let config_path = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("terview")
        .join("terview.toml");

    match crate::setup::version::check_setup_needed(&config_path)? {
        Some(old_version) => {
            tracing::info!(
                "Setup needed - migrating from version {} to {}",
                old_version,
                env!("CARGO_PKG_VERSION")
            );
            crate::setup::run_setup().map_err(|e| {
                tracing::error!("Setup failed: {e}");
                anyhow!("Setup failed: {e}")
            })?;
            crate::setup::version::update_config_version(&config_path).map_err(|e| {
                tracing::error!("Failed to update config version: {e}");
                anyhow!("Failed to update config version: {e}")
            })?;
            tracing::info!(
                "Setup completed successfully - migrated to version {}",
                env!("CARGO_PKG_VERSION")
            );
        }
        None => {
            tracing::debug!("Config version up to date ({})", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// A terminal-based interview practice tool with timed questions, live
/// transcription and AI feedback
#[derive(Parser)]
#[command(name = "terview")]
#[command(version)]
#[command(about = "Practice timed interview questions in your terminal")]
#[command(
    long_about = "terview walks you through a program's timed interview questions.\n\
Spoken questions are recorded from your microphone with a live level meter\n\
and live transcription; written questions are typed against the clock.\n\
When you finish, you can request AI feedback on each answer.\n\n\
DEFAULT COMMAND:\n    If no command is specified, 'practice' is used by default.\n\n\
EXAMPLES:\n    # Start a practice session\n    $ terview\n    \n    # Jump straight to a program\n    $ terview practice -p waterloo-eng\n    \n    # See available programs and their questions\n    $ terview programs\n    \n    # Set up API keys for transcription and feedback\n    $ terview auth\n    \n    # Edit configuration file\n    $ terview config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/terview/terview.toml\n    Program catalog:    ~/.config/terview/programs.toml (optional override)\n    Logs:               ~/.local/state/terview/terview.log.*"
)]
struct Cli {
    /// Start directly with the given program id (practice default command)
    #[arg(short, long, value_name = "PROGRAM", global = true)]
    program: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a practice session (default)
    ///
    /// Pick a program, pass the microphone check, then answer the program's
    /// timed questions. Responses are kept for the session only.
    #[command(visible_alias = "p")]
    Practice {
        /// Start directly with the given program id
        #[arg(short, long, value_name = "PROGRAM")]
        program: Option<String>,
    },

    /// List available practice programs and their questions
    Programs,

    /// Authenticate with AI providers and select models
    ///
    /// Configure API keys for live transcription (OpenAI, Groq) and
    /// feedback generation (Google, OpenAI), and choose which models to use.
    #[command(visible_alias = "a")]
    Auth,

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio settings, timer thresholds, and model selection.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in terview.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If setup fails
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "terview", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Check if setup is needed (version check or missing config)
    check_and_run_setup()?;

    match cli.command {
        None | Some(Commands::Practice { .. }) => {
            // Default command is practice.
            // If both top-level and subcommand options are given, the explicit
            // practice option takes precedence.
            let program = match cli.command {
                Some(Commands::Practice { program }) => program.or(cli.program),
                None => cli.program,
                _ => unreachable!(),
            };
            commands::handle_practice(program).await?;
        }
        Some(Commands::Programs) => {
            commands::handle_programs()?;
        }
        Some(Commands::Auth) => {
            if let Err(e) = commands::handle_auth() {
                // Cancellation already produced a cliclack message
                let err_msg = e.to_string();
                if err_msg.contains("cancelled") || err_msg.contains("interrupted") {
                    process::exit(0);
                } else {
                    return Err(e);
                }
            }
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
