//! Open the configuration file in the user's preferred editor.

use std::process::Command;

/// Opens the config file in the user's editor, creating it first if missing.
///
/// # Errors
/// - If the config path cannot be determined
/// - If no editor is available
/// - If the editor exits with an error
pub fn handle_config() -> Result<(), anyhow::Error> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        tracing::info!("Config file missing; running setup before editing");
        crate::setup::run_setup()?;
    }

    let editor = find_editor()?;
    tracing::info!("Opening {} with {}", config_path.display(), editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to launch editor '{editor}': {e}"))?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Finds the best available editor to use.
///
/// Tries in order: $EDITOR, nano, vi
fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }

    for editor in &["nano", "vi"] {
        if is_editor_available(editor) {
            return Ok(editor.to_string());
        }
    }

    Err(anyhow::anyhow!(
        "No editor found. Please set the $EDITOR environment variable."
    ))
}

/// Checks if an editor is available in the system PATH.
fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Retrieves the path to the terview configuration file.
///
/// # Errors
/// - If the home directory cannot be determined
fn get_config_path() -> anyhow::Result<std::path::PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("terview");

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("terview.toml"))
}
