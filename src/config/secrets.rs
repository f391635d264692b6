//! Secure storage of API credentials.
//!
//! API keys are kept out of the main config file in a credentials file under
//! the user's local data directory, written with owner-only permissions.
//! Keys are stored per provider id ("openai", "groq", "google").

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    keys: BTreeMap<String, String>,
}

/// Saves an API key for the given provider, creating the credentials file if needed.
///
/// # Errors
/// - If the data directory cannot be determined or created
/// - If the credentials file cannot be written
pub fn save_api_key(provider_id: &str, api_key: &str) -> anyhow::Result<()> {
    let path = credentials_path()?;
    let mut creds = read_credentials(&path)?;
    creds.keys.insert(provider_id.to_string(), api_key.to_string());
    write_credentials(&path, &creds)?;
    tracing::info!("API key saved for provider '{provider_id}'");
    Ok(())
}

/// Returns the stored API key for the given provider, if any.
///
/// # Errors
/// - If the credentials file exists but cannot be read or parsed
pub fn get_api_key(provider_id: &str) -> anyhow::Result<Option<String>> {
    let path = credentials_path()?;
    let creds = read_credentials(&path)?;
    Ok(creds.keys.get(provider_id).cloned())
}

/// Returns the provider ids that have a stored API key.
///
/// # Errors
/// - If the credentials file exists but cannot be read or parsed
pub fn authorized_providers() -> anyhow::Result<Vec<String>> {
    let path = credentials_path()?;
    let creds = read_credentials(&path)?;
    Ok(creds.keys.keys().cloned().collect())
}

fn read_credentials(path: &PathBuf) -> anyhow::Result<CredentialsFile> {
    if !path.exists() {
        return Ok(CredentialsFile::default());
    }
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read credentials file: {e}"))?;
    let creds: CredentialsFile =
        toml::from_str(&content).map_err(|e| anyhow!("Malformed credentials file: {e}"))?;
    Ok(creds)
}

fn write_credentials(path: &PathBuf, creds: &CredentialsFile) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(creds)?;
    fs::write(path, content)?;

    // Credentials must not be world-readable
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Retrieves the path to the credentials file, creating the data directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the data directory cannot be created
fn credentials_path() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("terview");
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join("credentials.toml"))
}
