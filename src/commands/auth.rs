//! Provider authentication and model selection.
//!
//! One guided flow configures either capability: live transcription
//! (OpenAI, Groq) or AI feedback (Google, OpenAI). The API key is stored in
//! the credentials file; the chosen model is written to the config file.

use crate::config::{self, save_config, TerviewConfig};
use crate::feedback::{FeedbackModel, FeedbackProvider};
use crate::transcription::{TranscriptionModel, TranscriptionProvider};
use anyhow::anyhow;

/// Runs the interactive auth flow.
///
/// # Errors
/// - If the user cancels (propagated so the caller can exit quietly)
/// - If credentials or config cannot be saved
pub fn handle_auth() -> Result<(), anyhow::Error> {
    cliclack::intro("terview auth")?;

    let capability: &str = cliclack::select("What do you want to configure?")
        .item(
            "transcription",
            "Live transcription",
            "speech-to-text while you record an answer",
        )
        .item(
            "feedback",
            "AI feedback",
            "answer feedback on the results screen",
        )
        .interact()?;

    match capability {
        "transcription" => configure_transcription()?,
        "feedback" => configure_feedback()?,
        _ => unreachable!(),
    }

    cliclack::outro("Done. Start a session with 'terview'.")?;
    Ok(())
}

fn configure_transcription() -> anyhow::Result<()> {
    let authorized = config::authorized_providers().unwrap_or_default();

    let mut select = cliclack::select("Transcription provider");
    for provider in TranscriptionProvider::all() {
        let hint = if authorized.contains(&provider.id().to_string()) {
            "API key saved"
        } else {
            ""
        };
        select = select.item(*provider, provider.name(), hint);
    }
    let provider: TranscriptionProvider = select.interact()?;

    prompt_and_save_key(provider.id(), provider.name(), &authorized)?;

    let mut select = cliclack::select("Transcription model");
    for model in TranscriptionModel::models_for_provider(provider) {
        select = select.item(model, model.id(), model.description());
    }
    let model: TranscriptionModel = select.interact()?;

    let mut app_config = load_or_default_config();
    app_config.transcription.model = model.id().to_string();
    app_config.transcription.enabled = true;
    save_config(&app_config)?;

    cliclack::log::success(format!(
        "Live transcription configured: {} via {}",
        model.id(),
        provider.name()
    ))?;
    Ok(())
}

fn configure_feedback() -> anyhow::Result<()> {
    let authorized = config::authorized_providers().unwrap_or_default();

    let mut select = cliclack::select("Feedback provider");
    for provider in FeedbackProvider::all() {
        let hint = if authorized.contains(&provider.id().to_string()) {
            "API key saved"
        } else {
            ""
        };
        select = select.item(*provider, provider.name(), hint);
    }
    let provider: FeedbackProvider = select.interact()?;

    prompt_and_save_key(provider.id(), provider.name(), &authorized)?;

    let models: Vec<FeedbackModel> = FeedbackModel::all()
        .iter()
        .filter(|m| m.provider() == provider)
        .copied()
        .collect();
    let mut select = cliclack::select("Feedback model");
    for model in &models {
        select = select.item(*model, model.id(), model.description());
    }
    let model: FeedbackModel = select.interact()?;

    let mut app_config = load_or_default_config();
    app_config.feedback.model = model.id().to_string();
    save_config(&app_config)?;

    cliclack::log::success(format!(
        "Feedback configured: {} via {}",
        model.id(),
        provider.name()
    ))?;
    Ok(())
}

/// Prompts for an API key unless one is saved and the user keeps it.
fn prompt_and_save_key(
    provider_id: &str,
    provider_name: &str,
    authorized: &[String],
) -> anyhow::Result<()> {
    if authorized.contains(&provider_id.to_string()) {
        let keep: bool = cliclack::confirm(format!(
            "An API key for {provider_name} is already saved. Keep it?"
        ))
        .initial_value(true)
        .interact()?;
        if keep {
            return Ok(());
        }
    }

    let api_key: String = cliclack::password(format!("{provider_name} API key"))
        .mask('▪')
        .interact()?;

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key cannot be empty"));
    }

    config::save_api_key(provider_id, api_key.trim())?;
    Ok(())
}

fn load_or_default_config() -> TerviewConfig {
    TerviewConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load config ({e}); starting from defaults");
        TerviewConfig::default()
    })
}
