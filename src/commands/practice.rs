//! The interactive practice session.
//!
//! Wires the catalog, capture devices, transcript feed, flow controller, and
//! TUI into the assessment loop: program selection, instructions with mic
//! check, per-question capture, and the results screen with on-demand
//! feedback. All session state lives in the flow controller; this module
//! only dispatches user actions and timer ticks into it.

use crate::assessment::{FlowController, Phase, ResponseBody};
use crate::capture::mic::{MicDevice, MicStream};
use crate::capture::{
    Artifact, CaptureDevice, InputStream, NullTranscriptFeed, SpokenCapture, SpokenStep,
    TranscriptFeed, WrittenCapture,
};
use crate::catalog::{Catalog, Question, QuestionKind};
use crate::config::{self, TerviewConfig};
use crate::feedback::{self, FeedbackModel};
use crate::practice::{
    InstructionsCommand, MicCheckView, PracticeTui, QuestionHeader, ResultsCommand, ResultsEntry,
    SelectCommand, SpokenCommand, SpokenView, WrittenCommand,
};
use crate::practice::ui::WrittenView;
use crate::transcription::{LiveTranscriber, TranscriptionModel};
use crate::ui::ErrorScreen;
use anyhow::{anyhow, bail};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a question presentation ended.
enum QuestionOutcome {
    Completed(ResponseBody),
    Quit,
}

/// How the results screen was left.
enum ResultsOutcome {
    Restart,
    Quit,
}

/// Runs the interactive practice session.
///
/// # Errors
/// - If configuration or the program catalog cannot be loaded
/// - If the terminal UI cannot be initialized
/// - If a device or rendering failure aborts the session
pub async fn handle_practice(program_id: Option<String>) -> Result<(), anyhow::Error> {
    tracing::info!("=== terview practice session started ===");

    let config = match TerviewConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/terview/terview.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow!("Configuration error: {err}"));
        }
    };

    let catalog = match Catalog::load() {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::error!("Failed to load program catalog: {err}");
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&format!("Program Catalog Error:\n\n{err}"))?;
            error_screen.cleanup()?;
            return Err(anyhow!("Catalog error: {err}"));
        }
    };

    if let Some(id) = &program_id {
        if catalog.program(id).is_none() {
            bail!("Unknown program id '{id}'. Run 'terview programs' to list available programs.");
        }
    }

    let mut tui = PracticeTui::new().map_err(|e| anyhow!("Failed to initialize UI: {e}"))?;

    let result = run_session(&mut tui, &config, &catalog, program_id).await;

    tui.cleanup()
        .map_err(|e| anyhow!("Cleanup failed: {e}"))?;

    if let Err(e) = result {
        tracing::error!("Practice session failed: {e}");
        let mut error_screen = ErrorScreen::new()?;
        error_screen.show_error(&format!("Session Error:\n\n{e}"))?;
        error_screen.cleanup()?;
        return Err(e);
    }

    tracing::info!("=== terview practice session exited ===");
    Ok(())
}

/// The phase-driven session loop. Returns when the user quits.
async fn run_session(
    tui: &mut PracticeTui,
    config: &TerviewConfig,
    catalog: &Catalog,
    program_id: Option<String>,
) -> anyhow::Result<()> {
    let mut flow = FlowController::new();

    if let Some(id) = program_id {
        // Already validated against the catalog
        let program = catalog
            .program(&id)
            .ok_or_else(|| anyhow!("Program '{id}' disappeared from the catalog"))?;
        flow.select_program(program.clone());
    }

    // Mic-check stream held only while on the instructions screen. The check
    // needs nothing beyond the device contract, so it goes through the seam.
    let mut mic_check: Option<Box<dyn InputStream>> = None;
    let mut mic_error: Option<String> = None;
    // Feedback per question id, kept for the rest of the session
    let mut feedbacks: HashMap<String, String> = HashMap::new();

    loop {
        match flow.session().phase() {
            Phase::Landing => {
                tui.render_program_select(&catalog.programs)?;
                match tui.handle_select_input(catalog.programs.len())? {
                    SelectCommand::Continue => {}
                    SelectCommand::Choose(idx) => {
                        flow.select_program(catalog.programs[idx].clone());
                    }
                    SelectCommand::Quit => break,
                }
            }
            Phase::Instructions => {
                let program = flow
                    .session()
                    .program()
                    .ok_or_else(|| anyhow!("Instructions phase without a program"))?
                    .clone();
                let view = MicCheckView {
                    granted: mic_check.is_some(),
                    level: mic_check.as_ref().map(|s| s.preview_level()).unwrap_or(0),
                    error: mic_error.as_deref(),
                };
                tui.render_instructions(&program, &view)?;
                match tui.handle_instructions_input()? {
                    InstructionsCommand::Continue => {}
                    InstructionsCommand::CheckMic => {
                        if let Some(mut stream) = mic_check.take() {
                            stream.release();
                        }
                        let mut device = mic_device(config);
                        match device.request_access() {
                            Ok(stream) => {
                                mic_check = Some(stream);
                                mic_error = None;
                            }
                            Err(e) => {
                                tracing::warn!("Microphone check failed: {e}");
                                mic_error = Some(e.to_string());
                            }
                        }
                    }
                    InstructionsCommand::Begin => {
                        // Begin is gated on a granted mic check; each question
                        // acquires its own stream, so drop the check stream.
                        if let Some(mut stream) = mic_check.take() {
                            stream.release();
                            flow.start_assessment()?;
                        }
                    }
                    InstructionsCommand::Back => {
                        if let Some(mut stream) = mic_check.take() {
                            stream.release();
                        }
                        mic_error = None;
                        flow.reset();
                    }
                    InstructionsCommand::Quit => {
                        if let Some(mut stream) = mic_check.take() {
                            stream.release();
                        }
                        break;
                    }
                }
            }
            Phase::InProgress => {
                let question = flow
                    .session()
                    .current_question()
                    .ok_or_else(|| anyhow!("In-progress phase without a current question"))?
                    .clone();
                let header_data = (
                    flow.session()
                        .program()
                        .map(|p| p.name.clone())
                        .unwrap_or_default(),
                    flow.session().question_index(),
                    flow.session().questions().len(),
                );

                let outcome = match question.kind {
                    QuestionKind::Video => {
                        run_spoken_question(tui, config, &header_data, &question)?
                    }
                    QuestionKind::Written => {
                        run_written_question(tui, config, &header_data, &question)?
                    }
                };

                match outcome {
                    QuestionOutcome::Completed(body) => {
                        flow.complete_current_question(body)?;
                    }
                    QuestionOutcome::Quit => break,
                }
            }
            Phase::Finished => {
                match run_results(tui, config, &flow, &mut feedbacks).await? {
                    ResultsOutcome::Restart => {
                        flow.reset();
                        feedbacks.clear();
                    }
                    ResultsOutcome::Quit => break,
                }
            }
        }
    }

    Ok(())
}

fn mic_device(config: &TerviewConfig) -> MicDevice {
    MicDevice::new(
        config.audio.device.clone(),
        config.audio.sample_rate,
        config.audio.reference_level_db,
    )
}

/// Builds the transcript feed for a recording stream: the live transcriber
/// when a model and API key are configured, otherwise the null feed.
fn build_transcript_feed(config: &TerviewConfig, stream: &MicStream) -> Box<dyn TranscriptFeed> {
    if !config.transcription.enabled {
        tracing::debug!("Live transcription disabled in config");
        return Box::new(NullTranscriptFeed);
    }

    let Some(model) = TranscriptionModel::from_id(&config.transcription.model) else {
        tracing::warn!(
            "Unknown transcription model '{}'; transcript disabled",
            config.transcription.model
        );
        return Box::new(NullTranscriptFeed);
    };

    match config::get_api_key(model.provider().id()) {
        Ok(Some(api_key)) => Box::new(LiveTranscriber::new(
            model,
            api_key,
            config.transcription.cadence_seconds,
            Arc::new(stream.span_tap()),
        )),
        Ok(None) => {
            tracing::info!(
                "No API key for {}; transcript disabled. Run 'terview auth' to enable it.",
                model.provider().name()
            );
            Box::new(NullTranscriptFeed)
        }
        Err(e) => {
            tracing::warn!("Failed to read credentials: {e}; transcript disabled");
            Box::new(NullTranscriptFeed)
        }
    }
}

/// Runs one spoken question through prep, recording, and review.
fn run_spoken_question(
    tui: &mut PracticeTui,
    config: &TerviewConfig,
    header: &(String, usize, usize),
    question: &Question,
) -> anyhow::Result<QuestionOutcome> {
    tui.reset_level_history();

    // Access was granted on the instructions screen; each question still
    // acquires its own stream, held for prep + recording + review.
    let stream = mic_device(config)
        .open()
        .map_err(|e| anyhow!("Microphone unavailable: {e}"))?;
    let feed = build_transcript_feed(config, &stream);

    let prep_seconds = question.prep_seconds.unwrap_or(0);
    let mut capture = SpokenCapture::new(
        prep_seconds,
        question.max_seconds,
        config.timers.warning_seconds,
        Box::new(stream),
        feed,
    );

    tracing::info!(
        "Spoken question '{}': {}s prep, {}s max answer",
        question.id,
        prep_seconds,
        question.max_seconds
    );

    let mut last_tick = Instant::now();
    loop {
        while last_tick.elapsed() >= Duration::from_secs(1) {
            capture.tick_second()?;
            last_tick += Duration::from_secs(1);
        }
        capture.poll();
        if capture.step() != SpokenStep::Review {
            tui.push_level(capture.preview_level());
        }

        let view = SpokenView {
            header: QuestionHeader {
                program_name: &header.0,
                index: header.1,
                total: header.2,
            },
            prompt: &question.prompt,
            step: capture.step(),
            remaining: capture.format_remaining(),
            warning: capture.is_warning(),
            transcript: capture.transcript(),
            transcription_supported: capture.transcription_supported(),
            listening: capture.transcription_listening(),
            recorded_seconds: capture.artifact().map(|a| a.duration_seconds),
        };
        tui.render_spoken(&view)?;

        match tui.handle_spoken_input(capture.step())? {
            SpokenCommand::Continue => {}
            SpokenCommand::StartNow => {
                capture.start_now()?;
                last_tick = Instant::now();
            }
            SpokenCommand::Stop => {
                capture.stop()?;
            }
            SpokenCommand::Submit => {
                if let Some(answer) = capture.submit() {
                    return Ok(QuestionOutcome::Completed(ResponseBody::Spoken {
                        artifact: answer.artifact,
                        transcript: answer.transcript,
                    }));
                }
            }
            SpokenCommand::Retry => {
                capture.retry();
                tui.reset_level_history();
                last_tick = Instant::now();
            }
            SpokenCommand::Play => {
                if let Some(artifact) = capture.artifact() {
                    play_artifact(artifact);
                }
            }
            SpokenCommand::Quit => return Ok(QuestionOutcome::Quit),
        }
    }
}

/// Runs one written question until submit or expiry.
fn run_written_question(
    tui: &mut PracticeTui,
    config: &TerviewConfig,
    header: &(String, usize, usize),
    question: &Question,
) -> anyhow::Result<QuestionOutcome> {
    tui.reset_written_input();
    let mut capture = WrittenCapture::new(
        question.max_seconds,
        config.timers.written_warning_seconds,
    );

    tracing::info!(
        "Written question '{}': {}s to answer",
        question.id,
        question.max_seconds
    );

    let mut last_tick = Instant::now();
    loop {
        while last_tick.elapsed() >= Duration::from_secs(1) {
            if let Some(answer) = capture.tick_second() {
                return Ok(QuestionOutcome::Completed(ResponseBody::Written {
                    text: answer.text,
                    word_count: answer.word_count,
                }));
            }
            last_tick += Duration::from_secs(1);
        }

        let view = WrittenView {
            header: QuestionHeader {
                program_name: &header.0,
                index: header.1,
                total: header.2,
            },
            prompt: &question.prompt,
            remaining: capture.format_remaining(),
            warning: capture.is_warning(),
            word_count: capture.word_count(),
            can_submit: capture.can_submit(),
        };
        tui.render_written(&view)?;

        match tui.handle_written_input()? {
            WrittenCommand::Continue => {}
            WrittenCommand::Edited => {
                capture.set_text(tui.written_text().to_string());
            }
            WrittenCommand::Submit => {
                if let Some(answer) = capture.submit() {
                    return Ok(QuestionOutcome::Completed(ResponseBody::Written {
                        text: answer.text,
                        word_count: answer.word_count,
                    }));
                }
            }
            WrittenCommand::Quit => return Ok(QuestionOutcome::Quit),
        }
    }
}

/// Runs the results screen until restart or quit. Feedback requests run on
/// spawned tasks and are joined from the render loop; at most one is in
/// flight, and results are cached per question for the session.
async fn run_results(
    tui: &mut PracticeTui,
    config: &TerviewConfig,
    flow: &FlowController,
    feedbacks: &mut HashMap<String, String>,
) -> anyhow::Result<ResultsOutcome> {
    let session = flow.session();
    let program = session
        .program()
        .ok_or_else(|| anyhow!("Finished phase without a program"))?
        .clone();

    let mut pending: Option<(String, tokio::task::JoinHandle<String>)> = None;

    loop {
        if pending
            .as_ref()
            .map(|(_, handle)| handle.is_finished())
            .unwrap_or(false)
        {
            let (question_id, handle) = pending.take().unwrap();
            let text = handle
                .await
                .unwrap_or_else(|_| feedback::FALLBACK_MESSAGE.to_string());
            feedbacks.insert(question_id, text);
        }

        let entries: Vec<ResultsEntry> = program
            .questions
            .iter()
            .filter_map(|q| {
                let response = session.response(&q.id)?;
                let (detail, summary) = match &response.body {
                    ResponseBody::Spoken {
                        artifact,
                        transcript,
                    } => (
                        if transcript.is_empty() {
                            "No transcript available.".to_string()
                        } else {
                            format!("\"{transcript}\"")
                        },
                        format!("Recorded answer, {:.1}s", artifact.duration_seconds),
                    ),
                    ResponseBody::Written { text, word_count } => {
                        (text.clone(), format!("Written answer, {word_count} words"))
                    }
                };
                Some(ResultsEntry {
                    prompt: &q.prompt,
                    kind: q.kind,
                    detail,
                    summary,
                    feedback: feedbacks.get(&q.id).map(|s| s.as_str()),
                    feedback_loading: pending
                        .as_ref()
                        .map(|(id, _)| id == &q.id)
                        .unwrap_or(false),
                })
            })
            .collect();

        tui.render_results(&program.name, &entries)?;

        match tui.handle_results_input(entries.len())? {
            ResultsCommand::Continue => {}
            ResultsCommand::Feedback(idx) => {
                let question = &program.questions[idx];
                // At most one request per question per session, one at a time
                if feedbacks.contains_key(&question.id) || pending.is_some() {
                    continue;
                }
                let Some(response) = session.response(&question.id) else {
                    continue;
                };
                let response_text = response.body.analysis_text().to_string();

                if !feedback::has_enough_content(question.kind, &response_text) {
                    feedbacks.insert(
                        question.id.clone(),
                        feedback::THIN_CONTENT_MESSAGE.to_string(),
                    );
                    continue;
                }

                let Some(model) = FeedbackModel::from_id(&config.feedback.model) else {
                    feedbacks.insert(
                        question.id.clone(),
                        format!(
                            "Unknown feedback model '{}'. Run 'terview config' to fix it.",
                            config.feedback.model
                        ),
                    );
                    continue;
                };

                let api_key = match config::get_api_key(model.provider().id()) {
                    Ok(Some(key)) => key,
                    _ => {
                        feedbacks.insert(
                            question.id.clone(),
                            format!(
                                "No API key for {}. Run 'terview auth' to set one up.",
                                model.provider().name()
                            ),
                        );
                        continue;
                    }
                };

                let prompt = question.prompt.clone();
                let kind = question.kind;
                pending = Some((
                    question.id.clone(),
                    tokio::spawn(async move {
                        match feedback::generate(model, &api_key, kind, &prompt, &response_text)
                            .await
                        {
                            Ok(text) => text,
                            Err(e) => {
                                // Single best-effort attempt; absorb into the fallback
                                tracing::warn!("Feedback generation failed: {e}");
                                feedback::FALLBACK_MESSAGE.to_string()
                            }
                        }
                    }),
                ));
            }
            ResultsCommand::Restart => return Ok(ResultsOutcome::Restart),
            ResultsCommand::Quit => return Ok(ResultsOutcome::Quit),
        }
    }
}

/// Plays a reviewed recording through the system audio player, detached so
/// the UI keeps running.
fn play_artifact(artifact: &Artifact) {
    let path = std::env::temp_dir().join(format!("terview-review-{}.wav", std::process::id()));
    if let Err(e) = std::fs::write(&path, &artifact.wav_bytes) {
        tracing::warn!("Failed to write playback file: {e}");
        return;
    }

    #[cfg(target_os = "macos")]
    let players: &[&str] = &["afplay"];
    #[cfg(not(target_os = "macos"))]
    let players: &[&str] = &["mpv", "ffplay", "aplay", "paplay"];

    for player in players {
        let mut command = std::process::Command::new(player);
        command
            .arg(&path)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        if *player == "mpv" {
            command.arg("--no-video");
        }
        match command.spawn() {
            Ok(_) => {
                tracing::debug!("Playing review recording with {player}");
                return;
            }
            Err(_) => continue,
        }
    }

    tracing::warn!("No audio player found for playback (tried {players:?})");
}
