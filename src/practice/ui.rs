//! Terminal user interface for the practice session.
//!
//! One `PracticeTui` instance lives for the whole session and renders the
//! screen for the current phase: program selection, instructions with mic
//! check, the spoken/written question screens, and results. Input handling
//! polls at 50ms and returns per-screen command enums; the command loop in
//! `commands::practice` owns all state transitions.

use crate::capture::SpokenStep;
use crate::catalog::{Program, QuestionKind};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Sparkline, Wrap},
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const ACCENT: Color = Color::Rgb(185, 207, 212);
const DIM: Color = Color::Rgb(100, 100, 100);
const WARN: Color = Color::Rgb(255, 80, 80);
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);

/// User command on the program-selection screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectCommand {
    Continue,
    /// A program was chosen (index into the rendered list)
    Choose(usize),
    Quit,
}

/// User command on the instructions screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionsCommand {
    Continue,
    /// Request (or retry) microphone access
    CheckMic,
    /// Begin the assessment (only honored once the mic check passed)
    Begin,
    /// Back to program selection
    Back,
    Quit,
}

/// User command on a spoken-question screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpokenCommand {
    Continue,
    /// Start recording before the prep countdown expires
    StartNow,
    /// Stop recording before the answer countdown expires
    Stop,
    /// Submit the reviewed recording
    Submit,
    /// Discard the recording and return to prep
    Retry,
    /// Play back the reviewed recording
    Play,
    Quit,
}

/// User command on a written-question screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrittenCommand {
    Continue,
    /// The answer text changed
    Edited,
    Submit,
    Quit,
}

/// User command on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsCommand {
    Continue,
    /// Request feedback for the selected response (index into the list)
    Feedback(usize),
    /// Reset the session and return to program selection
    Restart,
    Quit,
}

/// Header shown above every question screen.
pub struct QuestionHeader<'a> {
    pub program_name: &'a str,
    /// 0-based index of the current question
    pub index: usize,
    pub total: usize,
}

/// Mic-check state rendered on the instructions screen.
pub struct MicCheckView<'a> {
    pub granted: bool,
    pub level: u8,
    pub error: Option<&'a str>,
}

/// Everything the spoken-question screen needs to render one frame.
pub struct SpokenView<'a> {
    pub header: QuestionHeader<'a>,
    pub prompt: &'a str,
    pub step: SpokenStep,
    pub remaining: String,
    pub warning: bool,
    pub transcript: &'a str,
    pub transcription_supported: bool,
    pub listening: bool,
    /// Duration of the assembled recording, present during review
    pub recorded_seconds: Option<f32>,
}

/// Everything the written-question screen needs to render one frame.
pub struct WrittenView<'a> {
    pub header: QuestionHeader<'a>,
    pub prompt: &'a str,
    pub remaining: String,
    pub warning: bool,
    pub word_count: usize,
    pub can_submit: bool,
}

/// One response row on the results screen.
pub struct ResultsEntry<'a> {
    pub prompt: &'a str,
    pub kind: QuestionKind,
    /// Transcript or written text shown in the detail panel
    pub detail: String,
    /// Word count / duration summary line
    pub summary: String,
    pub feedback: Option<&'a str>,
    pub feedback_loading: bool,
}

/// Terminal UI for the practice session.
pub struct PracticeTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    list_state: ListState,
    results_state: ListState,
    input: Input,
    level_history: Vec<u64>,
    last_level_sample: Instant,
    level_interval: Duration,
}

impl PracticeTui {
    /// Creates the TUI and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let mut list_state = ListState::default();
        list_state.select(Some(0));
        let mut results_state = ListState::default();
        results_state.select(Some(0));

        Ok(Self {
            terminal,
            list_state,
            results_state,
            input: Input::default(),
            level_history: Vec::new(),
            last_level_sample: Instant::now(),
            level_interval: Duration::from_millis(50),
        })
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    // --- program selection ---

    /// Renders the program-selection list.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_program_select(&mut self, programs: &[Program]) -> anyhow::Result<()> {
        let items: Vec<ListItem> = programs
            .iter()
            .map(|p| {
                let line = Line::from(vec![
                    Span::styled(p.name.clone(), Style::default().fg(FG)),
                    Span::raw("  "),
                    Span::styled(p.institution.clone(), Style::default().fg(DIM)),
                ]);
                ListItem::new(line)
            })
            .collect();

        let selected = self.list_state.selected().unwrap_or(0);
        let description = programs
            .get(selected)
            .map(|p| p.description.clone())
            .unwrap_or_default();
        let question_summary = programs
            .get(selected)
            .map(|p| {
                let spoken = p
                    .questions
                    .iter()
                    .filter(|q| q.kind == QuestionKind::Video)
                    .count();
                let written = p.questions.len() - spoken;
                format!("{spoken} spoken + {written} written questions")
            })
            .unwrap_or_default();

        let list_state = &mut self.list_state;
        self.terminal.draw(|frame| {
            let area = frame.area();
            fill_background(frame, area);

            let [title_area, list_area, detail_area, footer_area] = Layout::vertical([
                Constraint::Length(2),
                Constraint::Min(4),
                Constraint::Length(4),
                Constraint::Length(1),
            ])
            .areas(area);

            let title = Paragraph::new("Choose a program to practice")
                .style(Style::default().fg(ACCENT).bg(BG))
                .block(Block::default().padding(Padding::horizontal(1)));
            frame.render_widget(title, title_area);

            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(DIM)),
                )
                .style(Style::default().bg(BG))
                .highlight_style(Style::default().bg(HIGHLIGHT_BG).fg(ACCENT))
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, list_area, list_state);

            let detail = Paragraph::new(format!("{description}\n{question_summary}"))
                .style(Style::default().fg(DIM).bg(BG))
                .wrap(Wrap { trim: true })
                .block(Block::default().padding(Padding::horizontal(1)));
            frame.render_widget(detail, detail_area);

            render_help(frame, footer_area, "↑/↓ select · enter choose · q quit");
        })?;

        Ok(())
    }

    /// Processes input on the program-selection screen.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_select_input(&mut self, program_count: usize) -> anyhow::Result<SelectCommand> {
        if let Some(key) = poll_key()? {
            return Ok(match key.code {
                KeyCode::Char('q') | KeyCode::Esc => SelectCommand::Quit,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    SelectCommand::Quit
                }
                KeyCode::Up => {
                    self.list_state.select_previous();
                    SelectCommand::Continue
                }
                KeyCode::Down => {
                    self.list_state.select_next();
                    SelectCommand::Continue
                }
                KeyCode::Enter => match self.list_state.selected() {
                    Some(idx) if idx < program_count => SelectCommand::Choose(idx),
                    _ => SelectCommand::Continue,
                },
                _ => SelectCommand::Continue,
            });
        }
        Ok(SelectCommand::Continue)
    }

    // --- instructions / mic check ---

    /// Renders the instructions screen with the mic-check panel.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_instructions(
        &mut self,
        program: &Program,
        mic: &MicCheckView,
    ) -> anyhow::Result<()> {
        let spoken = program
            .questions
            .iter()
            .filter(|q| q.kind == QuestionKind::Video)
            .count();
        let written = program.questions.len() - spoken;

        let mic_line = if mic.granted {
            Line::from(vec![
                Span::styled("✓ Microphone ready", Style::default().fg(ACCENT)),
                Span::styled(
                    format!("   input level {:>3}%", mic.level),
                    Style::default().fg(DIM),
                ),
            ])
        } else {
            Line::from(Span::styled(
                "Microphone not checked yet — press m to request access",
                Style::default().fg(DIM),
            ))
        };

        let mut body = vec![
            Line::from(Span::styled(
                format!("You are about to begin the assessment for {}.", program.name),
                Style::default().fg(FG),
            )),
            Line::raw(""),
            Line::from(Span::styled(
                format!("{spoken} spoken questions — prep countdown, then a recorded answer."),
                Style::default().fg(FG),
            )),
            Line::from(Span::styled(
                format!("{written} written questions — typed answer, auto-submits when time is up."),
                Style::default().fg(FG),
            )),
            Line::raw(""),
            mic_line,
        ];

        if let Some(error) = mic.error {
            body.push(Line::raw(""));
            body.push(Line::from(Span::styled(
                format!("Could not access the microphone: {error}"),
                Style::default().fg(WARN),
            )));
            body.push(Line::from(Span::styled(
                "Check permissions and press m to retry.",
                Style::default().fg(WARN),
            )));
        }

        let begin_help = if mic.granted {
            "enter begin · m re-check mic · b back · q quit"
        } else {
            "m check mic · b back · q quit"
        };

        self.terminal.draw(|frame| {
            let area = frame.area();
            fill_background(frame, area);

            let [title_area, body_area, footer_area] = Layout::vertical([
                Constraint::Length(2),
                Constraint::Min(4),
                Constraint::Length(1),
            ])
            .areas(area);

            let title = Paragraph::new("Assessment instructions")
                .style(Style::default().fg(ACCENT).bg(BG))
                .block(Block::default().padding(Padding::horizontal(1)));
            frame.render_widget(title, title_area);

            let paragraph = Paragraph::new(body)
                .style(Style::default().bg(BG))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(DIM))
                        .padding(Padding::uniform(1)),
                );
            frame.render_widget(paragraph, body_area);

            render_help(frame, footer_area, begin_help);
        })?;

        Ok(())
    }

    /// Processes input on the instructions screen.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_instructions_input(&mut self) -> anyhow::Result<InstructionsCommand> {
        if let Some(key) = poll_key()? {
            return Ok(match key.code {
                KeyCode::Char('q') | KeyCode::Esc => InstructionsCommand::Quit,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    InstructionsCommand::Quit
                }
                KeyCode::Char('m') => InstructionsCommand::CheckMic,
                KeyCode::Char('b') => InstructionsCommand::Back,
                KeyCode::Enter => InstructionsCommand::Begin,
                _ => InstructionsCommand::Continue,
            });
        }
        Ok(InstructionsCommand::Continue)
    }

    // --- spoken question ---

    /// Feeds the current preview level into the sparkline history.
    pub fn push_level(&mut self, level: u8) {
        if self.last_level_sample.elapsed() >= self.level_interval {
            self.level_history.push(level as u64);
            let width = self.terminal.size().map(|s| s.width as usize).unwrap_or(80);
            if self.level_history.len() > width {
                let excess = self.level_history.len() - width;
                self.level_history.drain(..excess);
            }
            self.last_level_sample = Instant::now();
        }
    }

    /// Clears the level history between questions.
    pub fn reset_level_history(&mut self) {
        self.level_history.clear();
    }

    /// Renders the spoken-question screen for the current step.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_spoken(&mut self, view: &SpokenView) -> anyhow::Result<()> {
        let header = header_line(&view.header, Some((view.remaining.as_str(), view.warning)));
        let step_label = match view.step {
            SpokenStep::Prep => Line::from(vec![
                Span::styled("PREP", Style::default().fg(ACCENT)),
                Span::styled(
                    "  recording starts automatically when prep time ends",
                    Style::default().fg(DIM),
                ),
            ]),
            SpokenStep::Recording => Line::from(vec![
                Span::styled("● REC", Style::default().fg(WARN)),
                Span::styled("  answer out loud", Style::default().fg(DIM)),
            ]),
            SpokenStep::Review => Line::from(vec![
                Span::styled("REVIEW", Style::default().fg(ACCENT)),
                Span::styled(
                    format!(
                        "  recorded {:.1}s",
                        view.recorded_seconds.unwrap_or_default()
                    ),
                    Style::default().fg(DIM),
                ),
            ]),
        };

        let transcript_text = if !view.transcription_supported {
            "Transcription unavailable — configure a model with 'terview auth' to see a live transcript.".to_string()
        } else if view.transcript.is_empty() {
            if view.listening {
                "Listening...".to_string()
            } else {
                "No transcript yet.".to_string()
            }
        } else {
            view.transcript.to_string()
        };

        let help = match view.step {
            SpokenStep::Prep => "enter start recording now · q quit",
            SpokenStep::Recording => "enter stop recording · q quit",
            SpokenStep::Review => "enter submit · r discard and retry · p play back · q quit",
        };

        let level_history = self.level_history.clone();
        self.terminal.draw(|frame| {
            let area = frame.area();
            fill_background(frame, area);

            let [header_area, prompt_area, step_area, meter_area, transcript_area, footer_area] =
                Layout::vertical([
                    Constraint::Length(1),
                    Constraint::Length(4),
                    Constraint::Length(1),
                    Constraint::Length(5),
                    Constraint::Min(4),
                    Constraint::Length(1),
                ])
                .areas(area);

            frame.render_widget(
                Paragraph::new(header).style(Style::default().bg(BG)),
                header_area,
            );

            let prompt = Paragraph::new(view.prompt)
                .style(Style::default().fg(FG).bg(BG))
                .wrap(Wrap { trim: true })
                .block(Block::default().padding(Padding::new(1, 1, 1, 0)));
            frame.render_widget(prompt, prompt_area);

            frame.render_widget(
                Paragraph::new(step_label)
                    .style(Style::default().bg(BG))
                    .block(Block::default().padding(Padding::horizontal(1))),
                step_area,
            );

            // Level meter runs through prep and recording; frozen in review
            let sparkline = Sparkline::default()
                .data(&level_history)
                .max(100)
                .style(Style::default().bg(BG).fg(ACCENT));
            frame.render_widget(sparkline, meter_area);

            let transcript = Paragraph::new(transcript_text)
                .style(Style::default().fg(FG).bg(BG))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(DIM))
                        .title(" live transcript ")
                        .title_style(Style::default().fg(DIM))
                        .padding(Padding::horizontal(1)),
                );
            frame.render_widget(transcript, transcript_area);

            render_help(frame, footer_area, help);
        })?;

        Ok(())
    }

    /// Processes input on the spoken-question screen.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_spoken_input(&mut self, step: SpokenStep) -> anyhow::Result<SpokenCommand> {
        if let Some(key) = poll_key()? {
            return Ok(match (step, key.code) {
                (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => SpokenCommand::Quit,
                (_, KeyCode::Char('c')) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    SpokenCommand::Quit
                }
                (SpokenStep::Prep, KeyCode::Enter) => SpokenCommand::StartNow,
                (SpokenStep::Recording, KeyCode::Enter) => SpokenCommand::Stop,
                (SpokenStep::Review, KeyCode::Enter) => SpokenCommand::Submit,
                (SpokenStep::Review, KeyCode::Char('r')) => SpokenCommand::Retry,
                (SpokenStep::Review, KeyCode::Char('p')) => SpokenCommand::Play,
                _ => SpokenCommand::Continue,
            });
        }
        Ok(SpokenCommand::Continue)
    }

    // --- written question ---

    /// Clears the written-answer editor for a new question.
    pub fn reset_written_input(&mut self) {
        self.input = Input::default();
    }

    /// Current text in the written-answer editor.
    pub fn written_text(&self) -> &str {
        self.input.value()
    }

    /// Renders the written-question screen.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_written(&mut self, view: &WrittenView) -> anyhow::Result<()> {
        let header = header_line(&view.header, Some((view.remaining.as_str(), view.warning)));

        let submit_hint = if view.can_submit {
            "enter submit · esc quit"
        } else {
            "write at least one word to submit · esc quit"
        };
        let count_line = format!("Word count: {}", view.word_count);
        let text = self.input.value().to_string();

        self.terminal.draw(|frame| {
            let area = frame.area();
            fill_background(frame, area);

            let [header_area, prompt_area, editor_area, count_area, footer_area] =
                Layout::vertical([
                    Constraint::Length(1),
                    Constraint::Length(4),
                    Constraint::Min(5),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .areas(area);

            frame.render_widget(
                Paragraph::new(header).style(Style::default().bg(BG)),
                header_area,
            );

            let prompt = Paragraph::new(view.prompt)
                .style(Style::default().fg(FG).bg(BG))
                .wrap(Wrap { trim: true })
                .block(Block::default().padding(Padding::new(1, 1, 1, 0)));
            frame.render_widget(prompt, prompt_area);

            let editor = Paragraph::new(text)
                .style(Style::default().fg(FG).bg(BG))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(DIM))
                        .title(" your answer ")
                        .title_style(Style::default().fg(DIM))
                        .padding(Padding::horizontal(1)),
                );
            frame.render_widget(editor, editor_area);

            frame.render_widget(
                Paragraph::new(count_line)
                    .style(Style::default().fg(DIM).bg(BG))
                    .block(Block::default().padding(Padding::horizontal(1))),
                count_area,
            );

            render_help(frame, footer_area, submit_hint);
        })?;

        Ok(())
    }

    /// Processes input on the written-question screen. Printable keys edit
    /// the answer; Enter submits; Esc quits.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_written_input(&mut self) -> anyhow::Result<WrittenCommand> {
        if event::poll(Duration::from_millis(50))? {
            let ev = event::read()?;
            if let Event::Key(key) = &ev {
                match key.code {
                    KeyCode::Esc => return Ok(WrittenCommand::Quit),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(WrittenCommand::Quit)
                    }
                    KeyCode::Enter => return Ok(WrittenCommand::Submit),
                    _ => {}
                }
            }
            if self.input.handle_event(&ev).is_some() {
                return Ok(WrittenCommand::Edited);
            }
        }
        Ok(WrittenCommand::Continue)
    }

    // --- results ---

    /// Renders the results screen: response list plus detail of the selection.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_results(
        &mut self,
        program_name: &str,
        entries: &[ResultsEntry],
    ) -> anyhow::Result<()> {
        let items: Vec<ListItem> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let marker = match entry.kind {
                    QuestionKind::Video => "[spoken]",
                    QuestionKind::Written => "[written]",
                };
                let line = Line::from(vec![
                    Span::styled(format!("Q{} ", i + 1), Style::default().fg(ACCENT)),
                    Span::styled(marker, Style::default().fg(DIM)),
                    Span::raw(" "),
                    Span::styled(truncate(entry.prompt, 70), Style::default().fg(FG)),
                ]);
                ListItem::new(line)
            })
            .collect();

        let selected = self.results_state.selected().unwrap_or(0).min(entries.len().saturating_sub(1));
        let detail_text = entries
            .get(selected)
            .map(|entry| {
                let mut text = format!("{}\n\n{}\n", entry.summary, entry.detail);
                if entry.feedback_loading {
                    text.push_str("\nAnalyzing your response...");
                } else if let Some(feedback) = entry.feedback {
                    text.push_str("\n── AI feedback ──\n");
                    text.push_str(feedback);
                } else {
                    text.push_str("\nPress f for AI feedback on this answer.");
                }
                text
            })
            .unwrap_or_default();

        let results_state = &mut self.results_state;
        self.terminal.draw(|frame| {
            let area = frame.area();
            fill_background(frame, area);

            let [title_area, list_area, detail_area, footer_area] = Layout::vertical([
                Constraint::Length(2),
                Constraint::Length((entries.len() as u16 + 2).min(10)),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .areas(area);

            let title = Paragraph::new(format!(
                "Assessment completed — {program_name}. Your responses:"
            ))
            .style(Style::default().fg(ACCENT).bg(BG))
            .block(Block::default().padding(Padding::horizontal(1)));
            frame.render_widget(title, title_area);

            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(DIM)),
                )
                .style(Style::default().bg(BG))
                .highlight_style(Style::default().bg(HIGHLIGHT_BG).fg(ACCENT))
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, list_area, results_state);

            let detail = Paragraph::new(detail_text)
                .style(Style::default().fg(FG).bg(BG))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(DIM))
                        .padding(Padding::horizontal(1)),
                );
            frame.render_widget(detail, detail_area);

            render_help(
                frame,
                footer_area,
                "↑/↓ select · f feedback · r try another program · q quit",
            );
        })?;

        Ok(())
    }

    /// Processes input on the results screen.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_results_input(&mut self, entry_count: usize) -> anyhow::Result<ResultsCommand> {
        if let Some(key) = poll_key()? {
            return Ok(match key.code {
                KeyCode::Char('q') | KeyCode::Esc => ResultsCommand::Quit,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    ResultsCommand::Quit
                }
                KeyCode::Up => {
                    self.results_state.select_previous();
                    ResultsCommand::Continue
                }
                KeyCode::Down => {
                    self.results_state.select_next();
                    ResultsCommand::Continue
                }
                KeyCode::Char('f') => match self.results_state.selected() {
                    Some(idx) if idx < entry_count => ResultsCommand::Feedback(idx),
                    _ => ResultsCommand::Continue,
                },
                KeyCode::Char('r') => ResultsCommand::Restart,
                _ => ResultsCommand::Continue,
            });
        }
        Ok(ResultsCommand::Continue)
    }
}

impl Drop for PracticeTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Polls for a key event with the standard 50ms frame budget.
fn poll_key() -> anyhow::Result<Option<KeyEvent>> {
    if event::poll(Duration::from_millis(50))? {
        if let Event::Key(key) = event::read()? {
            return Ok(Some(key));
        }
    }
    Ok(None)
}

fn fill_background(frame: &mut Frame, area: Rect) {
    frame.render_widget(Block::default().style(Style::default().bg(BG)), area);
}

fn render_help(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text)
        .style(Style::default().fg(DIM).bg(BG))
        .block(Block::default().padding(Padding::horizontal(1)));
    frame.render_widget(help, area);
}

fn header_line<'a>(header: &QuestionHeader<'a>, timer: Option<(&'a str, bool)>) -> Line<'a> {
    let mut spans = vec![
        Span::styled(header.program_name, Style::default().fg(ACCENT)),
        Span::styled(
            format!("  Question {} of {}", header.index + 1, header.total),
            Style::default().fg(DIM),
        ),
    ];
    if let Some((remaining, warning)) = timer {
        let style = if warning {
            Style::default().fg(WARN)
        } else {
            Style::default().fg(FG)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("⏱ {remaining}"), style));
    }
    Line::from(spans)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
