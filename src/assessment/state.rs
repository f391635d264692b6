//! Assessment session state.
//!
//! One session exists per process run. It owns all response data for the run
//! and is mutated only through the flow controller's transitions; everything
//! else reads it through `&` accessors.

use crate::capture::Artifact;
use crate::catalog::{Program, Question};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Coarse session-level stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Program selection
    #[default]
    Landing,
    /// Instructions and microphone check for the selected program
    Instructions,
    /// Answering questions
    InProgress,
    /// All questions answered; results available
    Finished,
}

/// Kind-specific content of a submitted response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Recorded spoken answer with its transcript (possibly empty or partial
    /// when transcription was unavailable or failed)
    Spoken {
        artifact: Artifact,
        transcript: String,
    },
    /// Typed answer with its derived word count
    Written { text: String, word_count: usize },
}

impl ResponseBody {
    /// The text a feedback request would analyze: transcript for spoken
    /// answers, the answer itself for written ones.
    pub fn analysis_text(&self) -> &str {
        match self {
            ResponseBody::Spoken { transcript, .. } => transcript,
            ResponseBody::Written { text, .. } => text,
        }
    }
}

/// A submitted response, produced exactly once per question presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub question_id: String,
    /// Denormalized copy of the originating question's prompt
    pub prompt: String,
    pub completed_at: DateTime<Utc>,
    pub body: ResponseBody,
}

/// The single owner of all response data for the run.
///
/// Created with all-empty defaults at process start; mutated only by the
/// flow controller; fully reset to defaults by the restart action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentSession {
    pub(super) program: Option<Program>,
    pub(super) question_index: usize,
    pub(super) responses: HashMap<String, Response>,
    pub(super) phase: Phase,
}

impl AssessmentSession {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    /// The selected program's ordered question list (empty before selection).
    pub fn questions(&self) -> &[Question] {
        self.program
            .as_ref()
            .map(|p| p.questions.as_slice())
            .unwrap_or(&[])
    }

    /// 0-based index of the question currently being answered.
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions().get(self.question_index)
    }

    pub fn is_last_question(&self) -> bool {
        let questions = self.questions();
        !questions.is_empty() && self.question_index == questions.len() - 1
    }

    pub fn responses(&self) -> &HashMap<String, Response> {
        &self.responses
    }

    pub fn response(&self, question_id: &str) -> Option<&Response> {
        self.responses.get(question_id)
    }
}
