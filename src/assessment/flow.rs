//! Flow controller: the only writer of assessment session state.
//!
//! Each transition is atomic and total: preconditions are checked up front
//! and the state is either fully updated or untouched. Precondition failures
//! are programming errors in the calling shell, surfaced as errors rather
//! than silently ignored.

use crate::assessment::state::{AssessmentSession, Phase, Response, ResponseBody};
use crate::catalog::Program;
use anyhow::{anyhow, bail};
use chrono::Utc;

/// Owns the assessment session and applies the named transitions.
#[derive(Debug, Default)]
pub struct FlowController {
    session: AssessmentSession,
}

impl FlowController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the session for the presentation shell.
    pub fn session(&self) -> &AssessmentSession {
        &self.session
    }

    /// Selects a program and moves to the instructions phase.
    pub fn select_program(&mut self, program: Program) {
        tracing::info!("Program selected: {} ({})", program.name, program.id);
        self.session.program = Some(program);
        self.session.phase = Phase::Instructions;
    }

    /// Begins the assessment at the first question.
    ///
    /// # Errors
    /// - If no program has been selected
    pub fn start_assessment(&mut self) -> anyhow::Result<()> {
        if self.session.program.is_none() {
            bail!("Cannot start an assessment before a program is selected");
        }
        tracing::info!("Assessment started");
        self.session.phase = Phase::InProgress;
        self.session.question_index = 0;
        Ok(())
    }

    /// Records a response for the given question id, replacing any previous
    /// submission for that id.
    ///
    /// # Errors
    /// - If the assessment is not in progress
    /// - If the question index is out of range
    pub fn save_response(&mut self, response: Response) -> anyhow::Result<()> {
        if self.session.phase != Phase::InProgress {
            bail!("Cannot save a response outside an in-progress assessment");
        }
        if self.session.question_index >= self.session.questions().len() {
            bail!(
                "Question index {} out of range ({} questions)",
                self.session.question_index,
                self.session.questions().len()
            );
        }
        tracing::debug!("Response saved for question '{}'", response.question_id);
        self.session
            .responses
            .insert(response.question_id.clone(), response);
        Ok(())
    }

    /// Advances to the next question.
    ///
    /// # Errors
    /// - If the current question is already the last one
    pub fn next_question(&mut self) -> anyhow::Result<()> {
        let last_index = self
            .session
            .questions()
            .len()
            .checked_sub(1)
            .ok_or_else(|| anyhow!("No questions to advance through"))?;
        if self.session.question_index >= last_index {
            bail!("Already at the last question");
        }
        self.session.question_index += 1;
        tracing::debug!(
            "Advanced to question {}/{}",
            self.session.question_index + 1,
            self.session.questions().len()
        );
        Ok(())
    }

    /// Marks the assessment finished.
    ///
    /// # Errors
    /// - If the last question has not been answered yet
    pub fn finish_assessment(&mut self) -> anyhow::Result<()> {
        let last_answered = self
            .session
            .questions()
            .last()
            .map(|q| self.session.responses.contains_key(&q.id))
            .unwrap_or(false);
        if !last_answered {
            bail!("Cannot finish before the last question is answered");
        }
        tracing::info!(
            "Assessment finished: {} responses",
            self.session.responses.len()
        );
        self.session.phase = Phase::Finished;
        Ok(())
    }

    /// Resets the session to its initial defaults.
    pub fn reset(&mut self) {
        tracing::info!("Session reset");
        self.session = AssessmentSession::default();
    }

    /// Applies the completion policy for the current question: save the
    /// response first, then advance the pointer or finish. The save-first
    /// ordering guarantees a response is durably recorded before the question
    /// pointer moves, so none can be skipped.
    ///
    /// # Errors
    /// - If there is no current question
    /// - If any applied transition's precondition fails
    pub fn complete_current_question(&mut self, body: ResponseBody) -> anyhow::Result<()> {
        let question = self
            .session
            .current_question()
            .ok_or_else(|| anyhow!("No current question to complete"))?;

        let response = Response {
            question_id: question.id.clone(),
            prompt: question.prompt.clone(),
            completed_at: Utc::now(),
            body,
        };

        let is_last = self.session.is_last_question();
        self.save_response(response)?;
        if is_last {
            self.finish_assessment()
        } else {
            self.next_question()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Program, Question, QuestionKind};

    fn written_question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            kind: QuestionKind::Written,
            prompt: format!("Prompt for {id}"),
            prep_seconds: None,
            max_seconds: 5,
        }
    }

    fn program(questions: Vec<Question>) -> Program {
        Program {
            id: "test-program".into(),
            name: "Test Program".into(),
            institution: "Test University".into(),
            description: String::new(),
            questions,
        }
    }

    fn written_body(text: &str) -> ResponseBody {
        ResponseBody::Written {
            text: text.to_string(),
            word_count: text.split_whitespace().count(),
        }
    }

    #[test]
    fn select_program_moves_to_instructions() {
        let mut flow = FlowController::new();
        assert_eq!(flow.session().phase(), Phase::Landing);

        flow.select_program(program(vec![written_question("q1")]));
        assert_eq!(flow.session().phase(), Phase::Instructions);
        assert_eq!(flow.session().questions().len(), 1);
    }

    #[test]
    fn start_requires_a_selected_program() {
        let mut flow = FlowController::new();
        assert!(flow.start_assessment().is_err());

        flow.select_program(program(vec![written_question("q1")]));
        flow.start_assessment().unwrap();
        assert_eq!(flow.session().phase(), Phase::InProgress);
        assert_eq!(flow.session().question_index(), 0);
    }

    #[test]
    fn save_response_rejects_out_of_phase_writes() {
        let mut flow = FlowController::new();
        flow.select_program(program(vec![written_question("q1")]));

        let response = Response {
            question_id: "q1".into(),
            prompt: "Prompt".into(),
            completed_at: Utc::now(),
            body: written_body("hello"),
        };
        // Still in instructions: saving is an invariant violation
        assert!(flow.save_response(response).is_err());
    }

    #[test]
    fn next_question_stops_at_the_last() {
        let mut flow = FlowController::new();
        flow.select_program(program(vec![written_question("q1"), written_question("q2")]));
        flow.start_assessment().unwrap();

        flow.next_question().unwrap();
        assert_eq!(flow.session().question_index(), 1);
        assert!(flow.next_question().is_err());
    }

    #[test]
    fn completion_saves_then_advances_and_finishes() {
        let mut flow = FlowController::new();
        flow.select_program(program(vec![
            written_question("q1"),
            written_question("q2"),
            written_question("q3"),
        ]));
        flow.start_assessment().unwrap();

        flow.complete_current_question(written_body("one")).unwrap();
        assert_eq!(flow.session().question_index(), 1);
        assert_eq!(flow.session().phase(), Phase::InProgress);

        flow.complete_current_question(written_body("two")).unwrap();
        flow.complete_current_question(written_body("three")).unwrap();

        let session = flow.session();
        assert_eq!(session.phase(), Phase::Finished);
        assert_eq!(session.responses().len(), 3);
        for id in ["q1", "q2", "q3"] {
            let response = session.response(id).expect("response recorded");
            assert_eq!(response.question_id, id);
            assert_eq!(response.prompt, format!("Prompt for {id}"));
        }
    }

    #[test]
    fn finish_requires_the_last_question_answered() {
        let mut flow = FlowController::new();
        flow.select_program(program(vec![written_question("q1"), written_question("q2")]));
        flow.start_assessment().unwrap();
        assert!(flow.finish_assessment().is_err());
    }

    #[test]
    fn resubmission_overwrites_by_question_id() {
        let mut flow = FlowController::new();
        flow.select_program(program(vec![written_question("q1")]));
        flow.start_assessment().unwrap();

        let first = Response {
            question_id: "q1".into(),
            prompt: "Prompt".into(),
            completed_at: Utc::now(),
            body: written_body("first"),
        };
        let second = Response {
            body: written_body("second take"),
            ..first.clone()
        };
        flow.save_response(first).unwrap();
        flow.save_response(second).unwrap();

        let session = flow.session();
        assert_eq!(session.responses().len(), 1);
        assert_eq!(
            session.response("q1").unwrap().body.analysis_text(),
            "second take"
        );
    }

    #[test]
    fn reset_restores_initial_defaults() {
        let mut flow = FlowController::new();
        flow.select_program(program(vec![written_question("q1")]));
        flow.start_assessment().unwrap();
        flow.complete_current_question(written_body("answer")).unwrap();
        assert_eq!(flow.session().phase(), Phase::Finished);

        flow.reset();
        assert_eq!(*flow.session(), AssessmentSession::default());
    }

    #[test]
    fn two_written_questions_end_to_end() {
        // q1 submitted manually with content, q2 auto-submitted empty.
        let mut flow = FlowController::new();
        flow.select_program(program(vec![written_question("q1"), written_question("q2")]));
        flow.start_assessment().unwrap();

        let mut q1 = crate::capture::WrittenCapture::new(5, 30);
        q1.set_text("hello world");
        let answer = q1.submit().unwrap();
        flow.complete_current_question(ResponseBody::Written {
            text: answer.text,
            word_count: answer.word_count,
        })
        .unwrap();

        assert_eq!(flow.session().question_index(), 1);
        match &flow.session().response("q1").unwrap().body {
            ResponseBody::Written { text, word_count } => {
                assert_eq!(text, "hello world");
                assert_eq!(*word_count, 2);
            }
            other => panic!("unexpected body: {other:?}"),
        }

        let mut q2 = crate::capture::WrittenCapture::new(5, 30);
        let answer = loop {
            if let Some(answer) = q2.tick_second() {
                break answer;
            }
        };
        flow.complete_current_question(ResponseBody::Written {
            text: answer.text,
            word_count: answer.word_count,
        })
        .unwrap();

        let session = flow.session();
        assert_eq!(session.phase(), Phase::Finished);
        match &session.response("q2").unwrap().body {
            ResponseBody::Written { text, word_count } => {
                assert_eq!(text, "");
                assert_eq!(*word_count, 0);
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }
}
