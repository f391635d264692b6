//! Practice program catalog.
//!
//! Programs are immutable reference data loaded once at startup: an ordered
//! list of programs, each with an ordered list of timed questions. A built-in
//! catalog ships embedded in the binary; a user catalog file, when present,
//! replaces it entirely.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Built-in catalog, parsed on first load.
const BUILTIN_PROGRAMS: &str = include_str!("programs.toml");

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Answered out loud; the answer is recorded and transcribed
    Video,
    /// Answered as typed text against the clock
    Written,
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Written => write!(f, "written"),
        }
    }
}

/// A single timed interview question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique across the whole catalog; responses are keyed by it
    pub id: String,
    pub kind: QuestionKind,
    pub prompt: String,
    /// Preparation time before recording starts (video questions only)
    #[serde(default)]
    pub prep_seconds: Option<u32>,
    /// Maximum recording time (video) or writing time (written)
    pub max_seconds: u32,
}

/// An institution-specific assessment definition with an ordered question list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,
    pub institution: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
}

/// The full program catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub programs: Vec<Program>,
}

impl Catalog {
    /// Loads the catalog: the user override file if present, otherwise the
    /// built-in programs. The result is validated before use.
    ///
    /// # Errors
    /// - If the user catalog exists but cannot be read or parsed
    /// - If the catalog fails validation
    pub fn load() -> anyhow::Result<Self> {
        let catalog = match user_catalog_path() {
            Ok(path) if path.exists() => {
                tracing::info!("Loading user program catalog from {}", path.display());
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow!("Failed to read {}: {e}", path.display()))?;
                toml::from_str(&content)
                    .map_err(|e| anyhow!("Malformed program catalog {}: {e}", path.display()))?
            }
            _ => Self::builtin()?,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parses the embedded built-in catalog.
    pub fn builtin() -> anyhow::Result<Self> {
        toml::from_str(BUILTIN_PROGRAMS).map_err(|e| anyhow!("Built-in catalog is malformed: {e}"))
    }

    /// Finds a program by id.
    pub fn program(&self, id: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.id == id)
    }

    /// Validates catalog invariants: every program has at least one question,
    /// question ids are unique across the whole catalog, and timings are positive.
    ///
    /// # Errors
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.programs.is_empty() {
            return Err(anyhow!("Catalog contains no programs"));
        }

        let mut seen_ids: HashSet<&str> = HashSet::new();
        for program in &self.programs {
            if program.questions.is_empty() {
                return Err(anyhow!("Program '{}' has no questions", program.id));
            }
            for question in &program.questions {
                if !seen_ids.insert(question.id.as_str()) {
                    return Err(anyhow!(
                        "Duplicate question id '{}' (question ids must be unique across the catalog)",
                        question.id
                    ));
                }
                if question.max_seconds == 0 {
                    return Err(anyhow!(
                        "Question '{}' has a zero time limit",
                        question.id
                    ));
                }
                match question.kind {
                    QuestionKind::Video => {
                        if question.prep_seconds.unwrap_or(0) == 0 {
                            return Err(anyhow!(
                                "Video question '{}' is missing prep_seconds",
                                question.id
                            ));
                        }
                    }
                    QuestionKind::Written => {
                        if question.prep_seconds.is_some() {
                            return Err(anyhow!(
                                "Written question '{}' must not set prep_seconds",
                                question.id
                            ));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Path of the optional user catalog override.
fn user_catalog_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home.join(".config").join("terview").join("programs.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_parses_and_validates() {
        let catalog = Catalog::builtin().unwrap();
        catalog.validate().unwrap();
        assert!(catalog.program("waterloo-eng").is_some());
        assert!(catalog.program("no-such-program").is_none());
    }

    #[test]
    fn builtin_question_ids_are_unique() {
        let catalog = Catalog::builtin().unwrap();
        let mut ids = HashSet::new();
        for program in &catalog.programs {
            for question in &program.questions {
                assert!(ids.insert(question.id.clone()), "duplicate id {}", question.id);
            }
        }
    }

    #[test]
    fn validation_rejects_empty_program() {
        let catalog = Catalog {
            programs: vec![Program {
                id: "p1".into(),
                name: "P1".into(),
                institution: "U".into(),
                description: String::new(),
                questions: vec![],
            }],
        };
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn validation_rejects_duplicate_ids_across_programs() {
        let question = Question {
            id: "q1".into(),
            kind: QuestionKind::Written,
            prompt: "Prompt".into(),
            prep_seconds: None,
            max_seconds: 60,
        };
        let catalog = Catalog {
            programs: vec![
                Program {
                    id: "p1".into(),
                    name: "P1".into(),
                    institution: "U".into(),
                    description: String::new(),
                    questions: vec![question.clone()],
                },
                Program {
                    id: "p2".into(),
                    name: "P2".into(),
                    institution: "U".into(),
                    description: String::new(),
                    questions: vec![question],
                },
            ],
        };
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn validation_rejects_video_without_prep() {
        let catalog = Catalog {
            programs: vec![Program {
                id: "p1".into(),
                name: "P1".into(),
                institution: "U".into(),
                description: String::new(),
                questions: vec![Question {
                    id: "q1".into(),
                    kind: QuestionKind::Video,
                    prompt: "Prompt".into(),
                    prep_seconds: None,
                    max_seconds: 60,
                }],
            }],
        };
        assert!(catalog.validate().is_err());
    }
}
