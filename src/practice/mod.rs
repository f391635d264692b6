//! Interactive practice session UI.

pub mod ui;

pub use ui::{
    InstructionsCommand, MicCheckView, PracticeTui, QuestionHeader, ResultsCommand, ResultsEntry,
    SelectCommand, SpokenCommand, SpokenView, WrittenCommand, WrittenView,
};
