//! Session-scoped assessment state and the flow controller that owns it.

pub mod flow;
pub mod state;

pub use flow::FlowController;
pub use state::{AssessmentSession, Phase, Response, ResponseBody};
