mod progress;
mod service;
mod view;
mod workflow;

// Public API of the play engine.
pub use crate::error::PlayError;
pub use progress::PlayProgress;
pub use service::{EndReason, PlayMode, PlaySession, RecordedAnswer};
pub use view::{OptionView, PlayStep, PlaySummary, QuestionView, SubmitOutcome};
pub use workflow::{PlayRequest, PlayService, StartedPlay, Submission};
