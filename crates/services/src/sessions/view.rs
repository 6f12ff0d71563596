use serde::Serialize;

use quiz_core::AnswerCheck;
use quiz_core::model::{OptionId, Question, QuestionId, SubcategoryId};

use super::progress::PlayProgress;
use super::service::PlayMode;

/// A question as shown to a learner. Option correctness is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub statement: String,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub id: OptionId,
    pub text: String,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id(),
            statement: question.statement().to_owned(),
            options: question
                .options()
                .iter()
                .map(|o| OptionView {
                    id: o.id(),
                    text: o.text().to_owned(),
                })
                .collect(),
        }
    }
}

/// The next question to answer, with timing and progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayStep {
    /// `None` if the queued question was deleted after the session started.
    pub question: Option<QuestionView>,
    pub subcategory_id: SubcategoryId,
    pub mode: PlayMode,
    pub remaining_secs: i64,
    pub progress: PlayProgress,
    /// Feedback on the previous answer; training mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnswerCheck>,
}

/// Final score of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaySummary {
    pub attempts: u32,
    pub correct: u32,
    pub timeout: bool,
}

/// Response to a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Next(PlayStep),
    Finished(PlaySummary),
}

impl SubmitOutcome {
    #[must_use]
    pub fn summary(&self) -> Option<&PlaySummary> {
        match self {
            SubmitOutcome::Finished(summary) => Some(summary),
            SubmitOutcome::Next(_) => None,
        }
    }

    #[must_use]
    pub fn step(&self) -> Option<&PlayStep> {
        match self {
            SubmitOutcome::Next(step) => Some(step),
            SubmitOutcome::Finished(_) => None,
        }
    }
}
