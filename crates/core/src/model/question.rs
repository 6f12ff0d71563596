use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId, SubcategoryId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question statement cannot be empty")]
    EmptyStatement,

    #[error("question answer cannot be empty")]
    EmptyAnswer,

    #[error("option text cannot be empty")]
    EmptyOptionText,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A question with its expected answer and optional multiple-choice options.
///
/// The statement may carry markup (e.g. LaTeX) and is stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    id: QuestionId,
    subcategory_id: SubcategoryId,
    statement: String,
    answer: String,
    options: Vec<QuestionOption>,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuestionError` if the statement or answer is blank.
    pub fn new(
        id: QuestionId,
        subcategory_id: SubcategoryId,
        statement: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let statement = statement.into();
        let answer = answer.into();
        Self::validate_text(&statement, &answer)?;
        Ok(Self {
            id,
            subcategory_id,
            statement,
            answer,
            options: Vec::new(),
        })
    }

    /// Attach options, ordered by id.
    #[must_use]
    pub fn with_options(mut self, mut options: Vec<QuestionOption>) -> Self {
        options.sort_by_key(QuestionOption::id);
        self.options = options;
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn subcategory_id(&self) -> SubcategoryId {
        self.subcategory_id
    }

    #[must_use]
    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// The expected answer exactly as it was stored.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }
}

impl Question {
    /// Check the editable text of a question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the statement or answer is blank.
    pub fn validate_text(statement: &str, answer: &str) -> Result<(), QuestionError> {
        if statement.trim().is_empty() {
            return Err(QuestionError::EmptyStatement);
        }
        if answer.trim().is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }
        Ok(())
    }
}

/// Unsaved question; also used as the payload for updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub subcategory_id: SubcategoryId,
    pub statement: String,
    pub answer: String,
}

impl QuestionDraft {
    /// # Errors
    ///
    /// Returns `QuestionError` if the statement or answer is blank.
    pub fn validate(self) -> Result<Self, QuestionError> {
        Question::validate_text(&self.statement, &self.answer)?;
        Ok(self)
    }
}

//
// ─── OPTIONS ───────────────────────────────────────────────────────────────────
//

/// One multiple-choice alternative of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionOption {
    id: OptionId,
    question_id: QuestionId,
    text: String,
    is_correct: bool,
}

impl QuestionOption {
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyOptionText` if the text is blank.
    pub fn new(
        id: OptionId,
        question_id: QuestionId,
        text: impl Into<String>,
        is_correct: bool,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyOptionText);
        }
        Ok(Self {
            id,
            question_id,
            text,
            is_correct,
        })
    }

    #[must_use]
    pub fn id(&self) -> OptionId {
        self.id
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDraft {
    pub question_id: QuestionId,
    pub text: String,
    pub is_correct: bool,
}

impl OptionDraft {
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyOptionText` if the text is blank.
    pub fn validate(self) -> Result<Self, QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyOptionText);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: u64, text: &str) -> QuestionOption {
        QuestionOption::new(OptionId::new(id), QuestionId::new(1), text, false).unwrap()
    }

    #[test]
    fn blank_answer_is_rejected() {
        let err = Question::new(QuestionId::new(1), SubcategoryId::new(1), "2+2?", " \n")
            .unwrap_err();
        assert_eq!(err, QuestionError::EmptyAnswer);
    }

    #[test]
    fn statement_is_kept_verbatim() {
        let q = Question::new(QuestionId::new(1), SubcategoryId::new(1), " $x^2$ ", "4").unwrap();
        assert_eq!(q.statement(), " $x^2$ ");
    }

    #[test]
    fn options_are_ordered_by_id() {
        let q = Question::new(QuestionId::new(1), SubcategoryId::new(1), "Pick", "B")
            .unwrap()
            .with_options(vec![option(3, "C"), option(1, "A"), option(2, "B")]);
        let texts: Vec<_> = q.options().iter().map(QuestionOption::text).collect();
        assert_eq!(texts, ["A", "B", "C"]);
    }
}
