use std::sync::Arc;

use quiz_core::AnswerCheck;
use quiz_core::model::QuestionId;
use storage::repository::{QuestionRepository, StorageError};

/// Checks submitted answers against the stored expected answers.
#[derive(Clone)]
pub struct AnswerService {
    questions: Arc<dyn QuestionRepository>,
}

impl AnswerService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    /// Evaluate `raw_answer` for the given question.
    ///
    /// An unknown question id yields `{ correct: false, expected: None }`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be loaded.
    pub async fn evaluate(
        &self,
        question_id: QuestionId,
        raw_answer: &str,
    ) -> Result<AnswerCheck, StorageError> {
        let question = self.questions.get_question(question_id).await?;
        Ok(AnswerCheck::evaluate(question.as_ref(), raw_answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{CategoryDraft, QuestionDraft, SubcategoryDraft};
    use storage::repository::{
        CategoryRepository, InMemoryRepository, QuestionRepository, SubcategoryRepository,
    };

    async fn store_with_answer(answer: &str) -> (InMemoryRepository, QuestionId) {
        let repo = InMemoryRepository::new();
        let cat = repo
            .insert_category(CategoryDraft::new("Math"))
            .await
            .unwrap();
        let sub = repo
            .insert_subcategory(SubcategoryDraft::new(cat, "Numbers"))
            .await
            .unwrap();
        let id = repo
            .insert_question(QuestionDraft {
                subcategory_id: sub,
                statement: "6 * 7".into(),
                answer: answer.into(),
            })
            .await
            .unwrap();
        (repo, id)
    }

    #[tokio::test]
    async fn unknown_question_has_no_expected_answer() {
        let service = AnswerService::new(Arc::new(InMemoryRepository::new()));
        let check = service.evaluate(QuestionId::new(7), "42").await.unwrap();
        assert!(!check.correct);
        assert_eq!(check.expected, None);
    }

    #[tokio::test]
    async fn stored_answer_is_compared_after_normalization() {
        let (repo, id) = store_with_answer("42").await;
        let service = AnswerService::new(Arc::new(repo));

        for given in ["42", " 42 ", "4 2"] {
            let check = service.evaluate(id, given).await.unwrap();
            assert!(check.correct, "given: {given:?}");
        }

        let wrong = service.evaluate(id, "43").await.unwrap();
        assert!(!wrong.correct);
        assert_eq!(wrong.expected.as_deref(), Some("42"));
    }
}
