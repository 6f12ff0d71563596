//! Answer normalization and comparison.
//!
//! Answers are compared on their canonical form: uppercased, with whitespace
//! and brackets removed and every multiplication sign spelled `X`. There is no
//! partial credit and no fuzzy or numeric tolerance.

use serde::Serialize;

use crate::model::Question;

const DROPPED: [char; 4] = ['(', ')', '[', ']'];
const MULTIPLICATION_SIGNS: [char; 3] = ['*', '·', '×'];
const CANONICAL_MULTIPLICATION: char = 'X';

/// Canonical form of an answer. `None` and `""` both normalize to `""`.
///
/// The result is idempotent: `normalize(normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize<'a>(text: impl Into<Option<&'a str>>) -> String {
    let Some(text) = text.into() else {
        return String::new();
    };

    text.to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace() && !DROPPED.contains(c))
        .map(|c| {
            if MULTIPLICATION_SIGNS.contains(&c) {
                CANONICAL_MULTIPLICATION
            } else {
                c
            }
        })
        .collect()
}

/// Outcome of checking one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerCheck {
    pub correct: bool,
    /// The stored answer, verbatim. `None` only when the question does not exist.
    pub expected: Option<String>,
}

impl AnswerCheck {
    /// Compare `raw_answer` with the stored answer of `question`.
    ///
    /// A missing question is always incorrect and discloses no expected answer.
    #[must_use]
    pub fn evaluate(question: Option<&Question>, raw_answer: &str) -> Self {
        match question {
            None => Self {
                correct: false,
                expected: None,
            },
            Some(question) => Self {
                correct: normalize(question.answer()) == normalize(raw_answer),
                expected: Some(question.answer().to_owned()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, SubcategoryId};

    fn question(answer: &str) -> Question {
        Question::new(QuestionId::new(1), SubcategoryId::new(1), "Q", answer).unwrap()
    }

    #[test]
    fn empty_and_missing_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(None::<&str>), "");
    }

    #[test]
    fn multiplication_variants_are_unified() {
        assert_eq!(normalize("2 * 3"), "2X3");
        assert_eq!(normalize("2×3"), "2X3");
        assert_eq!(normalize("2·3"), "2X3");
        assert_eq!(normalize("2x3"), "2X3");
    }

    #[test]
    fn brackets_and_whitespace_are_deleted() {
        assert_eq!(normalize("(A+B)"), "A+B");
        assert_eq!(normalize("[a + b]\t\n"), "A+B");
        assert_eq!(normalize("4 2"), "42");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "  (x + 1) * [y - 2] ",
            "straße",
            "3·4×5*6",
            "\tMixed Case\nLines",
            "ﬁ ligature",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(once.as_str()), once, "sample: {sample:?}");
        }
    }

    #[test]
    fn missing_question_is_incorrect_without_expected() {
        let check = AnswerCheck::evaluate(None, "42");
        assert_eq!(
            check,
            AnswerCheck {
                correct: false,
                expected: None
            }
        );
    }

    #[test]
    fn equivalent_spellings_are_correct() {
        let q = question("42");
        for given in ["42", " 42 ", "4 2", "(42)"] {
            let check = AnswerCheck::evaluate(Some(&q), given);
            assert!(check.correct, "given: {given:?}");
            assert_eq!(check.expected.as_deref(), Some("42"));
        }
    }

    #[test]
    fn wrong_answer_discloses_original_expected_text() {
        let q = question("2 * x");
        let check = AnswerCheck::evaluate(Some(&q), "43");
        assert!(!check.correct);
        assert_eq!(check.expected.as_deref(), Some("2 * x"));
    }
}
