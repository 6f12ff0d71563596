use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

use quiz_core::AnswerCheck;
use quiz_core::model::{QuestionId, SubcategoryId};
use quiz_core::time::seconds_until;

use super::progress::PlayProgress;
use super::view::PlaySummary;
use crate::error::PlayError;

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

/// Scoring strategy of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Each answer is checked immediately and feedback is returned.
    Training,
    /// Answers are only stored; scoring happens once the session ends.
    Exam,
}

impl PlayMode {
    #[must_use]
    pub fn from_exam_flag(exam: bool) -> Self {
        if exam { Self::Exam } else { Self::Training }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The deadline passed before the next submission.
    Timeout,
    /// Every queued question was answered.
    Exhausted,
    /// The learner ended the session before the deadline.
    Stopped,
}

/// One accepted submission, stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAnswer {
    pub question_id: QuestionId,
    pub raw_answer: String,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State of one timed play over a fixed question queue.
///
/// The queue, mode and deadline never change after creation. `position` only
/// moves forward and always equals `answers().len()`. Once a summary has been
/// produced the session is complete and rejects further answers.
pub struct PlaySession {
    subcategory_id: SubcategoryId,
    queue: Vec<QuestionId>,
    position: usize,
    mode: PlayMode,
    started_at: DateTime<Utc>,
    deadline: DateTime<Utc>,
    score: u32,
    answers: Vec<RecordedAnswer>,
    ended: Option<(EndReason, PlaySummary)>,
}

impl PlaySession {
    /// Create a session over `queue`, answerable until `started_at + time_limit`.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Empty` if the queue is empty.
    pub fn new(
        subcategory_id: SubcategoryId,
        queue: Vec<QuestionId>,
        mode: PlayMode,
        started_at: DateTime<Utc>,
        time_limit: Duration,
    ) -> Result<Self, PlayError> {
        if queue.is_empty() {
            return Err(PlayError::Empty);
        }

        Ok(Self {
            subcategory_id,
            queue,
            position: 0,
            mode,
            started_at,
            deadline: started_at + time_limit,
            score: 0,
            answers: Vec::new(),
            ended: None,
        })
    }

    #[must_use]
    pub fn subcategory_id(&self) -> SubcategoryId {
        self.subcategory_id
    }

    #[must_use]
    pub fn queue(&self) -> &[QuestionId] {
        &self.queue
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Running count of correct answers. Only maintained in training mode.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn answers(&self) -> &[RecordedAnswer] {
        &self.answers
    }

    /// Whole seconds left before the deadline; `<= 0` once it has passed.
    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        seconds_until(self.deadline, now)
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) <= 0
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.queue.len()
    }

    /// True once a summary has been produced.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.ended.is_some()
    }

    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        self.ended.map(|(reason, _)| reason)
    }

    #[must_use]
    pub fn summary(&self) -> Option<PlaySummary> {
        self.ended.map(|(_, summary)| summary)
    }

    #[must_use]
    pub fn current_question_id(&self) -> Option<QuestionId> {
        self.queue.get(self.position).copied()
    }

    #[must_use]
    pub fn progress(&self) -> PlayProgress {
        PlayProgress::at(self.position, self.queue.len())
    }

    /// Number of submissions recorded so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        u32::try_from(self.answers.len()).unwrap_or(u32::MAX)
    }

    /// Append a submission and advance. `check` is the immediate evaluation in
    /// training mode and `None` in exam mode.
    pub(crate) fn record(
        &mut self,
        question_id: QuestionId,
        raw_answer: String,
        check: Option<&AnswerCheck>,
    ) -> Result<(), PlayError> {
        if self.is_complete() || self.is_exhausted() {
            return Err(PlayError::Completed);
        }

        self.answers.push(RecordedAnswer {
            question_id,
            raw_answer,
        });
        if check.is_some_and(|c| c.correct) {
            self.score = self.score.saturating_add(1);
        }
        self.position += 1;
        Ok(())
    }

    /// Mark the session complete with the given final score.
    pub(crate) fn close(&mut self, reason: EndReason, correct: u32) -> PlaySummary {
        let summary = PlaySummary {
            attempts: self.attempts(),
            correct,
            timeout: reason == EndReason::Timeout,
        };
        self.ended = Some((reason, summary));
        summary
    }
}

impl fmt::Debug for PlaySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaySession")
            .field("subcategory_id", &self.subcategory_id)
            .field("queue_len", &self.queue.len())
            .field("position", &self.position)
            .field("mode", &self.mode)
            .field("deadline", &self.deadline)
            .field("score", &self.score)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
