use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use quiz_core::Clock;
use quiz_core::model::{Question, QuestionId, SubcategoryId};
use storage::repository::QuestionRepository;

use super::service::{EndReason, PlayMode, PlaySession};
use super::view::{PlayStep, PlaySummary, QuestionView, SubmitOutcome};
use crate::answer_service::AnswerService;
use crate::error::PlayError;

/// Parameters for starting a play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayRequest {
    pub subcategory_id: SubcategoryId,
    /// Number of questions to draw; ignored when `all_questions` is set.
    pub limit: u32,
    pub time_limit_minutes: u32,
    pub all_questions: bool,
    pub exam: bool,
}

/// One answer submitted by the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub question_id: QuestionId,
    pub subcategory_id: SubcategoryId,
    pub raw_answer: String,
}

/// A freshly created session and the first question to show.
#[derive(Debug)]
pub struct StartedPlay {
    pub session: PlaySession,
    pub step: PlayStep,
}

/// Drives play sessions: sampling, timing, evaluation and final scoring.
///
/// Holds no session state itself; callers own the `PlaySession` and pass it
/// back on every call.
#[derive(Clone)]
pub struct PlayService {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
    answers: AnswerService,
}

impl PlayService {
    #[must_use]
    pub fn new(clock: Clock, questions: Arc<dyn QuestionRepository>) -> Self {
        Self {
            clock,
            answers: AnswerService::new(Arc::clone(&questions)),
            questions,
        }
    }

    /// Draw the question queue and start a session.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Empty` if the subcategory yields no questions; no
    /// session is created in that case.
    /// Returns `PlayError::Storage` if sampling fails.
    pub async fn start(&self, request: PlayRequest) -> Result<StartedPlay, PlayError> {
        let limit = (!request.all_questions).then_some(request.limit);
        let sample = self
            .questions
            .sample_questions(request.subcategory_id, limit)
            .await?;

        let Some(first) = sample.first().map(QuestionView::from) else {
            info!(
                subcategory_id = %request.subcategory_id,
                "no questions to play"
            );
            return Err(PlayError::Empty);
        };

        let mode = PlayMode::from_exam_flag(request.exam);
        let session = PlaySession::new(
            request.subcategory_id,
            sample.iter().map(Question::id).collect(),
            mode,
            self.clock.now(),
            Duration::minutes(i64::from(request.time_limit_minutes)),
        )?;

        info!(
            subcategory_id = %request.subcategory_id,
            questions = session.queue().len(),
            ?mode,
            time_limit_minutes = request.time_limit_minutes,
            "play session started"
        );

        let step = PlayStep {
            question: Some(first),
            subcategory_id: request.subcategory_id,
            mode,
            remaining_secs: session.remaining_secs(session.started_at()),
            progress: session.progress(),
            result: None,
        };
        Ok(StartedPlay { session, step })
    }

    /// Record an answer and move to the next question or end the session.
    ///
    /// A submission arriving at or after the deadline is discarded and the
    /// session ends as timed out.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Completed` if the session already ended.
    /// Returns `PlayError::Storage` if evaluation or question lookup fails.
    pub async fn submit(
        &self,
        session: &mut PlaySession,
        submission: Submission,
    ) -> Result<SubmitOutcome, PlayError> {
        self.submit_at(session, submission, self.clock.now()).await
    }

    pub(crate) async fn submit_at(
        &self,
        session: &mut PlaySession,
        submission: Submission,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, PlayError> {
        if session.is_complete() {
            return Err(PlayError::Completed);
        }

        let remaining_secs = session.remaining_secs(now);
        if remaining_secs <= 0 {
            debug!(
                question_id = %submission.question_id,
                "submission after deadline discarded"
            );
            return self
                .finish(session, EndReason::Timeout)
                .await
                .map(SubmitOutcome::Finished);
        }

        if session.current_question_id() != Some(submission.question_id) {
            debug!(
                expected = ?session.current_question_id(),
                question_id = %submission.question_id,
                "answer submitted for a question other than the current one"
            );
        }

        let check = match session.mode() {
            PlayMode::Training => Some(
                self.answers
                    .evaluate(submission.question_id, &submission.raw_answer)
                    .await?,
            ),
            PlayMode::Exam => None,
        };
        session.record(
            submission.question_id,
            submission.raw_answer,
            check.as_ref(),
        )?;

        let Some(next_id) = session.current_question_id() else {
            return self
                .finish(session, EndReason::Exhausted)
                .await
                .map(SubmitOutcome::Finished);
        };

        let next = self.questions.get_question(next_id).await?;
        Ok(SubmitOutcome::Next(PlayStep {
            question: next.as_ref().map(QuestionView::from),
            subcategory_id: submission.subcategory_id,
            mode: session.mode(),
            remaining_secs,
            progress: session.progress(),
            result: check,
        }))
    }

    /// End the session on the learner's request (e.g. the client-side timer ran out).
    ///
    /// Reports a timeout if the deadline has passed. Finalizing a completed
    /// session returns its existing summary.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Storage` if exam re-scoring fails.
    pub async fn finalize(&self, session: &mut PlaySession) -> Result<PlaySummary, PlayError> {
        self.finalize_at(session, self.clock.now()).await
    }

    pub(crate) async fn finalize_at(
        &self,
        session: &mut PlaySession,
        now: DateTime<Utc>,
    ) -> Result<PlaySummary, PlayError> {
        if let Some(summary) = session.summary() {
            return Ok(summary);
        }
        let reason = if session.is_expired(now) {
            EndReason::Timeout
        } else if session.is_exhausted() {
            EndReason::Exhausted
        } else {
            EndReason::Stopped
        };
        self.finish(session, reason).await
    }

    /// The single terminal transition shared by every way a session ends.
    ///
    /// Training uses the running score; exam re-evaluates the whole answer log.
    async fn finish(
        &self,
        session: &mut PlaySession,
        reason: EndReason,
    ) -> Result<PlaySummary, PlayError> {
        let correct = match session.mode() {
            PlayMode::Training => session.score(),
            PlayMode::Exam => {
                let mut correct = 0_u32;
                for answer in session.answers() {
                    let check = self
                        .answers
                        .evaluate(answer.question_id, &answer.raw_answer)
                        .await?;
                    if check.correct {
                        correct = correct.saturating_add(1);
                    }
                }
                correct
            }
        };

        let summary = session.close(reason, correct);
        info!(
            subcategory_id = %session.subcategory_id(),
            mode = ?session.mode(),
            ?reason,
            attempts = summary.attempts,
            correct = summary.correct,
            "play session ended"
        );
        Ok(summary)
    }
}
