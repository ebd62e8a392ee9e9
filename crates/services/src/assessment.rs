use std::sync::Arc;

use api::{ApiError, QuizOverview, QuizSource, SubmissionReceipt, SubmissionSink};
use exam_core::session::{Session, Submission, TickOutcome};
use exam_core::{Clock, model::QuizId};

use crate::error::AssessmentError;

/// Whether the sink accepted the frozen submission.
///
/// The session is `Submitted` in either case; a failed delivery only
/// means the student is offered an explicit resend.
#[derive(Debug)]
pub enum Delivery {
    Accepted(SubmissionReceipt),
    Failed(ApiError),
}

impl Delivery {
    #[must_use]
    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        match self {
            Self::Accepted(receipt) => Some(receipt),
            Self::Failed(_) => None,
        }
    }
}

/// Outcome of the one finalize a session performs.
#[derive(Debug)]
pub struct SubmitReport {
    pub auto_submitted: bool,
    pub delivery: Delivery,
}

/// What a service-driven tick did.
#[derive(Debug)]
pub enum TickReport {
    Running { remaining_secs: u32 },
    AutoSubmitted(SubmitReport),
    Idle,
}

/// Orchestrates a student's quiz attempt against the backend.
///
/// The core `Session` finalizes synchronously before any network call,
/// so the at-most-once guarantee never depends on request timing.
#[derive(Clone)]
pub struct AssessmentService {
    clock: Clock,
    quizzes: Arc<dyn QuizSource>,
    sink: Arc<dyn SubmissionSink>,
}

impl AssessmentService {
    #[must_use]
    pub fn new(clock: Clock, quizzes: Arc<dyn QuizSource>, sink: Arc<dyn SubmissionSink>) -> Self {
        Self {
            clock,
            quizzes,
            sink,
        }
    }

    /// The catalog of quizzes available to the student.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Api` for backend failures.
    pub async fn list_quizzes(&self) -> Result<Vec<QuizOverview>, AssessmentError> {
        Ok(self.quizzes.list_quizzes().await?)
    }

    /// Loads the quiz and opens a session over it.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Api` when the quiz cannot be loaded,
    /// `AssessmentError::Session` when it cannot back a session.
    pub async fn start(&self, quiz_id: QuizId) -> Result<Session, AssessmentError> {
        let quiz = self.quizzes.fetch_quiz(quiz_id).await?;
        let session = Session::start(quiz, self.clock.now())?;
        tracing::info!(
            quiz_id = %quiz_id,
            attempt_id = %session.attempt_id(),
            time_limit_secs = session.remaining_secs(),
            "assessment session opened"
        );
        Ok(session)
    }

    /// Confirms a requested submission and hands the frozen payload to
    /// the sink. `None` when the session was not awaiting confirmation
    /// (including when it is already submitted), so a double click is
    /// harmless.
    pub async fn confirm_submit(&self, session: &mut Session) -> Option<SubmitReport> {
        let submission = session.confirm_submit(self.clock.now())?;
        Some(self.deliver(submission).await)
    }

    /// Drives the session countdown by one second, delivering the
    /// submission if this tick expired the timer.
    pub async fn tick(&self, session: &mut Session) -> TickReport {
        match session.tick(self.clock.now()) {
            TickOutcome::Running { remaining_secs } => TickReport::Running { remaining_secs },
            TickOutcome::AutoSubmitted(submission) => {
                tracing::info!(
                    attempt_id = %submission.attempt_id,
                    "time limit reached, auto-submitting"
                );
                TickReport::AutoSubmitted(self.deliver(submission).await)
            }
            TickOutcome::Idle => TickReport::Idle,
        }
    }

    /// Explicit resend of the already-frozen payload after a delivery
    /// failure. A distinct user action, never an automatic retry.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::NotSubmitted` before finalize,
    /// `AssessmentError::Api` when the sink fails again.
    pub async fn resubmit(&self, session: &Session) -> Result<SubmissionReceipt, AssessmentError> {
        let submission = session.submission().ok_or(AssessmentError::NotSubmitted)?;
        Ok(self.sink.submit(&submission).await?)
    }

    async fn deliver(&self, submission: Submission) -> SubmitReport {
        let auto_submitted = submission.auto_submitted;
        let delivery = match self.sink.submit(&submission).await {
            Ok(receipt) => Delivery::Accepted(receipt),
            Err(err) => {
                tracing::warn!(
                    attempt_id = %submission.attempt_id,
                    error = %err,
                    "submission delivery failed; session stays submitted"
                );
                Delivery::Failed(err)
            }
        };
        SubmitReport {
            auto_submitted,
            delivery,
        }
    }
}
