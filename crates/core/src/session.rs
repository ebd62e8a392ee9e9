use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{
    Answer, AnswerStore, AnswerValue, AttemptId, FlagTracker, OptionId, QuestionId, QuestionKind,
    Quiz, QuizId,
};
use crate::timer::{CountdownTimer, TimerError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Programming errors only. A quiz/session mismatch indicates a caller
/// bug, so these fail loudly in development and are never shown to the
/// student. Invalid state transitions are not errors at all; they are
/// silent no-ops, which is what makes double submission safe.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("question {id} is not part of the active quiz")]
    UnknownQuestion { id: QuestionId },

    #[error("option {option} does not belong to question {question}")]
    UnknownOption {
        question: QuestionId,
        option: OptionId,
    },

    #[error("answer value does not match the kind of question {question}")]
    KindMismatch { question: QuestionId },

    #[error(transparent)]
    Timer(#[from] TimerError),
}

//
// ─── STATUS & SUBMISSION ───────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Answering and flagging are live; the countdown runs.
    InProgress,
    /// The student asked to submit and is reviewing the summary.
    ConfirmingSubmission,
    /// Terminal. Answers and flags are frozen read-only.
    Submitted,
}

/// Frozen payload handed to the submission sink at finalize time.
///
/// Built exactly once per session; `Session::submission()` returns the
/// identical payload afterwards so a resubmission (a distinct user
/// action, not a retry of the transition) re-sends the same data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub attempt_id: AttemptId,
    pub quiz_id: QuizId,
    /// Answers in quiz display order.
    pub answers: Vec<Answer>,
    pub flagged: Vec<QuestionId>,
    pub submitted_at: DateTime<Utc>,
    /// True when expiry forced the submission.
    pub auto_submitted: bool,
}

/// What a 1 Hz tick did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown still running.
    Running { remaining_secs: u32 },
    /// This tick hit zero and forced the finalize.
    AutoSubmitted(Submission),
    /// Timer already expired or stopped; nothing happened.
    Idle,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One student's attempt at one quiz, from open to finalize.
///
/// Owns the answer store, the flag set and the countdown exclusively;
/// every mutation flows through these methods. The caller must
/// serialize timer ticks with user operations (single logical thread
/// per session), which the UI does by funnelling both through one
/// owned value.
#[derive(Debug, Clone)]
pub struct Session {
    attempt_id: AttemptId,
    quiz: Quiz,
    answers: AnswerStore,
    flags: FlagTracker,
    timer: CountdownTimer,
    status: SessionStatus,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
    auto_submitted: bool,
}

impl Session {
    /// Opens a session over a fully loaded quiz and starts the countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Timer` when the quiz carries a zero time
    /// limit (prevented upstream by `Quiz::new`, kept as a guard here).
    pub fn start(quiz: Quiz, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        let timer = CountdownTimer::start(quiz.time_limit_secs())?;
        Ok(Self {
            attempt_id: AttemptId::random(),
            quiz,
            answers: AnswerStore::new(),
            flags: FlagTracker::new(),
            timer,
            status: SessionStatus::InProgress,
            started_at,
            submitted_at: None,
            auto_submitted: false,
        })
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.status == SessionStatus::Submitted
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.timer.remaining_secs()
    }

    #[must_use]
    pub fn answer(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    #[must_use]
    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.answers.is_answered(question_id)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    #[must_use]
    pub fn is_flagged(&self, question_id: QuestionId) -> bool {
        self.flags.is_flagged(question_id)
    }

    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.flags.flagged_count()
    }

    /// Records or overwrites the answer for a question.
    ///
    /// No-op after submission. The value must match the question kind:
    /// choice answers must name one of the question's options, text
    /// answers are only valid for free-text kinds.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion`, `UnknownOption` or
    /// `KindMismatch` for caller bugs; all are also debug assertions.
    pub fn set_answer(
        &mut self,
        question_id: QuestionId,
        value: AnswerValue,
    ) -> Result<(), SessionError> {
        if self.status == SessionStatus::Submitted {
            return Ok(());
        }

        let question = self.lookup(question_id)?;
        match (&value, question.kind()) {
            (AnswerValue::Choice(option), kind) if kind.is_choice_based() => {
                if !question.has_option(*option) {
                    debug_assert!(false, "option {option} not on question {question_id}");
                    return Err(SessionError::UnknownOption {
                        question: question_id,
                        option: *option,
                    });
                }
            }
            (AnswerValue::Text(_), QuestionKind::OpenEnded | QuestionKind::FillInBlank) => {}
            _ => {
                debug_assert!(false, "answer kind mismatch for question {question_id}");
                return Err(SessionError::KindMismatch {
                    question: question_id,
                });
            }
        }

        let time_spent = self.elapsed_secs();
        self.answers
            .insert(Answer::new(question_id, value, time_spent));
        Ok(())
    }

    /// Toggles the "review later" marker on a question.
    ///
    /// No-op after submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` for a caller bug.
    pub fn toggle_flag(&mut self, question_id: QuestionId) -> Result<(), SessionError> {
        if self.status == SessionStatus::Submitted {
            return Ok(());
        }
        self.lookup(question_id)?;
        self.flags.toggle(question_id);
        Ok(())
    }

    /// Asks to submit: `InProgress` moves to `ConfirmingSubmission` so
    /// the student sees the review summary. No-op in any other state.
    pub fn request_submit(&mut self) {
        if self.status == SessionStatus::InProgress {
            self.status = SessionStatus::ConfirmingSubmission;
        }
    }

    /// Backs out of the confirmation dialog. No-op unless confirming.
    pub fn cancel_submit(&mut self) {
        if self.status == SessionStatus::ConfirmingSubmission {
            self.status = SessionStatus::InProgress;
        }
    }

    /// The one allowed finalize, valid only while confirming.
    ///
    /// Stops the countdown, freezes answers and flags, records the
    /// submission time and returns the frozen payload. Any other state
    /// (including `Submitted` itself) yields `None`: the state machine,
    /// not the network layer, decides whether a finalize already
    /// happened.
    pub fn confirm_submit(&mut self, now: DateTime<Utc>) -> Option<Submission> {
        if self.status != SessionStatus::ConfirmingSubmission {
            return None;
        }
        Some(self.finalize(now, false))
    }

    /// Drives the countdown by one second.
    ///
    /// When this tick reaches zero the session finalizes immediately,
    /// from `InProgress` or `ConfirmingSubmission` alike; expiry cannot
    /// be cancelled. After submission ticks are inert.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.timer.tick() {
            // status is never Submitted here: finalize stops the timer,
            // so an expiring tick implies the session is still live.
            return TickOutcome::AutoSubmitted(self.finalize(now, true));
        }
        if self.timer.is_running() {
            TickOutcome::Running {
                remaining_secs: self.timer.remaining_secs(),
            }
        } else {
            TickOutcome::Idle
        }
    }

    /// The frozen payload, available once submitted. Used by the
    /// explicit resubmission action after a sink failure.
    #[must_use]
    pub fn submission(&self) -> Option<Submission> {
        let submitted_at = self.submitted_at?;
        Some(self.build_submission(submitted_at, self.auto_submitted))
    }

    /// Wipes answers and flags. Only meaningful before submission;
    /// the whole-collection reset is the single deletion operation
    /// the answer store supports.
    pub fn reset(&mut self) {
        if self.status == SessionStatus::Submitted {
            return;
        }
        self.answers.clear();
        self.flags.clear();
    }

    fn finalize(&mut self, now: DateTime<Utc>, auto: bool) -> Submission {
        self.timer.stop();
        self.status = SessionStatus::Submitted;
        self.submitted_at = Some(now);
        self.auto_submitted = auto;
        self.build_submission(now, auto)
    }

    fn build_submission(&self, submitted_at: DateTime<Utc>, auto: bool) -> Submission {
        // Quiz display order, not insertion order.
        let mut answers: Vec<Answer> = self.answers.iter().cloned().collect();
        answers.sort_by_key(|a| self.quiz.position(a.question_id()));
        Submission {
            attempt_id: self.attempt_id,
            quiz_id: self.quiz.id(),
            answers,
            flagged: self.flags.iter().collect(),
            submitted_at,
            auto_submitted: auto,
        }
    }

    fn lookup(&self, question_id: QuestionId) -> Result<&crate::model::Question, SessionError> {
        match self.quiz.question(question_id) {
            Some(question) => Ok(question),
            None => {
                debug_assert!(false, "question {question_id} not in active quiz");
                Err(SessionError::UnknownQuestion { id: question_id })
            }
        }
    }

    fn elapsed_secs(&self) -> u32 {
        self.quiz.time_limit_secs() - self.timer.remaining_secs()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChoiceOption, Question, QuestionKind, Quiz};
    use crate::time::fixed_now;

    fn option(id: u64, text: &str) -> ChoiceOption {
        ChoiceOption::new(OptionId::new(id), text).unwrap()
    }

    fn sample_quiz(time_limit_minutes: u32) -> Quiz {
        let questions = vec![
            Question::new(
                QuestionId::new(1),
                "2 + 2 = ?",
                1,
                QuestionKind::SingleChoice {
                    options: vec![option(11, "3"), option(12, "4"), option(13, "5")],
                },
            )
            .unwrap(),
            Question::new(
                QuestionId::new(2),
                "Water boils at 100C at sea level",
                1,
                QuestionKind::TrueFalse {
                    options: vec![option(21, "True"), option(22, "False")],
                },
            )
            .unwrap(),
            Question::new(QuestionId::new(3), "Define entropy", 3, QuestionKind::OpenEnded)
                .unwrap(),
            Question::new(
                QuestionId::new(4),
                "The capital of France is ___",
                1,
                QuestionKind::FillInBlank,
            )
            .unwrap(),
            Question::new(QuestionId::new(5), "Explain Ohm's law", 2, QuestionKind::OpenEnded)
                .unwrap(),
        ];
        Quiz::new(QuizId::new(9), "Physics midterm", None, time_limit_minutes, questions).unwrap()
    }

    fn started(time_limit_minutes: u32) -> Session {
        Session::start(sample_quiz(time_limit_minutes), fixed_now()).unwrap()
    }

    #[test]
    fn starts_in_progress_with_full_countdown() {
        let session = started(45);
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.remaining_secs(), 45 * 60);
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn set_answer_overwrites_last_write_wins() {
        let mut session = started(45);
        session
            .set_answer(QuestionId::new(1), AnswerValue::Choice(OptionId::new(11)))
            .unwrap();
        session
            .set_answer(QuestionId::new(1), AnswerValue::Choice(OptionId::new(12)))
            .unwrap();

        let answer = session.answer(QuestionId::new(1)).unwrap();
        assert_eq!(answer.value(), &AnswerValue::Choice(OptionId::new(12)));
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "not in active quiz"))]
    fn unknown_question_fails_loudly() {
        let mut session = started(45);
        let result = session.set_answer(QuestionId::new(99), AnswerValue::Text("x".into()));
        // Release builds return the error instead of panicking.
        assert_eq!(
            result.unwrap_err(),
            SessionError::UnknownQuestion {
                id: QuestionId::new(99)
            }
        );
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "kind mismatch"))]
    fn text_answer_on_choice_question_is_rejected() {
        let mut session = started(45);
        let result = session.set_answer(QuestionId::new(1), AnswerValue::Text("four".into()));
        assert_eq!(
            result.unwrap_err(),
            SessionError::KindMismatch {
                question: QuestionId::new(1)
            }
        );
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "not on question"))]
    fn foreign_option_is_rejected() {
        let mut session = started(45);
        let result = session.set_answer(QuestionId::new(1), AnswerValue::Choice(OptionId::new(21)));
        assert_eq!(
            result.unwrap_err(),
            SessionError::UnknownOption {
                question: QuestionId::new(1),
                option: OptionId::new(21)
            }
        );
    }

    #[test]
    fn flag_toggle_is_involution() {
        let mut session = started(45);
        let q = QuestionId::new(3);
        session.toggle_flag(q).unwrap();
        assert!(session.is_flagged(q));
        session.toggle_flag(q).unwrap();
        assert!(!session.is_flagged(q));
    }

    #[test]
    fn manual_submit_with_confirmation_and_cancel() {
        let mut session = started(45);
        for (question, option) in [(1, 11), (2, 21)] {
            session
                .set_answer(
                    QuestionId::new(question),
                    AnswerValue::Choice(OptionId::new(option)),
                )
                .unwrap();
        }
        session
            .set_answer(QuestionId::new(3), AnswerValue::Text("disorder".into()))
            .unwrap();

        session.request_submit();
        assert_eq!(session.status(), SessionStatus::ConfirmingSubmission);

        session.cancel_submit();
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.answered_count(), 3);

        session.request_submit();
        let submission = session.confirm_submit(fixed_now()).unwrap();
        assert_eq!(session.status(), SessionStatus::Submitted);
        assert_eq!(submission.answers.len(), 3);
        assert!(!submission.auto_submitted);
        assert_eq!(session.submitted_at(), Some(fixed_now()));
    }

    #[test]
    fn double_click_submit_finalizes_once() {
        let mut session = started(45);
        session.request_submit();

        let first = session.confirm_submit(fixed_now());
        let at = session.submitted_at();
        let second = session.confirm_submit(fixed_now() + chrono::Duration::seconds(2));

        assert!(first.is_some());
        assert!(second.is_none());
        // Timestamp recorded on the first call only.
        assert_eq!(session.submitted_at(), at);
    }

    #[test]
    fn confirm_outside_confirming_state_is_noop() {
        let mut session = started(45);
        assert!(session.confirm_submit(fixed_now()).is_none());
        assert_eq!(session.status(), SessionStatus::InProgress);
    }

    #[test]
    fn zero_answer_submission_is_allowed() {
        let mut session = started(45);
        session.request_submit();
        let submission = session.confirm_submit(fixed_now()).unwrap();
        assert!(submission.answers.is_empty());
        assert_eq!(session.status(), SessionStatus::Submitted);
    }

    #[test]
    fn auto_submit_on_expiry() {
        // One-minute quiz, one answered question, no explicit submit.
        let mut session = started(1);
        session
            .set_answer(QuestionId::new(1), AnswerValue::Choice(OptionId::new(12)))
            .unwrap();

        let mut auto = None;
        for _ in 0..60 {
            if let TickOutcome::AutoSubmitted(submission) = session.tick(fixed_now()) {
                assert!(auto.is_none());
                auto = Some(submission);
            }
        }

        let submission = auto.expect("expiry forced exactly one finalize");
        assert!(submission.auto_submitted);
        assert_eq!(session.status(), SessionStatus::Submitted);
        assert_eq!(session.answered_count(), 1);
        assert_eq!(session.remaining_secs(), 0);

        // Ticks after expiry are inert.
        assert_eq!(session.tick(fixed_now()), TickOutcome::Idle);
    }

    #[test]
    fn expiry_overrides_pending_confirmation() {
        let mut session = started(1);
        session.request_submit();

        let mut outcome = TickOutcome::Idle;
        for _ in 0..60 {
            outcome = session.tick(fixed_now());
        }
        assert!(matches!(outcome, TickOutcome::AutoSubmitted(_)));
        assert_eq!(session.status(), SessionStatus::Submitted);
    }

    #[test]
    fn post_submission_freeze() {
        let mut session = started(45);
        session
            .set_answer(QuestionId::new(3), AnswerValue::Text("entropy".into()))
            .unwrap();
        session.toggle_flag(QuestionId::new(4)).unwrap();
        session.request_submit();
        session.confirm_submit(fixed_now()).unwrap();

        // Every mutating operation is now a no-op.
        session
            .set_answer(QuestionId::new(3), AnswerValue::Text("changed".into()))
            .unwrap();
        session.toggle_flag(QuestionId::new(4)).unwrap();
        session.request_submit();
        session.reset();

        assert_eq!(session.status(), SessionStatus::Submitted);
        assert_eq!(
            session.answer(QuestionId::new(3)).unwrap().value(),
            &AnswerValue::Text("entropy".into())
        );
        assert!(session.is_flagged(QuestionId::new(4)));
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn late_tick_after_manual_submit_cannot_refinalize() {
        let mut session = started(1);
        session.request_submit();
        session.confirm_submit(fixed_now()).unwrap();

        for _ in 0..120 {
            assert_eq!(session.tick(fixed_now()), TickOutcome::Idle);
        }
        assert_eq!(session.status(), SessionStatus::Submitted);
    }

    #[test]
    fn submission_payload_is_stable_for_resubmission() {
        let mut session = started(45);
        session
            .set_answer(QuestionId::new(4), AnswerValue::Text("Paris".into()))
            .unwrap();
        session.request_submit();
        let original = session.confirm_submit(fixed_now()).unwrap();

        let replay = session.submission().unwrap();
        assert_eq!(original, replay);
    }

    #[test]
    fn answers_ordered_by_quiz_position() {
        let mut session = started(45);
        session
            .set_answer(QuestionId::new(4), AnswerValue::Text("Paris".into()))
            .unwrap();
        session
            .set_answer(QuestionId::new(1), AnswerValue::Choice(OptionId::new(12)))
            .unwrap();
        session.request_submit();

        let submission = session.confirm_submit(fixed_now()).unwrap();
        let order: Vec<QuestionId> = submission
            .answers
            .iter()
            .map(Answer::question_id)
            .collect();
        assert_eq!(order, vec![QuestionId::new(1), QuestionId::new(4)]);
    }

    #[test]
    fn reset_clears_answers_and_flags_before_submission() {
        let mut session = started(45);
        session
            .set_answer(QuestionId::new(3), AnswerValue::Text("draft".into()))
            .unwrap();
        session.toggle_flag(QuestionId::new(1)).unwrap();
        session.reset();
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.flagged_count(), 0);
    }

    #[test]
    fn time_spent_reflects_elapsed_seconds() {
        let mut session = started(1);
        for _ in 0..10 {
            session.tick(fixed_now());
        }
        session
            .set_answer(QuestionId::new(3), AnswerValue::Text("after ten".into()))
            .unwrap();
        assert_eq!(
            session.answer(QuestionId::new(3)).unwrap().time_spent_secs(),
            10
        );
    }
}
