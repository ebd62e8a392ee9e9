use api::SubmissionReceipt;
use exam_core::model::{AnswerValue, OptionId, QuestionId, QuizId};
use exam_core::session::{Session, SessionStatus};
use exam_core::timer::format_remaining;
use services::{AssessmentService, Delivery, SubmitReport, TickReport};

use crate::views::ViewError;

/// Everything the exam page can ask of its session.
///
/// Sync intents mutate the owned session directly; `ConfirmSubmit` and
/// `Resubmit` go through the service because they may hit the
/// submission sink. The countdown is not an intent at all: the ticker
/// task calls `ExamVm::tick` itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExamIntent {
    Select(QuestionId, OptionId),
    EditText(QuestionId, String),
    ToggleFlag(QuestionId),
    Jump(QuestionId),
    RequestSubmit,
    CancelSubmit,
    ConfirmSubmit,
    Resubmit,
}

/// One row of the question index sidebar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionRowVm {
    pub id: QuestionId,
    pub number: usize,
    pub answered: bool,
    pub flagged: bool,
}

/// View model owning the live session for one exam page.
///
/// The page funnels user intents and the 1 Hz tick through this one
/// value, which serializes them by construction.
pub struct ExamVm {
    session: Session,
    receipt: Option<SubmissionReceipt>,
    delivery_error: Option<ViewError>,
    auto_submitted: bool,
}

impl ExamVm {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            receipt: None,
            delivery_error: None,
            auto_submitted: false,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.session.quiz().id()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    #[must_use]
    pub fn is_confirming(&self) -> bool {
        self.status() == SessionStatus::ConfirmingSubmission
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.session.is_submitted()
    }

    #[must_use]
    pub fn auto_submitted(&self) -> bool {
        self.auto_submitted
    }

    #[must_use]
    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    /// Set when the sink rejected the delivery; cleared by a
    /// successful resend.
    #[must_use]
    pub fn delivery_error(&self) -> Option<ViewError> {
        self.delivery_error
    }

    #[must_use]
    pub fn remaining_label(&self) -> String {
        format_remaining(self.session.remaining_secs())
    }

    /// Low-time highlight threshold for the countdown display.
    #[must_use]
    pub fn is_time_critical(&self) -> bool {
        !self.is_submitted() && self.session.remaining_secs() <= 60
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.session.answered_count()
    }

    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.session.flagged_count()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.session.quiz().question_count()
    }

    /// Index rows in quiz display order, color-coded by the view.
    #[must_use]
    pub fn rows(&self) -> Vec<QuestionRowVm> {
        self.session
            .quiz()
            .questions()
            .iter()
            .enumerate()
            .map(|(position, question)| QuestionRowVm {
                id: question.id(),
                number: position + 1,
                answered: self.session.is_answered(question.id()),
                flagged: self.session.is_flagged(question.id()),
            })
            .collect()
    }

    /// Currently selected option of a choice question, if any.
    #[must_use]
    pub fn selected_option(&self, question_id: QuestionId) -> Option<OptionId> {
        match self.session.answer(question_id)?.value() {
            AnswerValue::Choice(option) => Some(*option),
            AnswerValue::Text(_) => None,
        }
    }

    /// Current free-text answer, if any.
    #[must_use]
    pub fn text_answer(&self, question_id: QuestionId) -> Option<&str> {
        match self.session.answer(question_id)?.value() {
            AnswerValue::Text(text) => Some(text),
            AnswerValue::Choice(_) => None,
        }
    }

    /// Applies a synchronous intent. Async intents must go through the
    /// service-aware methods below; passing one here is a caller bug.
    pub fn apply(&mut self, intent: &ExamIntent) {
        match intent {
            ExamIntent::Select(question, option) => {
                // Unknown ids are programming errors; in release the
                // session leaves its state untouched.
                let _ = self
                    .session
                    .set_answer(*question, AnswerValue::Choice(*option));
            }
            ExamIntent::EditText(question, text) => {
                let _ = self
                    .session
                    .set_answer(*question, AnswerValue::Text(text.clone()));
            }
            ExamIntent::ToggleFlag(question) => {
                let _ = self.session.toggle_flag(*question);
            }
            ExamIntent::RequestSubmit => self.session.request_submit(),
            ExamIntent::CancelSubmit => self.session.cancel_submit(),
            ExamIntent::Jump(_) | ExamIntent::ConfirmSubmit | ExamIntent::Resubmit => {
                debug_assert!(false, "intent requires the service dispatcher");
            }
        }
    }

    /// Finalizes via the service; no-op unless confirming.
    pub async fn confirm_submit(&mut self, assessments: &AssessmentService) {
        if let Some(report) = assessments.confirm_submit(&mut self.session).await {
            self.absorb(report);
        }
    }

    /// Advances the countdown. Returns `true` once the session is
    /// submitted so the tick task knows to stop.
    pub async fn tick(&mut self, assessments: &AssessmentService) -> bool {
        match assessments.tick(&mut self.session).await {
            TickReport::Running { .. } => false,
            TickReport::AutoSubmitted(report) => {
                self.absorb(report);
                true
            }
            TickReport::Idle => self.is_submitted(),
        }
    }

    /// Explicit resend after a failed delivery.
    pub async fn resubmit(&mut self, assessments: &AssessmentService) {
        match assessments.resubmit(&self.session).await {
            Ok(receipt) => {
                self.receipt = Some(receipt);
                self.delivery_error = None;
            }
            Err(_) => {
                self.delivery_error = Some(ViewError::DeliveryFailed);
            }
        }
    }

    fn absorb(&mut self, report: SubmitReport) {
        self.auto_submitted = report.auto_submitted;
        match report.delivery {
            Delivery::Accepted(receipt) => {
                self.receipt = Some(receipt);
                self.delivery_error = None;
            }
            Delivery::Failed(_) => {
                self.delivery_error = Some(ViewError::DeliveryFailed);
            }
        }
    }
}

/// # Errors
///
/// Returns `ViewError::NotFound` when the quiz does not exist,
/// `ViewError::Unauthorized` on a rejected token and
/// `ViewError::Unknown` for other failures.
pub async fn start_exam(
    assessments: &AssessmentService,
    quiz_id: QuizId,
) -> Result<ExamVm, ViewError> {
    let session = assessments
        .start(quiz_id)
        .await
        .map_err(|err| ViewError::from_assessment(&err))?;
    Ok(ExamVm::new(session))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use api::InMemoryApi;
    use exam_core::model::{ChoiceOption, Question, QuestionKind, Quiz};
    use exam_core::time::fixed_clock;

    fn quiz() -> Quiz {
        let questions = vec![
            Question::new(
                QuestionId::new(1),
                "Pick one",
                1,
                QuestionKind::SingleChoice {
                    options: vec![
                        ChoiceOption::new(OptionId::new(11), "A").unwrap(),
                        ChoiceOption::new(OptionId::new(12), "B").unwrap(),
                    ],
                },
            )
            .unwrap(),
            Question::new(QuestionId::new(2), "Say why", 2, QuestionKind::OpenEnded).unwrap(),
        ];
        Quiz::new(QuizId::new(1), "Unit quiz", None, 1, questions).unwrap()
    }

    fn harness() -> (InMemoryApi, AssessmentService) {
        let backend = InMemoryApi::new();
        backend.put_quiz(quiz());
        let assessments = AssessmentService::new(
            fixed_clock(),
            Arc::new(backend.clone()),
            Arc::new(backend.clone()),
        );
        (backend, assessments)
    }

    #[tokio::test]
    async fn rows_reflect_answers_and_flags() {
        let (_backend, assessments) = harness();
        let mut vm = start_exam(&assessments, QuizId::new(1)).await.unwrap();

        vm.apply(&ExamIntent::Select(QuestionId::new(1), OptionId::new(11)));
        vm.apply(&ExamIntent::ToggleFlag(QuestionId::new(2)));

        let rows = vm.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].answered && !rows[0].flagged);
        assert!(!rows[1].answered && rows[1].flagged);
        assert_eq!(vm.selected_option(QuestionId::new(1)), Some(OptionId::new(11)));
    }

    #[tokio::test]
    async fn confirm_flow_reaches_submitted_with_receipt() {
        let (backend, assessments) = harness();
        let mut vm = start_exam(&assessments, QuizId::new(1)).await.unwrap();

        vm.apply(&ExamIntent::EditText(QuestionId::new(2), "because".into()));
        vm.apply(&ExamIntent::RequestSubmit);
        assert!(vm.is_confirming());

        vm.apply(&ExamIntent::CancelSubmit);
        assert!(!vm.is_confirming());

        vm.apply(&ExamIntent::RequestSubmit);
        vm.confirm_submit(&assessments).await;
        assert!(vm.is_submitted());
        assert!(vm.receipt().is_some());
        assert_eq!(backend.submission_count(), 1);

        // Double confirm stays a no-op.
        vm.confirm_submit(&assessments).await;
        assert_eq!(backend.submission_count(), 1);
    }

    #[tokio::test]
    async fn tick_reports_submission_to_stop_the_task() {
        let (_backend, assessments) = harness();
        let mut vm = start_exam(&assessments, QuizId::new(1)).await.unwrap();

        for _ in 0..59 {
            assert!(!vm.tick(&assessments).await);
        }
        assert!(vm.tick(&assessments).await);
        assert!(vm.is_submitted());
        assert!(vm.auto_submitted());
    }

    #[tokio::test]
    async fn failed_delivery_offers_resend() {
        let (backend, assessments) = harness();
        let mut vm = start_exam(&assessments, QuizId::new(1)).await.unwrap();

        backend.fail_submissions(true);
        vm.apply(&ExamIntent::RequestSubmit);
        vm.confirm_submit(&assessments).await;

        assert!(vm.is_submitted());
        assert_eq!(vm.delivery_error(), Some(ViewError::DeliveryFailed));
        assert!(vm.receipt().is_none());

        backend.fail_submissions(false);
        vm.resubmit(&assessments).await;
        assert!(vm.delivery_error().is_none());
        assert!(vm.receipt().is_some());
        assert_eq!(backend.submission_count(), 1);
    }

    #[tokio::test]
    async fn remaining_label_is_mm_ss() {
        let (_backend, assessments) = harness();
        let vm = start_exam(&assessments, QuizId::new(1)).await.unwrap();
        assert_eq!(vm.remaining_label(), "01:00");
        assert!(vm.is_time_critical());
    }
}
