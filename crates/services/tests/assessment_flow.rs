use std::sync::Arc;

use api::{ApiError, InMemoryApi};
use exam_core::model::{
    AnswerValue, ChoiceOption, OptionId, Question, QuestionId, QuestionKind, Quiz, QuizId,
};
use exam_core::session::SessionStatus;
use exam_core::time::{fixed_clock, fixed_now};
use services::{AssessmentError, AssessmentService, Delivery, SessionContext, TickReport};

fn option(id: u64, text: &str) -> ChoiceOption {
    ChoiceOption::new(OptionId::new(id), text).unwrap()
}

fn sample_quiz() -> Quiz {
    let questions = vec![
        Question::new(
            QuestionId::new(1),
            "Which keyword borrows?",
            1,
            QuestionKind::SingleChoice {
                options: vec![option(11, "&"), option(12, "*"), option(13, "!")],
            },
        )
        .unwrap(),
        Question::new(
            QuestionId::new(2),
            "Slices are fat pointers",
            1,
            QuestionKind::TrueFalse {
                options: vec![option(21, "True"), option(22, "False")],
            },
        )
        .unwrap(),
        Question::new(
            QuestionId::new(3),
            "Explain move semantics",
            3,
            QuestionKind::OpenEnded,
        )
        .unwrap(),
    ];
    Quiz::new(QuizId::new(1), "Rust basics", None, 1, questions).unwrap()
}

fn service(backend: &InMemoryApi) -> AssessmentService {
    AssessmentService::new(
        fixed_clock(),
        Arc::new(backend.clone()),
        Arc::new(backend.clone()),
    )
}

#[tokio::test]
async fn manual_submit_delivers_exactly_once() {
    let backend = InMemoryApi::new();
    backend.put_quiz(sample_quiz());
    backend.set_receipt_time(fixed_now());
    let assessments = service(&backend);

    let mut session = assessments.start(QuizId::new(1)).await.unwrap();
    session
        .set_answer(QuestionId::new(1), AnswerValue::Choice(OptionId::new(11)))
        .unwrap();
    session
        .set_answer(QuestionId::new(2), AnswerValue::Choice(OptionId::new(21)))
        .unwrap();

    session.request_submit();
    let report = assessments.confirm_submit(&mut session).await.unwrap();
    assert!(!report.auto_submitted);
    assert!(report.delivery.receipt().is_some());

    // A second confirm is a pure no-op: no state change, no network.
    assert!(assessments.confirm_submit(&mut session).await.is_none());
    assert_eq!(backend.submission_count(), 1);
    assert_eq!(session.status(), SessionStatus::Submitted);

    let stored = &backend.submissions()[0];
    assert_eq!(stored.answers.len(), 2);
    assert_eq!(stored.attempt_id, session.attempt_id());
}

#[tokio::test]
async fn expiry_auto_submits_through_the_service() {
    let backend = InMemoryApi::new();
    backend.put_quiz(sample_quiz());
    let assessments = service(&backend);

    let mut session = assessments.start(QuizId::new(1)).await.unwrap();
    session
        .set_answer(QuestionId::new(3), AnswerValue::Text("ownership moves".into()))
        .unwrap();

    let mut auto_reports = 0;
    for _ in 0..60 {
        if let TickReport::AutoSubmitted(report) = assessments.tick(&mut session).await {
            assert!(report.auto_submitted);
            auto_reports += 1;
        }
    }

    assert_eq!(auto_reports, 1);
    assert_eq!(backend.submission_count(), 1);
    assert!(backend.submissions()[0].auto_submitted);
    assert_eq!(session.status(), SessionStatus::Submitted);

    // Ticks past expiry stay inert.
    assert!(matches!(
        assessments.tick(&mut session).await,
        TickReport::Idle
    ));
}

#[tokio::test]
async fn sink_failure_keeps_session_submitted_and_resubmit_works() {
    let backend = InMemoryApi::new();
    backend.put_quiz(sample_quiz());
    let assessments = service(&backend);

    let mut session = assessments.start(QuizId::new(1)).await.unwrap();
    session
        .set_answer(QuestionId::new(1), AnswerValue::Choice(OptionId::new(12)))
        .unwrap();
    session.request_submit();

    backend.fail_submissions(true);
    let report = assessments.confirm_submit(&mut session).await.unwrap();
    let Delivery::Failed(err) = report.delivery else {
        panic!("delivery should have failed");
    };
    assert!(err.is_retryable());

    // Finalize happened regardless of the network outcome.
    assert_eq!(session.status(), SessionStatus::Submitted);
    assert_eq!(backend.submission_count(), 0);

    // The resend is an explicit action carrying the identical payload.
    backend.fail_submissions(false);
    let receipt = assessments.resubmit(&session).await.unwrap();
    assert!(!receipt.id.is_empty());
    assert_eq!(backend.submission_count(), 1);
    assert_eq!(backend.submissions()[0], session.submission().unwrap());
}

#[tokio::test]
async fn resubmit_before_finalize_is_rejected() {
    let backend = InMemoryApi::new();
    backend.put_quiz(sample_quiz());
    let assessments = service(&backend);

    let session = assessments.start(QuizId::new(1)).await.unwrap();
    assert!(matches!(
        assessments.resubmit(&session).await.unwrap_err(),
        AssessmentError::NotSubmitted
    ));
}

#[tokio::test]
async fn missing_quiz_surfaces_not_found() {
    let backend = InMemoryApi::new();
    let assessments = service(&backend);

    let err = assessments.start(QuizId::new(404)).await.unwrap_err();
    assert!(matches!(err, AssessmentError::Api(ApiError::NotFound)));
}

#[tokio::test]
async fn login_lifecycle_installs_and_clears_token() {
    let backend = InMemoryApi::new();
    backend.put_user("ada", "hopper");
    let context = SessionContext::new(Arc::new(backend.clone()), Arc::new(backend.clone()));

    assert!(!context.is_authenticated());
    context.login("ada", "hopper").await.unwrap();
    assert!(context.is_authenticated());
    assert_eq!(context.display_name().as_deref(), Some("ada"));

    context.logout().await;
    assert!(!context.is_authenticated());
    assert_eq!(context.display_name(), None);
}

#[tokio::test]
async fn bad_credentials_do_not_authenticate() {
    let backend = InMemoryApi::new();
    backend.put_user("ada", "hopper");
    let context = SessionContext::new(Arc::new(backend.clone()), Arc::new(backend.clone()));

    let err = context.login("ada", "lovelace").await.unwrap_err();
    assert!(matches!(err, services::AuthError::InvalidCredentials));
    assert!(!context.is_authenticated());
}
