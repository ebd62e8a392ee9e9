//! Wire shapes for the evaluation backend's JSON API.
//!
//! DTOs mirror the backend payloads and convert fallibly into domain
//! types so a malformed response can never produce a half-valid quiz.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use exam_core::model::{
    ChoiceOption, OptionId, Question, QuestionId, QuestionKind, Quiz, QuizError, QuizId,
};
use exam_core::session::Submission;

use crate::source::{
    ApiError, EntityDraft, EntityRecord, Notification, QuizOverview, SubmissionReceipt,
};

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        ApiError::InvalidPayload(err.to_string())
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Deserialize)]
pub struct QuizDto {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub time_limit_minutes: u32,
    pub questions: Vec<QuestionDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDto {
    pub id: u64,
    pub prompt: String,
    pub points: u32,
    pub kind: QuestionKindDto,
    #[serde(default)]
    pub options: Vec<OptionDto>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKindDto {
    SingleChoice,
    TrueFalse,
    OpenEnded,
    FillInBlank,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionDto {
    pub id: u64,
    pub text: String,
    // The backend may include a correctness flag for instructor-facing
    // endpoints; the student client tolerates and discards it.
    #[serde(default)]
    #[allow(dead_code)]
    pub correct: bool,
}

impl QuizDto {
    /// # Errors
    ///
    /// Returns `ApiError::InvalidPayload` when the payload violates a
    /// domain invariant (blank title, too few options, and so on).
    pub fn into_domain(self) -> Result<Quiz, ApiError> {
        let questions = self
            .questions
            .into_iter()
            .map(QuestionDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Quiz::new(
            QuizId::new(self.id),
            self.title,
            self.description,
            self.time_limit_minutes,
            questions,
        )?)
    }
}

impl QuestionDto {
    fn into_domain(self) -> Result<Question, ApiError> {
        let options = self
            .options
            .into_iter()
            .map(|o| ChoiceOption::new(OptionId::new(o.id), o.text))
            .collect::<Result<Vec<_>, _>>()?;

        let kind = match self.kind {
            QuestionKindDto::SingleChoice => QuestionKind::SingleChoice { options },
            QuestionKindDto::TrueFalse => QuestionKind::TrueFalse { options },
            QuestionKindDto::OpenEnded => QuestionKind::OpenEnded,
            QuestionKindDto::FillInBlank => QuestionKind::FillInBlank,
        };

        Ok(Question::new(
            QuestionId::new(self.id),
            self.prompt,
            self.points,
            kind,
        )?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizOverviewDto {
    pub id: u64,
    pub title: String,
    pub time_limit_minutes: u32,
    pub question_count: usize,
    pub total_points: u32,
}

impl From<QuizOverviewDto> for QuizOverview {
    fn from(dto: QuizOverviewDto) -> Self {
        Self {
            id: QuizId::new(dto.id),
            title: dto.title,
            time_limit_minutes: dto.time_limit_minutes,
            question_count: dto.question_count,
            total_points: dto.total_points,
        }
    }
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionDto {
    pub attempt_id: String,
    pub quiz_id: u64,
    pub answers: Vec<AnswerDto>,
    pub flagged_question_ids: Vec<u64>,
    pub submitted_at: DateTime<Utc>,
    pub auto_submitted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerDto {
    pub question_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub time_spent_secs: u32,
}

impl SubmissionDto {
    #[must_use]
    pub fn from_submission(submission: &Submission) -> Self {
        use exam_core::model::AnswerValue;

        let answers = submission
            .answers
            .iter()
            .map(|answer| {
                let (selected_option_id, text) = match answer.value() {
                    AnswerValue::Choice(option) => (Some(option.value()), None),
                    AnswerValue::Text(value) => (None, Some(value.clone())),
                };
                AnswerDto {
                    question_id: answer.question_id().value(),
                    selected_option_id,
                    text,
                    time_spent_secs: answer.time_spent_secs(),
                }
            })
            .collect();

        Self {
            attempt_id: submission.attempt_id.to_string(),
            quiz_id: submission.quiz_id.value(),
            answers,
            flagged_question_ids: submission.flagged.iter().map(|id| id.value()).collect(),
            submitted_at: submission.submitted_at,
            auto_submitted: submission.auto_submitted,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptDto {
    pub id: String,
    pub recorded_at: DateTime<Utc>,
}

impl From<ReceiptDto> for SubmissionReceipt {
    fn from(dto: ReceiptDto) -> Self {
        Self {
            id: dto.id,
            recorded_at: dto.recorded_at,
        }
    }
}

//
// ─── AUTH & NOTIFICATIONS ──────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequestDto {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponseDto {
    pub token: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationDto {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl From<NotificationDto> for Notification {
    fn from(dto: NotificationDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            body: dto.body,
            sent_at: dto.sent_at,
            read: dto.read,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationDraftDto {
    pub recipient: String,
    pub title: String,
    pub body: String,
}

//
// ─── MANAGEMENT ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Deserialize)]
pub struct EntityRecordDto {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub detail: Option<String>,
}

impl From<EntityRecordDto> for EntityRecord {
    fn from(dto: EntityRecordDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            detail: dto.detail,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityDraftDto {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl EntityDraftDto {
    #[must_use]
    pub fn from_draft(draft: &EntityDraft) -> Self {
        Self {
            name: draft.name.clone(),
            detail: draft.detail.clone(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
