use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use exam_core::model::{Quiz, QuizId};
use exam_core::session::Submission;

/// Errors surfaced by backend adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("backend request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid payload from backend: {0}")]
    InvalidPayload(String),
}

impl ApiError {
    /// Whether retrying the same call can plausibly succeed.
    /// Used by the submitted screen to offer a resend action.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::HttpStatus(status) => status.is_server_error(),
            Self::NotFound | Self::Unauthorized | Self::InvalidPayload(_) => false,
        }
    }
}

/// Catalog row for the quiz list; the full question set is only
/// fetched when a session opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOverview {
    pub id: QuizId,
    pub title: String,
    pub time_limit_minutes: u32,
    pub question_count: usize,
    pub total_points: u32,
}

/// Acknowledgement returned by the backend for a stored submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub id: String,
    pub recorded_at: DateTime<Utc>,
}

/// Bearer token plus display identity returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub bearer: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read: bool,
}

/// Outgoing notification composed in the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub recipient: String,
    pub title: String,
    pub body: String,
}

/// Roster categories an instructor can administer. Each maps to its
/// own backend collection but shares the same record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Teacher,
    Student,
    Class,
    Formation,
    User,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Teacher,
        EntityKind::Student,
        EntityKind::Class,
        EntityKind::Formation,
        EntityKind::User,
    ];

    /// URL path segment for the kind's backend collection.
    #[must_use]
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Teacher => "teachers",
            Self::Student => "students",
            Self::Class => "classes",
            Self::Formation => "formations",
            Self::User => "users",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Teacher => "Teachers",
            Self::Student => "Students",
            Self::Class => "Classes",
            Self::Formation => "Formations",
            Self::User => "Users",
        }
    }
}

/// Roster row as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub id: u64,
    pub name: String,
    pub detail: Option<String>,
}

/// Payload for creating or updating a roster record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDraft {
    pub name: String,
    pub detail: Option<String>,
}

/// Supplies fully formed quizzes before a session starts.
#[async_trait]
pub trait QuizSource: Send + Sync {
    async fn list_quizzes(&self) -> Result<Vec<QuizOverview>, ApiError>;

    /// The complete question list, ready for `Session::start`.
    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, ApiError>;
}

/// Receives the frozen submission at finalize time.
///
/// Invoked once per finalize; a failure is reported to the student but
/// never rolls the session back. Resending is a distinct call with the
/// identical payload, so the backend can dedupe on `attempt_id`.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, ApiError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<AuthToken, ApiError>;

    /// Best effort; the client clears its token regardless.
    async fn logout(&self) -> Result<(), ApiError>;
}

#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError>;
    async fn mark_read(&self, id: u64) -> Result<(), ApiError>;
    async fn send_notification(&self, draft: &NotificationDraft) -> Result<(), ApiError>;
}

/// CRUD over the instructor-administered rosters.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn list_entities(&self, kind: EntityKind) -> Result<Vec<EntityRecord>, ApiError>;
    async fn create_entity(
        &self,
        kind: EntityKind,
        draft: &EntityDraft,
    ) -> Result<EntityRecord, ApiError>;
    async fn update_entity(
        &self,
        kind: EntityKind,
        id: u64,
        draft: &EntityDraft,
    ) -> Result<EntityRecord, ApiError>;
    async fn delete_entity(&self, kind: EntityKind, id: u64) -> Result<(), ApiError>;
}

/// Where the current bearer token lives. The session context sets it
/// on login and clears it on logout; adapters attach it per request.
pub trait TokenStore: Send + Sync {
    fn set_token(&self, token: Option<String>);
    fn token(&self) -> Option<String>;
}
