use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use exam_core::model::{Quiz, QuizId};
use exam_core::session::Submission;

use crate::source::{
    ApiError, AuthApi, AuthToken, EntityDraft, EntityKind, EntityRecord, ManagementApi,
    Notification, NotificationApi, NotificationDraft, QuizOverview, QuizSource, SubmissionReceipt,
    SubmissionSink, TokenStore,
};

/// In-memory stand-in for the backend, shared by service tests and the
/// demo composition. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryApi {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    quizzes: Mutex<HashMap<QuizId, Quiz>>,
    submissions: Mutex<Vec<Submission>>,
    notifications: Mutex<Vec<Notification>>,
    sent_drafts: Mutex<Vec<NotificationDraft>>,
    users: Mutex<HashMap<String, String>>,
    entities: Mutex<HashMap<EntityKind, Vec<EntityRecord>>>,
    next_entity_id: Mutex<u64>,
    token: RwLock<Option<String>>,
    fail_submissions: AtomicBool,
    receipt_time: Mutex<Option<DateTime<Utc>>>,
}

impl InMemoryApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_quiz(&self, quiz: Quiz) {
        self.inner
            .quizzes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(quiz.id(), quiz);
    }

    pub fn put_user(&self, username: &str, password: &str) {
        self.inner
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(username.to_string(), password.to_string());
    }

    pub fn put_notification(&self, notification: Notification) {
        self.inner
            .notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }

    /// Make future `submit` calls fail with a retryable network-ish error.
    pub fn fail_submissions(&self, fail: bool) {
        self.inner.fail_submissions.store(fail, Ordering::SeqCst);
    }

    /// Pin the `recorded_at` stamped on receipts, for deterministic tests.
    pub fn set_receipt_time(&self, at: DateTime<Utc>) {
        *self
            .inner
            .receipt_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(at);
    }

    #[must_use]
    pub fn submissions(&self) -> Vec<Submission> {
        self.inner
            .submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.inner
            .submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn sent_drafts(&self) -> Vec<NotificationDraft> {
        self.inner
            .sent_drafts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStore for InMemoryApi {
    fn set_token(&self, token: Option<String>) {
        *self.inner.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn token(&self) -> Option<String> {
        self.inner.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl QuizSource for InMemoryApi {
    async fn list_quizzes(&self) -> Result<Vec<QuizOverview>, ApiError> {
        let quizzes = self.inner.quizzes.lock().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<QuizOverview> = quizzes
            .values()
            .map(|quiz| QuizOverview {
                id: quiz.id(),
                title: quiz.title().to_string(),
                time_limit_minutes: quiz.time_limit_minutes(),
                question_count: quiz.question_count(),
                total_points: quiz.total_points(),
            })
            .collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }

    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        self.inner
            .quizzes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }
}

#[async_trait]
impl SubmissionSink for InMemoryApi {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, ApiError> {
        if self.inner.fail_submissions.load(Ordering::SeqCst) {
            return Err(ApiError::HttpStatus(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            ));
        }
        let mut submissions = self
            .inner
            .submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        submissions.push(submission.clone());
        let recorded_at = self
            .inner
            .receipt_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unwrap_or_else(Utc::now);
        Ok(SubmissionReceipt {
            id: format!("receipt-{}", submissions.len()),
            recorded_at,
        })
    }
}

#[async_trait]
impl AuthApi for InMemoryApi {
    async fn login(&self, username: &str, password: &str) -> Result<AuthToken, ApiError> {
        let users = self.inner.users.lock().unwrap_or_else(PoisonError::into_inner);
        match users.get(username) {
            Some(stored) if stored == password => Ok(AuthToken {
                bearer: format!("token-{username}"),
                display_name: username.to_string(),
            }),
            _ => Err(ApiError::Unauthorized),
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[async_trait]
impl ManagementApi for InMemoryApi {
    async fn list_entities(&self, kind: EntityKind) -> Result<Vec<EntityRecord>, ApiError> {
        Ok(self
            .inner
            .entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_entity(
        &self,
        kind: EntityKind,
        draft: &EntityDraft,
    ) -> Result<EntityRecord, ApiError> {
        let id = {
            let mut next = self
                .inner
                .next_entity_id
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *next += 1;
            *next
        };
        let record = EntityRecord {
            id,
            name: draft.name.clone(),
            detail: draft.detail.clone(),
        };
        self.inner
            .entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update_entity(
        &self,
        kind: EntityKind,
        id: u64,
        draft: &EntityDraft,
    ) -> Result<EntityRecord, ApiError> {
        let mut entities = self
            .inner
            .entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let record = entities
            .entry(kind)
            .or_default()
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(ApiError::NotFound)?;
        record.name = draft.name.clone();
        record.detail = draft.detail.clone();
        Ok(record.clone())
    }

    async fn delete_entity(&self, kind: EntityKind, id: u64) -> Result<(), ApiError> {
        let mut entities = self
            .inner
            .entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let rows = entities.entry(kind).or_default();
        let before = rows.len();
        rows.retain(|record| record.id != id);
        if rows.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationApi for InMemoryApi {
    async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        Ok(self
            .inner
            .notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn mark_read(&self, id: u64) -> Result<(), ApiError> {
        let mut notifications = self
            .inner
            .notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                Ok(())
            }
            None => Err(ApiError::NotFound),
        }
    }

    async fn send_notification(&self, draft: &NotificationDraft) -> Result<(), ApiError> {
        self.inner
            .sent_drafts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(draft.clone());
        Ok(())
    }
}
