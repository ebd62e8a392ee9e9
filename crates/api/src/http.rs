use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

use exam_core::model::{Quiz, QuizId};
use exam_core::session::Submission;

use crate::dto::{
    EntityDraftDto, EntityRecordDto, LoginRequestDto, LoginResponseDto, NotificationDraftDto,
    NotificationDto, QuizDto, QuizOverviewDto, ReceiptDto, SubmissionDto,
};
use crate::source::{
    ApiError, AuthApi, AuthToken, EntityDraft, EntityKind, EntityRecord, ManagementApi,
    Notification, NotificationApi, NotificationDraft, QuizOverview, QuizSource, SubmissionReceipt,
    SubmissionSink, TokenStore,
};

/// HTTP adapter for the evaluation backend.
///
/// One instance serves all collaborator traits; the bearer token is
/// interior state so the session context can install and clear it
/// without rebuilding the client.
pub struct HttpApi {
    client: Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl HttpApi {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
            token: RwLock::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            status if !status.is_success() => Err(ApiError::HttpStatus(status)),
            _ => Ok(response),
        }
    }

    async fn get(&self, path: &str) -> Result<Response, ApiError> {
        let response = self
            .authorize(self.client.get(self.endpoint(path)))
            .send()
            .await?;
        Self::check(response).await
    }

    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, ApiError> {
        let response = self
            .authorize(self.client.post(self.endpoint(path)))
            .json(payload)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn put_json<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, ApiError> {
        let response = self
            .authorize(self.client.put(self.endpoint(path)))
            .json(payload)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn delete(&self, path: &str) -> Result<Response, ApiError> {
        let response = self
            .authorize(self.client.delete(self.endpoint(path)))
            .send()
            .await?;
        Self::check(response).await
    }
}

impl TokenStore for HttpApi {
    // The token is a plain Option, so it stays valid even if a writer
    // panicked; recover the guard instead of propagating the poison.
    fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl QuizSource for HttpApi {
    async fn list_quizzes(&self) -> Result<Vec<QuizOverview>, ApiError> {
        let rows: Vec<QuizOverviewDto> = self.get("quizzes").await?.json().await?;
        Ok(rows.into_iter().map(QuizOverview::from).collect())
    }

    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        let dto: QuizDto = self.get(&format!("quizzes/{id}")).await?.json().await?;
        dto.into_domain()
    }
}

#[async_trait]
impl SubmissionSink for HttpApi {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, ApiError> {
        let payload = SubmissionDto::from_submission(submission);
        let path = format!("quizzes/{}/submissions", submission.quiz_id);
        let receipt: ReceiptDto = self.post_json(&path, &payload).await?.json().await?;
        tracing::info!(
            attempt_id = %submission.attempt_id,
            receipt_id = %receipt.id,
            "submission stored by backend"
        );
        Ok(receipt.into())
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, username: &str, password: &str) -> Result<AuthToken, ApiError> {
        let payload = LoginRequestDto {
            username: username.to_string(),
            password: password.to_string(),
        };
        let body: LoginResponseDto = self.post_json("auth/login", &payload).await?.json().await?;
        Ok(AuthToken {
            bearer: body.token,
            display_name: body.display_name,
        })
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post_json("auth/logout", &serde_json::json!({})).await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationApi for HttpApi {
    async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let rows: Vec<NotificationDto> = self.get("notifications").await?.json().await?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn mark_read(&self, id: u64) -> Result<(), ApiError> {
        self.post_json(&format!("notifications/{id}/read"), &serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn send_notification(&self, draft: &NotificationDraft) -> Result<(), ApiError> {
        let payload = NotificationDraftDto {
            recipient: draft.recipient.clone(),
            title: draft.title.clone(),
            body: draft.body.clone(),
        };
        self.post_json("notifications", &payload).await?;
        Ok(())
    }
}

#[async_trait]
impl ManagementApi for HttpApi {
    async fn list_entities(&self, kind: EntityKind) -> Result<Vec<EntityRecord>, ApiError> {
        let rows: Vec<EntityRecordDto> = self.get(kind.path_segment()).await?.json().await?;
        Ok(rows.into_iter().map(EntityRecord::from).collect())
    }

    async fn create_entity(
        &self,
        kind: EntityKind,
        draft: &EntityDraft,
    ) -> Result<EntityRecord, ApiError> {
        let payload = EntityDraftDto::from_draft(draft);
        let row: EntityRecordDto = self
            .post_json(kind.path_segment(), &payload)
            .await?
            .json()
            .await?;
        Ok(row.into())
    }

    async fn update_entity(
        &self,
        kind: EntityKind,
        id: u64,
        draft: &EntityDraft,
    ) -> Result<EntityRecord, ApiError> {
        let payload = EntityDraftDto::from_draft(draft);
        let path = format!("{}/{id}", kind.path_segment());
        let row: EntityRecordDto = self.put_json(&path, &payload).await?.json().await?;
        Ok(row.into())
    }

    async fn delete_entity(&self, kind: EntityKind, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("{}/{id}", kind.path_segment())).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let api = HttpApi::new(Url::parse("https://eval.example.edu/api/").unwrap());
        assert_eq!(
            api.endpoint("/quizzes/3"),
            "https://eval.example.edu/api/quizzes/3"
        );
    }

    #[test]
    fn token_store_survives_a_poisoned_lock() {
        let api = std::sync::Arc::new(HttpApi::new(
            Url::parse("https://eval.example.edu").unwrap(),
        ));
        api.set_token(Some("abc".into()));

        let poisoner = std::sync::Arc::clone(&api);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.token.write().unwrap();
            panic!("poison the token lock");
        })
        .join();

        assert_eq!(api.token(), Some("abc".into()));
        api.set_token(None);
        assert_eq!(api.token(), None);
    }

    #[test]
    fn token_store_roundtrip() {
        let api = HttpApi::new(Url::parse("https://eval.example.edu").unwrap());
        assert_eq!(api.token(), None);
        api.set_token(Some("abc".into()));
        assert_eq!(api.token(), Some("abc".into()));
        api.set_token(None);
        assert_eq!(api.token(), None);
    }
}
