use std::sync::Arc;

use api::{Notification, NotificationApi, NotificationDraft};

use crate::error::NotificationError;

/// Thin pass-through over the backend's notification endpoints with
/// client-side draft hygiene.
#[derive(Clone)]
pub struct NotificationService {
    api: Arc<dyn NotificationApi>,
}

impl NotificationService {
    #[must_use]
    pub fn new(api: Arc<dyn NotificationApi>) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns `NotificationError::Api` for backend failures.
    pub async fn list(&self) -> Result<Vec<Notification>, NotificationError> {
        Ok(self.api.list_notifications().await?)
    }

    /// # Errors
    ///
    /// Returns `NotificationError::Api` for backend failures.
    pub async fn mark_read(&self, id: u64) -> Result<(), NotificationError> {
        self.api.mark_read(id).await?;
        Ok(())
    }

    /// Validates and sends a composed notification.
    ///
    /// # Errors
    ///
    /// Returns a field error for blank recipient/title/body, or
    /// `NotificationError::Api` for backend failures.
    pub async fn send(&self, draft: NotificationDraft) -> Result<(), NotificationError> {
        if draft.recipient.trim().is_empty() {
            return Err(NotificationError::EmptyRecipient);
        }
        if draft.title.trim().is_empty() {
            return Err(NotificationError::EmptyTitle);
        }
        if draft.body.trim().is_empty() {
            return Err(NotificationError::EmptyBody);
        }

        self.api.send_notification(&draft).await?;
        tracing::info!(recipient = %draft.recipient, "notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::InMemoryApi;

    fn draft(recipient: &str, title: &str, body: &str) -> NotificationDraft {
        NotificationDraft {
            recipient: recipient.into(),
            title: title.into(),
            body: body.into(),
        }
    }

    #[tokio::test]
    async fn blank_fields_rejected_before_network() {
        let backend = InMemoryApi::new();
        let service = NotificationService::new(Arc::new(backend.clone()));

        let err = service.send(draft(" ", "Hi", "Body")).await.unwrap_err();
        assert!(matches!(err, NotificationError::EmptyRecipient));
        let err = service.send(draft("ada", "", "Body")).await.unwrap_err();
        assert!(matches!(err, NotificationError::EmptyTitle));
        let err = service.send(draft("ada", "Hi", "  ")).await.unwrap_err();
        assert!(matches!(err, NotificationError::EmptyBody));
        assert!(backend.sent_drafts().is_empty());
    }

    #[tokio::test]
    async fn valid_draft_reaches_backend() {
        let backend = InMemoryApi::new();
        let service = NotificationService::new(Arc::new(backend.clone()));

        service
            .send(draft("class-2026", "Room change", "We moved to B204"))
            .await
            .unwrap();
        assert_eq!(backend.sent_drafts().len(), 1);
    }
}
