use std::sync::Arc;

use api::{EntityDraft, EntityKind, EntityRecord, ManagementApi};

use crate::error::ManagementError;

/// Thin pass-through over the backend's roster endpoints with
/// client-side draft hygiene.
#[derive(Clone)]
pub struct ManagementService {
    api: Arc<dyn ManagementApi>,
}

impl ManagementService {
    #[must_use]
    pub fn new(api: Arc<dyn ManagementApi>) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns `ManagementError::Api` for backend failures.
    pub async fn list(&self, kind: EntityKind) -> Result<Vec<EntityRecord>, ManagementError> {
        Ok(self.api.list_entities(kind).await?)
    }

    /// Validates and stores a new roster record.
    ///
    /// # Errors
    ///
    /// Returns `ManagementError::EmptyName` for a blank name, or
    /// `ManagementError::Api` for backend failures.
    pub async fn create(
        &self,
        kind: EntityKind,
        draft: EntityDraft,
    ) -> Result<EntityRecord, ManagementError> {
        let draft = Self::clean(draft)?;
        let record = self.api.create_entity(kind, &draft).await?;
        tracing::info!(kind = kind.path_segment(), id = record.id, "roster record created");
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `ManagementError::EmptyName` for a blank name, or
    /// `ManagementError::Api` for backend failures.
    pub async fn update(
        &self,
        kind: EntityKind,
        id: u64,
        draft: EntityDraft,
    ) -> Result<EntityRecord, ManagementError> {
        let draft = Self::clean(draft)?;
        Ok(self.api.update_entity(kind, id, &draft).await?)
    }

    /// # Errors
    ///
    /// Returns `ManagementError::Api` for backend failures.
    pub async fn delete(&self, kind: EntityKind, id: u64) -> Result<(), ManagementError> {
        self.api.delete_entity(kind, id).await?;
        tracing::info!(kind = kind.path_segment(), id, "roster record deleted");
        Ok(())
    }

    /// Trims the draft and rejects a blank name; an empty detail
    /// becomes `None` so the backend never stores whitespace.
    fn clean(draft: EntityDraft) -> Result<EntityDraft, ManagementError> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(ManagementError::EmptyName);
        }
        let detail = draft
            .detail
            .map(|detail| detail.trim().to_string())
            .filter(|detail| !detail.is_empty());
        Ok(EntityDraft { name, detail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::InMemoryApi;

    #[tokio::test]
    async fn blank_name_rejected_before_network() {
        let backend = InMemoryApi::new();
        let service = ManagementService::new(Arc::new(backend.clone()));

        let err = service
            .create(
                EntityKind::Student,
                EntityDraft {
                    name: "   ".into(),
                    detail: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ManagementError::EmptyName));
        assert!(backend
            .list_entities(EntityKind::Student)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn drafts_are_trimmed_on_the_way_in() {
        let backend = InMemoryApi::new();
        let service = ManagementService::new(Arc::new(backend.clone()));

        let record = service
            .create(
                EntityKind::Class,
                EntityDraft {
                    name: "  Year 2 Biology  ".into(),
                    detail: Some("   ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(record.name, "Year 2 Biology");
        assert_eq!(record.detail, None);

        let renamed = service
            .update(
                EntityKind::Class,
                record.id,
                EntityDraft {
                    name: "Year 2 Biology".into(),
                    detail: Some(" Room B204 ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.detail.as_deref(), Some("Room B204"));

        service.delete(EntityKind::Class, record.id).await.unwrap();
        assert!(service.list(EntityKind::Class).await.unwrap().is_empty());
    }
}
