use std::sync::Arc;

use services::{AssessmentService, ManagementService, NotificationService, SessionContext};

pub trait UiApp: Send + Sync {
    fn assessments(&self) -> Arc<AssessmentService>;
    fn session(&self) -> Arc<SessionContext>;
    fn notifications(&self) -> Arc<NotificationService>;
    fn management(&self) -> Arc<ManagementService>;
}

#[derive(Clone)]
pub struct AppContext {
    assessments: Arc<AssessmentService>,
    session: Arc<SessionContext>,
    notifications: Arc<NotificationService>,
    management: Arc<ManagementService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            assessments: app.assessments(),
            session: app.session(),
            notifications: app.notifications(),
            management: app.management(),
        }
    }

    #[must_use]
    pub fn assessments(&self) -> Arc<AssessmentService> {
        Arc::clone(&self.assessments)
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionContext> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn notifications(&self) -> Arc<NotificationService> {
        Arc::clone(&self.notifications)
    }

    #[must_use]
    pub fn management(&self) -> Arc<ManagementService> {
        Arc::clone(&self.management)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: Arc<dyn UiApp>) -> AppContext {
    AppContext::new(&app)
}
