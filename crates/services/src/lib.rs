#![forbid(unsafe_code)]

pub mod assessment;
pub mod context;
pub mod error;
pub mod management;
pub mod notifications;

pub use exam_core::Clock;

pub use assessment::{AssessmentService, Delivery, SubmitReport, TickReport};
pub use context::SessionContext;
pub use error::{AssessmentError, AuthError, ManagementError, NotificationError};
pub use management::ManagementService;
pub use notifications::NotificationService;
