//! Shared error types for the services crate.

use thiserror::Error;

use api::ApiError;
use exam_core::session::SessionError;

/// Errors emitted by `SessionContext`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `AssessmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("session has not been submitted")]
    NotSubmitted,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `ManagementService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManagementError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `NotificationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotificationError {
    #[error("recipient cannot be empty")]
    EmptyRecipient,
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("message body cannot be empty")]
    EmptyBody,
    #[error(transparent)]
    Api(#[from] ApiError),
}
