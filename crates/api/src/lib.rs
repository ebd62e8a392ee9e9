#![forbid(unsafe_code)]

//! Collaborator layer over the evaluation platform's REST backend.
//!
//! The client owns no business logic; these traits are the whole
//! contract with the backend: load quizzes, hand over submissions,
//! authenticate, move notifications, and administer rosters.

pub mod dto;
pub mod http;
pub mod memory;
pub mod source;

pub use http::HttpApi;
pub use memory::InMemoryApi;
pub use source::{
    ApiError, AuthApi, AuthToken, EntityDraft, EntityKind, EntityRecord, ManagementApi,
    Notification, NotificationApi, NotificationDraft, QuizOverview, QuizSource, SubmissionReceipt,
    SubmissionSink, TokenStore,
};
