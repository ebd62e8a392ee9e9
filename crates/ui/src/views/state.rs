use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unauthorized,
    NotFound,
    DeliveryFailed,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn from_assessment(err: &services::AssessmentError) -> Self {
        match err {
            services::AssessmentError::Api(api::ApiError::NotFound) => Self::NotFound,
            services::AssessmentError::Api(api::ApiError::Unauthorized) => Self::Unauthorized,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn from_management(err: &services::ManagementError) -> Self {
        match err {
            services::ManagementError::Api(api::ApiError::Unauthorized) => Self::Unauthorized,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Your session has expired. Please sign in again.",
            Self::NotFound => "That quiz is no longer available.",
            Self::DeliveryFailed => {
                "Your answers are locked in, but we couldn't reach the server. Resend when ready."
            }
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
