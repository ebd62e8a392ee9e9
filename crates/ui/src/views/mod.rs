mod exam;
mod login;
mod management;
mod notifications;
mod quizzes;
mod state;

pub use exam::ExamView;
pub use login::LoginView;
pub use management::ManagementView;
pub use notifications::NotificationsView;
pub use quizzes::QuizzesView;
pub use state::{view_state_from_resource, ViewError, ViewState};
