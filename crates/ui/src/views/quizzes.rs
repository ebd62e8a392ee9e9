use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use api::QuizOverview;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Debug, PartialEq)]
struct QuizCatalog {
    quizzes: Vec<QuizOverview>,
}

#[component]
pub fn QuizzesView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let assessments = ctx.assessments();
    let authenticated = ctx.session().is_authenticated();

    use_effect(move || {
        if !authenticated {
            let _ = navigator.push(Route::Login {});
        }
    });

    let resource = use_resource(move || {
        let assessments = assessments.clone();
        async move {
            let quizzes = assessments
                .list_quizzes()
                .await
                .map_err(|err| ViewError::from_assessment(&err))?;
            Ok(QuizCatalog { quizzes })
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "Available quizzes" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(catalog) => rsx! {
                    if catalog.quizzes.is_empty() {
                        p { "No quizzes are open right now." }
                    } else {
                        ul { class: "quiz-list",
                            for quiz in catalog.quizzes {
                                QuizCard { key: "{quiz.id}", quiz }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "view-error", "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn QuizCard(quiz: QuizOverview) -> Element {
    let meta = format!(
        "{} questions · {} min · {} points",
        quiz.question_count, quiz.time_limit_minutes, quiz.total_points
    );
    rsx! {
        li { class: "quiz-card",
            Link { class: "quiz-card__link", to: Route::Exam { quiz_id: quiz.id.value() },
                span { class: "quiz-card__title", "{quiz.title}" }
                span { class: "quiz-card__meta", "{meta}" }
                span { class: "quiz-card__cta", "Start" }
            }
        }
    }
}
