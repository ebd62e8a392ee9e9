use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator};

use crate::context::AppContext;
use crate::views::{ExamView, LoginView, ManagementView, NotificationsView, QuizzesView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/login", LoginView)] Login {},
    #[layout(Layout)]
        #[route("/", QuizzesView)] Quizzes {},
        #[route("/exam/:quiz_id", ExamView)] Exam { quiz_id: u64 },
        #[route("/notifications", NotificationsView)] Notifications {},
        #[route("/manage", ManagementView)] Manage {},
}

#[component]
fn Layout() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let session = ctx.session();
    let display_name = session.display_name().unwrap_or_default();

    let on_logout = use_callback(move |()| {
        let session = session.clone();
        spawn(async move {
            session.logout().await;
            let _ = navigator.push(Route::Login {});
        });
    });

    rsx! {
        div { class: "app",
            Sidebar { display_name, on_logout }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar(display_name: String, on_logout: EventHandler<()>) -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Assess" }
            ul {
                li { Link { to: Route::Quizzes {}, "Quizzes" } }
                li { Link { to: Route::Notifications {}, "Notifications" } }
                li { Link { to: Route::Manage {}, "Manage" } }
            }
            div { class: "sidebar__account",
                if !display_name.is_empty() {
                    span { class: "sidebar__user", "{display_name}" }
                }
                button {
                    class: "sidebar__logout",
                    r#type: "button",
                    onclick: move |_| on_logout.call(()),
                    "Log out"
                }
            }
        }
    }
}
