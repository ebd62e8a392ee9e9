use dioxus::prelude::*;
use dioxus_router::use_navigator;

use services::AuthError;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let session = ctx.session();

    let mut username = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<&'static str>);
    let mut busy = use_signal(|| false);

    let on_submit = use_callback(move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let session = session.clone();
        spawn(async move {
            busy.set(true);
            error.set(None);
            let user = username.read().trim().to_string();
            let pass = password.read().clone();
            let result = session.login(&user, &pass).await;
            busy.set(false);
            match result {
                Ok(()) => {
                    let _ = navigator.push(Route::Quizzes {});
                }
                Err(AuthError::InvalidCredentials) => {
                    error.set(Some("Invalid username or password."));
                }
                Err(_) => {
                    error.set(Some("Could not reach the server. Try again."));
                }
            }
        });
    });

    rsx! {
        div { class: "page login-page",
            form { class: "login-form", onsubmit: on_submit,
                h2 { "Sign in" }
                if let Some(message) = error() {
                    p { class: "view-error", "{message}" }
                }
                label { class: "login-form__field",
                    span { "Username" }
                    input {
                        r#type: "text",
                        name: "username",
                        autofocus: true,
                        value: "{username}",
                        oninput: move |evt| username.set(evt.value()),
                    }
                }
                label { class: "login-form__field",
                    span { "Password" }
                    input {
                        r#type: "password",
                        name: "password",
                        value: "{password}",
                        oninput: move |evt| password.set(evt.value()),
                    }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: busy(),
                    if busy() { "Signing in..." } else { "Sign in" }
                }
            }
        }
    }
}
