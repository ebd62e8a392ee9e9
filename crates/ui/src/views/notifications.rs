use dioxus::prelude::*;

use api::{Notification, NotificationDraft};
use services::NotificationError;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::format_datetime;

#[derive(Clone, Debug, PartialEq)]
struct Inbox {
    notifications: Vec<Notification>,
}

#[component]
pub fn NotificationsView() -> Element {
    let ctx = use_context::<AppContext>();
    let notifications = ctx.notifications();

    let notifications_for_resource = notifications.clone();
    let resource = use_resource(move || {
        let notifications = notifications_for_resource.clone();
        async move {
            let items = notifications
                .list()
                .await
                .map_err(|_| ViewError::Unknown)?;
            Ok(Inbox {
                notifications: items,
            })
        }
    });
    let state = view_state_from_resource(&resource);

    let on_mark_read = {
        let notifications = notifications.clone();
        use_callback(move |id: u64| {
            let notifications = notifications.clone();
            let mut resource = resource;
            spawn(async move {
                if notifications.mark_read(id).await.is_ok() {
                    resource.restart();
                }
            });
        })
    };

    let mut recipient = use_signal(String::new);
    let mut title = use_signal(String::new);
    let mut body = use_signal(String::new);
    let mut compose_status = use_signal(|| None::<&'static str>);

    let on_send = {
        let notifications = notifications.clone();
        use_callback(move |evt: FormEvent| {
            evt.prevent_default();
            let notifications = notifications.clone();
            spawn(async move {
                let draft = NotificationDraft {
                    recipient: recipient.read().trim().to_string(),
                    title: title.read().trim().to_string(),
                    body: body.read().trim().to_string(),
                };
                match notifications.send(draft).await {
                    Ok(()) => {
                        recipient.set(String::new());
                        title.set(String::new());
                        body.set(String::new());
                        compose_status.set(Some("Notification sent."));
                    }
                    Err(NotificationError::EmptyRecipient) => {
                        compose_status.set(Some("A recipient is required."));
                    }
                    Err(NotificationError::EmptyTitle) => {
                        compose_status.set(Some("A title is required."));
                    }
                    Err(NotificationError::EmptyBody) => {
                        compose_status.set(Some("A message body is required."));
                    }
                    Err(_) => {
                        compose_status.set(Some("Could not reach the server. Try again."));
                    }
                }
            });
        })
    };

    rsx! {
        div { class: "page",
            h2 { "Notifications" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(inbox) => rsx! {
                    if inbox.notifications.is_empty() {
                        p { "Nothing new." }
                    } else {
                        ul { class: "notification-list",
                            for item in inbox.notifications {
                                NotificationRow { key: "{item.id}", item, on_mark_read }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "view-error", "{err.message()}" }
                },
            }

            form { class: "notification-compose", onsubmit: on_send,
                h3 { "Send a notification" }
                if let Some(status) = compose_status() {
                    p { class: "notification-compose__status", "{status}" }
                }
                label { class: "notification-compose__field",
                    span { "Recipient" }
                    input {
                        r#type: "text",
                        name: "recipient",
                        value: "{recipient}",
                        oninput: move |evt| recipient.set(evt.value()),
                    }
                }
                label { class: "notification-compose__field",
                    span { "Title" }
                    input {
                        r#type: "text",
                        name: "title",
                        value: "{title}",
                        oninput: move |evt| title.set(evt.value()),
                    }
                }
                label { class: "notification-compose__field",
                    span { "Message" }
                    textarea {
                        name: "body",
                        rows: 4,
                        value: "{body}",
                        oninput: move |evt| body.set(evt.value()),
                    }
                }
                button { class: "btn btn-primary", r#type: "submit", "Send" }
            }
        }
    }
}

#[component]
fn NotificationRow(item: Notification, on_mark_read: EventHandler<u64>) -> Element {
    let id = item.id;
    let class = if item.read {
        "notification notification--read"
    } else {
        "notification"
    };
    rsx! {
        li { class: "{class}",
            div { class: "notification__header",
                span { class: "notification__title", "{item.title}" }
                span { class: "notification__date", "{format_datetime(item.sent_at)}" }
            }
            p { class: "notification__body", "{item.body}" }
            if !item.read {
                button {
                    class: "notification__mark-read",
                    r#type: "button",
                    onclick: move |_| on_mark_read.call(id),
                    "Mark as read"
                }
            }
        }
    }
}
