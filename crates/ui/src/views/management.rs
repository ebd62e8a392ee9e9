use dioxus::prelude::*;

use api::{EntityDraft, EntityKind, EntityRecord};
use services::ManagementError;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Debug, PartialEq)]
struct Roster {
    records: Vec<EntityRecord>,
}

/// Instructor screen for the roster collections. One list at a time,
/// switched by the kind tabs; the form below doubles for create and
/// rename.
#[component]
pub fn ManagementView() -> Element {
    let ctx = use_context::<AppContext>();
    let management = ctx.management();

    let kind = use_signal(|| EntityKind::Teacher);

    let management_for_resource = management.clone();
    let resource = use_resource(move || {
        let management = management_for_resource.clone();
        let kind = kind();
        async move {
            let records = management
                .list(kind)
                .await
                .map_err(|err| ViewError::from_management(&err))?;
            Ok(Roster { records })
        }
    });
    let state = view_state_from_resource(&resource);

    let mut name = use_signal(String::new);
    let mut detail = use_signal(String::new);
    let mut editing = use_signal(|| None::<u64>);
    let mut form_status = use_signal(|| None::<&'static str>);

    let on_pick_kind = use_callback(move |picked: EntityKind| {
        let mut kind = kind;
        kind.set(picked);
        editing.set(None);
        name.set(String::new());
        detail.set(String::new());
        form_status.set(None);
    });

    let on_edit = use_callback(move |record: EntityRecord| {
        editing.set(Some(record.id));
        name.set(record.name);
        detail.set(record.detail.unwrap_or_default());
        form_status.set(None);
    });

    let on_delete = {
        let management = management.clone();
        use_callback(move |id: u64| {
            let management = management.clone();
            let mut resource = resource;
            spawn(async move {
                match management.delete(kind(), id).await {
                    Ok(()) => {
                        if editing() == Some(id) {
                            editing.set(None);
                            name.set(String::new());
                            detail.set(String::new());
                        }
                        resource.restart();
                    }
                    Err(_) => form_status.set(Some("Could not delete the record. Try again.")),
                }
            });
        })
    };

    let on_save = {
        let management = management.clone();
        use_callback(move |evt: FormEvent| {
            evt.prevent_default();
            let management = management.clone();
            let mut resource = resource;
            spawn(async move {
                let draft = EntityDraft {
                    name: name.read().clone(),
                    detail: Some(detail.read().clone()),
                };
                let result = match editing() {
                    Some(id) => management.update(kind(), id, draft).await,
                    None => management.create(kind(), draft).await,
                };
                match result {
                    Ok(_) => {
                        editing.set(None);
                        name.set(String::new());
                        detail.set(String::new());
                        form_status.set(None);
                        resource.restart();
                    }
                    Err(ManagementError::EmptyName) => {
                        form_status.set(Some("A name is required."));
                    }
                    Err(_) => {
                        form_status.set(Some("Could not reach the server. Try again."));
                    }
                }
            });
        })
    };

    let selected = kind();
    let empty_label = format!("No {} yet.", selected.label().to_lowercase());
    let form_title = if editing().is_some() {
        "Edit record"
    } else {
        "Add record"
    };

    rsx! {
        div { class: "page",
            h2 { "Manage" }

            div { class: "roster-tabs",
                for tab in EntityKind::ALL {
                    button {
                        key: "{tab.path_segment()}",
                        class: if tab == selected { "roster-tab roster-tab--active" } else { "roster-tab" },
                        r#type: "button",
                        onclick: move |_| on_pick_kind.call(tab),
                        "{tab.label()}"
                    }
                }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(roster) => rsx! {
                    if roster.records.is_empty() {
                        p { "{empty_label}" }
                    } else {
                        ul { class: "roster-list",
                            for record in roster.records {
                                RosterRow {
                                    key: "{record.id}",
                                    record,
                                    on_edit,
                                    on_delete,
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "view-error", "{err.message()}" }
                },
            }

            form { class: "roster-form", onsubmit: on_save,
                h3 { "{form_title}" }
                if let Some(status) = form_status() {
                    p { class: "roster-form__status", "{status}" }
                }
                label { class: "roster-form__field",
                    span { "Name" }
                    input {
                        r#type: "text",
                        name: "name",
                        value: "{name}",
                        oninput: move |evt| name.set(evt.value()),
                    }
                }
                label { class: "roster-form__field",
                    span { "Detail" }
                    input {
                        r#type: "text",
                        name: "detail",
                        value: "{detail}",
                        oninput: move |evt| detail.set(evt.value()),
                    }
                }
                button { class: "btn btn-primary", r#type: "submit", "Save" }
                if editing().is_some() {
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| {
                            editing.set(None);
                            name.set(String::new());
                            detail.set(String::new());
                            form_status.set(None);
                        },
                        "Cancel"
                    }
                }
            }
        }
    }
}

#[component]
fn RosterRow(
    record: EntityRecord,
    on_edit: EventHandler<EntityRecord>,
    on_delete: EventHandler<u64>,
) -> Element {
    let id = record.id;
    let for_edit = record.clone();
    rsx! {
        li { class: "roster-row",
            div { class: "roster-row__text",
                span { class: "roster-row__name", "{record.name}" }
                if let Some(detail) = record.detail.as_deref() {
                    span { class: "roster-row__detail", "{detail}" }
                }
            }
            div { class: "roster-row__actions",
                button {
                    r#type: "button",
                    onclick: move |_| on_edit.call(for_edit.clone()),
                    "Edit"
                }
                button {
                    r#type: "button",
                    onclick: move |_| on_delete.call(id),
                    "Delete"
                }
            }
        }
    }
}
