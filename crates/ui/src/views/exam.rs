use std::time::Duration;

use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::use_navigator;

use exam_core::model::{ChoiceOption, OptionId, Question, QuestionId, QuestionKind, QuizId};
use exam_core::navigation::{Navigator, anchor_id};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ExamIntent, ExamVm, format_datetime, start_exam};

/// The timed assessment page.
///
/// One `ExamVm` owns the live session. User intents and the 1 Hz tick
/// both funnel through the same signal, so the session is never touched
/// from two places at once.
#[component]
pub fn ExamView(quiz_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let quiz_id = QuizId::new(quiz_id);
    let assessments = ctx.assessments();

    let vm = use_signal(|| None::<ExamVm>);
    let mut ticker_started = use_signal(|| false);

    let assessments_for_resource = assessments.clone();
    let resource = use_resource(move || {
        let assessments = assessments_for_resource.clone();
        let mut vm = vm;
        async move {
            let started = start_exam(&assessments, quiz_id).await?;
            vm.set(Some(started));
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    // One countdown task per mounted session. It drives the timer and
    // stops itself once the session is submitted.
    let assessments_for_ticker = assessments.clone();
    use_effect(move || {
        if vm.read().is_none() || ticker_started() {
            return;
        }
        ticker_started.set(true);
        let assessments = assessments_for_ticker.clone();
        let mut vm = vm;
        spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.tick().await;
            loop {
                interval.tick().await;
                let taken = vm.write().take();
                let Some(mut value) = taken else { break };
                let submitted = value.tick(&assessments).await;
                *vm.write() = Some(value);
                if submitted {
                    break;
                }
            }
        });
    });

    let dispatch = {
        let assessments = assessments.clone();
        use_callback(move |intent: ExamIntent| {
            let mut vm = vm;
            match intent {
                ExamIntent::Jump(question) => {
                    let anchor = anchor_id(question);
                    let js = format!(
                        "document.getElementById({anchor:?})?.scrollIntoView({{ behavior: 'smooth', block: 'start' }});"
                    );
                    let _ = eval(&js);
                }
                ExamIntent::ConfirmSubmit | ExamIntent::Resubmit => {
                    let assessments = assessments.clone();
                    spawn(async move {
                        let taken = vm.write().take();
                        let Some(mut value) = taken else { return };
                        match intent {
                            ExamIntent::ConfirmSubmit => value.confirm_submit(&assessments).await,
                            _ => value.resubmit(&assessments).await,
                        }
                        // Always put the session back so the page stays usable.
                        *vm.write() = Some(value);
                    });
                }
                sync_intent => {
                    if let Some(value) = vm.write().as_mut() {
                        value.apply(&sync_intent);
                    }
                }
            }
        })
    };

    let vm_guard = vm.read();
    let exam = vm_guard.as_ref();
    let title = exam.map_or(String::new(), |exam| exam.session().quiz().title().to_string());
    let description = exam.and_then(|exam| {
        exam.session()
            .quiz()
            .description()
            .map(ToString::to_string)
    });
    let remaining_label = exam.map_or_else(String::new, ExamVm::remaining_label);
    let time_critical = exam.is_some_and(ExamVm::is_time_critical);
    let timer_class = if time_critical {
        "exam-timer exam-timer--critical"
    } else {
        "exam-timer"
    };
    let answered = exam.map_or(0, ExamVm::answered_count);
    let total = exam.map_or(0, ExamVm::total_questions);
    let flagged = exam.map_or(0, ExamVm::flagged_count);
    let progress_label = format!("Answered {answered} / {total}");
    let rows = exam.map_or_else(Vec::new, ExamVm::rows);
    let is_confirming = exam.is_some_and(ExamVm::is_confirming);
    let is_submitted = exam.is_some_and(ExamVm::is_submitted);
    let unanswered = total.saturating_sub(answered);

    rsx! {
        div { class: "page exam-page",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading quiz..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "view-error", "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let _ = navigator.push(Route::Quizzes {});
                        },
                        "Back to quizzes"
                    }
                },
                ViewState::Ready(()) => rsx! {
                    header { class: "exam-header",
                        div { class: "exam-header__heading",
                            h2 { class: "exam-header__title", "{title}" }
                            if let Some(description) = description.as_deref() {
                                p { class: "exam-header__description", "{description}" }
                            }
                        }
                        div { class: "exam-header__status",
                            span { class: "{timer_class}", id: "exam-timer", "{remaining_label}" }
                            span { class: "exam-progress", "{progress_label}" }
                            button {
                                class: "btn btn-primary",
                                id: "exam-submit",
                                r#type: "button",
                                disabled: is_submitted || is_confirming,
                                onclick: move |_| dispatch.call(ExamIntent::RequestSubmit),
                                "Submit"
                            }
                        }
                    }
                    div { class: "exam-layout",
                        nav { class: "question-index", aria_label: "Question index",
                            ol { class: "question-index__list",
                                for row in rows {
                                    li { key: "{row.id}",
                                        button {
                                            class: index_entry_class(row.answered, row.flagged),
                                            r#type: "button",
                                            onclick: move |_| dispatch.call(ExamIntent::Jump(row.id)),
                                            "{row.number}"
                                        }
                                    }
                                }
                            }
                        }
                        div { class: "question-list",
                            if let Some(exam) = exam {
                                for question in exam.session().quiz().questions().iter().cloned() {
                                    QuestionCard {
                                        key: "{question.id()}",
                                        question: question.clone(),
                                        number: Navigator::new(exam.session().quiz())
                                            .display_number(question.id())
                                            .unwrap_or(0),
                                        selected: exam.selected_option(question.id()),
                                        text: exam.text_answer(question.id()).map(ToString::to_string),
                                        flagged: exam.session().is_flagged(question.id()),
                                        locked: is_submitted || is_confirming,
                                        on_intent: dispatch,
                                    }
                                }
                            }
                        }
                    }
                    if is_confirming {
                        div { class: "exam-overlay",
                            div {
                                class: "exam-dialog",
                                role: "dialog",
                                aria_modal: "true",
                                aria_labelledby: "exam-confirm-title",
                                h3 { class: "exam-dialog__title", id: "exam-confirm-title", "Submit your answers?" }
                                p { "You have answered {answered} of {total} questions." }
                                if unanswered > 0 {
                                    p { class: "exam-dialog__warning",
                                        "{unanswered} unanswered questions will be submitted blank."
                                    }
                                }
                                if flagged > 0 {
                                    p { class: "exam-dialog__warning",
                                        "{flagged} questions are still flagged for review."
                                    }
                                }
                                div { class: "exam-dialog__actions",
                                    button {
                                        class: "btn btn-secondary",
                                        id: "exam-confirm-cancel",
                                        r#type: "button",
                                        onclick: move |_| dispatch.call(ExamIntent::CancelSubmit),
                                        "Keep working"
                                    }
                                    button {
                                        class: "btn btn-primary",
                                        id: "exam-confirm-submit",
                                        r#type: "button",
                                        onclick: move |_| dispatch.call(ExamIntent::ConfirmSubmit),
                                        "Submit now"
                                    }
                                }
                            }
                        }
                    }
                    if is_submitted {
                        SubmittedPanel { exam_signal: vm, on_intent: dispatch }
                    }
                },
            }
        }
    }
}

fn index_entry_class(answered: bool, flagged: bool) -> String {
    let mut class = String::from("question-index__entry");
    if answered {
        class.push_str(" question-index__entry--answered");
    }
    if flagged {
        class.push_str(" question-index__entry--flagged");
    }
    class
}

#[component]
fn QuestionCard(
    question: Question,
    number: usize,
    selected: Option<OptionId>,
    text: Option<String>,
    flagged: bool,
    locked: bool,
    on_intent: EventHandler<ExamIntent>,
) -> Element {
    let question_id = question.id();
    let anchor = anchor_id(question_id);
    let flag_label = if flagged { "Unflag" } else { "Flag for review" };
    let card_class = if flagged {
        "question-card question-card--flagged"
    } else {
        "question-card"
    };
    let points = question.points();
    let points_label = if points == 1 {
        "1 point".to_string()
    } else {
        format!("{points} points")
    };

    rsx! {
        section { class: "{card_class}", id: "{anchor}",
            header { class: "question-card__header",
                span { class: "question-card__number", "Question {number}" }
                span { class: "question-card__meta", "{question.kind().label()} · {points_label}" }
                button {
                    class: "question-card__flag",
                    r#type: "button",
                    disabled: locked,
                    onclick: move |_| on_intent.call(ExamIntent::ToggleFlag(question_id)),
                    "{flag_label}"
                }
            }
            p { class: "question-card__prompt", "{question.prompt()}" }
            match question.kind() {
                QuestionKind::SingleChoice { options } | QuestionKind::TrueFalse { options } => rsx! {
                    ul { class: "question-card__options",
                        for option in options.iter() {
                            ChoiceRow {
                                key: "{option.id()}",
                                question_id: question_id,
                                option: option.clone(),
                                checked: selected == Some(option.id()),
                                locked: locked,
                                on_intent: on_intent,
                            }
                        }
                    }
                },
                QuestionKind::OpenEnded => rsx! {
                    textarea {
                        class: "question-card__essay",
                        rows: 6,
                        disabled: locked,
                        value: text.as_deref().unwrap_or_default(),
                        oninput: move |evt| {
                            on_intent.call(ExamIntent::EditText(question_id, evt.value()));
                        },
                    }
                },
                QuestionKind::FillInBlank => rsx! {
                    input {
                        class: "question-card__blank",
                        r#type: "text",
                        disabled: locked,
                        value: text.as_deref().unwrap_or_default(),
                        oninput: move |evt| {
                            on_intent.call(ExamIntent::EditText(question_id, evt.value()));
                        },
                    }
                },
            }
        }
    }
}

#[component]
fn ChoiceRow(
    question_id: QuestionId,
    option: ChoiceOption,
    checked: bool,
    locked: bool,
    on_intent: EventHandler<ExamIntent>,
) -> Element {
    let option_id = option.id();
    rsx! {
        li {
            label { class: "question-card__option",
                input {
                    r#type: "radio",
                    name: "question-{question_id}",
                    checked: checked,
                    disabled: locked,
                    onclick: move |_| {
                        on_intent.call(ExamIntent::Select(question_id, option_id));
                    },
                }
                span { "{option.text()}" }
            }
        }
    }
}

#[component]
fn SubmittedPanel(
    exam_signal: Signal<Option<ExamVm>>,
    on_intent: EventHandler<ExamIntent>,
) -> Element {
    let navigator = use_navigator();
    let guard = exam_signal.read();
    let Some(exam) = guard.as_ref() else {
        return rsx! {};
    };
    let auto_submitted = exam.auto_submitted();
    let receipt_line = exam.receipt().map(|receipt| {
        format!(
            "Receipt {} · recorded {}",
            receipt.id,
            format_datetime(receipt.recorded_at)
        )
    });
    let delivery_error = exam.delivery_error();

    rsx! {
        div { class: "exam-overlay",
            div {
                class: "exam-dialog exam-dialog--submitted",
                role: "dialog",
                aria_modal: "true",
                aria_labelledby: "exam-submitted-title",
                h3 { class: "exam-dialog__title", id: "exam-submitted-title",
                    if auto_submitted {
                        "Time is up"
                    } else {
                        "Submission recorded"
                    }
                }
                if auto_submitted {
                    p { "The time limit was reached and your answers were submitted automatically." }
                }
                if let Some(receipt_line) = receipt_line {
                    p { class: "exam-dialog__receipt", "{receipt_line}" }
                }
                if let Some(err) = delivery_error {
                    p { class: "exam-dialog__warning", "{err.message()}" }
                    button {
                        class: "btn btn-primary",
                        id: "exam-resend",
                        r#type: "button",
                        onclick: move |_| on_intent.call(ExamIntent::Resubmit),
                        "Resend answers"
                    }
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| {
                        let _ = navigator.push(Route::Quizzes {});
                    },
                    "Back to quizzes"
                }
            }
        }
    }
}
