use dioxus::prelude::*;
use dioxus_router::Link;
use prep_core::model::NavigationIntent;
use services::ExamCommand;

use crate::routes::Route;
use crate::vm::{ChoiceVm, ExhibitVm, IntroVm, QuestionVm, ResultsVm, ReviewVm};

#[component]
pub fn IntroScreen(intro: IntroVm, send: Callback<ExamCommand>) -> Element {
    let delay_enabled = intro.delay_enabled;
    let extended_time = intro.extended_time;

    rsx! {
        section { class: "exam-intro",
            h3 { "{intro.title}" }
            p { "{intro.question_count} questions | Time limit: {intro.time_label}" }
            if intro.has_exhibit {
                p { class: "muted", "A reference sheet is available during this test." }
            }
            if intro.resumed_answers > 0 {
                p { class: "exam-resume",
                    "Resuming saved progress: {intro.resumed_answers} answered."
                }
            }
            label {
                input {
                    r#type: "checkbox",
                    checked: delay_enabled,
                    onchange: move |_| send.call(ExamCommand::SetDelayEnabled(!delay_enabled)),
                }
                " Navigation delay"
            }
            label {
                input {
                    r#type: "checkbox",
                    checked: extended_time,
                    onchange: move |_| send.call(ExamCommand::SetExtendedTime(!extended_time)),
                }
                " Extended time (1.5x)"
            }
            button {
                class: "btn btn-primary",
                onclick: move |_| send.call(ExamCommand::Start),
                "Start"
            }
        }
    }
}

#[component]
pub fn QuestionScreen(
    question: QuestionVm,
    navigating: bool,
    highlight: bool,
    on_toggle_highlight: Callback<()>,
    send: Callback<ExamCommand>,
) -> Element {
    let mut exhibit_open = use_signal(|| false);
    let mark_label = if question.marked { "Unmark" } else { "Mark" };
    let next_label = if question.is_last { "Finish" } else { "Next" };
    let highlight_label = if highlight { "Highlight on" } else { "Highlight" };
    let (stem_class, toggle_class) = if highlight {
        ("question-stem highlight-mode", "btn btn-toggle active")
    } else {
        ("question-stem", "btn btn-toggle")
    };
    let has_exhibit = question.exhibit.is_some();
    let open_exhibit = question.exhibit.clone().filter(|_| exhibit_open());

    rsx! {
        section { class: "exam-question",
            div { class: "question-meta",
                span { "{question.position_label}" }
                if question.marked {
                    span { class: "marked-flag", "Marked" }
                }
                button {
                    class: "{toggle_class}",
                    onclick: move |_| on_toggle_highlight.call(()),
                    "{highlight_label}"
                }
            }
            p { class: "{stem_class}", "{question.stem}" }
            ul { class: "choices",
                for choice in question.choices {
                    ChoiceButton { choice, send }
                }
            }
            div { class: "question-nav",
                button {
                    class: "btn",
                    disabled: navigating,
                    onclick: move |_| send.call(ExamCommand::Navigate(NavigationIntent::Previous)),
                    "Previous"
                }
                button {
                    class: "btn",
                    onclick: move |_| send.call(ExamCommand::ToggleMark),
                    "{mark_label}"
                }
                if has_exhibit {
                    button {
                        class: "btn",
                        onclick: move |_| exhibit_open.set(true),
                        "Exhibit"
                    }
                }
                button {
                    class: "btn",
                    disabled: navigating,
                    onclick: move |_| send.call(ExamCommand::Navigate(NavigationIntent::OpenReview)),
                    "Review"
                }
                button {
                    class: "btn btn-primary",
                    disabled: navigating,
                    onclick: move |_| send.call(ExamCommand::Navigate(NavigationIntent::Next)),
                    "{next_label}"
                }
            }
            if let Some(exhibit) = open_exhibit {
                ExhibitDialog { exhibit, on_close: move |()| exhibit_open.set(false) }
            }
        }
    }
}

#[component]
fn ExhibitDialog(exhibit: ExhibitVm, on_close: Callback<()>) -> Element {
    rsx! {
        div { class: "modal-backdrop", onclick: move |_| on_close.call(()),
            div {
                class: "modal exhibit",
                role: "dialog",
                onclick: move |evt| evt.stop_propagation(),
                div { class: "modal-header",
                    h3 { "{exhibit.title}" }
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| on_close.call(()),
                        "Close"
                    }
                }
                p { class: "exhibit-body", "{exhibit.body}" }
            }
        }
    }
}

#[component]
fn ChoiceButton(choice: ChoiceVm, send: Callback<ExamCommand>) -> Element {
    let index = choice.index;
    let class = if choice.selected { "choice selected" } else { "choice" };
    rsx! {
        li {
            button {
                class: "{class}",
                onclick: move |_| send.call(ExamCommand::SelectAnswer(index)),
                span { class: "choice-label", "{choice.label}." }
                " {choice.text}"
            }
        }
    }
}

#[component]
pub fn ReviewScreen(review: ReviewVm, send: Callback<ExamCommand>) -> Element {
    let first_marked = review.first_marked;
    let first_incomplete = review.first_incomplete;

    rsx! {
        section { class: "exam-review",
            h3 { "Review" }
            p { class: "muted", "{review.summary_label}" }
            div { class: "review-actions",
                button {
                    class: "btn",
                    disabled: first_marked.is_none(),
                    onclick: move |_| {
                        if let Some(index) = first_marked {
                            send.call(ExamCommand::JumpTo(index));
                        }
                    },
                    "Review marked"
                }
                button {
                    class: "btn",
                    disabled: first_incomplete.is_none(),
                    onclick: move |_| {
                        if let Some(index) = first_incomplete {
                            send.call(ExamCommand::JumpTo(index));
                        }
                    },
                    "Review incomplete"
                }
                button {
                    class: "btn",
                    onclick: move |_| send.call(ExamCommand::JumpTo(0)),
                    "Review all"
                }
                button {
                    class: "btn btn-primary",
                    onclick: move |_| send.call(ExamCommand::RequestSubmit),
                    "End"
                }
            }
            table { class: "review-table",
                thead {
                    tr {
                        th { "Question" }
                        th { "Marked" }
                        th { "Status" }
                    }
                }
                tbody {
                    for row in review.rows {
                        tr {
                            key: "{row.index}",
                            td {
                                button {
                                    class: "link",
                                    onclick: move |_| send.call(ExamCommand::JumpTo(row.index)),
                                    "{row.label}"
                                }
                            }
                            td { if row.marked { "Yes" } }
                            td { "{row.status}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn ResultsScreen(results: ResultsVm, subject_route: Route, on_retake: Callback<()>) -> Element {
    rsx! {
        section { class: "exam-results",
            h3 { "Results" }
            if results.timed_out {
                p { class: "muted", "Time expired. Your answers were submitted automatically." }
            }
            p { class: "score {results.band_class}", "{results.scaled_score}" }
            p { "{results.band_label}" }
            dl { class: "summary",
                dt { "Correct" }
                dd { "{results.correct_label} ({results.percent}%)" }
                dt { "Time" }
                dd { "{results.time_label}" }
                dt { "Avg. per question" }
                dd { "{results.avg_label}" }
            }
            h4 { "By topic" }
            ul { class: "topics",
                for topic in results.topics {
                    li { "{topic.topic}: {topic.label} ({topic.percent}%)" }
                }
            }
            div { class: "results-actions",
                Link { class: "btn", to: subject_route, "Back to subject" }
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| on_retake.call(()),
                    "Retake"
                }
            }
        }
    }
}

#[component]
pub fn ConfirmDialog(send: Callback<ExamCommand>) -> Element {
    rsx! {
        div { class: "modal-backdrop",
            div { class: "modal", role: "dialog",
                h3 { "End the exam?" }
                p { "Your answers will be submitted and scored." }
                div { class: "modal-actions",
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| send.call(ExamCommand::CancelSubmit),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| send.call(ExamCommand::Submit),
                        "Submit"
                    }
                }
            }
        }
    }
}
