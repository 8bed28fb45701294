use dioxus::prelude::*;
use dioxus_router::Link;
use prep_core::model::AttemptId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{AttemptDetailVm, OutcomeRowVm, map_attempt_detail};

#[component]
pub fn AttemptView(id: i64) -> Element {
    let ctx = use_context::<AppContext>();
    let history = ctx.history();
    let namespace = ctx.namespace().clone();

    let resource = use_resource(move || {
        let history = history.clone();
        let namespace = namespace.clone();
        async move {
            let review = history
                .attempt_review(&namespace, AttemptId::new(id))
                .await
                .map_err(|err| ViewError::from_history(&err))?;
            Ok::<_, ViewError>(map_attempt_detail(&review))
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(detail) => rsx! {
                    AttemptDetails { detail }
                },
                ViewState::Error(err) => rsx! {
                    h2 { "Attempt Review" }
                    p { "{err.message()}" }
                    Link { to: Route::Dashboard {}, "Back to dashboard" }
                },
            }
        }
    }
}

#[component]
fn AttemptDetails(detail: AttemptDetailVm) -> Element {
    let results = detail.results;
    rsx! {
        h2 { "{detail.title}" }
        p { class: "muted", "Completed {detail.completed_at_str}" }
        dl { class: "summary",
            dt { "Score" }
            dd { class: "{results.band_class}", "{results.scaled_score} ({results.band_label})" }
            dt { "Correct" }
            dd { "{results.correct_label} ({results.percent}%)" }
            dt { "Time" }
            dd { "{results.time_label}" }
        }
        ul { class: "topics",
            for topic in results.topics {
                li { "{topic.topic}: {topic.label}" }
            }
        }
        ol { class: "outcomes",
            for row in detail.rows {
                OutcomeRow { row }
            }
        }
        Link { to: Route::Subject { slug: detail.subject_slug.to_string() }, "Back to subject" }
    }
}

#[component]
fn OutcomeRow(row: OutcomeRowVm) -> Element {
    rsx! {
        li { class: "outcome",
            div { class: "outcome-header",
                span { "Question {row.number}" }
                span { class: "outcome-status", "{row.status}" }
                if row.marked {
                    span { class: "marked-flag", "Marked" }
                }
            }
            p { class: "question-stem", "{row.stem}" }
            ul { class: "choices",
                for choice in row.choices {
                    li {
                        class: "{choice.class}",
                        "{choice.label}. {choice.text}"
                        if choice.was_chosen {
                            span { class: "choice-note", " (your answer)" }
                        }
                    }
                }
            }
        }
    }
}
