use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{SubjectCardVm, map_subject_cards};

#[derive(Clone, Debug, PartialEq)]
struct DashboardData {
    cards: Vec<SubjectCardVm>,
}

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let history = ctx.history();
    let namespace = ctx.namespace().clone();

    let resource = use_resource(move || {
        let history = history.clone();
        let namespace = namespace.clone();
        async move {
            let overview = history.dashboard(&namespace).await.map_err(|err| {
                tracing::warn!(error = %err, "dashboard load failed");
                ViewError::from_history(&err)
            })?;
            Ok(DashboardData {
                cards: map_subject_cards(&overview),
            })
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page",
            h2 { "Dashboard" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    ul { class: "subject-cards",
                        for card in data.cards {
                            SubjectCard { card }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
            }
        }
    }
}

#[component]
fn SubjectCard(card: SubjectCardVm) -> Element {
    rsx! {
        li { class: "subject-card",
            Link { to: Route::Subject { slug: card.slug.to_string() },
                span { class: "subject-name", "{card.name}" }
            }
            p { "Best score: {card.best_score_str}" }
            p { class: "subject-progress", "{card.progress_label}" }
        }
    }
}
