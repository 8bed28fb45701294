use dioxus::prelude::*;
use dioxus_router::Link;
use prep_core::model::{Subject, TestIndex};
use storage::repository::ExamSlot;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{SubjectPageVm, TestRowVm, format_duration, map_test_row};

#[component]
pub fn SubjectView(slug: String) -> Element {
    let ctx = use_context::<AppContext>();
    let history = ctx.history();
    let namespace = ctx.namespace().clone();
    let config = ctx.config().clone();
    let max_attempts = config.max_attempts();
    let subject = Subject::from_slug(&slug).ok();
    let mut reset_error = use_signal(|| None::<ViewError>);

    let resource = {
        let history = history.clone();
        let namespace = namespace.clone();
        use_resource(move || {
            let history = history.clone();
            let namespace = namespace.clone();
            let config = config.clone();
            async move {
                let subject = subject.ok_or(ViewError::NotFound)?;
                let overview = history
                    .dashboard(&namespace)
                    .await
                    .map_err(|err| ViewError::from_history(&err))?
                    .into_iter()
                    .find(|o| o.subject == subject)
                    .ok_or(ViewError::NotFound)?;

                let mut tests = Vec::with_capacity(overview.tests.len());
                for summary in &overview.tests {
                    let slot = ExamSlot::new(namespace.clone(), subject, summary.test_index);
                    let attempts = history
                        .attempts(&slot)
                        .await
                        .map_err(|err| ViewError::from_history(&err))?;
                    tests.push(map_test_row(summary, &attempts, max_attempts));
                }

                let minutes = config.duration_minutes(subject);
                Ok(SubjectPageVm {
                    subject,
                    name: subject.display_name(),
                    topics_label: subject.topics().join(", "),
                    duration_label: format_duration(Some(minutes * 60)),
                    has_exhibit: subject.profile().has_exhibit,
                    tests,
                })
            }
        })
    };

    let on_reset = use_callback(move |number: u32| {
        let Some(subject) = subject else {
            return;
        };
        let history = history.clone();
        let slot = ExamSlot::new(
            namespace.clone(),
            subject,
            TestIndex::new(number.saturating_sub(1)),
        );
        let mut resource = resource;
        spawn(async move {
            match history.reset_test(&slot).await {
                Ok(_) => {
                    reset_error.set(None);
                    resource.restart();
                }
                Err(err) => {
                    tracing::warn!(slot = %slot, error = %err, "reset failed");
                    reset_error.set(Some(ViewError::from_history(&err)));
                }
            }
        });
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
                ViewState::Ready(page) => rsx! {
                    h2 { "{page.name}" }
                    p { class: "subject-meta",
                        "Time limit: {page.duration_label}"
                        if page.has_exhibit {
                            " | Reference sheet available"
                        }
                    }
                    p { class: "subject-topics", "Topics: {page.topics_label}" }
                    if let Some(err) = reset_error() {
                        p { class: "error", "{err.message()}" }
                    }
                    ul { class: "test-rows",
                        for row in page.tests {
                            TestRow {
                                slug: page.subject.slug().to_string(),
                                row,
                                on_reset,
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    h2 { "Subject" }
                    p { "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn TestRow(slug: String, row: TestRowVm, on_reset: Callback<u32>) -> Element {
    let number = row.number;
    let has_attempts = !row.attempts.is_empty();
    rsx! {
        li { class: "test-row",
            div { class: "test-row-header",
                h3 { "{row.title}" }
                span { class: "band {row.band_class}", "{row.band_label}" }
            }
            dl { class: "test-stats",
                dt { "Attempts" }
                dd { "{row.attempts_label}" }
                dt { "Best score" }
                dd { "{row.best_score_str}" }
                dt { "Last attempt" }
                dd { "{row.last_attempt_str}" }
                dt { "Avg. per question" }
                dd { "{row.avg_time_str}" }
            }
            if has_attempts {
                ol { class: "attempt-list",
                    for attempt in row.attempts.iter() {
                        li {
                            match attempt.id {
                                Some(id) => rsx! {
                                    Link { to: Route::Attempt { id },
                                        "{attempt.label}: {attempt.score}"
                                    }
                                },
                                None => rsx! {
                                    span { "{attempt.label}: {attempt.score}" }
                                },
                            }
                            span { class: "attempt-date", " {attempt.completed_at_str}" }
                        }
                    }
                }
            }
            div { class: "test-actions",
                if !row.has_questions {
                    span { class: "muted", "No questions available" }
                } else if row.can_start {
                    Link { class: "btn", to: Route::Exam { slug: slug.clone(), number }, "Start" }
                } else {
                    span { class: "muted", "No attempts left" }
                }
                if has_attempts {
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| on_reset.call(number),
                        "Reset"
                    }
                }
            }
        }
    }
}
