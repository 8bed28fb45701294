use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use prep_core::model::{NavigationIntent, Subject, TestIndex};
use services::{ExamCommand, ExamDriver, ExamHandle, ExamSnapshot};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ExamPageVm, ExamScreen};

use super::screens::{ConfirmDialog, IntroScreen, QuestionScreen, ResultsScreen, ReviewScreen};

#[derive(Clone)]
struct ExamLaunch {
    handle: ExamHandle,
    duration_minutes: u32,
}

#[component]
pub fn ExamView(slug: String, number: u32) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let exams = ctx.exams();
    let namespace = ctx.namespace().clone();
    let subject = Subject::from_slug(&slug).ok();
    let snapshot = use_signal(|| None::<ExamSnapshot>);
    let mut highlight = use_signal(|| false);

    let resource = use_resource(move || {
        let exams = exams.clone();
        let namespace = namespace.clone();
        let mut snapshot = snapshot;
        async move {
            let subject = subject.ok_or(ViewError::NotFound)?;
            let test_index = number
                .checked_sub(1)
                .map(TestIndex::new)
                .ok_or(ViewError::NotFound)?;
            let controller = exams
                .open(namespace, subject, test_index)
                .await
                .map_err(|err| {
                    tracing::info!(%subject, %test_index, error = %err, "exam not opened");
                    ViewError::from_exam(&err)
                })?;
            let duration_minutes = controller.duration_minutes();
            let (handle, _task) = ExamDriver::spawn(controller, exams.config());
            snapshot.set(Some(handle.snapshot()));
            Ok::<_, ViewError>(ExamLaunch {
                handle,
                duration_minutes,
            })
        }
    });

    let current_launch = move || {
        resource
            .value()
            .read()
            .as_ref()
            .and_then(|value| value.as_ref().ok())
            .cloned()
    };

    // Mirror driver snapshots into a signal; the loop ends when the driver stops.
    use_effect(move || {
        let Some(launch) = current_launch() else {
            return;
        };
        let mut rx = launch.handle.subscribe();
        let mut snapshot = snapshot;
        spawn(async move {
            while rx.changed().await.is_ok() {
                let next = rx.borrow_and_update().clone();
                snapshot.set(Some(next));
            }
        });
    });

    let send = use_callback(move |command: ExamCommand| {
        let Some(launch) = current_launch() else {
            return;
        };
        if !launch.handle.try_send(command) {
            tracing::warn!("exam driver is not accepting commands");
        }
    });

    let subject_route = Route::Subject { slug: slug.clone() };
    let on_exit = {
        let subject_route = subject_route.clone();
        use_callback(move |save: bool| {
            send.call(if save {
                ExamCommand::ExitAndSave
            } else {
                ExamCommand::ExitWithoutSave
            });
            navigator.push(subject_route.clone());
        })
    };
    let on_toggle_highlight = use_callback(move |()| highlight.set(!highlight()));
    let on_retake = use_callback(move |()| {
        let mut snapshot = snapshot;
        snapshot.set(None);
        let mut resource = resource;
        resource.restart();
    });

    let page = use_memo(move || {
        let duration = current_launch().map_or(0, |launch| launch.duration_minutes);
        snapshot
            .read()
            .as_ref()
            .map(|snap| ExamPageVm::from_snapshot(snap, duration))
    });

    let on_key = use_callback(move |evt: KeyboardEvent| {
        let on_question = page
            .read()
            .as_ref()
            .is_some_and(|vm| matches!(vm.screen, ExamScreen::Question(_)));
        if !on_question {
            return;
        }
        match evt.data.key() {
            Key::ArrowRight => {
                evt.prevent_default();
                send.call(ExamCommand::Navigate(NavigationIntent::Next));
            }
            Key::ArrowLeft => {
                evt.prevent_default();
                send.call(ExamCommand::Navigate(NavigationIntent::Previous));
            }
            Key::Character(value) => match value.as_str() {
                "m" | "M" => send.call(ExamCommand::ToggleMark),
                "a" | "b" | "c" | "d" | "e" | "f" => {
                    let offset = value.as_bytes()[0] - b'a';
                    send.call(ExamCommand::SelectAnswer(usize::from(offset)));
                }
                _ => {}
            },
            _ => {}
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page exam-page", tabindex: "0", onkeydown: move |evt| on_key.call(evt),
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    h2 { "Practice Test" }
                    p { class: "exam-unavailable", "{err.message()}" }
                    Link { class: "btn", to: subject_route.clone(), "Back" }
                },
                ViewState::Ready(_) => match page() {
                    None => rsx! {
                        p { "Loading..." }
                    },
                    Some(vm) => rsx! {
                        header { class: "exam-header",
                            h2 { "{vm.heading}" }
                            if !matches!(vm.screen, ExamScreen::Intro(_) | ExamScreen::Results(_)) {
                                span { class: "exam-clock", "{vm.clock_label}" }
                                span { class: "exam-answered", "{vm.answered_label}" }
                                button {
                                    class: "btn btn-secondary",
                                    onclick: move |_| on_exit.call(true),
                                    "Save & exit"
                                }
                                button {
                                    class: "btn btn-secondary",
                                    onclick: move |_| on_exit.call(false),
                                    "Exit without saving"
                                }
                            }
                        }
                        match vm.screen {
                            ExamScreen::Intro(intro) => rsx! {
                                IntroScreen { intro, send }
                            },
                            ExamScreen::Question(question) => rsx! {
                                QuestionScreen {
                                    question,
                                    navigating: vm.navigating,
                                    highlight: highlight(),
                                    on_toggle_highlight,
                                    send,
                                }
                            },
                            ExamScreen::Review(review) => rsx! {
                                ReviewScreen { review, send }
                            },
                            ExamScreen::Results(results) => rsx! {
                                ResultsScreen {
                                    results,
                                    subject_route: subject_route.clone(),
                                    on_retake,
                                }
                            },
                        }
                        if vm.awaiting_confirmation {
                            ConfirmDialog { send }
                        }
                    },
                },
            }
        }
    }
}
