use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use prep_core::model::{
    AttemptId, CompletedAttempt, ExamSession, Namespace, Question, Subject, TestIndex,
};
use prep_core::time::{fixed_clock, fixed_now};
use services::{AppServices, ExamConfig, ExamService, HistoryService};
use storage::bank::QuestionBank;
use storage::repository::Storage;

use crate::context::{UiApp, build_app_context};
use crate::views::{AttemptView, DashboardView, ExamView, SubjectView};

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn namespace(&self) -> Namespace {
        self.services.namespace().clone()
    }

    fn exams(&self) -> Arc<ExamService> {
        self.services.exams()
    }

    fn history(&self) -> Arc<HistoryService> {
        self.services.history()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Dashboard,
    Subject(&'static str),
    Exam(&'static str, u32),
    Attempt(i64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Dashboard => rsx! { DashboardView {} },
        ViewKind::Subject(slug) => rsx! { SubjectView { slug: slug.to_string() } },
        ViewKind::Exam(slug, number) => rsx! { ExamView { slug: slug.to_string(), number } },
        ViewKind::Attempt(id) => rsx! { AttemptView { id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub namespace: Namespace,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then let resources and spawned tasks run to quiescence.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..5 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    pub async fn seed_attempt(&self, attempt: &CompletedAttempt) -> AttemptId {
        self.storage
            .attempts
            .append_attempt(&self.namespace, attempt)
            .await
            .expect("append attempt")
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn questions(n: usize) -> Arc<[Question]> {
    (0..n)
        .map(|i| {
            Question::new(
                format!("Stem {i}"),
                vec!["alpha".into(), "beta".into(), "gamma".into(), "delta".into()],
                0,
            )
            .expect("valid question")
        })
        .collect()
}

/// General Chemistry has two 30-question tests; every other subject is empty.
pub fn bank() -> QuestionBank {
    let mut bank = QuestionBank::empty();
    bank.insert(Subject::GeneralChemistry, vec![questions(30), questions(30)]);
    bank
}

/// A submitted General Chemistry test 1 attempt with the first `correct` answers right.
pub fn completed_attempt(correct: usize) -> CompletedAttempt {
    let mut session =
        ExamSession::new(Subject::GeneralChemistry, TestIndex::new(0), questions(30))
            .expect("session");
    session.start(30, false, fixed_now());
    for _ in 0..correct {
        session.select_answer(0);
        session.next();
    }
    session.submit(fixed_now()).expect("submit")
}

pub fn setup_view_harness(view: ViewKind) -> ViewHarness {
    setup_view_harness_with_storage(view, Storage::in_memory())
}

pub fn setup_view_harness_with_storage(view: ViewKind, storage: Storage) -> ViewHarness {
    let namespace = Namespace::guest();
    let services = AppServices::from_parts(
        storage.clone(),
        bank(),
        namespace.clone(),
        fixed_clock(),
        ExamConfig::default(),
    );
    let app = Arc::new(TestApp { services });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness {
        dom,
        storage,
        namespace,
    }
}
