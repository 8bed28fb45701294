use std::sync::Arc;

use prep_core::model::Namespace;
use services::{ExamConfig, ExamService, HistoryService};

/// What the composition root hands to the views.
pub trait UiApp: Send + Sync {
    fn namespace(&self) -> Namespace;

    fn exams(&self) -> Arc<ExamService>;
    fn history(&self) -> Arc<HistoryService>;
}

#[derive(Clone)]
pub struct AppContext {
    namespace: Namespace,
    exams: Arc<ExamService>,
    history: Arc<HistoryService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            namespace: app.namespace(),
            exams: app.exams(),
            history: app.history(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    #[must_use]
    pub fn exams(&self) -> Arc<ExamService> {
        Arc::clone(&self.exams)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn config(&self) -> &ExamConfig {
        self.exams.config()
    }
}

// Provided by the composition root (`crates/app`) or the view test harness.

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
