use std::path::Path;
use std::sync::Arc;

use prep_core::model::Namespace;
use storage::bank::QuestionBank;
use storage::repository::Storage;

use crate::Clock;
use crate::config::ExamConfig;
use crate::error::AppServicesError;
use crate::exam_service::ExamService;
use crate::history_service::HistoryService;

/// Assembles app-facing services for one namespace.
#[derive(Clone)]
pub struct AppServices {
    namespace: Namespace,
    config: ExamConfig,
    exams: Arc<ExamService>,
    history: Arc<HistoryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and a bank directory.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or bank loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        bank_dir: &Path,
        namespace: Namespace,
        clock: Clock,
        config: ExamConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let bank = QuestionBank::load_dir(bank_dir)?;
        if bank.is_empty() {
            tracing::warn!(dir = %bank_dir.display(), "question bank is empty");
        }
        Ok(Self::from_parts(storage, bank, namespace, clock, config))
    }

    /// Build services over in-memory storage.
    #[must_use]
    pub fn in_memory(bank: QuestionBank, namespace: Namespace, clock: Clock, config: ExamConfig) -> Self {
        Self::from_parts(Storage::in_memory(), bank, namespace, clock, config)
    }

    #[must_use]
    pub fn from_parts(
        storage: Storage,
        bank: QuestionBank,
        namespace: Namespace,
        clock: Clock,
        config: ExamConfig,
    ) -> Self {
        let bank = Arc::new(bank);
        let exams = Arc::new(ExamService::new(
            clock,
            config.clone(),
            Arc::clone(&bank),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.attempts),
        ));
        let history = Arc::new(HistoryService::new(
            config.max_attempts(),
            bank,
            Arc::clone(&storage.progress),
            Arc::clone(&storage.attempts),
        ));
        Self {
            namespace,
            config,
            exams,
            history,
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    #[must_use]
    pub fn config(&self) -> &ExamConfig {
        &self.config
    }

    #[must_use]
    pub fn exams(&self) -> Arc<ExamService> {
        Arc::clone(&self.exams)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }
}
