//! Shared error types for the services crate.

use thiserror::Error;

use prep_core::model::{SessionError, Subject, TestIndex};
use storage::bank::BankError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ExamService` and `ExamController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamServiceError {
    #[error("no questions available for {subject} test {}", .test_index.display_number())]
    NoQuestions {
        subject: Subject,
        test_index: TestIndex,
    },
    #[error("attempt limit of {limit} reached; reset the test to try again")]
    AttemptLimitReached { limit: usize },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `HistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error("questions for this attempt are no longer available")]
    QuestionsUnavailable,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Bank(#[from] BankError),
}
