use dioxus::prelude::*;
use services::{ExamServiceError, HistoryError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    NoQuestions,
    AttemptLimit,
    NotFound,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::NoQuestions => "No questions available for this exam.",
            ViewError::AttemptLimit => {
                "You have used every attempt for this test. Reset it to try again."
            }
            ViewError::NotFound => "Not found.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }

    #[must_use]
    pub fn from_exam(err: &ExamServiceError) -> Self {
        match err {
            ExamServiceError::NoQuestions { .. } => ViewError::NoQuestions,
            ExamServiceError::AttemptLimitReached { .. } => ViewError::AttemptLimit,
            _ => ViewError::Unknown,
        }
    }

    #[must_use]
    pub fn from_history(err: &HistoryError) -> Self {
        match err {
            HistoryError::QuestionsUnavailable => ViewError::NoQuestions,
            HistoryError::Storage(storage::repository::StorageError::NotFound) => {
                ViewError::NotFound
            }
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
