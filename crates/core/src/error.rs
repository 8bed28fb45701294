use thiserror::Error;

use crate::model::{AttemptError, NamespaceError, QuestionError, SessionError, SubjectError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Namespace(#[from] NamespaceError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}
