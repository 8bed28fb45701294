mod attempt;
mod exam;
mod ids;
mod namespace;
mod progress;
mod question;
mod review;
mod subject;

pub use attempt::{AttemptError, CompletedAttempt, QuestionOutcome, grade_attempt};
pub use exam::{
    EXTENDED_TIME_FACTOR, ExamSession, ExamSettings, ExamView, NavigationIntent, NextOutcome,
    SessionError, SubmitReason, TickOutcome, exam_duration_secs,
};
pub use ids::{AttemptId, TestIndex};
pub use namespace::{Namespace, NamespaceError, UserId};
pub use progress::SavedProgress;
pub use question::{MAX_CHOICES, MIN_CHOICES, Question, QuestionError, choice_label};
pub use review::{ReviewRow, ReviewSheet};
pub use subject::{Subject, SubjectError, SubjectProfile};
