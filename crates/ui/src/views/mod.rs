mod attempt;
mod dashboard;
mod exam;
mod state;
mod subject;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use attempt::AttemptView;
pub use dashboard::DashboardView;
pub use exam::ExamView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use subject::SubjectView;
