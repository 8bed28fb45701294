use prep_core::model::{CompletedAttempt, Subject};
use services::{SubjectOverview, TestSummary};

use crate::vm::exam_vm::band_class;
use crate::vm::time_fmt::{format_datetime, format_duration};

const NO_SCORE: &str = "-";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectCardVm {
    pub slug: &'static str,
    pub name: &'static str,
    pub best_score_str: String,
    pub progress_label: String,
}

impl From<&SubjectOverview> for SubjectCardVm {
    fn from(overview: &SubjectOverview) -> Self {
        Self {
            slug: overview.subject.slug(),
            name: overview.subject.display_name(),
            best_score_str: score_str(overview.best_score()),
            progress_label: format!(
                "{} of {} tests attempted",
                overview.attempted_tests(),
                overview.tests.len()
            ),
        }
    }
}

#[must_use]
pub fn map_subject_cards(items: &[SubjectOverview]) -> Vec<SubjectCardVm> {
    items.iter().map(SubjectCardVm::from).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptRowVm {
    /// `None` for attempts that were never persisted.
    pub id: Option<i64>,
    pub label: String,
    pub score: u16,
    pub completed_at_str: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestRowVm {
    pub number: u32,
    pub title: String,
    pub attempts_label: String,
    pub best_score_str: String,
    pub last_attempt_str: String,
    pub avg_time_str: String,
    pub band_label: &'static str,
    pub band_class: &'static str,
    pub can_start: bool,
    pub has_questions: bool,
    pub attempts: Vec<AttemptRowVm>,
}

#[must_use]
pub fn map_test_row(
    summary: &TestSummary,
    attempts: &[CompletedAttempt],
    max_attempts: usize,
) -> TestRowVm {
    TestRowVm {
        number: summary.test_index.display_number(),
        title: format!("Test {}", summary.test_index.display_number()),
        attempts_label: format!("{} / {max_attempts} attempts", summary.attempt_count),
        best_score_str: score_str(summary.best_score),
        last_attempt_str: summary
            .last_attempt_at
            .map_or_else(|| NO_SCORE.to_string(), format_datetime),
        avg_time_str: format_duration(summary.avg_secs_per_question),
        band_label: summary.band.label(),
        band_class: band_class(summary.band),
        can_start: summary.can_start(),
        has_questions: summary.has_questions,
        attempts: attempts
            .iter()
            .enumerate()
            .map(|(i, attempt)| AttemptRowVm {
                id: attempt.id().map(|id| id.value()),
                label: format!("Attempt {}", i + 1),
                score: attempt.scaled_score(),
                completed_at_str: format_datetime(attempt.completed_at()),
            })
            .collect(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectPageVm {
    pub subject: Subject,
    pub name: &'static str,
    pub topics_label: String,
    pub duration_label: String,
    pub has_exhibit: bool,
    pub tests: Vec<TestRowVm>,
}

fn score_str(score: Option<u16>) -> String {
    score.map_or_else(|| NO_SCORE.to_string(), |s| s.to_string())
}
