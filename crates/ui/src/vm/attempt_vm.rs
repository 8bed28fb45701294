use prep_core::model::choice_label;
use services::AttemptReview;

use crate::vm::exam_vm::{ResultsVm, map_results};
use crate::vm::time_fmt::format_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewChoiceVm {
    pub label: char,
    pub text: String,
    pub is_correct: bool,
    pub was_chosen: bool,
    pub class: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutcomeRowVm {
    pub number: usize,
    pub stem: String,
    pub status: &'static str,
    pub marked: bool,
    pub choices: Vec<ReviewChoiceVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptDetailVm {
    pub title: String,
    pub subject_slug: &'static str,
    pub completed_at_str: String,
    pub results: ResultsVm,
    pub rows: Vec<OutcomeRowVm>,
}

#[must_use]
pub fn map_attempt_detail(review: &AttemptReview) -> AttemptDetailVm {
    let attempt = &review.attempt;
    let rows = review
        .outcomes
        .iter()
        .filter_map(|outcome| {
            let question = review.questions.get(outcome.index)?;
            let status = if outcome.is_correct() {
                "Correct"
            } else if outcome.is_skipped() {
                "Skipped"
            } else {
                "Incorrect"
            };
            Some(OutcomeRowVm {
                number: outcome.index + 1,
                stem: question.stem().to_string(),
                status,
                marked: outcome.marked,
                choices: question
                    .choices()
                    .iter()
                    .enumerate()
                    .map(|(i, text)| {
                        let is_correct = i == outcome.correct;
                        let was_chosen = outcome.chosen == Some(i);
                        ReviewChoiceVm {
                            label: choice_label(i),
                            text: text.clone(),
                            is_correct,
                            was_chosen,
                            class: match (is_correct, was_chosen) {
                                (true, _) => "choice correct",
                                (false, true) => "choice chosen",
                                (false, false) => "choice",
                            },
                        }
                    })
                    .collect(),
            })
        })
        .collect();

    AttemptDetailVm {
        title: format!(
            "{} Test {}",
            attempt.subject().display_name(),
            attempt.test_index().display_number()
        ),
        subject_slug: attempt.subject().slug(),
        completed_at_str: format_datetime(attempt.completed_at()),
        results: map_results(attempt),
        rows,
    }
}
