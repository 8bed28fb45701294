use prep_core::model::{
    CompletedAttempt, ExamSession, ExamView, Subject, SubmitReason, choice_label,
    exam_duration_secs,
};
use prep_core::scoring::{ScoreBand, topic_breakdown};
use services::ExamSnapshot;

use crate::vm::time_fmt::{format_clock, format_duration};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceVm {
    pub index: usize,
    pub label: char,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntroVm {
    pub title: String,
    pub question_count: usize,
    pub time_label: String,
    pub delay_enabled: bool,
    pub extended_time: bool,
    pub has_exhibit: bool,
    /// Answers carried over from a saved session.
    pub resumed_answers: usize,
}

/// Reference sheet a subject may consult while answering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExhibitVm {
    pub title: &'static str,
    pub body: &'static str,
}

#[must_use]
pub fn exhibit_for(subject: Subject) -> Option<ExhibitVm> {
    if !subject.profile().has_exhibit {
        return None;
    }
    let (title, body) = match subject {
        Subject::QuantitativeReasoning => (
            "Formula Reference",
            "Common algebra, geometry and probability formulas for this section.",
        ),
        _ => (
            "Periodic Table",
            "Periodic table of the elements with atomic numbers and masses.",
        ),
    };
    Some(ExhibitVm { title, body })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub position_label: String,
    pub stem: String,
    pub choices: Vec<ChoiceVm>,
    pub marked: bool,
    pub is_last: bool,
    pub exhibit: Option<ExhibitVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRowVm {
    pub index: usize,
    pub label: String,
    pub marked: bool,
    pub status: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewVm {
    pub rows: Vec<ReviewRowVm>,
    pub first_marked: Option<usize>,
    pub first_incomplete: Option<usize>,
    pub summary_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicVm {
    pub topic: &'static str,
    pub label: String,
    pub percent: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub scaled_score: u16,
    pub correct_label: String,
    pub percent: u32,
    pub band_label: &'static str,
    pub band_class: &'static str,
    pub time_label: String,
    pub avg_label: String,
    pub timed_out: bool,
    pub topics: Vec<TopicVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExamScreen {
    Intro(IntroVm),
    Question(QuestionVm),
    Review(ReviewVm),
    Results(ResultsVm),
}

/// Everything the exam page renders for one snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExamPageVm {
    pub heading: String,
    pub clock_label: String,
    pub answered_label: String,
    pub awaiting_confirmation: bool,
    pub navigating: bool,
    pub screen: ExamScreen,
}

impl ExamPageVm {
    #[must_use]
    pub fn from_snapshot(snapshot: &ExamSnapshot, duration_minutes: u32) -> Self {
        let session = &snapshot.session;
        let screen = match session.view() {
            ExamView::Intro => ExamScreen::Intro(map_intro(session, duration_minutes)),
            ExamView::InProgress => ExamScreen::Question(map_question(session)),
            ExamView::Review => ExamScreen::Review(map_review(session)),
            ExamView::Results => match snapshot.last_attempt.as_ref() {
                Some(attempt) => ExamScreen::Results(map_results(attempt)),
                None => ExamScreen::Review(map_review(session)),
            },
        };

        Self {
            heading: format!(
                "{} Test {}",
                session.subject().display_name(),
                session.test_index().display_number()
            ),
            clock_label: format_clock(session.time_remaining_secs()),
            answered_label: format!(
                "{} of {} answered",
                session.answered_count(),
                session.question_count()
            ),
            awaiting_confirmation: snapshot.awaiting_confirmation,
            navigating: snapshot.pending_navigation.is_some(),
            screen,
        }
    }
}

fn map_intro(session: &ExamSession, duration_minutes: u32) -> IntroVm {
    let settings = session.settings();
    let secs = exam_duration_secs(duration_minutes, settings.extended_time);
    IntroVm {
        title: format!(
            "{} Practice Test {}",
            session.subject().display_name(),
            session.test_index().display_number()
        ),
        question_count: session.question_count(),
        time_label: format_duration(Some(secs)),
        delay_enabled: settings.delay_enabled,
        extended_time: settings.extended_time,
        has_exhibit: session.subject().profile().has_exhibit,
        resumed_answers: session.answered_count(),
    }
}

fn map_question(session: &ExamSession) -> QuestionVm {
    let index = session.current_index();
    let question = session.current_question();
    let chosen = session.answer_for(index);
    QuestionVm {
        position_label: format!("Question {} of {}", index + 1, session.question_count()),
        stem: question.stem().to_string(),
        choices: question
            .choices()
            .iter()
            .enumerate()
            .map(|(i, text)| ChoiceVm {
                index: i,
                label: choice_label(i),
                text: text.clone(),
                selected: chosen == Some(i),
            })
            .collect(),
        marked: session.is_marked(index),
        is_last: session.is_last_question(),
        exhibit: exhibit_for(session.subject()),
    }
}

fn map_review(session: &ExamSession) -> ReviewVm {
    let sheet = session.review_sheet();
    ReviewVm {
        rows: sheet
            .rows()
            .iter()
            .map(|row| ReviewRowVm {
                index: row.index,
                label: row.label(),
                marked: row.marked,
                status: if row.completed { "Complete" } else { "Incomplete" },
            })
            .collect(),
        first_marked: sheet.first_marked(),
        first_incomplete: sheet.first_incomplete(),
        summary_label: format!(
            "{} marked, {} incomplete",
            sheet.marked_count(),
            sheet.incomplete_count()
        ),
    }
}

#[must_use]
pub fn band_class(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Unscored => "band-unscored",
        ScoreBand::BelowTarget => "band-below",
        ScoreBand::OnTarget => "band-target",
        ScoreBand::Strong => "band-strong",
    }
}

#[must_use]
pub fn map_topics(attempt: &CompletedAttempt) -> Vec<TopicVm> {
    topic_breakdown(
        attempt.subject(),
        attempt.correct_count(),
        attempt.total_count(),
    )
    .into_iter()
    .map(|score| TopicVm {
        topic: score.topic,
        label: format!("{} / {}", score.correct, score.total),
        percent: score.percent(),
    })
    .collect()
}

#[must_use]
pub fn map_results(attempt: &CompletedAttempt) -> ResultsVm {
    let band = ScoreBand::classify(Some(attempt.scaled_score()));
    ResultsVm {
        scaled_score: attempt.scaled_score(),
        correct_label: format!("{} / {} correct", attempt.correct_count(), attempt.total_count()),
        percent: attempt.percent(),
        band_label: band.label(),
        band_class: band_class(band),
        time_label: format_duration(Some(attempt.duration_secs())),
        avg_label: format_duration(attempt.avg_secs_per_question()),
        timed_out: attempt.reason() == SubmitReason::TimeExpired,
        topics: map_topics(attempt),
    }
}
