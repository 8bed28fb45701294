use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::attempt::{AttemptDraft, CompletedAttempt};
use super::ids::TestIndex;
use super::progress::SavedProgress;
use super::question::Question;
use super::review::{ReviewRow, ReviewSheet};
use super::subject::Subject;
use crate::time::elapsed_secs;

/// Multiplier applied to the exam duration when extended time is enabled.
pub const EXTENDED_TIME_FACTOR: f64 = 1.5;

/// Countdown length in whole seconds, floored.
#[must_use]
pub fn exam_duration_secs(duration_minutes: u32, extended_time: bool) -> u32 {
    let base = duration_minutes.saturating_mul(60);
    if extended_time {
        // 1.5x in integer arithmetic
        base.saturating_mul(3) / 2
    } else {
        base
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for this exam")]
    NoQuestions,
    #[error("exam has not been started")]
    NotStarted,
    #[error("exam has already been submitted")]
    AlreadySubmitted,
}

/// Screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamView {
    Intro,
    InProgress,
    Review,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSettings {
    pub delay_enabled: bool,
    pub extended_time: bool,
}

impl Default for ExamSettings {
    fn default() -> Self {
        Self {
            delay_enabled: true,
            extended_time: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmitReason {
    Manual,
    TimeExpired,
}

/// Navigation actions that go through the artificial delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationIntent {
    Next,
    Previous,
    OpenReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextOutcome {
    Moved(usize),
    /// Already on the last question; the caller should ask before submitting.
    ConfirmSubmit,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Running { remaining: u32 },
    Expired(CompletedAttempt),
}

/// One user's pass through one practice test.
///
/// All transitions are synchronous; callers own scheduling (countdown,
/// navigation delay) and persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamSession {
    subject: Subject,
    test_index: TestIndex,
    questions: Arc<[Question]>,
    current: usize,
    answers: BTreeMap<usize, usize>,
    marked: BTreeSet<usize>,
    time_remaining_secs: Option<u32>,
    time_limit_secs: Option<u32>,
    view: ExamView,
    settings: ExamSettings,
    started_at: Option<DateTime<Utc>>,
    result: Option<CompletedAttempt>,
}

impl ExamSession {
    /// Fresh session on the intro screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestions` for an empty question list.
    pub fn new(
        subject: Subject,
        test_index: TestIndex,
        questions: Arc<[Question]>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        Ok(Self {
            subject,
            test_index,
            questions,
            current: 0,
            answers: BTreeMap::new(),
            marked: BTreeSet::new(),
            time_remaining_secs: None,
            time_limit_secs: None,
            view: ExamView::Intro,
            settings: ExamSettings::default(),
            started_at: None,
            result: None,
        })
    }

    /// Fresh session with previously saved answers and marks merged in.
    ///
    /// A payload that does not fit the question list is dropped whole.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestions` for an empty question list.
    pub fn resume(
        subject: Subject,
        test_index: TestIndex,
        questions: Arc<[Question]>,
        progress: Option<SavedProgress>,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(subject, test_index, questions)?;
        if let Some(progress) = progress {
            session.restore(progress);
        }
        Ok(session)
    }

    /// Replaces answers and marks with `progress` if every entry is in range.
    ///
    /// Only applies on the intro screen. Position is reset to the first
    /// question.
    pub fn restore(&mut self, progress: SavedProgress) -> bool {
        if self.view != ExamView::Intro || !self.accepts(&progress) {
            return false;
        }
        self.answers = progress.answers;
        self.marked = progress.marked;
        self.current = 0;
        true
    }

    fn accepts(&self, progress: &SavedProgress) -> bool {
        let answers_ok = progress
            .answers
            .iter()
            .all(|(&q, &c)| self.questions.get(q).is_some_and(|question| question.has_choice(c)));
        let marks_ok = progress.marked.iter().all(|&q| q < self.questions.len());
        answers_ok && marks_ok
    }

    pub fn set_delay_enabled(&mut self, enabled: bool) -> bool {
        if self.view != ExamView::Intro {
            return false;
        }
        self.settings.delay_enabled = enabled;
        true
    }

    pub fn set_extended_time(&mut self, enabled: bool) -> bool {
        if self.view != ExamView::Intro {
            return false;
        }
        self.settings.extended_time = enabled;
        true
    }

    /// Intro → in progress, starting the countdown.
    pub fn start(&mut self, duration_minutes: u32, extended_time: bool, now: DateTime<Utc>) -> bool {
        if self.view != ExamView::Intro {
            return false;
        }
        let limit = exam_duration_secs(duration_minutes, extended_time);
        self.settings.extended_time = extended_time;
        self.time_limit_secs = Some(limit);
        self.time_remaining_secs = Some(limit);
        self.started_at = Some(now);
        self.current = 0;
        self.view = ExamView::InProgress;
        true
    }

    /// Records `choice` for the current question, overwriting any earlier one.
    pub fn select_answer(&mut self, choice: usize) -> bool {
        if self.view != ExamView::InProgress || !self.current_question().has_choice(choice) {
            return false;
        }
        self.answers.insert(self.current, choice);
        true
    }

    pub fn toggle_mark(&mut self) -> bool {
        if self.view == ExamView::Results {
            return false;
        }
        if !self.marked.remove(&self.current) {
            self.marked.insert(self.current);
        }
        true
    }

    pub fn next(&mut self) -> NextOutcome {
        if self.view != ExamView::InProgress {
            return NextOutcome::Ignored;
        }
        if self.is_last_question() {
            return NextOutcome::ConfirmSubmit;
        }
        self.current = (self.current + 1).min(self.last_index());
        NextOutcome::Moved(self.current)
    }

    pub fn previous(&mut self) -> bool {
        if self.view != ExamView::InProgress || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn open_review(&mut self) -> bool {
        if self.view != ExamView::InProgress {
            return false;
        }
        self.view = ExamView::Review;
        true
    }

    /// Review → in progress at `index`. Anything that is not a valid
    /// question index is ignored.
    pub fn jump_to<I: TryInto<usize>>(&mut self, index: I) -> bool {
        if self.view != ExamView::Review {
            return false;
        }
        let Ok(index) = index.try_into() else {
            return false;
        };
        if index >= self.questions.len() {
            return false;
        }
        self.current = index;
        self.view = ExamView::InProgress;
        true
    }

    /// Grades the session and moves to the results screen.
    ///
    /// # Errors
    ///
    /// `SessionError::NotStarted` from the intro screen and
    /// `SessionError::AlreadySubmitted` once results are showing.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<CompletedAttempt, SessionError> {
        self.finish(now, SubmitReason::Manual)
    }

    fn finish(
        &mut self,
        now: DateTime<Utc>,
        reason: SubmitReason,
    ) -> Result<CompletedAttempt, SessionError> {
        match self.view {
            ExamView::Intro => return Err(SessionError::NotStarted),
            ExamView::Results => return Err(SessionError::AlreadySubmitted),
            ExamView::InProgress | ExamView::Review => {}
        }
        let attempt = CompletedAttempt::grade(
            &self.questions,
            AttemptDraft {
                subject: self.subject,
                test_index: self.test_index,
                answers: self.answers.clone(),
                marked: self.marked.clone(),
                completed_at: now,
                duration_secs: self.elapsed(now),
                reason,
            },
        );
        self.view = ExamView::Results;
        self.result = Some(attempt.clone());
        Ok(attempt)
    }

    fn elapsed(&self, now: DateTime<Utc>) -> u32 {
        let wall = self.started_at.map_or(0, |at| elapsed_secs(at, now));
        let counted = match (self.time_limit_secs, self.time_remaining_secs) {
            (Some(limit), Some(remaining)) => limit.saturating_sub(remaining),
            _ => 0,
        };
        wall.max(counted)
    }

    /// One second of countdown. Expiry submits exactly once; every tick
    /// outside an in-progress exam is a no-op.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.view != ExamView::InProgress {
            return TickOutcome::Ignored;
        }
        let Some(remaining) = self.time_remaining_secs else {
            return TickOutcome::Ignored;
        };
        let remaining = remaining.saturating_sub(1);
        self.time_remaining_secs = Some(remaining);
        if remaining > 0 {
            return TickOutcome::Running { remaining };
        }
        match self.finish(now, SubmitReason::TimeExpired) {
            Ok(attempt) => TickOutcome::Expired(attempt),
            Err(_) => TickOutcome::Ignored,
        }
    }

    /// Results → intro with an empty answer sheet.
    pub fn restart(&mut self) -> bool {
        if self.view != ExamView::Results {
            return false;
        }
        self.current = 0;
        self.answers.clear();
        self.marked.clear();
        self.time_remaining_secs = None;
        self.time_limit_secs = None;
        self.started_at = None;
        self.result = None;
        self.view = ExamView::Intro;
        true
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn test_index(&self) -> TestIndex {
        self.test_index
    }

    #[must_use]
    pub fn questions(&self) -> &Arc<[Question]> {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // `new` rejects empty lists and `current` never leaves 0..len
        &self.questions[self.current]
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current == self.last_index()
    }

    fn last_index(&self) -> usize {
        self.questions.len() - 1
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.answers
    }

    #[must_use]
    pub fn answer_for(&self, index: usize) -> Option<usize> {
        self.answers.get(&index).copied()
    }

    #[must_use]
    pub fn marked(&self) -> &BTreeSet<usize> {
        &self.marked
    }

    #[must_use]
    pub fn is_marked(&self, index: usize) -> bool {
        self.marked.contains(&index)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn time_remaining_secs(&self) -> Option<u32> {
        self.time_remaining_secs
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> Option<u32> {
        self.time_limit_secs
    }

    #[must_use]
    pub fn view(&self) -> ExamView {
        self.view
    }

    #[must_use]
    pub fn settings(&self) -> ExamSettings {
        self.settings
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// The attempt produced by the last submit, while results are showing.
    #[must_use]
    pub fn result(&self) -> Option<&CompletedAttempt> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn review_sheet(&self) -> ReviewSheet {
        ReviewSheet::new(
            (0..self.questions.len())
                .map(|index| ReviewRow {
                    index,
                    marked: self.marked.contains(&index),
                    completed: self.answers.contains_key(&index),
                })
                .collect(),
        )
    }

    /// The slice of state that is persisted for resume.
    #[must_use]
    pub fn progress(&self) -> SavedProgress {
        SavedProgress::new(self.answers.clone(), self.marked.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::scale_score;
    use crate::time::fixed_now;

    fn bank(n: usize) -> Arc<[Question]> {
        (0..n)
            .map(|i| {
                Question::new(
                    format!("Question {i}"),
                    vec!["w".into(), "x".into(), "y".into(), "z".into()],
                    i % 4,
                )
                .unwrap()
            })
            .collect()
    }

    fn session(n: usize) -> ExamSession {
        ExamSession::new(Subject::GeneralChemistry, TestIndex::new(0), bank(n)).unwrap()
    }

    fn started(n: usize) -> ExamSession {
        let mut s = session(n);
        assert!(s.start(30, false, fixed_now()));
        s
    }

    #[test]
    fn empty_bank_is_rejected() {
        let err = ExamSession::new(Subject::Biology, TestIndex::new(0), bank(0)).unwrap_err();
        assert_eq!(err, SessionError::NoQuestions);
    }

    #[test]
    fn start_only_from_intro() {
        let mut s = session(5);
        assert!(s.start(30, true, fixed_now()));
        assert_eq!(s.view(), ExamView::InProgress);
        assert_eq!(s.time_remaining_secs(), Some(2700));
        assert!(s.settings().extended_time);
        assert!(!s.start(30, false, fixed_now()));
        assert_eq!(s.time_remaining_secs(), Some(2700));
    }

    #[test]
    fn duration_is_floored() {
        assert_eq!(exam_duration_secs(30, false), 1800);
        assert_eq!(exam_duration_secs(45, true), 4050);
        assert_eq!(exam_duration_secs(0, true), 0);
        let exact = f64::from(exam_duration_secs(7, false)) * EXTENDED_TIME_FACTOR;
        assert_eq!(f64::from(exam_duration_secs(7, true)), exact.floor());
    }

    #[test]
    fn submit_counts_correct_answers() {
        for n in [30usize, 40, 50] {
            for k in [0usize, 7, n] {
                let mut s = started(n);
                for i in 0..k {
                    assert!(s.select_answer(i % 4));
                    s.next();
                }
                let attempt = s.submit(fixed_now()).unwrap();
                assert_eq!(attempt.correct_count() as usize, k);
                assert_eq!(
                    attempt.scaled_score(),
                    scale_score(k as i64, n as i64),
                    "n={n} k={k}"
                );
                assert_eq!(s.view(), ExamView::Results);
            }
        }
    }

    #[test]
    fn twelve_of_thirty_scores_290() {
        let mut s = started(30);
        for i in 0..12 {
            s.select_answer(i % 4);
            s.next();
        }
        let attempt = s.submit(fixed_now()).unwrap();
        assert_eq!(attempt.correct_count(), 12);
        assert_eq!(attempt.scaled_score(), 290);
    }

    #[test]
    fn next_past_last_requests_confirmation_once() {
        let mut s = started(4);
        let mut confirmations = 0;
        for _ in 0..4 {
            if s.next() == NextOutcome::ConfirmSubmit {
                confirmations += 1;
            }
        }
        assert_eq!(confirmations, 1);
        assert_eq!(s.current_index(), 3);
        assert_eq!(s.view(), ExamView::InProgress);
    }

    #[test]
    fn previous_at_first_question_is_noop() {
        let mut s = started(3);
        let before = s.clone();
        assert!(!s.previous());
        assert_eq!(s, before);
    }

    #[test]
    fn reselecting_overwrites() {
        let mut s = started(3);
        s.select_answer(1);
        s.select_answer(2);
        assert_eq!(s.answers().len(), 1);
        assert_eq!(s.answer_for(0), Some(2));
        assert!(!s.select_answer(9));
        assert_eq!(s.answer_for(0), Some(2));
    }

    #[test]
    fn answers_survive_navigation() {
        let mut s = started(3);
        s.select_answer(0);
        s.toggle_mark();
        s.next();
        s.previous();
        assert_eq!(s.answer_for(0), Some(0));
        assert!(s.is_marked(0));
        s.toggle_mark();
        assert!(!s.is_marked(0));
    }

    #[test]
    fn resume_restores_answers_and_resets_position() {
        let mut s = started(5);
        s.select_answer(3);
        s.next();
        s.next();
        s.select_answer(1);
        s.toggle_mark();
        let saved = s.progress();

        let resumed = ExamSession::resume(
            Subject::GeneralChemistry,
            TestIndex::new(0),
            s.questions().clone(),
            Some(saved.clone()),
        )
        .unwrap();
        assert_eq!(resumed.answers(), &saved.answers);
        assert_eq!(resumed.marked(), &saved.marked);
        assert_eq!(resumed.current_index(), 0);
        assert_eq!(resumed.view(), ExamView::Intro);
    }

    #[test]
    fn out_of_range_progress_is_dropped_whole() {
        let mut s = session(3);
        let bad = SavedProgress::new(BTreeMap::from([(0, 1), (7, 0)]), BTreeSet::new());
        assert!(!s.restore(bad));
        assert!(s.answers().is_empty());

        let bad_choice = SavedProgress::new(BTreeMap::from([(0, 4)]), BTreeSet::new());
        assert!(!s.restore(bad_choice));
        let bad_mark = SavedProgress::new(BTreeMap::new(), BTreeSet::from([3]));
        assert!(!s.restore(bad_mark));
    }

    #[test]
    fn countdown_expires_exactly_once() {
        let mut s = session(10);
        assert!(s.start(10, false, fixed_now()));
        s.select_answer(0);
        for _ in 0..599 {
            assert!(matches!(s.tick(fixed_now()), TickOutcome::Running { .. }));
        }
        let TickOutcome::Expired(attempt) = s.tick(fixed_now()) else {
            panic!("600th tick should expire the exam");
        };
        assert_eq!(attempt.reason(), SubmitReason::TimeExpired);
        assert_eq!(attempt.correct_count(), 1);
        assert_eq!(attempt.duration_secs(), 600);
        assert_eq!(s.view(), ExamView::Results);
        assert_eq!(s.time_remaining_secs(), Some(0));
        assert_eq!(s.tick(fixed_now()), TickOutcome::Ignored);
        assert_eq!(s.time_remaining_secs(), Some(0));
    }

    #[test]
    fn ticks_outside_progress_are_ignored() {
        let mut s = session(3);
        assert_eq!(s.tick(fixed_now()), TickOutcome::Ignored);
        s.start(1, false, fixed_now());
        s.open_review();
        assert_eq!(s.tick(fixed_now()), TickOutcome::Ignored);
        assert_eq!(s.time_remaining_secs(), Some(60));
    }

    #[test]
    fn jump_to_out_of_range_is_ignored() {
        let mut s = started(5);
        s.next();
        assert!(s.open_review());
        let before = (s.current_index(), s.view());
        assert!(!s.jump_to(-1));
        assert!(!s.jump_to(5));
        assert_eq!((s.current_index(), s.view()), before);

        assert!(s.jump_to(3));
        assert_eq!(s.current_index(), 3);
        assert_eq!(s.view(), ExamView::InProgress);
    }

    #[test]
    fn jump_to_requires_review() {
        let mut s = started(5);
        assert!(!s.jump_to(2));
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn submit_from_review_and_twice() {
        let mut s = session(3);
        assert_eq!(s.submit(fixed_now()).unwrap_err(), SessionError::NotStarted);
        s.start(30, false, fixed_now());
        s.open_review();
        assert!(s.submit(fixed_now()).is_ok());
        assert_eq!(s.submit(fixed_now()).unwrap_err(), SessionError::AlreadySubmitted);
        assert!(s.result().is_some());
        assert!(!s.toggle_mark());
    }

    #[test]
    fn restart_clears_everything() {
        let mut s = started(3);
        s.select_answer(0);
        s.toggle_mark();
        s.submit(fixed_now()).unwrap();
        assert!(s.restart());
        assert_eq!(s.view(), ExamView::Intro);
        assert!(s.answers().is_empty());
        assert!(s.marked().is_empty());
        assert_eq!(s.time_remaining_secs(), None);
        assert!(s.result().is_none());
    }

    #[test]
    fn review_sheet_tracks_state() {
        let mut s = started(4);
        s.select_answer(0);
        s.next();
        s.toggle_mark();
        let sheet = s.review_sheet();
        assert_eq!(sheet.rows().len(), 4);
        assert_eq!(sheet.first_marked(), Some(1));
        assert_eq!(sheet.first_incomplete(), Some(1));
    }

    #[test]
    fn settings_locked_after_start() {
        let mut s = session(2);
        assert!(s.set_delay_enabled(false));
        assert!(!s.settings().delay_enabled);
        s.start(30, false, fixed_now());
        assert!(!s.set_delay_enabled(true));
        assert!(!s.set_extended_time(true));
    }
}
