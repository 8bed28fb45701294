use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use prep_core::model::{
    AttemptId, CompletedAttempt, Namespace, Question, QuestionOutcome, Subject, TestIndex,
    grade_attempt,
};
use prep_core::scoring::{ScoreBand, TopicScore, topic_breakdown};
use storage::bank::QuestionBank;
use storage::repository::{AttemptRepository, ExamProgressRepository, ExamSlot};

use crate::error::HistoryError;

/// Dashboard line for one practice test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSummary {
    pub subject: Subject,
    pub test_index: TestIndex,
    pub attempt_count: usize,
    pub attempts_left: usize,
    pub best_score: Option<u16>,
    pub last_score: Option<u16>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub avg_secs_per_question: Option<u32>,
    pub band: ScoreBand,
    pub has_questions: bool,
}

impl TestSummary {
    #[must_use]
    pub fn can_start(&self) -> bool {
        self.has_questions && self.attempts_left > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectOverview {
    pub subject: Subject,
    pub tests: Vec<TestSummary>,
}

impl SubjectOverview {
    #[must_use]
    pub fn best_score(&self) -> Option<u16> {
        self.tests.iter().filter_map(|t| t.best_score).max()
    }

    #[must_use]
    pub fn attempted_tests(&self) -> usize {
        self.tests.iter().filter(|t| t.attempt_count > 0).count()
    }
}

/// Read-only view of a finished attempt.
#[derive(Debug, Clone)]
pub struct AttemptReview {
    pub attempt: CompletedAttempt,
    pub questions: Arc<[Question]>,
    pub outcomes: Vec<QuestionOutcome>,
    pub topics: Vec<TopicScore>,
}

/// Summarizes the attempts of one test, oldest first.
#[must_use]
pub fn summarize(
    subject: Subject,
    test_index: TestIndex,
    attempts: &[CompletedAttempt],
    max_attempts: usize,
    has_questions: bool,
) -> TestSummary {
    let best_score = attempts.iter().map(CompletedAttempt::scaled_score).max();
    let last = attempts.last();

    let timed: Vec<&CompletedAttempt> = attempts.iter().filter(|a| a.duration_secs() > 0).collect();
    let secs: u64 = timed.iter().map(|a| u64::from(a.duration_secs())).sum();
    let questions: u64 = timed.iter().map(|a| u64::from(a.total_count())).sum();
    let avg_secs_per_question = (questions > 0)
        .then(|| u32::try_from(secs / questions).unwrap_or(u32::MAX));

    TestSummary {
        subject,
        test_index,
        attempt_count: attempts.len(),
        attempts_left: max_attempts.saturating_sub(attempts.len()),
        best_score,
        last_score: last.map(CompletedAttempt::scaled_score),
        last_attempt_at: last.map(CompletedAttempt::completed_at),
        avg_secs_per_question,
        band: ScoreBand::classify(best_score),
        has_questions,
    }
}

/// Attempt history, dashboard rows and test resets.
#[derive(Clone)]
pub struct HistoryService {
    max_attempts: usize,
    bank: Arc<QuestionBank>,
    progress: Arc<dyn ExamProgressRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(
        max_attempts: usize,
        bank: Arc<QuestionBank>,
        progress: Arc<dyn ExamProgressRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            max_attempts,
            bank,
            progress,
            attempts,
        }
    }

    /// Attempts of one test, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the history cannot be read.
    pub async fn attempts(&self, slot: &ExamSlot) -> Result<Vec<CompletedAttempt>, HistoryError> {
        Ok(self.attempts.list_attempts(slot).await?)
    }

    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the history cannot be read.
    pub async fn summary(&self, slot: &ExamSlot) -> Result<TestSummary, HistoryError> {
        let attempts = self.attempts.list_attempts(slot).await?;
        Ok(summarize(
            slot.subject,
            slot.test_index,
            &attempts,
            self.max_attempts,
            self.bank.questions(slot.subject, slot.test_index).is_some(),
        ))
    }

    /// Every subject with a line per offered test.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the history cannot be read.
    pub async fn dashboard(&self, namespace: &Namespace) -> Result<Vec<SubjectOverview>, HistoryError> {
        let mut grouped: BTreeMap<(Subject, TestIndex), Vec<CompletedAttempt>> = BTreeMap::new();
        for attempt in self.attempts.list_namespace_attempts(namespace).await? {
            grouped
                .entry((attempt.subject(), attempt.test_index()))
                .or_default()
                .push(attempt);
        }

        Ok(Subject::ALL
            .into_iter()
            .map(|subject| {
                let offered = usize::try_from(subject.profile().test_count)
                    .unwrap_or(0)
                    .max(self.bank.test_count(subject));
                let tests = (0..offered)
                    .filter_map(|i| u32::try_from(i).ok())
                    .map(TestIndex::new)
                    .map(|test_index| {
                        let attempts = grouped
                            .get(&(subject, test_index))
                            .map_or(&[][..], Vec::as_slice);
                        summarize(
                            subject,
                            test_index,
                            attempts,
                            self.max_attempts,
                            self.bank.questions(subject, test_index).is_some(),
                        )
                    })
                    .collect();
                SubjectOverview { subject, tests }
            })
            .collect())
    }

    /// Clear the saved progress and the attempt history of one test.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if either delete fails.
    pub async fn reset_test(&self, slot: &ExamSlot) -> Result<u64, HistoryError> {
        self.progress.clear_progress(slot).await?;
        let removed = self.attempts.clear_attempts(slot).await?;
        tracing::info!(slot = %slot, removed, "test reset");
        Ok(removed)
    }

    /// Reopen a finished attempt read-only.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` (including `NotFound`) if the attempt
    /// cannot be read and `HistoryError::QuestionsUnavailable` if its test
    /// is no longer in the bank.
    pub async fn attempt_review(
        &self,
        namespace: &Namespace,
        id: AttemptId,
    ) -> Result<AttemptReview, HistoryError> {
        let attempt = self.attempts.get_attempt(namespace, id).await?;
        let questions = self
            .bank
            .questions(attempt.subject(), attempt.test_index())
            .filter(|qs| u32::try_from(qs.len()).ok() == Some(attempt.total_count()))
            .ok_or(HistoryError::QuestionsUnavailable)?;
        let outcomes = grade_attempt(&questions, &attempt);
        let topics = topic_breakdown(
            attempt.subject(),
            attempt.correct_count(),
            attempt.total_count(),
        );
        Ok(AttemptReview {
            attempt,
            questions,
            outcomes,
            topics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_core::model::{ExamSession, SubmitReason};
    use prep_core::time::fixed_now;

    fn questions(n: usize) -> Arc<[Question]> {
        (0..n)
            .map(|i| Question::new(format!("Q{i}"), vec!["a".into(), "b".into()], 0).unwrap())
            .collect()
    }

    fn attempt(correct: usize, duration_secs: i64) -> CompletedAttempt {
        let mut session =
            ExamSession::new(Subject::Biology, TestIndex::new(0), questions(40)).unwrap();
        session.start(30, false, fixed_now());
        for _ in 0..correct {
            session.select_answer(0);
            session.next();
        }
        session
            .submit(fixed_now() + chrono::Duration::seconds(duration_secs))
            .unwrap()
    }

    #[test]
    fn summary_of_no_attempts() {
        let summary = summarize(Subject::Biology, TestIndex::new(0), &[], 3, true);
        assert_eq!(summary.attempt_count, 0);
        assert_eq!(summary.best_score, None);
        assert_eq!(summary.band, ScoreBand::Unscored);
        assert!(summary.can_start());
    }

    #[test]
    fn summary_tracks_best_last_and_pace() {
        let attempts = [attempt(30, 800), attempt(22, 400), attempt(10, 0)];
        assert_eq!(attempts[0].reason(), SubmitReason::Manual);
        let summary = summarize(Subject::Biology, TestIndex::new(0), &attempts, 3, true);
        assert_eq!(summary.attempt_count, 3);
        assert_eq!(summary.best_score, Some(340));
        assert_eq!(summary.last_score, Some(250));
        assert_eq!(summary.avg_secs_per_question, Some(15));
        assert_eq!(summary.band, ScoreBand::Strong);
        assert_eq!(summary.attempts_left, 0);
        assert!(!summary.can_start());
    }
}
