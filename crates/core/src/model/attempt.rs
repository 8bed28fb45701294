use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::exam::SubmitReason;
use super::ids::{AttemptId, TestIndex};
use super::question::Question;
use super::subject::Subject;
use crate::scoring::scale_score;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("correct count {correct} exceeds total {total}")]
    CorrectExceedsTotal { correct: u32, total: u32 },
    #[error("attempt has no questions")]
    EmptyAttempt,
    #[error("answer recorded for question {index} of {total}")]
    AnswerOutOfRange { index: usize, total: u32 },
}

/// Immutable record of one finished pass through a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedAttempt {
    id: Option<AttemptId>,
    subject: Subject,
    test_index: TestIndex,
    correct_count: u32,
    total_count: u32,
    scaled_score: u16,
    answers: BTreeMap<usize, usize>,
    marked: BTreeSet<usize>,
    completed_at: DateTime<Utc>,
    duration_secs: u32,
    reason: SubmitReason,
}

/// Grading inputs captured from a session at submit time.
#[derive(Debug, Clone)]
pub(crate) struct AttemptDraft {
    pub subject: Subject,
    pub test_index: TestIndex,
    pub answers: BTreeMap<usize, usize>,
    pub marked: BTreeSet<usize>,
    pub completed_at: DateTime<Utc>,
    pub duration_secs: u32,
    pub reason: SubmitReason,
}

impl CompletedAttempt {
    pub(crate) fn grade(questions: &[Question], draft: AttemptDraft) -> Self {
        let correct = questions
            .iter()
            .enumerate()
            .filter(|(i, q)| draft.answers.get(i).is_some_and(|&c| q.is_correct(c)))
            .count();
        let correct_count = u32::try_from(correct).unwrap_or(u32::MAX);
        let total_count = u32::try_from(questions.len()).unwrap_or(u32::MAX);
        Self {
            id: None,
            subject: draft.subject,
            test_index: draft.test_index,
            correct_count,
            total_count,
            scaled_score: scale_score(i64::from(correct_count), i64::from(total_count)),
            answers: draft.answers,
            marked: draft.marked,
            completed_at: draft.completed_at,
            duration_secs: draft.duration_secs,
            reason: draft.reason,
        }
    }

    /// Rebuilds an attempt read back from storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` when the stored counts or answers contradict
    /// each other.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: AttemptId,
        subject: Subject,
        test_index: TestIndex,
        correct_count: u32,
        total_count: u32,
        scaled_score: u16,
        answers: BTreeMap<usize, usize>,
        marked: BTreeSet<usize>,
        completed_at: DateTime<Utc>,
        duration_secs: u32,
        reason: SubmitReason,
    ) -> Result<Self, AttemptError> {
        if total_count == 0 {
            return Err(AttemptError::EmptyAttempt);
        }
        if correct_count > total_count {
            return Err(AttemptError::CorrectExceedsTotal {
                correct: correct_count,
                total: total_count,
            });
        }
        let limit = total_count as usize;
        if let Some(&index) = answers
            .keys()
            .chain(marked.iter())
            .find(|&&i| i >= limit)
        {
            return Err(AttemptError::AnswerOutOfRange {
                index,
                total: total_count,
            });
        }
        Ok(Self {
            id: Some(id),
            subject,
            test_index,
            correct_count,
            total_count,
            scaled_score,
            answers,
            marked,
            completed_at,
            duration_secs,
            reason,
        })
    }

    #[must_use]
    pub fn with_id(mut self, id: AttemptId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn id(&self) -> Option<AttemptId> {
        self.id
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
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    #[must_use]
    pub fn scaled_score(&self) -> u16 {
        self.scaled_score
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.answers
    }

    #[must_use]
    pub fn marked(&self) -> &BTreeSet<usize> {
        &self.marked
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn reason(&self) -> SubmitReason {
        self.reason
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Whole-number percentage of questions answered correctly.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total_count == 0 {
            return 0;
        }
        (self.correct_count * 100 + self.total_count / 2) / self.total_count
    }

    /// Average seconds spent per question, `None` when no time was recorded.
    #[must_use]
    pub fn avg_secs_per_question(&self) -> Option<u32> {
        if self.duration_secs == 0 || self.total_count == 0 {
            return None;
        }
        Some(self.duration_secs / self.total_count)
    }
}

/// How one question ended up in a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub index: usize,
    pub chosen: Option<usize>,
    pub correct: usize,
    pub marked: bool,
}

impl QuestionOutcome {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.chosen == Some(self.correct)
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.chosen.is_none()
    }
}

/// Lines an attempt up against its questions for read-only review.
#[must_use]
pub fn grade_attempt(questions: &[Question], attempt: &CompletedAttempt) -> Vec<QuestionOutcome> {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| QuestionOutcome {
            index,
            chosen: attempt.answers.get(&index).copied(),
            correct: question.correct_choice(),
            marked: attempt.marked.contains(&index),
        })
        .collect()
}
