use thiserror::Error;

/// Fewest choices a question may offer.
pub const MIN_CHOICES: usize = 2;
/// Most choices a question may offer (the shipped banks use four or five).
pub const MAX_CHOICES: usize = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question stem is empty")]
    EmptyStem,

    #[error("question has {len} choices, expected {MIN_CHOICES}..={MAX_CHOICES}")]
    ChoiceCount { len: usize },

    #[error("choice {index} is empty")]
    EmptyChoice { index: usize },

    #[error("correct choice {correct} is out of range for {len} choices")]
    CorrectOutOfRange { correct: usize, len: usize },
}

/// A single multiple-choice question.
///
/// Immutable once built; sessions share the bank's copy through `Arc<[Question]>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    stem: String,
    choices: Vec<String>,
    correct: usize,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the stem or any choice is blank, the choice
    /// count is outside `MIN_CHOICES..=MAX_CHOICES`, or `correct` does not
    /// index a choice.
    pub fn new(
        stem: impl Into<String>,
        choices: Vec<String>,
        correct: usize,
    ) -> Result<Self, QuestionError> {
        let stem = stem.into();
        if stem.trim().is_empty() {
            return Err(QuestionError::EmptyStem);
        }
        if !(MIN_CHOICES..=MAX_CHOICES).contains(&choices.len()) {
            return Err(QuestionError::ChoiceCount { len: choices.len() });
        }
        if let Some(index) = choices.iter().position(|c| c.trim().is_empty()) {
            return Err(QuestionError::EmptyChoice { index });
        }
        if correct >= choices.len() {
            return Err(QuestionError::CorrectOutOfRange {
                correct,
                len: choices.len(),
            });
        }

        Ok(Self {
            stem,
            choices,
            correct,
        })
    }

    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn correct_choice(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn has_choice(&self, choice: usize) -> bool {
        choice < self.choices.len()
    }

    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct
    }
}

/// Letter shown next to a choice: 0 → 'A', 1 → 'B', ...
#[must_use]
pub fn choice_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .filter(u8::is_ascii_uppercase)
        .map_or('?', char::from)
}
