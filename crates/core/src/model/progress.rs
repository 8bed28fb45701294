use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// The resumable slice of an exam session: answers and marks only.
///
/// Position and remaining time are not persisted; a resumed session starts
/// again at question 0 from the intro screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProgress {
    #[serde(default)]
    pub answers: BTreeMap<usize, usize>,
    #[serde(default)]
    pub marked: BTreeSet<usize>,
}

impl SavedProgress {
    #[must_use]
    pub fn new(answers: BTreeMap<usize, usize>, marked: BTreeSet<usize>) -> Self {
        Self { answers, marked }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty() && self.marked.is_empty()
    }
}
