/// One line of the review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewRow {
    pub index: usize,
    pub marked: bool,
    pub completed: bool,
}

impl ReviewRow {
    #[must_use]
    pub fn skipped(&self) -> bool {
        !self.completed
    }

    /// "Question 3" style label, one-based.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Question {}", self.index + 1)
    }
}

/// Snapshot of answer and mark state for every question of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewSheet {
    rows: Vec<ReviewRow>,
}

impl ReviewSheet {
    #[must_use]
    pub fn new(rows: Vec<ReviewRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[ReviewRow] {
        &self.rows
    }

    /// Target of "Review marked".
    #[must_use]
    pub fn first_marked(&self) -> Option<usize> {
        self.rows.iter().find(|r| r.marked).map(|r| r.index)
    }

    /// Target of "Review incomplete".
    #[must_use]
    pub fn first_incomplete(&self) -> Option<usize> {
        self.rows.iter().find(|r| r.skipped()).map(|r| r.index)
    }

    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.rows.iter().filter(|r| r.marked).count()
    }

    #[must_use]
    pub fn incomplete_count(&self) -> usize {
        self.rows.iter().filter(|r| r.skipped()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, marked: bool, completed: bool) -> ReviewRow {
        ReviewRow {
            index,
            marked,
            completed,
        }
    }

    #[test]
    fn finds_first_marked_and_incomplete() {
        let sheet = ReviewSheet::new(vec![
            row(0, false, true),
            row(1, true, true),
            row(2, false, false),
            row(3, true, false),
        ]);
        assert_eq!(sheet.first_marked(), Some(1));
        assert_eq!(sheet.first_incomplete(), Some(2));
        assert_eq!(sheet.marked_count(), 2);
        assert_eq!(sheet.incomplete_count(), 2);
        assert_eq!(sheet.rows()[3].label(), "Question 4");
    }

    #[test]
    fn none_when_everything_is_clean() {
        let sheet = ReviewSheet::new(vec![row(0, false, true), row(1, false, true)]);
        assert_eq!(sheet.first_marked(), None);
        assert_eq!(sheet.first_incomplete(), None);
    }
}
