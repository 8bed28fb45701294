use std::sync::Arc;

use prep_core::model::{
    CompletedAttempt, ExamSession, ExamView, Namespace, NavigationIntent, NextOutcome, Subject,
    TestIndex, TickOutcome,
};
use storage::bank::QuestionBank;
use storage::repository::{AttemptRepository, ExamProgressRepository, ExamSlot};
use tokio::task::JoinHandle;

use crate::Clock;
use crate::config::ExamConfig;
use crate::error::ExamServiceError;

/// Opens exam sessions against the question bank and persistence.
#[derive(Clone)]
pub struct ExamService {
    clock: Clock,
    config: ExamConfig,
    bank: Arc<QuestionBank>,
    progress: Arc<dyn ExamProgressRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl ExamService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: ExamConfig,
        bank: Arc<QuestionBank>,
        progress: Arc<dyn ExamProgressRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            config,
            bank,
            progress,
            attempts,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ExamConfig {
        &self.config
    }

    #[must_use]
    pub fn bank(&self) -> &Arc<QuestionBank> {
        &self.bank
    }

    /// Open a test on its intro screen, resuming saved answers and marks.
    ///
    /// Saved progress that cannot be read is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::NoQuestions` when the bank has nothing for
    /// the test, `ExamServiceError::AttemptLimitReached` once the attempt
    /// history is full, and `ExamServiceError::Storage` if the history
    /// cannot be read.
    pub async fn open(
        &self,
        namespace: Namespace,
        subject: Subject,
        test_index: TestIndex,
    ) -> Result<ExamController, ExamServiceError> {
        let questions = self
            .bank
            .questions(subject, test_index)
            .ok_or(ExamServiceError::NoQuestions {
                subject,
                test_index,
            })?;
        let slot = ExamSlot::new(namespace, subject, test_index);

        let taken = self.attempts.list_attempts(&slot).await?.len();
        if taken >= self.config.max_attempts() {
            return Err(ExamServiceError::AttemptLimitReached {
                limit: self.config.max_attempts(),
            });
        }

        let saved = match self.progress.load_progress(&slot).await {
            Ok(saved) => saved,
            Err(err) => {
                tracing::warn!(slot = %slot, error = %err, "failed to load saved progress");
                None
            }
        };
        let resumed = saved.is_some();
        let mut session = ExamSession::resume(subject, test_index, questions, saved)?;
        session.set_delay_enabled(self.config.default_delay_enabled());
        tracing::info!(slot = %slot, resumed, "opened exam");

        Ok(ExamController {
            clock: self.clock,
            duration_minutes: self.config.duration_minutes(subject),
            slot,
            session,
            awaiting_confirmation: false,
            attempts_taken: taken,
            max_attempts: self.config.max_attempts(),
            progress: Arc::clone(&self.progress),
            attempts: Arc::clone(&self.attempts),
            writes: PendingWrites::default(),
        })
    }
}

/// Sole owner of one `ExamSession`.
///
/// Every transition is applied synchronously; persistence runs as detached
/// tasks whose failures are only logged. Must be used inside a Tokio runtime.
pub struct ExamController {
    clock: Clock,
    duration_minutes: u32,
    slot: ExamSlot,
    session: ExamSession,
    awaiting_confirmation: bool,
    attempts_taken: usize,
    max_attempts: usize,
    progress: Arc<dyn ExamProgressRepository>,
    attempts: Arc<dyn AttemptRepository>,
    writes: PendingWrites,
}

impl ExamController {
    #[must_use]
    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    #[must_use]
    pub fn slot(&self) -> &ExamSlot {
        &self.slot
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// True while the "submit now?" prompt should be showing.
    #[must_use]
    pub fn awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    pub fn set_delay_enabled(&mut self, enabled: bool) -> bool {
        self.session.set_delay_enabled(enabled)
    }

    pub fn set_extended_time(&mut self, enabled: bool) -> bool {
        self.session.set_extended_time(enabled)
    }

    pub fn start(&mut self) -> bool {
        let extended = self.session.settings().extended_time;
        let started = self
            .session
            .start(self.duration_minutes, extended, self.clock.now());
        if started {
            tracing::info!(
                slot = %self.slot,
                minutes = self.duration_minutes,
                extended,
                "exam started"
            );
        }
        started
    }

    pub fn select_answer(&mut self, choice: usize) -> bool {
        let changed = self.session.select_answer(choice);
        if changed {
            self.save_progress();
        }
        changed
    }

    pub fn toggle_mark(&mut self) -> bool {
        let changed = self.session.toggle_mark();
        if changed {
            self.save_progress();
        }
        changed
    }

    pub fn next(&mut self) -> NextOutcome {
        let outcome = self.session.next();
        if outcome == NextOutcome::ConfirmSubmit {
            self.awaiting_confirmation = true;
        }
        outcome
    }

    pub fn previous(&mut self) -> bool {
        self.session.previous()
    }

    pub fn open_review(&mut self) -> bool {
        self.session.open_review()
    }

    /// Applies a navigation intent once any delay has elapsed.
    pub fn navigate(&mut self, intent: NavigationIntent) -> bool {
        match intent {
            NavigationIntent::Next => self.next() != NextOutcome::Ignored,
            NavigationIntent::Previous => self.previous(),
            NavigationIntent::OpenReview => self.open_review(),
        }
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        self.session.jump_to(index)
    }

    /// Asks for submit confirmation, as the review screen's "End" does.
    pub fn request_submit(&mut self) -> bool {
        if matches!(self.session.view(), ExamView::InProgress | ExamView::Review) {
            self.awaiting_confirmation = true;
        }
        self.awaiting_confirmation
    }

    pub fn cancel_submit(&mut self) {
        self.awaiting_confirmation = false;
    }

    /// Grades the session, moves to results and records the attempt.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Session` if the exam is not running.
    pub fn submit(&mut self) -> Result<CompletedAttempt, ExamServiceError> {
        self.awaiting_confirmation = false;
        let attempt = self.session.submit(self.clock.now())?;
        self.record_attempt(&attempt);
        Ok(attempt)
    }

    /// One countdown step. Expiry records the attempt exactly once.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.session.tick(self.clock.now());
        if let TickOutcome::Expired(attempt) = &outcome {
            self.awaiting_confirmation = false;
            self.record_attempt(attempt);
        }
        outcome
    }

    /// Attempts still available for this test, counting the ones recorded
    /// through this controller.
    #[must_use]
    pub fn attempts_left(&self) -> usize {
        self.max_attempts.saturating_sub(self.attempts_taken)
    }

    /// Back to the intro screen for another attempt.
    ///
    /// Refused once the attempt limit is used up.
    pub fn restart(&mut self) -> bool {
        if self.session.view() != ExamView::Results {
            return false;
        }
        if self.attempts_left() == 0 {
            tracing::info!(slot = %self.slot, limit = self.max_attempts, "restart refused");
            return false;
        }
        self.awaiting_confirmation = false;
        self.session.restart()
    }

    /// Leave the exam, keeping answers and marks for the next visit.
    ///
    /// The returned writes may be awaited or dropped; dropping detaches them.
    #[must_use = "await the writes or drop them to detach"]
    pub fn exit_and_save(mut self) -> PendingWrites {
        if matches!(self.session.view(), ExamView::InProgress | ExamView::Review) {
            self.save_progress();
        }
        tracing::info!(slot = %self.slot, "exam left with progress saved");
        self.writes
    }

    /// Leave the exam, discarding the in-memory session and the saved slot.
    #[must_use = "await the writes or drop them to detach"]
    pub fn exit_without_save(mut self) -> PendingWrites {
        let progress = Arc::clone(&self.progress);
        let slot = self.slot.clone();
        self.writes.spawn(async move {
            if let Err(err) = progress.clear_progress(&slot).await {
                tracing::warn!(slot = %slot, error = %err, "failed to clear saved progress");
            }
        });
        tracing::info!(slot = %self.slot, "exam left without saving");
        self.writes
    }

    /// Wait for outstanding persistence tasks.
    pub async fn flush(&mut self) {
        std::mem::take(&mut self.writes).wait().await;
    }

    fn save_progress(&mut self) {
        let progress = Arc::clone(&self.progress);
        let slot = self.slot.clone();
        let payload = self.session.progress();
        self.writes.spawn(async move {
            if let Err(err) = progress.save_progress(&slot, &payload).await {
                tracing::warn!(slot = %slot, error = %err, "failed to save progress");
            }
        });
    }

    fn record_attempt(&mut self, attempt: &CompletedAttempt) {
        self.attempts_taken += 1;
        tracing::info!(
            slot = %self.slot,
            correct = attempt.correct_count(),
            total = attempt.total_count(),
            score = attempt.scaled_score(),
            reason = ?attempt.reason(),
            "exam submitted"
        );
        let attempts = Arc::clone(&self.attempts);
        let progress = Arc::clone(&self.progress);
        let slot = self.slot.clone();
        let attempt = attempt.clone();
        self.writes.spawn(async move {
            if let Err(err) = attempts.append_attempt(&slot.namespace, &attempt).await {
                tracing::warn!(slot = %slot, error = %err, "failed to append attempt");
            }
            if let Err(err) = progress.clear_progress(&slot).await {
                tracing::warn!(slot = %slot, error = %err, "failed to clear saved progress");
            }
        });
    }
}

/// Detached persistence tasks of a controller, applied in submission order.
#[derive(Default)]
pub struct PendingWrites {
    tail: Option<JoinHandle<()>>,
}

impl PendingWrites {
    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let previous = self.tail.take();
        self.tail = Some(tokio::spawn(async move {
            if let Some(previous) = previous {
                if let Err(err) = previous.await {
                    tracing::warn!(error = %err, "persistence task failed");
                }
            }
            task.await;
        }));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tail.as_ref().is_none_or(JoinHandle::is_finished)
    }

    pub async fn wait(self) {
        if let Some(tail) = self.tail {
            if let Err(err) = tail.await {
                tracing::warn!(error = %err, "persistence task failed");
            }
        }
    }
}
