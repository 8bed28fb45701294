mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use prep_core::model::{
    AttemptId, CompletedAttempt, ExamView, Namespace, NavigationIntent, SavedProgress, Subject,
    SubmitReason, TestIndex,
};
use prep_core::time::fixed_clock;
use services::{AppServices, ExamCommand, ExamConfig, ExamDriver, ExamHandle};
use storage::repository::{
    AttemptRepository, ExamProgressRepository, ExamSlot, InMemoryRepository, Storage,
    StorageError,
};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};

use common::{bank, services_with};

async fn open(repo: &InMemoryRepository, config: ExamConfig) -> (ExamHandle, JoinHandle<()>) {
    let services = services_with(repo, config.clone());
    let controller = services
        .exams()
        .open(Namespace::guest(), Subject::Biology, TestIndex::new(0))
        .await
        .unwrap();
    ExamDriver::spawn(controller, &config)
}

fn biology_slot() -> ExamSlot {
    ExamSlot::new(Namespace::guest(), Subject::Biology, TestIndex::new(0))
}

#[tokio::test(start_paused = true)]
async fn navigation_waits_for_the_delay() {
    let repo = InMemoryRepository::new();
    let (handle, _task) = open(&repo, ExamConfig::default()).await;
    let mut rx = handle.subscribe();

    handle.send(ExamCommand::Start).await;
    let sent_at = Instant::now();
    handle
        .send(ExamCommand::Navigate(NavigationIntent::Next))
        .await;

    rx.wait_for(|s| s.pending_navigation == Some(NavigationIntent::Next))
        .await
        .unwrap();
    rx.wait_for(|s| s.session.current_index() == 1).await.unwrap();
    assert!(sent_at.elapsed() >= Duration::from_secs(2));
    assert_eq!(handle.snapshot().pending_navigation, None);
}

#[tokio::test(start_paused = true)]
async fn newer_navigation_replaces_the_pending_one() {
    let repo = InMemoryRepository::new();
    let (handle, _task) = open(&repo, ExamConfig::default()).await;
    let mut rx = handle.subscribe();

    handle.send(ExamCommand::Start).await;
    handle
        .send(ExamCommand::Navigate(NavigationIntent::Next))
        .await;
    sleep(Duration::from_secs(1)).await;
    let replaced_at = Instant::now();
    handle
        .send(ExamCommand::Navigate(NavigationIntent::Next))
        .await;

    rx.wait_for(|s| s.session.current_index() == 1).await.unwrap();
    assert!(replaced_at.elapsed() >= Duration::from_secs(2));

    sleep(Duration::from_secs(10)).await;
    assert_eq!(handle.snapshot().session.current_index(), 1);
}

#[tokio::test(start_paused = true)]
async fn navigation_is_immediate_when_delay_is_off() {
    let repo = InMemoryRepository::new();
    let (handle, _task) = open(&repo, ExamConfig::default()).await;
    let mut rx = handle.subscribe();

    handle.send(ExamCommand::SetDelayEnabled(false)).await;
    handle.send(ExamCommand::Start).await;
    let sent_at = Instant::now();
    handle
        .send(ExamCommand::Navigate(NavigationIntent::OpenReview))
        .await;

    rx.wait_for(|s| s.session.view() == ExamView::Review)
        .await
        .unwrap();
    assert_eq!(sent_at.elapsed(), Duration::ZERO);

    handle.send(ExamCommand::JumpTo(3)).await;
    rx.wait_for(|s| s.session.current_index() == 3).await.unwrap();
    assert_eq!(handle.snapshot().session.view(), ExamView::InProgress);
}

#[tokio::test(start_paused = true)]
async fn countdown_submits_once_on_expiry() {
    let repo = InMemoryRepository::new();
    let config = ExamConfig::default().with_duration(Subject::Biology, 10);
    let (handle, task) = open(&repo, config).await;
    let mut rx = handle.subscribe();

    let started_at = Instant::now();
    handle.send(ExamCommand::Start).await;
    handle.send(ExamCommand::SelectAnswer(0)).await;

    let snapshot = rx
        .wait_for(|s| s.session.view() == ExamView::Results)
        .await
        .unwrap()
        .clone();
    let elapsed = started_at.elapsed();
    assert!(elapsed >= Duration::from_secs(600) && elapsed < Duration::from_secs(601));
    assert_eq!(snapshot.session.time_remaining_secs(), Some(0));
    let attempt = snapshot.last_attempt.expect("attempt recorded");
    assert_eq!(attempt.reason(), SubmitReason::TimeExpired);
    assert_eq!(attempt.correct_count(), 1);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(handle.snapshot().session.view(), ExamView::Results);

    handle.send(ExamCommand::Shutdown).await;
    task.await.unwrap();
    assert_eq!(repo.list_attempts(&biology_slot()).await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn submit_cancels_pending_navigation() {
    let repo = InMemoryRepository::new();
    let (handle, _task) = open(&repo, ExamConfig::default()).await;
    let mut rx = handle.subscribe();

    handle.send(ExamCommand::Start).await;
    handle
        .send(ExamCommand::Navigate(NavigationIntent::Next))
        .await;
    handle.send(ExamCommand::RequestSubmit).await;
    handle.send(ExamCommand::Submit).await;

    let snapshot = rx
        .wait_for(|s| s.session.view() == ExamView::Results)
        .await
        .unwrap()
        .clone();
    assert_eq!(snapshot.pending_navigation, None);
    assert!(!snapshot.awaiting_confirmation);
    assert_eq!(snapshot.session.current_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels_pending_navigation() {
    let repo = InMemoryRepository::new();
    let (handle, task) = open(&repo, ExamConfig::default()).await;
    let rx = handle.subscribe();

    handle.send(ExamCommand::Start).await;
    handle
        .send(ExamCommand::Navigate(NavigationIntent::Next))
        .await;
    drop(handle);

    task.await.unwrap();
    sleep(Duration::from_secs(5)).await;
    assert_eq!(rx.borrow().session.current_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn exit_commands_stop_the_driver() {
    let repo = InMemoryRepository::new();
    let (handle, task) = open(&repo, ExamConfig::default()).await;

    handle.send(ExamCommand::Start).await;
    handle.send(ExamCommand::SelectAnswer(2)).await;
    handle.send(ExamCommand::ExitAndSave).await;
    task.await.unwrap();
    assert!(handle.snapshot().closed);
    assert!(!handle.send(ExamCommand::ToggleMark).await);
    let saved = repo.load_progress(&biology_slot()).await.unwrap().unwrap();
    assert_eq!(saved.answers.get(&0), Some(&2));

    let (handle, task) = open(&repo, ExamConfig::default()).await;
    assert_eq!(handle.snapshot().session.answer_for(0), Some(2));
    handle.send(ExamCommand::ExitWithoutSave).await;
    task.await.unwrap();
    assert_eq!(repo.load_progress(&biology_slot()).await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn restart_is_refused_once_attempts_are_used_up() {
    let repo = InMemoryRepository::new();
    let config = ExamConfig::default().with_max_attempts(2);
    let (handle, task) = open(&repo, config).await;
    let mut rx = handle.subscribe();

    handle.send(ExamCommand::Start).await;
    handle.send(ExamCommand::Submit).await;
    rx.wait_for(|s| s.session.view() == ExamView::Results)
        .await
        .unwrap();

    handle.send(ExamCommand::Restart).await;
    rx.wait_for(|s| s.session.view() == ExamView::Intro)
        .await
        .unwrap();
    assert_eq!(handle.snapshot().last_attempt, None);

    handle.send(ExamCommand::Start).await;
    handle.send(ExamCommand::Submit).await;
    rx.wait_for(|s| s.session.view() == ExamView::Results)
        .await
        .unwrap();

    handle.send(ExamCommand::Restart).await;
    handle.send(ExamCommand::Start).await;
    handle.send(ExamCommand::Shutdown).await;
    task.await.unwrap();

    assert_eq!(handle.snapshot().session.view(), ExamView::Results);
    assert_eq!(repo.list_attempts(&biology_slot()).await.unwrap().len(), 2);
}

/// Progress store whose first save stalls and then fails.
struct StallingProgress {
    inner: InMemoryRepository,
    saves: Mutex<usize>,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl StallingProgress {
    fn record(&self, entry: &'static str) {
        self.log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl ExamProgressRepository for StallingProgress {
    async fn save_progress(
        &self,
        slot: &ExamSlot,
        progress: &SavedProgress,
    ) -> Result<(), StorageError> {
        let nth = {
            let mut saves = self.saves.lock().unwrap();
            *saves += 1;
            *saves
        };
        if nth == 1 {
            sleep(Duration::from_secs(5)).await;
            self.record("save failed");
            return Err(StorageError::Connection("busy".into()));
        }
        self.inner.save_progress(slot, progress).await?;
        self.record("save");
        Ok(())
    }

    async fn load_progress(&self, slot: &ExamSlot) -> Result<Option<SavedProgress>, StorageError> {
        self.inner.load_progress(slot).await
    }

    async fn clear_progress(&self, slot: &ExamSlot) -> Result<(), StorageError> {
        self.inner.clear_progress(slot).await?;
        self.record("clear");
        Ok(())
    }
}

struct LoggedAttempts {
    inner: InMemoryRepository,
    log: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl AttemptRepository for LoggedAttempts {
    async fn append_attempt(
        &self,
        namespace: &Namespace,
        attempt: &CompletedAttempt,
    ) -> Result<AttemptId, StorageError> {
        let id = self.inner.append_attempt(namespace, attempt).await?;
        self.log.lock().unwrap().push("append");
        Ok(id)
    }

    async fn list_attempts(&self, slot: &ExamSlot) -> Result<Vec<CompletedAttempt>, StorageError> {
        self.inner.list_attempts(slot).await
    }

    async fn list_namespace_attempts(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<CompletedAttempt>, StorageError> {
        self.inner.list_namespace_attempts(namespace).await
    }

    async fn get_attempt(
        &self,
        namespace: &Namespace,
        id: AttemptId,
    ) -> Result<CompletedAttempt, StorageError> {
        self.inner.get_attempt(namespace, id).await
    }

    async fn clear_attempts(&self, slot: &ExamSlot) -> Result<u64, StorageError> {
        self.inner.clear_attempts(slot).await
    }
}

#[tokio::test(start_paused = true)]
async fn writes_stay_ordered_when_a_save_fails() {
    let repo = InMemoryRepository::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let storage = Storage {
        progress: Arc::new(StallingProgress {
            inner: repo.clone(),
            saves: Mutex::new(0),
            log: Arc::clone(&log),
        }),
        attempts: Arc::new(LoggedAttempts {
            inner: repo.clone(),
            log: Arc::clone(&log),
        }),
    };
    let config = ExamConfig::default();
    let services = AppServices::from_parts(
        storage,
        bank(),
        Namespace::guest(),
        fixed_clock(),
        config.clone(),
    );
    let controller = services
        .exams()
        .open(Namespace::guest(), Subject::Biology, TestIndex::new(0))
        .await
        .unwrap();
    let (handle, task) = ExamDriver::spawn(controller, &config);
    let mut rx = handle.subscribe();

    handle.send(ExamCommand::Start).await;
    handle.send(ExamCommand::SelectAnswer(0)).await;
    handle.send(ExamCommand::SelectAnswer(1)).await;
    handle.send(ExamCommand::RequestSubmit).await;
    handle.send(ExamCommand::Submit).await;
    let snapshot = rx
        .wait_for(|s| s.session.view() == ExamView::Results)
        .await
        .unwrap()
        .clone();
    assert_eq!(snapshot.last_attempt.map(|a| a.answers().len()), Some(1));

    handle.send(ExamCommand::Shutdown).await;
    task.await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["save failed", "save", "append", "clear"]
    );
    assert_eq!(repo.load_progress(&biology_slot()).await.unwrap(), None);
    assert_eq!(repo.list_attempts(&biology_slot()).await.unwrap().len(), 1);
}
