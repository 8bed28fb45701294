use std::sync::Arc;

use prep_core::model::{AttemptId, CompletedAttempt, Namespace};
use storage::repository::{AttemptRepository, ExamSlot, InMemoryRepository, Storage, StorageError};

use super::test_harness::{
    ViewKind, completed_attempt, setup_view_harness, setup_view_harness_with_storage,
};

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_lists_subjects() {
    let mut harness = setup_view_harness(ViewKind::Dashboard);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("General Chemistry"), "missing subject in {html}");
    assert!(html.contains("Reading Comprehension"), "missing subject in {html}");
    assert!(
        html.contains("0 of 10 tests attempted"),
        "missing progress in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_renders_best_score() {
    let mut harness = setup_view_harness(ViewKind::Dashboard);
    harness.seed_attempt(&completed_attempt(12)).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Best score: 290"), "missing score in {html}");
    assert!(
        html.contains("1 of 10 tests attempted"),
        "missing progress in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn subject_view_smoke_lists_attempts() {
    let mut harness = setup_view_harness(ViewKind::Subject("general-chemistry"));
    harness.seed_attempt(&completed_attempt(12)).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Test 1"), "missing test row in {html}");
    assert!(html.contains("1 / 3 attempts"), "missing attempts in {html}");
    assert!(html.contains("Attempt 1: 290"), "missing attempt link in {html}");
    assert!(html.contains("Reset"), "missing reset in {html}");
    assert!(html.contains("Topics:"), "missing topics in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn subject_view_smoke_unknown_slug() {
    let mut harness = setup_view_harness(ViewKind::Subject("astrology"));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Not found."), "missing not found in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_without_questions() {
    let mut harness = setup_view_harness(ViewKind::Exam("biology", 1));
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("No questions available for this exam."),
        "missing empty state in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_renders_intro() {
    let mut harness = setup_view_harness(ViewKind::Exam("general-chemistry", 1));
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("General Chemistry Practice Test 1"),
        "missing title in {html}"
    );
    assert!(html.contains("30 questions"), "missing count in {html}");
    assert!(html.contains("Start"), "missing start in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_refuses_after_attempt_limit() {
    let mut harness = setup_view_harness(ViewKind::Exam("general-chemistry", 1));
    for _ in 0..3 {
        harness.seed_attempt(&completed_attempt(5)).await;
    }
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("You have used every attempt for this test."),
        "missing limit message in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn attempt_view_smoke_renders_outcomes() {
    let repo = InMemoryRepository::new();
    let id = repo
        .append_attempt(&Namespace::guest(), &completed_attempt(12))
        .await
        .expect("append attempt");
    let storage = Storage {
        progress: Arc::new(repo.clone()),
        attempts: Arc::new(repo),
    };
    let mut harness = setup_view_harness_with_storage(ViewKind::Attempt(id.value()), storage);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("General Chemistry Test 1"), "missing title in {html}");
    assert!(html.contains("290"), "missing score in {html}");
    assert!(html.contains("Question 30"), "missing last row in {html}");
    assert!(html.contains("Skipped"), "missing skipped status in {html}");
    assert!(html.contains("(your answer)"), "missing chosen note in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn attempt_view_smoke_unknown_id() {
    let mut harness = setup_view_harness(ViewKind::Attempt(404));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Not found."), "missing not found in {html}");
}

struct FailingAttempts;

#[async_trait::async_trait]
impl AttemptRepository for FailingAttempts {
    async fn append_attempt(
        &self,
        _namespace: &Namespace,
        _attempt: &CompletedAttempt,
    ) -> Result<AttemptId, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn list_attempts(&self, _slot: &ExamSlot) -> Result<Vec<CompletedAttempt>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn list_namespace_attempts(
        &self,
        _namespace: &Namespace,
    ) -> Result<Vec<CompletedAttempt>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn get_attempt(
        &self,
        _namespace: &Namespace,
        _id: AttemptId,
    ) -> Result<CompletedAttempt, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn clear_attempts(&self, _slot: &ExamSlot) -> Result<u64, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_renders_error_state() {
    let storage = Storage {
        progress: Arc::new(InMemoryRepository::new()),
        attempts: Arc::new(FailingAttempts),
    };
    let mut harness = setup_view_harness_with_storage(ViewKind::Dashboard, storage);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Something went wrong"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}
