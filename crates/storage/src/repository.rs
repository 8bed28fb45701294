use async_trait::async_trait;
use prep_core::model::{AttemptId, CompletedAttempt, Namespace, SavedProgress, Subject, TestIndex};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One `(namespace, subject, test)` persistence slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExamSlot {
    pub namespace: Namespace,
    pub subject: Subject,
    pub test_index: TestIndex,
}

impl ExamSlot {
    #[must_use]
    pub fn new(namespace: Namespace, subject: Subject, test_index: TestIndex) -> Self {
        Self {
            namespace,
            subject,
            test_index,
        }
    }
}

impl fmt::Display for ExamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.namespace.storage_key(),
            self.subject.slug(),
            self.test_index
        )
    }
}

/// Encode saved progress for a text column.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_progress(progress: &SavedProgress) -> Result<String, StorageError> {
    serde_json::to_string(progress).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decode saved progress. Malformed payloads are logged and treated as absent.
#[must_use]
pub fn decode_progress(slot: &ExamSlot, raw: &str) -> Option<SavedProgress> {
    match serde_json::from_str::<SavedProgress>(raw) {
        Ok(progress) => Some(progress),
        Err(err) => {
            tracing::warn!(slot = %slot, error = %err, "discarding malformed saved progress");
            None
        }
    }
}

/// In-progress resume slot: answers and marks only.
#[async_trait]
pub trait ExamProgressRepository: Send + Sync {
    /// Replace the saved progress of a slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the payload cannot be stored.
    async fn save_progress(
        &self,
        slot: &ExamSlot,
        progress: &SavedProgress,
    ) -> Result<(), StorageError>;

    /// Most recently saved progress, or `None` when nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures; malformed payloads
    /// come back as `Ok(None)`.
    async fn load_progress(&self, slot: &ExamSlot) -> Result<Option<SavedProgress>, StorageError>;

    /// Forget the saved progress of a slot. Clearing an empty slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn clear_progress(&self, slot: &ExamSlot) -> Result<(), StorageError>;
}

/// Append-only history of completed attempts.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Append an attempt and return its storage id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(
        &self,
        namespace: &Namespace,
        attempt: &CompletedAttempt,
    ) -> Result<AttemptId, StorageError>;

    /// Attempts of one slot, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn list_attempts(&self, slot: &ExamSlot) -> Result<Vec<CompletedAttempt>, StorageError>;

    /// Every attempt of a namespace, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn list_namespace_attempts(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<CompletedAttempt>, StorageError>;

    /// Fetch one attempt of a namespace.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id does not exist in this namespace.
    async fn get_attempt(
        &self,
        namespace: &Namespace,
        id: AttemptId,
    ) -> Result<CompletedAttempt, StorageError>;

    /// Delete the history of a slot, returning how many attempts were removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn clear_attempts(&self, slot: &ExamSlot) -> Result<u64, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<ExamSlot, SavedProgress>>>,
    attempts: Arc<Mutex<Vec<(Namespace, CompletedAttempt)>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn in_slot(slot: &ExamSlot, namespace: &Namespace, attempt: &CompletedAttempt) -> bool {
    *namespace == slot.namespace
        && attempt.subject() == slot.subject
        && attempt.test_index() == slot.test_index
}

#[async_trait]
impl ExamProgressRepository for InMemoryRepository {
    async fn save_progress(
        &self,
        slot: &ExamSlot,
        progress: &SavedProgress,
    ) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.insert(slot.clone(), progress.clone());
        Ok(())
    }

    async fn load_progress(&self, slot: &ExamSlot) -> Result<Option<SavedProgress>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.get(slot).cloned())
    }

    async fn clear_progress(&self, slot: &ExamSlot) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.remove(slot);
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempt(
        &self,
        namespace: &Namespace,
        attempt: &CompletedAttempt,
    ) -> Result<AttemptId, StorageError> {
        let mut guard = self.attempts.lock().map_err(poisoned)?;
        let next = guard
            .iter()
            .filter_map(|(_, a)| a.id())
            .map(|id| id.value())
            .max()
            .unwrap_or(0)
            + 1;
        let id = AttemptId::new(next);
        guard.push((namespace.clone(), attempt.clone().with_id(id)));
        Ok(id)
    }

    async fn list_attempts(&self, slot: &ExamSlot) -> Result<Vec<CompletedAttempt>, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|(ns, a)| in_slot(slot, ns, a))
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn list_namespace_attempts(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<CompletedAttempt>, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn get_attempt(
        &self,
        namespace: &Namespace,
        id: AttemptId,
    ) -> Result<CompletedAttempt, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        guard
            .iter()
            .find(|(ns, a)| ns == namespace && a.id() == Some(id))
            .map(|(_, a)| a.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn clear_attempts(&self, slot: &ExamSlot) -> Result<u64, StorageError> {
        let mut guard = self.attempts.lock().map_err(poisoned)?;
        let before = guard.len();
        guard.retain(|(ns, a)| !in_slot(slot, ns, a));
        Ok(u64::try_from(before - guard.len()).unwrap_or(u64::MAX))
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ExamProgressRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ExamProgressRepository> = Arc::new(repo.clone());
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo);
        Self { progress, attempts }
    }
}
