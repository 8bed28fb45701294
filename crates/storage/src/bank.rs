//! Question bank loader.
//!
//! A bank directory holds one `<subject-slug>.json` file per subject: an
//! array of tests, each an array of `{ "stem", "c", "a" }` records where `c`
//! lists the choices and `a` is the zero-based correct choice.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use prep_core::model::{Question, QuestionError, Subject, TestIndex};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid question bank for {subject}: {source}")]
    Json {
        subject: Subject,
        #[source]
        source: serde_json::Error,
    },

    #[error("{subject} test {test} question {question}: {source}")]
    InvalidQuestion {
        subject: Subject,
        test: usize,
        question: usize,
        #[source]
        source: QuestionError,
    },
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    stem: String,
    c: Vec<String>,
    a: usize,
}

/// Loaded questions, shared with sessions by reference count.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    tests: HashMap<Subject, Vec<Arc<[Question]>>>,
}

impl QuestionBank {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every subject file found in `dir`. Missing files leave the
    /// subject empty.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if a present file cannot be read or holds an
    /// invalid record.
    pub fn load_dir(dir: &Path) -> Result<Self, BankError> {
        let mut bank = Self::empty();
        for subject in Subject::ALL {
            let path = dir.join(format!("{}.json", subject.slug()));
            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!(subject = %subject, path = %path.display(), "no bank file");
                    continue;
                }
                Err(source) => return Err(BankError::Io { path, source }),
            };
            let tests = Self::parse_subject(subject, &raw)?;
            tracing::info!(subject = %subject, tests = tests.len(), "loaded question bank");
            bank.insert(subject, tests);
        }
        Ok(bank)
    }

    /// Parse one subject file.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Json` for malformed JSON and
    /// `BankError::InvalidQuestion` for a record that fails validation.
    pub fn parse_subject(subject: Subject, raw: &str) -> Result<Vec<Arc<[Question]>>, BankError> {
        let tests: Vec<Vec<RawQuestion>> =
            serde_json::from_str(raw).map_err(|source| BankError::Json { subject, source })?;
        tests
            .into_iter()
            .enumerate()
            .map(|(test, records)| {
                records
                    .into_iter()
                    .enumerate()
                    .map(|(question, r)| {
                        Question::new(r.stem, r.c, r.a).map_err(|source| {
                            BankError::InvalidQuestion {
                                subject,
                                test,
                                question,
                                source,
                            }
                        })
                    })
                    .collect::<Result<Arc<[Question]>, _>>()
            })
            .collect()
    }

    pub fn insert(&mut self, subject: Subject, tests: Vec<Arc<[Question]>>) {
        self.tests.insert(subject, tests);
    }

    /// Questions of one test. `None` means "no questions available".
    #[must_use]
    pub fn questions(&self, subject: Subject, test_index: TestIndex) -> Option<Arc<[Question]>> {
        let index = usize::try_from(test_index.value()).ok()?;
        self.tests
            .get(&subject)?
            .get(index)
            .filter(|qs| !qs.is_empty())
            .cloned()
    }

    /// Number of tests loaded for `subject`.
    #[must_use]
    pub fn test_count(&self, subject: Subject) -> usize {
        self.tests.get(&subject).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.values().all(Vec::is_empty)
    }
}
