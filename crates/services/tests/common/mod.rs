#![allow(dead_code)]

use std::sync::Arc;

use prep_core::model::{Question, Subject};
use prep_core::time::fixed_clock;
use services::{AppServices, ExamConfig};
use storage::bank::QuestionBank;
use storage::repository::{InMemoryRepository, Storage};

pub fn questions(n: usize) -> Arc<[Question]> {
    (0..n)
        .map(|i| {
            Question::new(
                format!("Question {i}"),
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                i % 4,
            )
            .unwrap()
        })
        .collect()
}

pub fn bank() -> QuestionBank {
    let mut bank = QuestionBank::empty();
    bank.insert(Subject::GeneralChemistry, vec![questions(30), questions(30)]);
    bank.insert(Subject::Biology, vec![questions(5)]);
    bank
}

pub fn services_with(repo: &InMemoryRepository, config: ExamConfig) -> AppServices {
    let storage = Storage {
        progress: Arc::new(repo.clone()),
        attempts: Arc::new(repo.clone()),
    };
    AppServices::from_parts(
        storage,
        bank(),
        prep_core::model::Namespace::guest(),
        fixed_clock(),
        config,
    )
}
