#![forbid(unsafe_code)]

pub mod bank;
pub mod repository;
pub mod sqlite;

pub use bank::{BankError, QuestionBank};
pub use repository::{ExamSlot, StorageError, Storage};
