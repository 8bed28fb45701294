#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod exam_driver;
pub mod exam_service;
pub mod history_service;

pub use prep_core::Clock;

pub use app_services::AppServices;
pub use config::ExamConfig;
pub use error::{AppServicesError, ExamServiceError, HistoryError};
pub use exam_driver::{ExamCommand, ExamDriver, ExamHandle, ExamSnapshot};
pub use exam_service::{ExamController, ExamService, PendingWrites};
pub use history_service::{AttemptReview, HistoryService, SubjectOverview, TestSummary};
