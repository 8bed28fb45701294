use std::collections::{BTreeMap, BTreeSet};

use prep_core::model::{AttemptId, CompletedAttempt, Subject, SubmitReason, TestIndex};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn test_index_to_i64(index: TestIndex) -> i64 {
    i64::from(index.value())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn reason_to_str(reason: SubmitReason) -> &'static str {
    match reason {
        SubmitReason::Manual => "manual",
        SubmitReason::TimeExpired => "time_expired",
    }
}

pub(crate) fn parse_reason(s: &str) -> Result<SubmitReason, StorageError> {
    match s {
        "manual" => Ok(SubmitReason::Manual),
        "time_expired" => Ok(SubmitReason::TimeExpired),
        _ => Err(StorageError::Serialization(format!("invalid reason: {s}"))),
    }
}

pub(crate) fn encode_answers(answers: &BTreeMap<usize, usize>) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(ser)
}

pub(crate) fn encode_marked(marked: &BTreeSet<usize>) -> Result<String, StorageError> {
    serde_json::to_string(marked).map_err(ser)
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<CompletedAttempt, StorageError> {
    let subject_slug: String = row.try_get("subject").map_err(ser)?;
    let subject = Subject::from_slug(&subject_slug).map_err(ser)?;
    let test_index = TestIndex::new(u32_from_i64(
        "test_index",
        row.try_get::<i64, _>("test_index").map_err(ser)?,
    )?);

    let scaled_score = u16::try_from(row.try_get::<i64, _>("scaled_score").map_err(ser)?)
        .map_err(ser)?;
    let answers: BTreeMap<usize, usize> =
        serde_json::from_str(&row.try_get::<String, _>("answers").map_err(ser)?).map_err(ser)?;
    let marked: BTreeSet<usize> =
        serde_json::from_str(&row.try_get::<String, _>("marked").map_err(ser)?).map_err(ser)?;
    let reason_str: String = row.try_get("reason").map_err(ser)?;

    CompletedAttempt::from_persisted(
        AttemptId::new(row.try_get("id").map_err(ser)?),
        subject,
        test_index,
        u32_from_i64("correct_count", row.try_get("correct_count").map_err(ser)?)?,
        u32_from_i64("total_count", row.try_get("total_count").map_err(ser)?)?,
        scaled_score,
        answers,
        marked,
        row.try_get("completed_at").map_err(ser)?,
        u32_from_i64("duration_secs", row.try_get("duration_secs").map_err(ser)?)?,
        parse_reason(&reason_str)?,
    )
    .map_err(ser)
}
