use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::collections::BTreeMap;

use screening_core::model::{
    AssessmentResult, CategoryScore, ChronologicalAge, MilestoneCategory, MilestoneDraft,
    MilestoneId, RecordedAnswer, ScreeningId, ScreeningRecord,
};

use crate::repository::{ScreeningRow, StorageError};

pub(super) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(super) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(super) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(super) fn milestone_id_from_i64(v: i64) -> Result<MilestoneId, StorageError> {
    u64::try_from(v)
        .map(MilestoneId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid milestone id: {v}")))
}

pub(super) fn milestone_draft_from_row(row: &SqliteRow) -> Result<MilestoneDraft, StorageError> {
    let id = milestone_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let display_name: String = row.try_get("display_name").map_err(ser)?;
    let description: Option<String> = row.try_get("description").map_err(ser)?;
    let expected_by_month = row
        .try_get::<Option<i64>, _>("expected_by_month")
        .map_err(ser)?
        .map(|v| u32_from_i64("expected_by_month", v))
        .transpose()?;
    let age_equivalent_months: Option<f64> =
        row.try_get("age_equivalent_months").map_err(ser)?;
    let concern_if_missing_by_month = u32_from_i64(
        "concern_if_missing_by_month",
        row.try_get::<i64, _>("concern_if_missing_by_month").map_err(ser)?,
    )?;
    let red_flag = row.try_get::<i64, _>("red_flag").map_err(ser)? != 0;
    let category = row
        .try_get::<String, _>("category")
        .map_err(ser)?
        .parse::<MilestoneCategory>()
        .map_err(ser)?;
    let display_order =
        u32_from_i64("display_order", row.try_get::<i64, _>("display_order").map_err(ser)?)?;

    Ok(MilestoneDraft {
        id,
        display_name,
        description,
        expected_by_month,
        age_equivalent_months,
        concern_if_missing_by_month,
        red_flag,
        category,
        display_order,
    })
}

pub(super) fn record_from_row(row: &SqliteRow) -> Result<ScreeningRecord, StorageError> {
    let screening_id = row
        .try_get::<String, _>("screening_uuid")
        .map_err(ser)?
        .parse::<ScreeningId>()
        .map_err(ser)?;
    let chronological_age =
        ChronologicalAge::new(row.try_get::<f64, _>("chronological_age_months").map_err(ser)?)
            .map_err(ser)?;
    let age_equivalent_months: f64 = row.try_get("age_equivalent_months").map_err(ser)?;
    let raw_score = u32_from_i64("raw_score", row.try_get::<i64, _>("raw_score").map_err(ser)?)?;
    let max_score = u32_from_i64("max_score", row.try_get::<i64, _>("max_score").map_err(ser)?)?;

    let category_scores: BTreeMap<MilestoneCategory, CategoryScore> =
        serde_json::from_str(&row.try_get::<String, _>("category_scores").map_err(ser)?)
            .map_err(ser)?;
    let answers: Vec<RecordedAnswer> =
        serde_json::from_str(&row.try_get::<String, _>("answers").map_err(ser)?).map_err(ser)?;

    let started_at = row.try_get("started_at").map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    let result = AssessmentResult::from_persisted(
        age_equivalent_months,
        raw_score,
        max_score,
        category_scores,
        answers,
    )
    .map_err(ser)?;

    ScreeningRecord::new(
        screening_id,
        chronological_age,
        result,
        started_at,
        completed_at,
    )
    .map_err(ser)
}

pub(super) fn screening_row_from_row(row: &SqliteRow) -> Result<ScreeningRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let record = record_from_row(row)?;
    Ok(ScreeningRow::new(id, record))
}
