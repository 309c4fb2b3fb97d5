use chrono::{DateTime, Utc};
use sqlx::Row;

use screening_core::model::ScreeningRecord;

use super::SqliteRepository;
use super::mapping::{record_from_row, screening_row_from_row, ser};
use crate::repository::{ScreeningHistoryRepository, ScreeningRow, StorageError};

#[async_trait::async_trait]
impl ScreeningHistoryRepository for SqliteRepository {
    async fn append_record(&self, record: &ScreeningRecord) -> Result<i64, StorageError> {
        let uuid = record.id().to_string();
        let result = record.result();
        let category_scores =
            serde_json::to_string(result.category_scores()).map_err(ser)?;
        let answers = serde_json::to_string(result.answers()).map_err(ser)?;

        let res = sqlx::query(
            r"
            INSERT INTO screenings (
                screening_uuid, chronological_age_months, age_equivalent_months,
                raw_score, max_score, category_scores, answers, started_at, completed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(screening_uuid) DO NOTHING
            ",
        )
        .bind(&uuid)
        .bind(record.chronological_age().months())
        .bind(result.age_equivalent_months())
        .bind(i64::from(result.raw_score()))
        .bind(i64::from(result.max_score()))
        .bind(category_scores)
        .bind(answers)
        .bind(record.started_at())
        .bind(record.completed_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() > 0 {
            return Ok(res.last_insert_rowid());
        }

        // The record was appended earlier; hand back the existing row id.
        let row = sqlx::query("SELECT id FROM screenings WHERE screening_uuid = ?1")
            .bind(&uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;

        row.try_get("id").map_err(ser)
    }

    async fn get_record(&self, id: i64) -> Result<ScreeningRecord, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, screening_uuid, chronological_age_months, age_equivalent_months,
                   raw_score, max_score, category_scores, answers, started_at, completed_at
            FROM screenings
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        record_from_row(&row)
    }

    async fn list_record_rows(
        &self,
        completed_from: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<ScreeningRow>, StorageError> {
        let mut sql = String::from(
            r"
            SELECT id, screening_uuid, chronological_age_months, age_equivalent_months,
                   raw_score, max_score, category_scores, answers, started_at, completed_at
            FROM screenings
            ",
        );

        let mut bind_index = 1;
        if completed_from.is_some() {
            sql.push_str(" WHERE completed_at >= ?1");
            bind_index += 1;
        }
        sql.push_str(" ORDER BY completed_at DESC, id DESC LIMIT ?");
        sql.push_str(&bind_index.to_string());

        let mut query = sqlx::query(&sql);
        if let Some(from) = completed_from {
            query = query.bind(from);
        }
        query = query.bind(i64::from(limit));

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(screening_row_from_row(&row)?);
        }
        Ok(out)
    }
}
