use screening_core::model::MilestoneDraft;

use super::SqliteRepository;
use super::mapping::{id_i64, milestone_draft_from_row};
use crate::repository::{CatalogRepository, StorageError};

#[async_trait::async_trait]
impl CatalogRepository for SqliteRepository {
    async fn fetch_milestones(&self) -> Result<Vec<MilestoneDraft>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, display_name, description, expected_by_month, age_equivalent_months,
                   concern_if_missing_by_month, red_flag, category, display_order
            FROM milestones
            ORDER BY display_order ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut drafts = Vec::with_capacity(rows.len());
        for row in rows {
            drafts.push(milestone_draft_from_row(&row)?);
        }
        Ok(drafts)
    }

    async fn replace_milestones(&self, drafts: &[MilestoneDraft]) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("DELETE FROM milestones")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for draft in drafts {
            sqlx::query(
                r"
                INSERT INTO milestones (
                    id, display_name, description, expected_by_month, age_equivalent_months,
                    concern_if_missing_by_month, red_flag, category, display_order
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ",
            )
            .bind(id_i64("milestone id", draft.id.value())?)
            .bind(&draft.display_name)
            .bind(draft.description.as_deref())
            .bind(draft.expected_by_month.map(i64::from))
            .bind(draft.age_equivalent_months)
            .bind(i64::from(draft.concern_if_missing_by_month))
            .bind(i64::from(draft.red_flag))
            .bind(draft.category.as_str())
            .bind(i64::from(draft.display_order))
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}
