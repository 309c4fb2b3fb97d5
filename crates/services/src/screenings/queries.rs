use chrono::{DateTime, Duration, Utc};

use screening_core::model::{ChronologicalAge, MilestoneCatalog, ScreeningRecord};
use storage::repository::{CatalogRepository, ScreeningHistoryRepository, ScreeningRow};

use super::service::ScreeningSession;
use crate::error::ScreeningError;

/// Storage-backed screening queries and builders.
pub(crate) struct ScreeningQueries;

impl ScreeningQueries {
    /// Fetch and validate the catalog, then open a screening session on it.
    ///
    /// This is where both precondition faults surface: an invalid catalog
    /// (empty, duplicate ids, unorderable items) and, upstream of this call,
    /// an out-of-range age.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError::InvalidCatalog` for catalog faults, or
    /// `ScreeningError::Storage` on repository failures.
    pub async fn start_from_storage(
        catalogs: &dyn CatalogRepository,
        chronological_age: ChronologicalAge,
        now: DateTime<Utc>,
    ) -> Result<ScreeningSession, ScreeningError> {
        let drafts = catalogs.fetch_milestones().await?;
        let catalog = MilestoneCatalog::from_drafts(drafts)?;
        Ok(ScreeningSession::new(catalog, chronological_age, now))
    }

    /// Fetch a screening record by row id.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError::Storage` when repository access fails.
    pub async fn get_record(
        id: i64,
        history: &dyn ScreeningHistoryRepository,
    ) -> Result<ScreeningRecord, ScreeningError> {
        Ok(history.get_record(id).await?)
    }

    /// List rows completed within the trailing `days` window.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError::Storage` when repository access fails.
    pub async fn list_recent_record_rows(
        history: &dyn ScreeningHistoryRepository,
        now: DateTime<Utc>,
        days: i64,
        limit: u32,
    ) -> Result<Vec<ScreeningRow>, ScreeningError> {
        let completed_from = now - Duration::days(days);
        Ok(history.list_record_rows(Some(completed_from), limit).await?)
    }
}
