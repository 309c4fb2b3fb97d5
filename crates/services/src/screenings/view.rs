use chrono::{DateTime, Utc};
use std::sync::Arc;

use screening_core::model::{DelayStatus, ScreeningId, ScreeningRecord};
use storage::repository::{ScreeningHistoryRepository, ScreeningRow};

use super::queries::ScreeningQueries;
use crate::Clock;
use crate::error::ScreeningError;

/// Storage identifier for a persisted screening record.
///
/// NOTE: This is currently `i64` to match `SQLite` row IDs; the stable
/// cross-system key is the record's `ScreeningId`.
pub type ScreeningRecordId = i64;

/// Presentation-agnostic list item for a past screening.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
///
/// The UI may format timestamps and statuses as needed. The delay status is
/// derived here from the stored scores; it is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningListItem {
    pub id: ScreeningRecordId,
    pub screening_id: ScreeningId,
    pub completed_at: DateTime<Utc>,

    pub chronological_age_months: f64,
    pub age_equivalent_months: f64,
    pub raw_score: u32,
    pub max_score: u32,
    pub status: DelayStatus,
}

impl ScreeningListItem {
    #[must_use]
    pub fn from_row(row: &ScreeningRow) -> Self {
        let record = &row.record;
        let result = record.result();
        Self {
            id: row.id,
            screening_id: record.id(),
            completed_at: record.completed_at(),
            chronological_age_months: record.chronological_age().months(),
            age_equivalent_months: result.age_equivalent_months(),
            raw_score: result.raw_score(),
            max_score: result.max_score(),
            status: DelayStatus::classify(
                record.chronological_age(),
                result.age_equivalent_months(),
            ),
        }
    }
}

/// Presentation-facing screening history facade that hides repositories and
/// time from the UI.
///
/// This service owns:
/// - the time source (`Clock`)
/// - repository access
///
/// It does **not** own UI formatting.
#[derive(Clone)]
pub struct ScreeningHistoryService {
    clock: Clock,
    history: Arc<dyn ScreeningHistoryRepository>,
}

impl ScreeningHistoryService {
    #[must_use]
    pub fn new(clock: Clock, history: Arc<dyn ScreeningHistoryRepository>) -> Self {
        Self { clock, history }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(
            clock,
            Arc::new(storage::repository::InMemoryRepository::new()),
        )
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Load screenings completed within the trailing `days` window.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError::Storage` on repository failures.
    pub async fn list_recent_screenings(
        &self,
        days: i64,
        limit: u32,
    ) -> Result<Vec<ScreeningListItem>, ScreeningError> {
        let now = self.clock.now();
        let rows =
            ScreeningQueries::list_recent_record_rows(self.history.as_ref(), now, days, limit)
                .await?;

        Ok(rows.iter().map(ScreeningListItem::from_row).collect())
    }

    /// Fetch a screening record by row ID.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError::Storage` when repository access fails.
    pub async fn get_screening(
        &self,
        id: ScreeningRecordId,
    ) -> Result<ScreeningRecord, ScreeningError> {
        ScreeningQueries::get_record(id, self.history.as_ref()).await
    }
}
