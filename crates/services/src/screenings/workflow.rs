use std::sync::Arc;

use screening_core::model::{ChronologicalAge, Response};
use screening_core::traversal::SessionState;
use storage::repository::{CatalogRepository, ScreeningHistoryRepository};

use super::queries::ScreeningQueries;
use super::service::ScreeningSession;
use crate::Clock;
use crate::error::ScreeningError;

/// Result of answering a single question in a screening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningAnswerResult {
    pub state: SessionState,
    pub is_complete: bool,
    pub record_id: Option<i64>,
}

/// Orchestrates screening start and persisted completion.
#[derive(Clone)]
pub struct ScreeningLoopService {
    clock: Clock,
    catalogs: Arc<dyn CatalogRepository>,
    history: Arc<dyn ScreeningHistoryRepository>,
}

impl ScreeningLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalogs: Arc<dyn CatalogRepository>,
        history: Arc<dyn ScreeningHistoryRepository>,
    ) -> Self {
        Self {
            clock,
            catalogs,
            history,
        }
    }

    /// Start a new screening for a child of the given age in months.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError::InvalidAge` for an out-of-range age,
    /// `ScreeningError::InvalidCatalog` for catalog faults, or
    /// `ScreeningError::Storage` on repository failures, all before any
    /// question is asked.
    pub async fn start_screening(
        &self,
        age_months: f64,
    ) -> Result<ScreeningSession, ScreeningError> {
        let age = ChronologicalAge::new(age_months)?;
        let now = self.clock.now();
        ScreeningQueries::start_from_storage(self.catalogs.as_ref(), age, now).await
    }

    /// Answer the pending question and persist the record when the screening
    /// completes.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError` for traversal or persistence failures.
    pub async fn answer_current(
        &self,
        screening: &mut ScreeningSession,
        response: Response,
    ) -> Result<ScreeningAnswerResult, ScreeningError> {
        let answered_at = self.clock.now();
        let state = screening.answer_current(response, answered_at)?;

        if screening.is_complete() && screening.record_id().is_none() {
            let record = screening.build_record()?;
            let record_id = self.history.append_record(&record).await?;
            screening.set_record_id(record_id);
        }

        Ok(ScreeningAnswerResult {
            state,
            is_complete: screening.is_complete(),
            record_id: screening.record_id(),
        })
    }

    /// Retry record persistence after a completed screening.
    ///
    /// Useful when the final append failed (e.g. transient storage error).
    /// The record keeps its screening id, so the repository dedupes replays.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError::Completed` if the screening is not complete.
    /// Returns `ScreeningError::Storage` if persistence fails.
    pub async fn finalize_record(
        &self,
        screening: &mut ScreeningSession,
    ) -> Result<i64, ScreeningError> {
        if let Some(id) = screening.record_id() {
            return Ok(id);
        }

        if !screening.is_complete() {
            return Err(ScreeningError::Completed);
        }

        let record = screening.build_record()?;
        let id = self.history.append_record(&record).await?;
        screening.set_record_id(id);
        Ok(id)
    }
}
