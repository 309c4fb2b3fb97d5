use chrono::{DateTime, Utc};
use std::fmt;

use screening_core::model::{
    AssessmentResult, ChronologicalAge, DelayStatus, Milestone, MilestoneCatalog, RecordedAnswer,
    Response, ScreeningId, ScreeningRecord,
};
use screening_core::scoring::score_session;
use screening_core::traversal::{AssessmentSession, SessionState};

use super::progress::ScreeningProgress;
use crate::error::ScreeningError;

//
// ─── SCREENING SESSION ─────────────────────────────────────────────────────────
//

/// In-memory screening run for one child.
///
/// Wraps the core [`AssessmentSession`] with wall-clock bookkeeping, scores
/// it exactly once at termination, and remembers the persisted record id so
/// completion writes stay idempotent. The screening id is generated up front
/// and reused for every persistence attempt of this run.
pub struct ScreeningSession {
    screening_id: ScreeningId,
    session: AssessmentSession,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    result: Option<AssessmentResult>,
    record_id: Option<i64>,
}

impl ScreeningSession {
    /// Create a new screening over a validated catalog snapshot.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    #[must_use]
    pub fn new(
        catalog: MilestoneCatalog,
        chronological_age: ChronologicalAge,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            screening_id: ScreeningId::generate(),
            session: AssessmentSession::new(catalog, chronological_age),
            started_at,
            completed_at: None,
            result: None,
            record_id: None,
        }
    }

    #[must_use]
    pub fn screening_id(&self) -> ScreeningId {
        self.screening_id
    }

    #[must_use]
    pub fn chronological_age(&self) -> ChronologicalAge {
        self.session.chronological_age()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn record_id(&self) -> Option<i64> {
        self.record_id
    }

    /// The scored result, available once the session is complete.
    #[must_use]
    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }

    /// Derived delay classification for display, available once complete.
    #[must_use]
    pub fn status(&self) -> Option<DelayStatus> {
        self.result.as_ref().map(|result| {
            DelayStatus::classify(
                self.session.chronological_age(),
                result.age_equivalent_months(),
            )
        })
    }

    /// The single pending question, `None` once complete.
    #[must_use]
    pub fn current_milestone(&self) -> Option<&Milestone> {
        self.session.current_milestone()
    }

    /// Answers given so far, in presentation order.
    #[must_use]
    pub fn answers(&self) -> &[RecordedAnswer] {
        self.session.answers()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session.is_terminal()
    }

    /// Returns a summary of the current screening progress.
    #[must_use]
    pub fn progress(&self) -> ScreeningProgress {
        ScreeningProgress {
            answered: self.session.answered_count(),
            catalog_size: self.session.catalog().len(),
            is_complete: self.is_complete(),
        }
    }

    /// Apply a caregiver response to the pending question.
    ///
    /// When the answer terminates the traversal, the session is scored once
    /// and the completion time recorded.
    ///
    /// `answered_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError::Traversal` if the screening is already
    /// finished; scoring faults propagate as `ScreeningError::Scoring`.
    pub fn answer_current(
        &mut self,
        response: Response,
        answered_at: DateTime<Utc>,
    ) -> Result<SessionState, ScreeningError> {
        let state = self.session.submit(response)?;

        if state == SessionState::Complete && self.result.is_none() {
            self.result = Some(score_session(&self.session)?);
            self.completed_at = Some(answered_at);
        }

        Ok(state)
    }

    /// Build the append-only history record for this completed screening.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError::Completed` if the screening has not finished
    /// yet.
    pub fn build_record(&self) -> Result<ScreeningRecord, ScreeningError> {
        let completed_at = self.completed_at.ok_or(ScreeningError::Completed)?;
        let result = self.result.clone().ok_or(ScreeningError::Completed)?;

        Ok(ScreeningRecord::new(
            self.screening_id,
            self.session.chronological_age(),
            result,
            self.started_at,
            completed_at,
        )?)
    }

    pub(crate) fn set_record_id(&mut self, id: i64) {
        self.record_id = Some(id);
    }
}

impl fmt::Debug for ScreeningSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreeningSession")
            .field("screening_id", &self.screening_id)
            .field("session", &self.session)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .field("record_id", &self.record_id)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
