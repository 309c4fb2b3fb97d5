use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::age::ChronologicalAge;
use crate::model::ids::ScreeningId;
use crate::model::result::AssessmentResult;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScreeningRecordError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,
}

/// Append-only history record for one completed screening.
///
/// Records are independent outputs handed to the persistence collaborator,
/// not session mutations; the generated `ScreeningId` keys idempotent writes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningRecord {
    id: ScreeningId,
    chronological_age: ChronologicalAge,
    result: AssessmentResult,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl ScreeningRecord {
    /// Builds a record for a scored screening.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningRecordError::InvalidTimeRange` if `completed_at`
    /// is before `started_at`.
    pub fn new(
        id: ScreeningId,
        chronological_age: ChronologicalAge,
        result: AssessmentResult,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ScreeningRecordError> {
        if completed_at < started_at {
            return Err(ScreeningRecordError::InvalidTimeRange);
        }

        Ok(Self {
            id,
            chronological_age,
            result,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> ScreeningId {
        self.id
    }

    #[must_use]
    pub fn chronological_age(&self) -> ChronologicalAge {
        self.chronological_age
    }

    #[must_use]
    pub fn result(&self) -> &AssessmentResult {
        &self.result
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::MilestoneId;
    use crate::model::milestone::MilestoneCategory;
    use crate::model::response::{RecordedAnswer, Response};
    use crate::model::result::CategoryScore;
    use crate::time::fixed_now;
    use std::collections::BTreeMap;

    fn result() -> AssessmentResult {
        let mut categories = BTreeMap::new();
        categories.insert(
            MilestoneCategory::Stationary,
            CategoryScore { raw: 2, max: 2 },
        );
        AssessmentResult::from_persisted(
            6.0,
            2,
            2,
            categories,
            vec![RecordedAnswer::new(MilestoneId::new(1), Response::Yes)],
        )
        .unwrap()
    }

    #[test]
    fn record_creation_works() {
        let now = fixed_now();
        let age = ChronologicalAge::new(7.0).unwrap();
        let record =
            ScreeningRecord::new(ScreeningId::generate(), age, result(), now, now).unwrap();

        assert_eq!(record.chronological_age(), age);
        assert_eq!(record.result().raw_score(), 2);
        assert_eq!(record.started_at(), now);
    }

    #[test]
    fn inverted_time_range_is_rejected() {
        let now = fixed_now();
        let age = ChronologicalAge::new(7.0).unwrap();
        let err = ScreeningRecord::new(
            ScreeningId::generate(),
            age,
            result(),
            now,
            now - chrono::Duration::seconds(1),
        )
        .unwrap_err();
        assert!(matches!(err, ScreeningRecordError::InvalidTimeRange));
    }
}
