use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::age::ChronologicalAge;
use crate::model::milestone::MilestoneCategory;
use crate::model::response::RecordedAnswer;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum AssessmentResultError {
    #[error("age equivalent must be finite and non-negative, got {provided}")]
    InvalidAgeEquivalent { provided: f64 },

    #[error("raw score ({raw}) exceeds max score ({max})")]
    ScoreExceedsMax { raw: u32, max: u32 },

    #[error("max score ({max}) does not match answer count ({answers})")]
    AnswerCountMismatch { max: u32, answers: usize },

    #[error("category totals ({raw}/{max}) do not match aggregate scores")]
    CategoryTotalsMismatch { raw: u32, max: u32 },
}

//
// ─── CATEGORY SCORE ────────────────────────────────────────────────────────────
//

/// Raw/max point pair for one milestone category.
///
/// Only answered milestones contribute; unasked items are excluded from both
/// sides, never counted as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryScore {
    pub raw: u32,
    pub max: u32,
}

//
// ─── ASSESSMENT RESULT ─────────────────────────────────────────────────────────
//

/// Immutable output of scoring one terminal session.
///
/// Created once per completed screening and handed to collaborators for
/// display and append-only persistence; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentResult {
    age_equivalent_months: f64,
    raw_score: u32,
    max_score: u32,
    category_scores: BTreeMap<MilestoneCategory, CategoryScore>,
    answers: Vec<RecordedAnswer>,
}

impl AssessmentResult {
    /// Internal constructor for the scoring engine, which upholds the
    /// consistency invariants by construction.
    pub(crate) fn new(
        age_equivalent_months: f64,
        raw_score: u32,
        max_score: u32,
        category_scores: BTreeMap<MilestoneCategory, CategoryScore>,
        answers: Vec<RecordedAnswer>,
    ) -> Self {
        Self {
            age_equivalent_months,
            raw_score,
            max_score,
            category_scores,
            answers,
        }
    }

    /// Rehydrates a result from persisted storage, re-checking consistency.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentResultError` if the stored pieces do not add up:
    /// a non-finite or negative age equivalent, `raw > max`, a max score that
    /// does not equal two points per answer, or category totals that disagree
    /// with the aggregates.
    pub fn from_persisted(
        age_equivalent_months: f64,
        raw_score: u32,
        max_score: u32,
        category_scores: BTreeMap<MilestoneCategory, CategoryScore>,
        answers: Vec<RecordedAnswer>,
    ) -> Result<Self, AssessmentResultError> {
        if !age_equivalent_months.is_finite() || age_equivalent_months < 0.0 {
            return Err(AssessmentResultError::InvalidAgeEquivalent {
                provided: age_equivalent_months,
            });
        }
        if raw_score > max_score {
            return Err(AssessmentResultError::ScoreExceedsMax {
                raw: raw_score,
                max: max_score,
            });
        }
        let expected_max = u32::try_from(answers.len())
            .ok()
            .and_then(|n| n.checked_mul(2));
        if expected_max != Some(max_score) {
            return Err(AssessmentResultError::AnswerCountMismatch {
                max: max_score,
                answers: answers.len(),
            });
        }

        let (category_raw, category_max) = category_scores
            .values()
            .fold((0_u32, 0_u32), |(raw, max), score| {
                (raw.saturating_add(score.raw), max.saturating_add(score.max))
            });
        if category_raw != raw_score || category_max != max_score {
            return Err(AssessmentResultError::CategoryTotalsMismatch {
                raw: category_raw,
                max: category_max,
            });
        }

        Ok(Self {
            age_equivalent_months,
            raw_score,
            max_score,
            category_scores,
            answers,
        })
    }

    /// Functional age estimate in months, rounded to one decimal place.
    #[must_use]
    pub fn age_equivalent_months(&self) -> f64 {
        self.age_equivalent_months
    }

    #[must_use]
    pub fn raw_score(&self) -> u32 {
        self.raw_score
    }

    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    #[must_use]
    pub fn category_scores(&self) -> &BTreeMap<MilestoneCategory, CategoryScore> {
        &self.category_scores
    }

    #[must_use]
    pub fn category(&self, category: MilestoneCategory) -> Option<CategoryScore> {
        self.category_scores.get(&category).copied()
    }

    /// Answers in presentation order.
    #[must_use]
    pub fn answers(&self) -> &[RecordedAnswer] {
        &self.answers
    }
}

//
// ─── DELAY STATUS ──────────────────────────────────────────────────────────────
//

/// Qualitative reading of the gap between chronological and functional age.
///
/// A derived display value; it is computed from a result on demand and never
/// stored with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelayStatus {
    OnTrack,
    Mild,
    Moderate,
    Significant,
}

impl DelayStatus {
    /// Classifies the delay in months. Boundaries are inclusive on the lower
    /// bucket: a delay of exactly 3.0 months is `Mild`, exactly 6.0 is
    /// `Moderate`.
    #[must_use]
    pub fn classify(chronological_age: ChronologicalAge, age_equivalent_months: f64) -> Self {
        let delay = chronological_age.months() - age_equivalent_months;
        if delay <= 0.0 {
            Self::OnTrack
        } else if delay <= 3.0 {
            Self::Mild
        } else if delay <= 6.0 {
            Self::Moderate
        } else {
            Self::Significant
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DelayStatus::OnTrack => "on track",
            DelayStatus::Mild => "mild delay",
            DelayStatus::Moderate => "moderate delay",
            DelayStatus::Significant => "significant delay",
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::MilestoneId;
    use crate::model::response::Response;

    fn answers(n: u64) -> Vec<RecordedAnswer> {
        (1..=n)
            .map(|id| RecordedAnswer::new(MilestoneId::new(id), Response::Yes))
            .collect()
    }

    fn categories(raw: u32, max: u32) -> BTreeMap<MilestoneCategory, CategoryScore> {
        let mut scores = BTreeMap::new();
        scores.insert(MilestoneCategory::Locomotion, CategoryScore { raw, max });
        scores
    }

    #[test]
    fn from_persisted_accepts_consistent_pieces() {
        let result =
            AssessmentResult::from_persisted(9.8, 4, 4, categories(4, 4), answers(2)).unwrap();
        assert_eq!(result.age_equivalent_months(), 9.8);
        assert_eq!(result.raw_score(), 4);
        assert_eq!(
            result.category(MilestoneCategory::Locomotion),
            Some(CategoryScore { raw: 4, max: 4 })
        );
        assert!(result.category(MilestoneCategory::Reflexes).is_none());
    }

    #[test]
    fn from_persisted_rejects_raw_over_max() {
        let err = AssessmentResult::from_persisted(1.0, 5, 4, categories(5, 4), answers(2))
            .unwrap_err();
        assert!(matches!(err, AssessmentResultError::ScoreExceedsMax { .. }));
    }

    #[test]
    fn from_persisted_rejects_answer_count_mismatch() {
        let err = AssessmentResult::from_persisted(1.0, 4, 4, categories(4, 4), answers(3))
            .unwrap_err();
        assert!(matches!(
            err,
            AssessmentResultError::AnswerCountMismatch { .. }
        ));
    }

    #[test]
    fn from_persisted_rejects_category_mismatch() {
        let err = AssessmentResult::from_persisted(1.0, 4, 4, categories(2, 4), answers(2))
            .unwrap_err();
        assert!(matches!(
            err,
            AssessmentResultError::CategoryTotalsMismatch { .. }
        ));
    }

    #[test]
    fn from_persisted_rejects_invalid_age_equivalent() {
        let err = AssessmentResult::from_persisted(f64::NAN, 4, 4, categories(4, 4), answers(2))
            .unwrap_err();
        assert!(matches!(
            err,
            AssessmentResultError::InvalidAgeEquivalent { .. }
        ));
    }

    #[test]
    fn delay_status_buckets_are_inclusive_on_the_lower_side() {
        let age = ChronologicalAge::new(12.0).unwrap();
        assert_eq!(DelayStatus::classify(age, 12.0), DelayStatus::OnTrack);
        assert_eq!(DelayStatus::classify(age, 13.0), DelayStatus::OnTrack);
        assert_eq!(DelayStatus::classify(age, 11.9), DelayStatus::Mild);
        assert_eq!(DelayStatus::classify(age, 9.0), DelayStatus::Mild);
        assert_eq!(DelayStatus::classify(age, 8.9), DelayStatus::Moderate);
        assert_eq!(DelayStatus::classify(age, 6.0), DelayStatus::Moderate);
        assert_eq!(DelayStatus::classify(age, 5.9), DelayStatus::Significant);
    }
}
