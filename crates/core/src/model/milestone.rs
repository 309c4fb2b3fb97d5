use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::MilestoneId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MilestoneError {
    #[error("milestone {id} has an empty display name")]
    EmptyDisplayName { id: MilestoneId },

    #[error(
        "milestone {id} cannot be ordered: both expected_by_month and age_equivalent_months are missing"
    )]
    Unorderable { id: MilestoneId },

    #[error("milestone {id} has an invalid age equivalent: {provided}")]
    InvalidAgeEquivalent { id: MilestoneId, provided: f64 },

    #[error("unknown milestone category: {0:?}")]
    UnknownCategory(String),
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Motor-skill domain a milestone belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneCategory {
    Reflexes,
    Stationary,
    Locomotion,
    ObjectManipulation,
}

impl MilestoneCategory {
    /// All categories, in their canonical display order.
    pub const ALL: [MilestoneCategory; 4] = [
        MilestoneCategory::Reflexes,
        MilestoneCategory::Stationary,
        MilestoneCategory::Locomotion,
        MilestoneCategory::ObjectManipulation,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MilestoneCategory::Reflexes => "reflexes",
            MilestoneCategory::Stationary => "stationary",
            MilestoneCategory::Locomotion => "locomotion",
            MilestoneCategory::ObjectManipulation => "object_manipulation",
        }
    }
}

impl fmt::Display for MilestoneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilestoneCategory {
    type Err = MilestoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reflexes" => Ok(Self::Reflexes),
            "stationary" => Ok(Self::Stationary),
            "locomotion" => Ok(Self::Locomotion),
            "object_manipulation" => Ok(Self::ObjectManipulation),
            other => Err(MilestoneError::UnknownCategory(other.to_string())),
        }
    }
}

//
// ─── MILESTONE ─────────────────────────────────────────────────────────────────
//

/// Unvalidated milestone definition as supplied by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneDraft {
    pub id: MilestoneId,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expected_by_month: Option<u32>,
    #[serde(default)]
    pub age_equivalent_months: Option<f64>,
    pub concern_if_missing_by_month: u32,
    pub red_flag: bool,
    pub category: MilestoneCategory,
    pub display_order: u32,
}

impl MilestoneDraft {
    /// Validates the draft into a `Milestone`.
    ///
    /// # Errors
    ///
    /// - `EmptyDisplayName` if the display name is blank;
    /// - `Unorderable` if both `expected_by_month` and `age_equivalent_months`
    ///   are missing (the item has no place in the catalog's total order);
    /// - `InvalidAgeEquivalent` if `age_equivalent_months` is negative or
    ///   not finite.
    pub fn validate(self) -> Result<Milestone, MilestoneError> {
        if self.display_name.trim().is_empty() {
            return Err(MilestoneError::EmptyDisplayName { id: self.id });
        }

        if let Some(age) = self.age_equivalent_months {
            if !age.is_finite() || age < 0.0 {
                return Err(MilestoneError::InvalidAgeEquivalent {
                    id: self.id,
                    provided: age,
                });
            }
        }

        let ordering_age = match (self.age_equivalent_months, self.expected_by_month) {
            (Some(age), _) => age,
            (None, Some(expected)) => f64::from(expected),
            (None, None) => return Err(MilestoneError::Unorderable { id: self.id }),
        };

        Ok(Milestone {
            id: self.id,
            display_name: self.display_name,
            description: self.description,
            expected_by_month: self.expected_by_month,
            age_equivalent_months: self.age_equivalent_months,
            concern_if_missing_by_month: self.concern_if_missing_by_month,
            red_flag: self.red_flag,
            category: self.category,
            display_order: self.display_order,
            ordering_age,
        })
    }
}

/// A single age-normed motor-skill checkpoint.
///
/// Orderable by construction: validation guarantees at least one of the two
/// age fields is present and precomputes the ordering key.
#[derive(Debug, Clone, PartialEq)]
pub struct Milestone {
    id: MilestoneId,
    display_name: String,
    description: Option<String>,
    expected_by_month: Option<u32>,
    age_equivalent_months: Option<f64>,
    concern_if_missing_by_month: u32,
    red_flag: bool,
    category: MilestoneCategory,
    display_order: u32,
    ordering_age: f64,
}

impl Milestone {
    #[must_use]
    pub fn id(&self) -> MilestoneId {
        self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn expected_by_month(&self) -> Option<u32> {
        self.expected_by_month
    }

    #[must_use]
    pub fn age_equivalent_months(&self) -> Option<f64> {
        self.age_equivalent_months
    }

    #[must_use]
    pub fn concern_if_missing_by_month(&self) -> u32 {
        self.concern_if_missing_by_month
    }

    #[must_use]
    pub fn red_flag(&self) -> bool {
        self.red_flag
    }

    #[must_use]
    pub fn category(&self) -> MilestoneCategory {
        self.category
    }

    #[must_use]
    pub fn display_order(&self) -> u32 {
        self.display_order
    }

    /// The months value this milestone is scored and ordered by:
    /// `age_equivalent_months`, falling back to `expected_by_month`.
    #[must_use]
    pub fn ordering_age(&self) -> f64 {
        self.ordering_age
    }

    /// The months value traversal initialization compares the chronological
    /// age against: `expected_by_month`, falling back to the ordering age.
    #[must_use]
    pub fn start_reference_month(&self) -> f64 {
        self.expected_by_month
            .map_or(self.ordering_age, f64::from)
    }

    /// Converts back into a draft, e.g. for persistence.
    #[must_use]
    pub fn to_draft(&self) -> MilestoneDraft {
        MilestoneDraft {
            id: self.id,
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            expected_by_month: self.expected_by_month,
            age_equivalent_months: self.age_equivalent_months,
            concern_if_missing_by_month: self.concern_if_missing_by_month,
            red_flag: self.red_flag,
            category: self.category,
            display_order: self.display_order,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: u64) -> MilestoneDraft {
        MilestoneDraft {
            id: MilestoneId::new(id),
            display_name: format!("Milestone {id}"),
            description: None,
            expected_by_month: Some(9),
            age_equivalent_months: Some(8.5),
            concern_if_missing_by_month: 12,
            red_flag: false,
            category: MilestoneCategory::Locomotion,
            display_order: 1,
        }
    }

    #[test]
    fn validate_accepts_complete_draft() {
        let milestone = draft(1).validate().unwrap();
        assert_eq!(milestone.id(), MilestoneId::new(1));
        assert_eq!(milestone.ordering_age(), 8.5);
        assert_eq!(milestone.start_reference_month(), 9.0);
    }

    #[test]
    fn ordering_age_falls_back_to_expected_month() {
        let mut d = draft(2);
        d.age_equivalent_months = None;
        let milestone = d.validate().unwrap();
        assert_eq!(milestone.ordering_age(), 9.0);
    }

    #[test]
    fn start_reference_falls_back_to_ordering_age() {
        let mut d = draft(3);
        d.expected_by_month = None;
        let milestone = d.validate().unwrap();
        assert_eq!(milestone.start_reference_month(), 8.5);
    }

    #[test]
    fn blank_display_name_is_rejected() {
        let mut d = draft(4);
        d.display_name = "   ".into();
        let err = d.validate().unwrap_err();
        assert!(matches!(err, MilestoneError::EmptyDisplayName { .. }));
    }

    #[test]
    fn missing_both_age_fields_is_unorderable() {
        let mut d = draft(5);
        d.expected_by_month = None;
        d.age_equivalent_months = None;
        let err = d.validate().unwrap_err();
        assert!(matches!(
            err,
            MilestoneError::Unorderable { id } if id == MilestoneId::new(5)
        ));
    }

    #[test]
    fn non_finite_age_equivalent_is_rejected() {
        let mut d = draft(6);
        d.age_equivalent_months = Some(f64::NAN);
        let err = d.validate().unwrap_err();
        assert!(matches!(err, MilestoneError::InvalidAgeEquivalent { .. }));
    }

    #[test]
    fn category_string_codes_round_trip() {
        for category in MilestoneCategory::ALL {
            assert_eq!(
                category.as_str().parse::<MilestoneCategory>().unwrap(),
                category
            );
        }
        assert!("fine_motor".parse::<MilestoneCategory>().is_err());
    }

    #[test]
    fn to_draft_round_trips() {
        let milestone = draft(7).validate().unwrap();
        let rebuilt = milestone.to_draft().validate().unwrap();
        assert_eq!(rebuilt, milestone);
    }
}
