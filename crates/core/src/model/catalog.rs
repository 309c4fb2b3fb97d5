use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::MilestoneId;
use crate::model::milestone::{Milestone, MilestoneDraft, MilestoneError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Faults in a milestone catalog supplied by a collaborator.
///
/// All of these are checked once, before a session starts; the engine refuses
/// to traverse an invalid catalog.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("milestone catalog is empty")]
    Empty,

    #[error("milestone catalog contains duplicate id {id}")]
    DuplicateId { id: MilestoneId },

    #[error(transparent)]
    Milestone(#[from] MilestoneError),
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Immutable, validated, totally ordered snapshot of a milestone set.
///
/// Items are sorted ascending by ordering age (age equivalent, falling back
/// to expected-by month), ties broken by display order then id. Sessions
/// take this snapshot at creation and the order never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneCatalog {
    milestones: Vec<Milestone>,
}

impl MilestoneCatalog {
    /// Builds a catalog from already-validated milestones.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty input and
    /// `CatalogError::DuplicateId` on the first duplicate id found. Duplicate
    /// ids are a data-integrity fault on the catalog supplier's side; the
    /// engine fails fast instead of overwriting or skipping entries.
    pub fn from_milestones(mut milestones: Vec<Milestone>) -> Result<Self, CatalogError> {
        if milestones.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(milestones.len());
        for milestone in &milestones {
            if !seen.insert(milestone.id()) {
                return Err(CatalogError::DuplicateId {
                    id: milestone.id(),
                });
            }
        }

        milestones.sort_by(|a, b| {
            a.ordering_age()
                .total_cmp(&b.ordering_age())
                .then_with(|| a.display_order().cmp(&b.display_order()))
                .then_with(|| a.id().value().cmp(&b.id().value()))
        });

        Ok(Self { milestones })
    }

    /// Validates raw collaborator drafts and builds a catalog from them.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Milestone` for any item that fails validation
    /// (blank name, unorderable, invalid age equivalent), plus the
    /// `from_milestones` faults.
    pub fn from_drafts(drafts: Vec<MilestoneDraft>) -> Result<Self, CatalogError> {
        let milestones = drafts
            .into_iter()
            .map(MilestoneDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_milestones(milestones)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    /// A validated catalog is never empty; kept for iterator-style call sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Milestone> {
        self.milestones.get(index)
    }

    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    #[must_use]
    pub fn find(&self, id: MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id() == id)
    }

    #[must_use]
    pub fn index_of(&self, id: MilestoneId) -> Option<usize> {
        self.milestones.iter().position(|m| m.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Milestone> {
        self.milestones.iter()
    }
}

impl<'a> IntoIterator for &'a MilestoneCatalog {
    type Item = &'a Milestone;
    type IntoIter = std::slice::Iter<'a, Milestone>;

    fn into_iter(self) -> Self::IntoIter {
        self.milestones.iter()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::milestone::MilestoneCategory;

    fn draft(id: u64, age: f64, display_order: u32) -> MilestoneDraft {
        MilestoneDraft {
            id: MilestoneId::new(id),
            display_name: format!("Milestone {id}"),
            description: None,
            expected_by_month: Some(age.ceil() as u32),
            age_equivalent_months: Some(age),
            concern_if_missing_by_month: age.ceil() as u32 + 3,
            red_flag: false,
            category: MilestoneCategory::Locomotion,
            display_order,
        }
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = MilestoneCatalog::from_drafts(Vec::new()).unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn duplicate_ids_fail_fast() {
        let err =
            MilestoneCatalog::from_drafts(vec![draft(1, 6.0, 0), draft(1, 9.0, 1)]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateId { id } if id == MilestoneId::new(1)
        ));
    }

    #[test]
    fn sorts_by_ordering_age_then_display_order() {
        let catalog = MilestoneCatalog::from_drafts(vec![
            draft(1, 12.0, 1),
            draft(2, 6.0, 0),
            draft(3, 12.0, 0),
            draft(4, 9.0, 0),
        ])
        .unwrap();

        let ids: Vec<u64> = catalog.iter().map(|m| m.id().value()).collect();
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    #[test]
    fn order_falls_back_to_expected_month() {
        let mut without_equivalent = draft(2, 7.0, 0);
        without_equivalent.age_equivalent_months = None;
        without_equivalent.expected_by_month = Some(7);

        let catalog =
            MilestoneCatalog::from_drafts(vec![draft(1, 9.0, 0), without_equivalent]).unwrap();

        assert_eq!(catalog.get(0).unwrap().id(), MilestoneId::new(2));
        assert_eq!(catalog.get(1).unwrap().id(), MilestoneId::new(1));
    }

    #[test]
    fn unorderable_draft_surfaces_as_catalog_fault() {
        let mut bad = draft(9, 6.0, 0);
        bad.expected_by_month = None;
        bad.age_equivalent_months = None;

        let err = MilestoneCatalog::from_drafts(vec![draft(1, 6.0, 0), bad]).unwrap_err();
        assert!(matches!(err, CatalogError::Milestone(_)));
    }

    #[test]
    fn lookup_by_id_works() {
        let catalog =
            MilestoneCatalog::from_drafts(vec![draft(1, 6.0, 0), draft(2, 9.0, 0)]).unwrap();
        assert_eq!(catalog.find(MilestoneId::new(2)).unwrap().ordering_age(), 9.0);
        assert_eq!(catalog.index_of(MilestoneId::new(2)), Some(1));
        assert!(catalog.find(MilestoneId::new(3)).is_none());
    }
}
