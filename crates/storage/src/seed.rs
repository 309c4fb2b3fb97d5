//! Built-in gross-motor milestone catalog.
//!
//! The screening engine treats the catalog as collaborator-supplied data;
//! this module is the application's default supply, loaded on first run and
//! by the `seed` binary.

use screening_core::model::{MilestoneCategory, MilestoneDraft, MilestoneId};

struct SeedMilestone {
    name: &'static str,
    description: Option<&'static str>,
    expected_by_month: u32,
    age_equivalent_months: f64,
    concern_if_missing_by_month: u32,
    red_flag: bool,
    category: MilestoneCategory,
}

const SEED_MILESTONES: &[SeedMilestone] = &[
    SeedMilestone {
        name: "Grasps a finger placed in the palm",
        description: Some("Closes the fingers around a caregiver's finger"),
        expected_by_month: 1,
        age_equivalent_months: 0.5,
        concern_if_missing_by_month: 2,
        red_flag: true,
        category: MilestoneCategory::Reflexes,
    },
    SeedMilestone {
        name: "Turns head to both sides while on back",
        description: None,
        expected_by_month: 2,
        age_equivalent_months: 1.0,
        concern_if_missing_by_month: 3,
        red_flag: false,
        category: MilestoneCategory::Reflexes,
    },
    SeedMilestone {
        name: "Pushes up on forearms during tummy time",
        description: Some("Lifts head and chest while lying on the stomach"),
        expected_by_month: 3,
        age_equivalent_months: 2.5,
        concern_if_missing_by_month: 4,
        red_flag: false,
        category: MilestoneCategory::Stationary,
    },
    SeedMilestone {
        name: "Holds head steady when held upright",
        description: None,
        expected_by_month: 4,
        age_equivalent_months: 3.0,
        concern_if_missing_by_month: 5,
        red_flag: true,
        category: MilestoneCategory::Stationary,
    },
    SeedMilestone {
        name: "Reaches for a toy with one hand",
        description: None,
        expected_by_month: 5,
        age_equivalent_months: 4.0,
        concern_if_missing_by_month: 6,
        red_flag: false,
        category: MilestoneCategory::ObjectManipulation,
    },
    SeedMilestone {
        name: "Rolls from tummy to back",
        description: None,
        expected_by_month: 5,
        age_equivalent_months: 4.5,
        concern_if_missing_by_month: 7,
        red_flag: false,
        category: MilestoneCategory::Locomotion,
    },
    SeedMilestone {
        name: "Passes a toy from hand to hand",
        description: None,
        expected_by_month: 7,
        age_equivalent_months: 6.0,
        concern_if_missing_by_month: 9,
        red_flag: false,
        category: MilestoneCategory::ObjectManipulation,
    },
    SeedMilestone {
        name: "Sits without support",
        description: Some("Stays sitting on the floor without propping on hands"),
        expected_by_month: 7,
        age_equivalent_months: 6.5,
        concern_if_missing_by_month: 9,
        red_flag: true,
        category: MilestoneCategory::Stationary,
    },
    SeedMilestone {
        name: "Rakes small objects toward self",
        description: None,
        expected_by_month: 8,
        age_equivalent_months: 7.5,
        concern_if_missing_by_month: 10,
        red_flag: false,
        category: MilestoneCategory::ObjectManipulation,
    },
    SeedMilestone {
        name: "Crawls on hands and knees",
        description: None,
        expected_by_month: 10,
        age_equivalent_months: 8.5,
        concern_if_missing_by_month: 12,
        red_flag: false,
        category: MilestoneCategory::Locomotion,
    },
    SeedMilestone {
        name: "Pulls to stand at furniture",
        description: None,
        expected_by_month: 10,
        age_equivalent_months: 9.0,
        concern_if_missing_by_month: 12,
        red_flag: false,
        category: MilestoneCategory::Locomotion,
    },
    SeedMilestone {
        name: "Picks up small items with thumb and finger",
        description: Some("Pincer grasp on cereal-sized pieces"),
        expected_by_month: 10,
        age_equivalent_months: 9.5,
        concern_if_missing_by_month: 12,
        red_flag: false,
        category: MilestoneCategory::ObjectManipulation,
    },
    SeedMilestone {
        name: "Cruises along furniture",
        description: None,
        expected_by_month: 12,
        age_equivalent_months: 11.0,
        concern_if_missing_by_month: 14,
        red_flag: false,
        category: MilestoneCategory::Locomotion,
    },
    SeedMilestone {
        name: "Stands alone for a few seconds",
        description: None,
        expected_by_month: 13,
        age_equivalent_months: 12.0,
        concern_if_missing_by_month: 15,
        red_flag: false,
        category: MilestoneCategory::Stationary,
    },
    SeedMilestone {
        name: "Walks several steps alone",
        description: None,
        expected_by_month: 14,
        age_equivalent_months: 13.0,
        concern_if_missing_by_month: 18,
        red_flag: true,
        category: MilestoneCategory::Locomotion,
    },
    SeedMilestone {
        name: "Stacks two blocks",
        description: None,
        expected_by_month: 16,
        age_equivalent_months: 15.0,
        concern_if_missing_by_month: 20,
        red_flag: false,
        category: MilestoneCategory::ObjectManipulation,
    },
    SeedMilestone {
        name: "Walks up steps with a hand held",
        description: None,
        expected_by_month: 20,
        age_equivalent_months: 18.0,
        concern_if_missing_by_month: 24,
        red_flag: false,
        category: MilestoneCategory::Locomotion,
    },
    SeedMilestone {
        name: "Kicks a ball forward",
        description: None,
        expected_by_month: 24,
        age_equivalent_months: 21.0,
        concern_if_missing_by_month: 30,
        red_flag: false,
        category: MilestoneCategory::Locomotion,
    },
    SeedMilestone {
        name: "Jumps with both feet off the floor",
        description: None,
        expected_by_month: 30,
        age_equivalent_months: 27.0,
        concern_if_missing_by_month: 36,
        red_flag: false,
        category: MilestoneCategory::Locomotion,
    },
    SeedMilestone {
        name: "Stands briefly on one foot",
        description: None,
        expected_by_month: 36,
        age_equivalent_months: 33.0,
        concern_if_missing_by_month: 42,
        red_flag: false,
        category: MilestoneCategory::Stationary,
    },
    SeedMilestone {
        name: "Pedals a tricycle",
        description: None,
        expected_by_month: 38,
        age_equivalent_months: 36.0,
        concern_if_missing_by_month: 48,
        red_flag: false,
        category: MilestoneCategory::Locomotion,
    },
    SeedMilestone {
        name: "Throws a ball overhand",
        description: None,
        expected_by_month: 42,
        age_equivalent_months: 40.0,
        concern_if_missing_by_month: 48,
        red_flag: false,
        category: MilestoneCategory::ObjectManipulation,
    },
    SeedMilestone {
        name: "Hops on one foot several times",
        description: None,
        expected_by_month: 48,
        age_equivalent_months: 45.0,
        concern_if_missing_by_month: 54,
        red_flag: false,
        category: MilestoneCategory::Locomotion,
    },
    SeedMilestone {
        name: "Catches a large bounced ball",
        description: None,
        expected_by_month: 54,
        age_equivalent_months: 50.0,
        concern_if_missing_by_month: 60,
        red_flag: false,
        category: MilestoneCategory::ObjectManipulation,
    },
];

/// The default catalog as raw drafts, ids and display order assigned by
/// position.
#[must_use]
pub fn default_milestones() -> Vec<MilestoneDraft> {
    SEED_MILESTONES
        .iter()
        .enumerate()
        .map(|(index, seed)| MilestoneDraft {
            id: MilestoneId::new(index as u64 + 1),
            display_name: seed.name.to_string(),
            description: seed.description.map(ToString::to_string),
            expected_by_month: Some(seed.expected_by_month),
            age_equivalent_months: Some(seed.age_equivalent_months),
            concern_if_missing_by_month: seed.concern_if_missing_by_month,
            red_flag: seed.red_flag,
            category: seed.category,
            display_order: index as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use screening_core::model::MilestoneCatalog;

    #[test]
    fn default_catalog_validates() {
        let catalog = MilestoneCatalog::from_drafts(default_milestones()).unwrap();
        assert_eq!(catalog.len(), SEED_MILESTONES.len());
    }

    #[test]
    fn default_catalog_is_age_ordered() {
        let catalog = MilestoneCatalog::from_drafts(default_milestones()).unwrap();
        let ages: Vec<f64> = catalog.iter().map(|m| m.ordering_age()).collect();
        let mut sorted = ages.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(ages, sorted);
    }

    #[test]
    fn default_catalog_covers_every_category() {
        let catalog = MilestoneCatalog::from_drafts(default_milestones()).unwrap();
        for category in MilestoneCategory::ALL {
            assert!(catalog.iter().any(|m| m.category() == category));
        }
    }
}
