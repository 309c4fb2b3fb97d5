use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a Milestone
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MilestoneId(u64);

impl MilestoneId {
    /// Creates a new `MilestoneId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for MilestoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MilestoneId({})", self.0)
    }
}

impl fmt::Display for MilestoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a completed screening.
///
/// Generated once per terminal session; collaborators key their append-only
/// history writes on it so re-delivery of the same record stays idempotent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreeningId(Uuid);

impl ScreeningId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for ScreeningId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScreeningId({})", self.0)
    }
}

impl fmt::Display for ScreeningId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for MilestoneId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(MilestoneId::new)
            .map_err(|_| ParseIdError {
                kind: "MilestoneId".to_string(),
            })
    }
}

impl FromStr for ScreeningId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Uuid>()
            .map(ScreeningId::from_uuid)
            .map_err(|_| ParseIdError {
                kind: "ScreeningId".to_string(),
            })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_id_display() {
        let id = MilestoneId::new(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn milestone_id_from_str() {
        let id: MilestoneId = "123".parse().unwrap();
        assert_eq!(id, MilestoneId::new(123));
    }

    #[test]
    fn milestone_id_from_str_invalid() {
        let result = "not-a-number".parse::<MilestoneId>();
        assert!(result.is_err());
    }

    #[test]
    fn screening_id_round_trips_through_string() {
        let original = ScreeningId::generate();
        let parsed: ScreeningId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn screening_id_from_str_invalid() {
        let result = "definitely-not-a-uuid".parse::<ScreeningId>();
        assert!(result.is_err());
    }

    #[test]
    fn generated_screening_ids_are_distinct() {
        assert_ne!(ScreeningId::generate(), ScreeningId::generate());
    }
}
