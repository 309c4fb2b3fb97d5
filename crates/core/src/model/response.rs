use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::MilestoneId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while translating caregiver responses at the boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("invalid response value: {0:?}")]
    InvalidResponse(String),

    #[error("invalid response point value: {0}")]
    InvalidPoints(u32),
}

//
// ─── RESPONSE ─────────────────────────────────────────────────────────────────
//

/// Closed three-value caregiver answer to a milestone question.
///
/// Traversal collapses `Sometimes` and `NotYet` into "fail"; scoring keeps
/// them distinct:
/// - `Yes`: skill mastered (2 points)
/// - `Sometimes`: skill emerging (1 point)
/// - `NotYet`: skill not present (0 points)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Yes,
    Sometimes,
    NotYet,
}

impl Response {
    /// Points contributed to the raw score.
    #[must_use]
    pub fn points(self) -> u32 {
        match self {
            Response::Yes => 2,
            Response::Sometimes => 1,
            Response::NotYet => 0,
        }
    }

    /// Whether the traversal engine treats this answer as a pass.
    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Response::Yes)
    }

    /// Translates the numeric point encoding used by older collaborators.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::InvalidPoints` if the value is not 0, 1, or 2.
    pub fn from_points(value: u32) -> Result<Self, ResponseError> {
        match value {
            2 => Ok(Self::Yes),
            1 => Ok(Self::Sometimes),
            0 => Ok(Self::NotYet),
            other => Err(ResponseError::InvalidPoints(other)),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Response::Yes => "yes",
            Response::Sometimes => "sometimes",
            Response::NotYet => "not_yet",
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Response {
    type Err = ResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "sometimes" => Ok(Self::Sometimes),
            "not_yet" => Ok(Self::NotYet),
            other => Err(ResponseError::InvalidResponse(other.to_string())),
        }
    }
}

//
// ─── RECORDED ANSWER ──────────────────────────────────────────────────────────
//

/// One presented-and-answered milestone within a session.
///
/// Sessions and results keep these in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedAnswer {
    pub milestone_id: MilestoneId,
    pub response: Response,
}

impl RecordedAnswer {
    #[must_use]
    pub fn new(milestone_id: MilestoneId, response: Response) -> Self {
        Self {
            milestone_id,
            response,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_mapping_is_correct() {
        assert_eq!(Response::Yes.points(), 2);
        assert_eq!(Response::Sometimes.points(), 1);
        assert_eq!(Response::NotYet.points(), 0);
    }

    #[test]
    fn only_yes_counts_as_pass() {
        assert!(Response::Yes.is_pass());
        assert!(!Response::Sometimes.is_pass());
        assert!(!Response::NotYet.is_pass());
    }

    #[test]
    fn numeric_translation_round_trips() {
        for response in [Response::Yes, Response::Sometimes, Response::NotYet] {
            assert_eq!(Response::from_points(response.points()).unwrap(), response);
        }
        let err = Response::from_points(3).unwrap_err();
        assert!(matches!(err, ResponseError::InvalidPoints(3)));
    }

    #[test]
    fn string_translation_round_trips() {
        for response in [Response::Yes, Response::Sometimes, Response::NotYet] {
            assert_eq!(response.as_str().parse::<Response>().unwrap(), response);
        }
        let err = "maybe".parse::<Response>().unwrap_err();
        assert!(matches!(err, ResponseError::InvalidResponse(_)));
    }

    #[test]
    fn recorded_answer_creation_works() {
        let answer = RecordedAnswer::new(MilestoneId::new(7), Response::Sometimes);
        assert_eq!(answer.milestone_id, MilestoneId::new(7));
        assert_eq!(answer.response, Response::Sometimes);
    }
}
