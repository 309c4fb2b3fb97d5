use thiserror::Error;

use crate::model::{
    AgeError, AssessmentResultError, CatalogError, MilestoneError, ResponseError,
    ScreeningRecordError,
};
use crate::scoring::ScoringError;
use crate::traversal::TraversalError;

/// Crate-level error aggregating the per-module faults.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Age(#[from] AgeError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Milestone(#[from] MilestoneError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error(transparent)]
    Record(#[from] ScreeningRecordError),
    #[error(transparent)]
    Result(#[from] AssessmentResultError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Traversal(#[from] TraversalError),
}
