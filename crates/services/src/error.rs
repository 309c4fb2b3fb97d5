//! Shared error types for the services crate.

use thiserror::Error;

use screening_core::model::{AgeError, CatalogError, ScreeningRecordError};
use screening_core::scoring::ScoringError;
use screening_core::traversal::TraversalError;
use storage::repository::StorageError;

/// Errors emitted by screening services.
///
/// Catalog and age faults surface here before any question is asked; once a
/// session runs, every submitted response is valid by construction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScreeningError {
    #[error("screening already completed")]
    Completed,
    #[error(transparent)]
    InvalidCatalog(#[from] CatalogError),
    #[error(transparent)]
    InvalidAge(#[from] AgeError),
    #[error(transparent)]
    Traversal(#[from] TraversalError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Record(#[from] ScreeningRecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
