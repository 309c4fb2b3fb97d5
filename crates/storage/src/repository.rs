use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use screening_core::model::{MilestoneDraft, ScreeningRecord};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted screening record together with its storage row id.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningRow {
    pub id: i64,
    pub record: ScreeningRecord,
}

impl ScreeningRow {
    #[must_use]
    pub fn new(id: i64, record: ScreeningRecord) -> Self {
        Self { id, record }
    }
}

/// Repository contract for the milestone catalog.
///
/// The catalog is supplied and owned by the surrounding application; the
/// engine receives it through this seam instead of a process-wide cache.
/// Raw drafts are returned on purpose: validation and ordering happen once,
/// at session start, so catalog faults surface to the caller there.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Fetch every milestone definition.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be loaded.
    async fn fetch_milestones(&self) -> Result<Vec<MilestoneDraft>, StorageError>;

    /// Replace the stored catalog wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be stored.
    async fn replace_milestones(&self, drafts: &[MilestoneDraft]) -> Result<(), StorageError>;
}

/// Repository contract for the append-only screening history.
#[async_trait]
pub trait ScreeningHistoryRepository: Send + Sync {
    /// Append a completed screening, returning its row id.
    ///
    /// Idempotent on the record's `ScreeningId`: re-appending the same
    /// record returns the existing row id instead of duplicating it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_record(&self, record: &ScreeningRecord) -> Result<i64, StorageError>;

    /// Fetch a screening record by row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_record(&self, id: i64) -> Result<ScreeningRecord, StorageError>;

    /// List records, most recently completed first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_record_rows(
        &self,
        completed_from: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<ScreeningRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    milestones: Arc<Mutex<Vec<MilestoneDraft>>>,
    screenings: Arc<Mutex<Vec<ScreeningRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn fetch_milestones(&self) -> Result<Vec<MilestoneDraft>, StorageError> {
        let guard = self
            .milestones
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn replace_milestones(&self, drafts: &[MilestoneDraft]) -> Result<(), StorageError> {
        let mut guard = self
            .milestones
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = drafts.to_vec();
        Ok(())
    }
}

#[async_trait]
impl ScreeningHistoryRepository for InMemoryRepository {
    async fn append_record(&self, record: &ScreeningRecord) -> Result<i64, StorageError> {
        let mut guard = self
            .screenings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if let Some(existing) = guard.iter().find(|row| row.record.id() == record.id()) {
            return Ok(existing.id);
        }

        let id = guard.last().map_or(1, |row| row.id + 1);
        guard.push(ScreeningRow::new(id, record.clone()));
        Ok(id)
    }

    async fn get_record(&self, id: i64) -> Result<ScreeningRecord, StorageError> {
        let guard = self
            .screenings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.record.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_record_rows(
        &self,
        completed_from: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<ScreeningRow>, StorageError> {
        let guard = self
            .screenings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut rows: Vec<ScreeningRow> = guard
            .iter()
            .filter(|row| {
                completed_from.is_none_or(|from| row.record.completed_at() >= from)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.record
                .completed_at()
                .cmp(&a.record.completed_at())
                .then_with(|| b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

/// Aggregates the catalog and history repositories behind trait objects for
/// easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn CatalogRepository>,
    pub screenings: Arc<dyn ScreeningHistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo.clone());
        let screenings: Arc<dyn ScreeningHistoryRepository> = Arc::new(repo);
        Self {
            catalog,
            screenings,
        }
    }
}
