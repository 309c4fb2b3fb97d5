use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema (milestone catalog, screening history, indexes).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS milestones (
                    id INTEGER PRIMARY KEY,
                    display_name TEXT NOT NULL,
                    description TEXT,
                    expected_by_month INTEGER CHECK (expected_by_month >= 0),
                    age_equivalent_months REAL CHECK (age_equivalent_months >= 0),
                    concern_if_missing_by_month INTEGER NOT NULL CHECK (concern_if_missing_by_month >= 0),
                    red_flag INTEGER NOT NULL CHECK (red_flag IN (0, 1)),
                    category TEXT NOT NULL,
                    display_order INTEGER NOT NULL CHECK (display_order >= 0)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS screenings (
                    id INTEGER PRIMARY KEY,
                    screening_uuid TEXT NOT NULL UNIQUE,
                    chronological_age_months REAL NOT NULL CHECK (chronological_age_months >= 0),
                    age_equivalent_months REAL NOT NULL CHECK (age_equivalent_months >= 0),
                    raw_score INTEGER NOT NULL CHECK (raw_score >= 0),
                    max_score INTEGER NOT NULL CHECK (max_score >= raw_score),
                    category_scores TEXT NOT NULL,
                    answers TEXT NOT NULL,
                    started_at TEXT NOT NULL,
                    completed_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_milestones_display_order
                    ON milestones (display_order, id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_screenings_completed
                    ON screenings (completed_at, id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
