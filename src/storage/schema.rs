use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::{SavedItem, SavedItemRow, StoreError};

// ============================================================================
// Database
// ============================================================================

/// Read-only view of memory_jogger's SQLite database.
///
/// Schema and writes belong to memory_jogger; this side only samples items.
#[derive(Debug, Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open the database at `database_url` (`sqlite://path`, `sqlite:path`
    /// or a bare path) in read-only mode.
    pub async fn open(database_url: &str) -> Result<Self, StoreError> {
        let url = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite:{database_url}")
        };

        // busy_timeout=5000: memory_jogger may be writing while we read
        let options = SqliteConnectOptions::from_str(&url)?
            .read_only(true)
            .pragma("busy_timeout", "5000");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;
        tracing::debug!("Opened saved-item database");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// One saved item picked uniformly at random.
    ///
    /// Items without a URL or added time are never picked.
    pub async fn random_item(&self) -> Result<SavedItem, StoreError> {
        let row = sqlx::query_as::<_, SavedItemRow>(
            r#"
            SELECT id, title, excerpt, url, CAST(time_added AS TEXT) AS time_added
            FROM saved_items
            WHERE url IS NOT NULL AND time_added IS NOT NULL
            ORDER BY RANDOM()
            LIMIT 1
        "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::Empty)?.into_item()
    }
}
