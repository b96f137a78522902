use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use thiserror::Error;

use crate::config::LedgerSettings;
use crate::models::{LedgerEntry, Listing};

/// Errors that can occur when interacting with the ledger database
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// Durable record of listings that have already been notified
///
/// Keyed by listing id. Entries are inserted once and never updated, so
/// the score and time of the first notification stay on record until the
/// expiry sweep removes them. Every statement commits on its own.
pub struct Ledger {
    pool: SqlitePool,
}

impl Ledger {
    /// Open (creating if needed) the ledger database at `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, LedgerError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::migrate(pool).await
    }

    /// Open a private in-memory ledger, gone once closed
    pub async fn in_memory() -> Result<Self, LedgerError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // A single connection that never gets recycled, otherwise the
        // in-memory database would vanish with it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::migrate(pool).await
    }

    /// Open the ledger from settings
    pub async fn from_settings(settings: &LedgerSettings) -> Result<Self, LedgerError> {
        tracing::debug!("Opening ledger at {}", settings.url);
        Self::connect(&settings.url, settings.max_connections.unwrap_or(1)).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, LedgerError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Whether a listing id has ever been recorded
    pub async fn exists(&self, id: &str) -> Result<bool, LedgerError> {
        let row = sqlx::query("SELECT 1 FROM notified_listings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Record a notified listing at the current time
    ///
    /// Returns `false` without touching the existing entry when the id is
    /// already present.
    pub async fn record(&self, listing: &Listing, score: f64) -> Result<bool, LedgerError> {
        self.record_at(listing, score, Utc::now()).await
    }

    /// Record a notified listing with an explicit notification time
    pub async fn record_at(
        &self,
        listing: &Listing,
        score: f64,
        notified_at: DateTime<Utc>,
    ) -> Result<bool, LedgerError> {
        let query = r#"
            INSERT OR IGNORE INTO notified_listings (id, title, company, url, score, notified_at)
            VALUES (?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(&listing.id)
            .bind(&listing.title)
            .bind(&listing.company)
            .bind(&listing.url)
            .bind(score)
            .bind(notified_at)
            .execute(&self.pool)
            .await?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            tracing::info!(
                "Stored job: {} at {} (score: {:.1}%)",
                listing.title,
                listing.company,
                score
            );
        } else {
            tracing::debug!("Job {} already recorded, keeping original entry", listing.id);
        }

        Ok(inserted)
    }

    /// Delete entries notified more than `retention_days` ago
    ///
    /// Safe to call every cycle. Returns the number of entries removed.
    pub async fn expire(&self, retention_days: u32) -> Result<u64, LedgerError> {
        let cutoff = Utc::now() - ChronoDuration::days(i64::from(retention_days));
        let removed = self.expire_before(cutoff).await?;

        tracing::debug!("Cleaned up {} jobs older than {} days", removed, retention_days);
        Ok(removed)
    }

    /// Delete entries notified strictly before `cutoff`
    pub async fn expire_before(&self, cutoff: DateTime<Utc>) -> Result<u64, LedgerError> {
        let result = sqlx::query(
            "DELETE FROM notified_listings WHERE julianday(notified_at) < julianday(?)",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Fetch a single entry by listing id
    pub async fn get(&self, id: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        let query = r#"
            SELECT id, title, company, url, score, notified_at
            FROM notified_listings
            WHERE id = ?
        "#;

        let row = sqlx::query(query).bind(id).fetch_optional(&self.pool).await?;

        row.map(|row| entry_from_row(&row)).transpose()
    }

    /// Most recently notified entries, newest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<LedgerEntry>, LedgerError> {
        let query = r#"
            SELECT id, title, company, url, score, notified_at
            FROM notified_listings
            ORDER BY julianday(notified_at) DESC
            LIMIT ?
        "#;

        let rows = sqlx::query(query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(entry_from_row).collect()
    }

    /// Number of entries currently held
    pub async fn count(&self) -> Result<i64, LedgerError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM notified_listings")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("total")?)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, LedgerError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    /// Release the underlying connections
    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<LedgerEntry, LedgerError> {
    Ok(LedgerEntry {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        company: row.try_get("company")?,
        url: row.try_get("url")?,
        score: row.try_get("score")?,
        notified_at: row.try_get("notified_at")?,
    })
}
