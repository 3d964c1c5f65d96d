// src/repositories/postgres.rs - Durable link store
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error};
use sqlx::{PgPool, Postgres, Transaction};

use super::{LinkRepository, Result};
use crate::db::{Database, StorageHealth};
use crate::errors::RepositoryError;
use crate::models::{ClickSummary, NewClickEvent, NewShortLink, ShortLink};

const LINK_COLUMNS: &str = "code, original_url, created_at, expires_at, click_count, is_custom_code";

pub struct PgLinkRepository {
    db: Database,
}

impl PgLinkRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn pool(&self) -> &PgPool {
        self.db.get_pool()
    }

    // Helper method for transactions
    async fn begin_transaction(&self) -> Result<Transaction<'_, Postgres>> {
        self.pool().begin().await.map_err(|e| {
            error!("Failed to start database transaction: {}", e);
            RepositoryError::Database(e)
        })
    }

    async fn commit(tx: Transaction<'_, Postgres>) -> Result<()> {
        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            RepositoryError::Database(e)
        })
    }
}

fn not_found(code: &str) -> RepositoryError {
    RepositoryError::NotFound(format!("Short link '{}' not found", code))
}

/// `ON CONFLICT DO NOTHING` returns no row when the code is taken
fn inserted_or_conflict(record: Option<ShortLink>, code: &str) -> Result<ShortLink> {
    record.ok_or_else(|| RepositoryError::Conflict(format!("Code '{}' is already taken", code)))
}

/// Bind value for `LIMIT $n`: NULL keeps every row, oversized limits saturate
fn limit_param(limit: Option<usize>) -> Option<i64> {
    limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX))
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, link: NewShortLink) -> Result<ShortLink> {
        let sql = format!(
            "INSERT INTO short_links (code, original_url, expires_at, is_custom_code)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (code) DO NOTHING
             RETURNING {}",
            LINK_COLUMNS
        );

        let record = sqlx::query_as::<_, ShortLink>(&sql)
            .bind(&link.code)
            .bind(&link.original_url)
            .bind(link.expires_at)
            .bind(link.is_custom_code)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert short link: {}", e);
                RepositoryError::from(e)
            })?;

        inserted_or_conflict(record, &link.code)
    }

    async fn get(&self, code: &str) -> Result<ShortLink> {
        let sql = format!("SELECT {} FROM short_links WHERE code = $1", LINK_COLUMNS);

        sqlx::query_as::<_, ShortLink>(&sql)
            .bind(code)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| not_found(code))
    }

    async fn exists(&self, code: &str) -> Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM short_links WHERE code = $1)")
                .bind(code)
                .fetch_one(self.pool())
                .await?;
        Ok(exists)
    }

    async fn increment_clicks(&self, code: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE short_links SET click_count = click_count + 1 WHERE code = $1 RETURNING click_count",
        )
        .bind(code)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| not_found(code))
    }

    async fn append_click(&self, event: NewClickEvent) -> Result<i64> {
        let mut tx = self.begin_transaction().await?;

        // The UPDATE takes the row lock, so concurrent clicks on one code serialise here
        let click_count = sqlx::query_scalar::<_, i64>(
            "UPDATE short_links SET click_count = click_count + 1 WHERE code = $1 RETURNING click_count",
        )
        .bind(&event.code)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found(&event.code))?;

        sqlx::query("INSERT INTO click_events (code, clicked_at, source_ip) VALUES ($1, $2, $3)")
            .bind(&event.code)
            .bind(event.timestamp)
            .bind(&event.source_ip)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to append click for '{}': {}", event.code, e);
                RepositoryError::from(e)
            })?;

        Self::commit(tx).await?;
        debug!("Recorded click #{} for '{}'", click_count, event.code);

        Ok(click_count)
    }

    async fn click_summary(&self, code: &str, limit: Option<usize>) -> Result<ClickSummary> {
        let mut tx = self.begin_transaction().await?;

        // Counter and events must come from the same snapshot
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let click_count =
            sqlx::query_scalar::<_, i64>("SELECT click_count FROM short_links WHERE code = $1")
                .bind(code)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| not_found(code))?;

        let source_ips = sqlx::query_scalar::<_, String>(
            "SELECT source_ip FROM click_events
             WHERE code = $1
             ORDER BY clicked_at DESC, id DESC
             LIMIT $2",
        )
        .bind(code)
        .bind(limit_param(limit))
        .fetch_all(&mut *tx)
        .await?;

        Self::commit(tx).await?;

        Ok(ClickSummary {
            click_count,
            source_ips,
        })
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64> {
        // click_events rows go with their link (ON DELETE CASCADE)
        let result = sqlx::query(
            "DELETE FROM short_links WHERE expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(before)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }

    async fn health(&self) -> StorageHealth {
        self.db.health_check().await
    }
}
