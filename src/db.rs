use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use sqlx::migrate::MigrateDatabase;
use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    FromRow, Postgres,
};
use thiserror::Error;

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    #[error("Failed to create database: {0}")]
    DatabaseCreationFailed(String),
}

pub type DbResult<T> = Result<T, DatabaseError>;

/// Represents an established database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// Storage health status
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

/// Database information
#[derive(Debug, Clone, Deserialize, Serialize, FromRow)]
pub struct DbInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Health check result for whichever backend holds the links
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageHealth {
    pub backend: String,
    pub status: HealthState,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_info: Option<DbInfo>,
}

impl StorageHealth {
    pub fn healthy(backend: &str, response_time: Duration) -> Self {
        Self {
            backend: backend.to_string(),
            status: HealthState::Healthy,
            response_time_ms: response_time.as_millis() as u64,
            message: None,
            db_info: None,
        }
    }
}

impl Database {
    /// Create a new database connection pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Initializing database connection");
        debug!(
            "Database configuration: max_conn={}, min_conn={}, timeout={}s",
            config.max_connections, config.min_connections, config.connect_timeout_seconds
        );

        if !config.skip_db_exists_check {
            Self::ensure_database_exists(config).await?;
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                DatabaseError::ConnectionError(e)
            })?;

        info!("Successfully connected to database");

        if config.use_migrations {
            Self::run_migrations(&pool).await?;
        }

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> StorageHealth {
        let start = Instant::now();

        let result = sqlx::query("SELECT 1 AS result")
            .fetch_one(self.get_pool())
            .await;

        let elapsed = start.elapsed();

        match result {
            Ok(_) => {
                let db_info = sqlx::query_as::<_, DbInfo>(
                    "SELECT current_database() AS name, version() AS version",
                )
                .fetch_one(self.get_pool())
                .await
                .ok();

                StorageHealth {
                    db_info,
                    ..StorageHealth::healthy("postgres", elapsed)
                }
            }
            Err(e) => {
                error!("Database health check failed: {}", e);
                StorageHealth {
                    backend: "postgres".to_string(),
                    status: HealthState::Unhealthy,
                    response_time_ms: elapsed.as_millis() as u64,
                    message: Some(format!("Database query failed: {}", e)),
                    db_info: None,
                }
            }
        }
    }

    /// Ensure the target database exists, create it if necessary
    async fn ensure_database_exists(config: &DatabaseConfig) -> DbResult<()> {
        let url = &config.url;
        let db_name = extract_db_name_from_url(url).ok_or_else(|| {
            DatabaseError::DatabaseNotFound(
                "Could not extract database name from connection string".to_string(),
            )
        })?;

        debug!("Checking if database '{}' exists", db_name);

        let db_exists = Postgres::database_exists(url)
            .await
            .map_err(DatabaseError::ConnectionError)?;

        if db_exists {
            debug!("Database '{}' exists", db_name);
            return Ok(());
        }

        if !config.create_database_if_missing {
            return Err(DatabaseError::DatabaseNotFound(format!(
                "Database '{}' does not exist",
                db_name
            )));
        }

        info!("Database '{}' does not exist, creating it", db_name);
        if let Err(err) = Postgres::create_database(url).await {
            return Err(DatabaseError::DatabaseCreationFailed(format!(
                "Failed to create database '{}': {}",
                db_name, err
            )));
        }

        info!("Successfully created database '{}'", db_name);
        Ok(())
    }

    /// Run database migrations
    async fn run_migrations(pool: &PgPool) -> DbResult<()> {
        info!("Running database migrations");

        match sqlx::migrate!("./migrations").run(pool).await {
            Ok(_) => {
                info!("Database migrations completed successfully");
                Ok(())
            }
            Err(e) => {
                warn!("Database migration error: {}", e);
                Err(DatabaseError::MigrationError(e.to_string()))
            }
        }
    }

    /// Gracefully close the database connection pool
    pub async fn shutdown(&self) {
        info!("Shutting down database connection pool...");

        let used_connections = self.pool.size();
        let idle_connections = self.pool.num_idle();

        self.pool.close().await;

        info!(
            "Database connection pool closed. Stats: {} active, {} idle connections released",
            used_connections, idle_connections
        );
    }
}

/// Extract database name from a PostgreSQL connection string
fn extract_db_name_from_url(url: &str) -> Option<String> {
    // scheme://credentials@host:port/dbname?params
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 4 {
        return None;
    }

    let db_name = parts[3].split('?').next()?;
    if db_name.is_empty() {
        return None;
    }

    Some(db_name.to_string())
}
