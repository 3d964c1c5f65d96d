// src/repositories/mod.rs - Link store contract
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::StorageHealth;
use crate::errors::RepositoryError;
use crate::models::{ClickSummary, NewClickEvent, NewShortLink, ShortLink};

mod memory;
mod postgres;

pub use memory::InMemoryLinkRepository;
pub use postgres::PgLinkRepository;

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new short link
    ///
    /// ### Returns
    /// * `Result<ShortLink>` - The stored link with `created_at` and a zero click count
    ///
    /// ### Errors
    /// * `RepositoryError::Conflict` - If the code is already taken, expired or not
    /// * `RepositoryError::Database` - If a database error occurs
    async fn create(&self, link: NewShortLink) -> Result<ShortLink>;

    /// Finds a short link by its code
    ///
    /// ### Errors
    /// * `RepositoryError::NotFound` - If no link has this code
    /// * `RepositoryError::Database` - If a database error occurs
    async fn get(&self, code: &str) -> Result<ShortLink>;

    /// Whether any link, expired or not, holds this code
    async fn exists(&self, code: &str) -> Result<bool>;

    /// Atomically increments the click counter of a link without recording an event.
    /// Redirects go through `append_click`, which bumps the counter together with the event.
    ///
    /// ### Returns
    /// * `Result<i64>` - The counter after the increment
    ///
    /// ### Errors
    /// * `RepositoryError::NotFound` - If no link has this code
    async fn increment_clicks(&self, code: &str) -> Result<i64>;

    /// Appends a click event and increments the link's counter as one unit:
    /// either both are stored or neither is.
    ///
    /// ### Returns
    /// * `Result<i64>` - The counter after the increment
    ///
    /// ### Errors
    /// * `RepositoryError::NotFound` - If no link has the event's code
    async fn append_click(&self, event: NewClickEvent) -> Result<i64>;

    /// Reads the click counter and recorded source addresses, most recent first,
    /// from one consistent snapshot
    ///
    /// ### Arguments
    /// * `limit` - Keep only the N most recent addresses (`None` keeps all)
    ///
    /// ### Errors
    /// * `RepositoryError::NotFound` - If no link has this code
    async fn click_summary(&self, code: &str, limit: Option<usize>) -> Result<ClickSummary>;

    /// Deletes links that expired before `before`, together with their click events
    ///
    /// ### Returns
    /// * `Result<u64>` - Number of links removed
    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64>;

    /// Backend health for the `/health` endpoint
    async fn health(&self) -> StorageHealth;
}
