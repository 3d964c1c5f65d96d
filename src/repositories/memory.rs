// src/repositories/memory.rs - In-process link store
use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use tokio::sync::RwLock;

use super::{LinkRepository, Result};
use crate::db::StorageHealth;
use crate::errors::RepositoryError;
use crate::models::{ClickEvent, ClickSummary, NewClickEvent, NewShortLink, ShortLink};

#[derive(Default)]
struct MemoryState {
    links: HashMap<String, ShortLink>,
    clicks: HashMap<String, Vec<ClickEvent>>,
    last_click_id: i64,
}

/// Keeps links and clicks behind one lock, so an append and its counter
/// increment are never observed apart. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(code: &str) -> RepositoryError {
    RepositoryError::NotFound(format!("Short link '{}' not found", code))
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, link: NewShortLink) -> Result<ShortLink> {
        let mut state = self.state.write().await;
        if state.links.contains_key(&link.code) {
            return Err(RepositoryError::Conflict(format!(
                "Code '{}' is already taken",
                link.code
            )));
        }

        let record = ShortLink {
            code: link.code,
            original_url: link.original_url,
            created_at: Utc::now(),
            expires_at: link.expires_at,
            click_count: 0,
            is_custom_code: link.is_custom_code,
        };
        state.links.insert(record.code.clone(), record.clone());

        Ok(record)
    }

    async fn get(&self, code: &str) -> Result<ShortLink> {
        let state = self.state.read().await;
        state.links.get(code).cloned().ok_or_else(|| not_found(code))
    }

    async fn exists(&self, code: &str) -> Result<bool> {
        Ok(self.state.read().await.links.contains_key(code))
    }

    async fn increment_clicks(&self, code: &str) -> Result<i64> {
        let mut state = self.state.write().await;
        let link = state.links.get_mut(code).ok_or_else(|| not_found(code))?;
        link.click_count += 1;
        Ok(link.click_count)
    }

    async fn append_click(&self, event: NewClickEvent) -> Result<i64> {
        let mut state = self.state.write().await;
        let state = &mut *state;

        let link = state
            .links
            .get_mut(&event.code)
            .ok_or_else(|| not_found(&event.code))?;
        link.click_count += 1;
        let click_count = link.click_count;

        state.last_click_id += 1;
        let id = state.last_click_id;
        state
            .clicks
            .entry(event.code.clone())
            .or_default()
            .push(ClickEvent {
                id,
                code: event.code,
                timestamp: event.timestamp,
                source_ip: event.source_ip,
            });

        Ok(click_count)
    }

    async fn click_summary(&self, code: &str, limit: Option<usize>) -> Result<ClickSummary> {
        let state = self.state.read().await;
        let link = state.links.get(code).ok_or_else(|| not_found(code))?;

        let mut events: Vec<&ClickEvent> = state
            .clicks
            .get(code)
            .map(|events| events.iter().collect())
            .unwrap_or_default();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        let source_ips = events
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|event| event.source_ip.clone())
            .collect();

        Ok(ClickSummary {
            click_count: link.click_count,
            source_ips,
        })
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64> {
        let mut state = self.state.write().await;

        let expired: Vec<String> = state
            .links
            .values()
            .filter(|link| link.expires_at.is_some_and(|expiry| expiry < before))
            .map(|link| link.code.clone())
            .collect();

        for code in &expired {
            state.links.remove(code);
            state.clicks.remove(code);
        }
        debug!("Purged {} expired links from memory", expired.len());

        Ok(expired.len() as u64)
    }

    /// Healthy once the state lock can be taken for reading
    async fn health(&self) -> StorageHealth {
        let start = Instant::now();
        let _guard = self.state.read().await;
        StorageHealth::healthy("memory", start.elapsed())
    }
}
