// src/services/click_recorder.rs - Click event recording
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;

use super::Result;
use crate::models::NewClickEvent;
use crate::repositories::LinkRepository;

pub struct ClickRecorder<R: LinkRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: LinkRepository + ?Sized> ClickRecorder<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Appends a click event and bumps the link's counter in one store transaction.
    /// Returns the counter after this click.
    pub async fn record(&self, code: &str, source_ip: &str, timestamp: DateTime<Utc>) -> Result<i64> {
        let event = NewClickEvent {
            code: code.to_string(),
            timestamp,
            source_ip: source_ip.to_string(),
        };

        let click_count = self.repository.append_click(event).await?;
        debug!("Click on '{}' from {} (total {})", code, source_ip, click_count);

        Ok(click_count)
    }
}
