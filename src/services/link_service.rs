// src/services/link_service.rs - Shortening, redirects and analytics
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::info;
use validator::Validate;

use super::{ClickRecorder, CodeGenerator, Result};
use crate::config::ShortenerConfig;
use crate::db::StorageHealth;
use crate::errors::ServiceError;
use crate::models::{AnalyticsDto, LinkInfoDto, ShortLink, ShortenRequestDto};
use crate::repositories::LinkRepository;
use crate::validations::{validate_expiry, validation_message};

#[async_trait]
pub trait LinkServiceTrait: Send + Sync {
    /// Validates the request and stores a link under an alias or a generated code
    async fn shorten(&self, dto: ShortenRequestDto) -> Result<ShortLink>;

    /// Returns the target of a live link and records the click.
    /// Fails with `NotFound` for unknown codes and `Expired` once the expiry has passed.
    async fn resolve(&self, code: &str, source_ip: &str) -> Result<String>;

    /// Link details without side effects; expired links still answer
    async fn get_info(&self, code: &str) -> Result<LinkInfoDto>;

    /// Click count and source addresses, most recent first
    async fn get_analytics(&self, code: &str, limit: Option<usize>) -> Result<AnalyticsDto>;

    /// Drops links that have been expired for longer than `retention`
    async fn purge_expired(&self, retention: Duration) -> Result<u64>;

    async fn storage_health(&self) -> StorageHealth;
}

pub struct LinkService<R: LinkRepository + ?Sized> {
    repository: Arc<R>,
    generator: CodeGenerator<R>,
    recorder: ClickRecorder<R>,
    max_ttl: Duration,
}

impl<R: LinkRepository + ?Sized> LinkService<R> {
    pub fn new(repository: Arc<R>, config: &ShortenerConfig) -> Self {
        Self {
            generator: CodeGenerator::new(
                Arc::clone(&repository),
                config.code_length,
                config.max_attempts,
            ),
            recorder: ClickRecorder::new(Arc::clone(&repository)),
            max_ttl: Duration::days(config.max_ttl_days),
            repository,
        }
    }
}

#[async_trait]
impl<R: LinkRepository + ?Sized> LinkServiceTrait for LinkService<R> {
    async fn shorten(&self, dto: ShortenRequestDto) -> Result<ShortLink> {
        dto.validate()
            .map_err(|e| ServiceError::Validation(validation_message(&e)))?;

        if let Some(expires_at) = &dto.expires_at {
            validate_expiry(expires_at, Utc::now(), self.max_ttl).map_err(|e| {
                ServiceError::Validation(
                    e.message
                        .map(|m| m.into_owned())
                        .unwrap_or_else(|| "Invalid expiration date".to_string()),
                )
            })?;
        }

        let link = self
            .generator
            .reserve(dto.original_url, dto.expires_at, dto.alias)
            .await?;

        info!(
            "Created short link '{}' -> '{}' (expires: {:?})",
            link.code, link.original_url, link.expires_at
        );
        Ok(link)
    }

    async fn resolve(&self, code: &str, source_ip: &str) -> Result<String> {
        let now = Utc::now();
        let link = self.repository.get(code).await?;

        if link.is_expired_at(now) {
            info!("Short link '{}' has expired", code);
            return Err(ServiceError::Expired(format!(
                "Short link '{}' has expired",
                code
            )));
        }

        self.recorder.record(code, source_ip, now).await?;

        Ok(link.original_url)
    }

    async fn get_info(&self, code: &str) -> Result<LinkInfoDto> {
        let link = self.repository.get(code).await?;
        Ok(LinkInfoDto::from(link))
    }

    async fn get_analytics(&self, code: &str, limit: Option<usize>) -> Result<AnalyticsDto> {
        let summary = self.repository.click_summary(code, limit).await?;
        Ok(AnalyticsDto::from(summary))
    }

    async fn purge_expired(&self, retention: Duration) -> Result<u64> {
        // Nothing can have expired before the start of the calendar
        let Some(before) = Utc::now().checked_sub_signed(retention) else {
            return Ok(0);
        };
        let removed = self.repository.purge_expired(before).await?;
        Ok(removed)
    }

    async fn storage_health(&self) -> StorageHealth {
        self.repository.health().await
    }
}
