// src/services/code_generator.rs - Short code reservation
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::Result;
use crate::errors::{RepositoryError, ServiceError};
use crate::models::{NewShortLink, ShortLink};
use crate::repositories::LinkRepository;
use crate::utils::id_generator;

pub struct CodeGenerator<R: LinkRepository + ?Sized> {
    repository: Arc<R>,
    code_length: usize,
    max_attempts: u32,
}

impl<R: LinkRepository + ?Sized> CodeGenerator<R> {
    pub fn new(repository: Arc<R>, code_length: usize, max_attempts: u32) -> Self {
        Self {
            repository,
            code_length,
            max_attempts,
        }
    }

    /// Claims a code for `original_url` and stores the link under it.
    ///
    /// A requested alias is used verbatim and fails with `Conflict` when taken.
    /// Without one, random codes are tried until one is free; after
    /// `max_attempts` collisions the call fails with `Exhausted`.
    pub async fn reserve(
        &self,
        original_url: String,
        expires_at: Option<DateTime<Utc>>,
        alias: Option<String>,
    ) -> Result<ShortLink> {
        match alias {
            Some(alias) => self.reserve_alias(alias, original_url, expires_at).await,
            None => self.reserve_random(original_url, expires_at).await,
        }
    }

    async fn reserve_alias(
        &self,
        alias: String,
        original_url: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink> {
        if self.repository.exists(&alias).await? {
            return Err(alias_taken(&alias));
        }

        let link = NewShortLink {
            code: alias.clone(),
            original_url,
            expires_at,
            is_custom_code: true,
        };

        // Another request may have taken the alias since the check
        self.repository.create(link).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => alias_taken(&alias),
            other => other.into(),
        })
    }

    async fn reserve_random(
        &self,
        original_url: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink> {
        for attempt in 1..=self.max_attempts {
            let code = id_generator::generate_short_id(self.code_length);

            if self.repository.exists(&code).await? {
                debug!("Generated code '{}' collided (attempt {})", code, attempt);
                continue;
            }

            let link = NewShortLink {
                code,
                original_url: original_url.clone(),
                expires_at,
                is_custom_code: false,
            };

            match self.repository.create(link).await {
                Ok(record) => return Ok(record),
                Err(RepositoryError::Conflict(msg)) => {
                    debug!("Lost insert race on attempt {}: {}", attempt, msg);
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            "No free {}-character code after {} attempts",
            self.code_length, self.max_attempts
        );
        Err(ServiceError::Exhausted(format!(
            "Failed to generate a unique short code after {} attempts",
            self.max_attempts
        )))
    }
}

fn alias_taken(alias: &str) -> ServiceError {
    ServiceError::Conflict(format!("Alias '{}' is already taken", alias))
}
