use std::sync::Arc;

mod click_recorder;
mod code_generator;
pub mod expiry_sweeper;
mod link_service;

pub use click_recorder::ClickRecorder;
pub use code_generator::CodeGenerator;
pub use link_service::{LinkService, LinkServiceTrait};

use crate::{config::ShortenerConfig, errors::ServiceError, repositories::LinkRepository};

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Service shared by all workers, whichever backend was configured
pub type LinkServiceType = LinkService<dyn LinkRepository>;

/// Service Register
pub fn register(repository: Arc<dyn LinkRepository>, config: &ShortenerConfig) -> LinkServiceType {
    LinkService::new(repository, config)
}
