use std::io::Error as IoError;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

pub mod config;
pub mod repository;
pub mod service;

pub use config::ConfigError;
pub use repository::RepositoryError;
pub use service::ServiceError;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    // Service-level domain errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Conflict error: {0}")]
    Conflict(String),
    #[error("Not found error: {0}")]
    NotFound(String),
    #[error("Expired error: {0}")]
    Expired(String),
    #[error("Exhausted error: {0}")]
    Exhausted(String),
    #[error("Internal error: {0}")]
    Internal(String),
    // Infrastructure/system errors
    #[error("Server error: {0}")]
    Server(#[from] IoError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Logger error: {0}")]
    Logger(String),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl AppError {
    /// Message placed in the `error` field of the response body.
    /// Infrastructure details are logged, never sent to the client.
    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::Expired(msg)
            | AppError::Exhausted(msg) => msg.clone(),
            _ => "An internal error occurred".to_string(),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Conflict(msg) => AppError::Conflict(msg),
            ServiceError::NotFound(msg) => AppError::NotFound(msg),
            ServiceError::Expired(msg) => AppError::Expired(msg),
            ServiceError::Exhausted(msg) => AppError::Exhausted(msg),
            ServiceError::Repository(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::Exhausted(_) => StatusCode::CONFLICT,
            AppError::Expired(_) => StatusCode::GONE,
            AppError::Internal(_)
            | AppError::Server(_)
            | AppError::Config(_)
            | AppError::Logger(_)
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        HttpResponse::build(status).json(json!({ "error": self.client_message() }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    async fn body_json(err: AppError) -> serde_json::Value {
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn domain_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::from(ServiceError::Validation("bad".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ServiceError::NotFound("x".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ServiceError::Conflict("x".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(ServiceError::Exhausted("x".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(ServiceError::Expired("x".into())).status_code(),
            StatusCode::GONE
        );
    }

    #[actix_web::test]
    async fn body_carries_the_domain_message() {
        let body = body_json(AppError::Conflict("Alias 'docs' is already taken".into())).await;
        assert_eq!(body, json!({ "error": "Alias 'docs' is already taken" }));
    }

    #[actix_web::test]
    async fn store_failures_hide_their_details() {
        let err = AppError::from(ServiceError::Repository(RepositoryError::Database(
            sqlx::Error::PoolTimedOut,
        )));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(err).await;
        assert_eq!(body, json!({ "error": "An internal error occurred" }));
    }
}
