use std::{sync::Arc, time::Duration as StdDuration, time::Instant};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Duration;
use env_logger::Env;
use log::{debug, info, warn};

use crate::{
    config::{Config, Environment, ServerConfig, StorageBackend},
    db::Database,
    errors::AppError,
    middleware::RequestLogger,
    repositories::{InMemoryLinkRepository, LinkRepository, PgLinkRepository},
    routes,
    services::{self, expiry_sweeper},
    types::AppState,
};

// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;

// Setup logging with custom format and configuration
fn setup_logging(config: &Config) -> Result<(), AppError> {
    let log_level = match config.app.environment {
        Environment::Development => config.app.log_level.clone(),
        Environment::Testing => "debug,actix_web=info".to_string(),
        Environment::Production => "info,actix_web=warn".to_string(),
    };

    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::try_init_from_env(env)
        .map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))
}

/// Browser access for the front-end; `*` opens the API to any origin
fn cors(server: &ServerConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_any_header()
        .max_age(3600);

    if server.cors_allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }

    server
        .cors_allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

pub async fn server() -> AppResult<()> {
    let config = Config::load()?;

    setup_logging(&config)?;

    let start_time = Instant::now();

    info!("Starting {} v{}", config.app.name, config.app.version);
    info!("Environment: {:?}", config.app.environment);
    info!(
        "Binding to {}:{} with {} workers",
        config.server.host, config.server.port, config.server.workers
    );

    if config.app.environment == Environment::Development {
        debug!("Debug logging enabled");
        debug!("Full configuration: {:?}", config);
    }

    let database = match config.db.backend {
        StorageBackend::Postgres => Some(Database::connect(&config.db).await?),
        StorageBackend::Memory => {
            warn!("Using in-memory storage: links and clicks are lost on restart");
            None
        }
    };

    let repository: Arc<dyn LinkRepository> = match &database {
        Some(db) => Arc::new(PgLinkRepository::new(db.clone())),
        None => Arc::new(InMemoryLinkRepository::new()),
    };

    let link_service = web::Data::new(services::register(repository, &config.shortener));

    if config.shortener.sweep_interval_seconds > 0 {
        expiry_sweeper::spawn(
            link_service.clone(),
            StdDuration::from_secs(config.shortener.sweep_interval_seconds),
            Duration::hours(config.shortener.expired_retention_hours),
        );
    }

    let enable_debug_logging = config.app.environment != Environment::Production;

    let app_config = config.clone();

    let log_format = if enable_debug_logging {
        "%a \"%r\" %s %b %T \"%{Referer}i\" \"%{User-Agent}i\" %{X-Request-ID}o"
    } else {
        "%a \"%r\" %s %b %T"
    };

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState {
                start_time,
                version: app_config.app.version.clone(),
            }))
            // Make the full configuration available to handlers
            .app_data(web::Data::new(app_config.clone()))
            .app_data(link_service.clone())
            .wrap(RequestLogger::new(enable_debug_logging))
            // Outside RequestLogger so the access line can print X-Request-ID
            .wrap(Logger::new(log_format))
            .wrap(cors(&app_config.server))
            .configure(routes::configure_routes)
    })
    .workers(config.server.workers)
    .bind((config.server.host.to_string(), config.server.port))?
    .run()
    .await?;

    if let Some(db) = database {
        db.shutdown().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use actix_web::{dev::Service, http::header, test, HttpResponse};

    use super::*;

    fn server_config(origins: &[&str]) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            workers: 1,
            trust_proxy_headers: false,
            cors_allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[actix_web::test]
    async fn cors_allows_only_listed_origins() {
        let app = test::init_service(
            App::new()
                .wrap(cors(&server_config(&["http://localhost:3000"])))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let allowed = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://localhost:3000"))
            .to_request();
        let res = test::call_service(&app, allowed).await;
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );

        let denied = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://evil.example"))
            .to_request();
        // Rejected either as an error response or a plain one without the allow header
        if let Ok(res) = app.call(denied).await {
            assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        }
    }

    #[actix_web::test]
    async fn cors_wildcard_allows_any_origin() {
        let app = test::init_service(
            App::new()
                .wrap(cors(&server_config(&["*"])))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://anywhere.example"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
