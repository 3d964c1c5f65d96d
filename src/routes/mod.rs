use actix_web::{web, HttpResponse, Responder};

use crate::{
    db::HealthState,
    errors::AppError,
    services::{LinkServiceTrait, LinkServiceType},
    types::{AppState, HealthStatus, ResponsePayload},
};

mod links;

/// Largest accepted JSON body
const JSON_LIMIT_BYTES: usize = 32 * 1024;

// Handler function for the root route "/"
async fn index() -> impl Responder {
    let welcome_message = ResponsePayload {
        status: 200,
        message: String::from("Link shortener is running"),
    };

    HttpResponse::Ok().json(welcome_message)
}

// Handler function for the health check endpoint
async fn health_check(
    data: web::Data<AppState>,
    service: web::Data<LinkServiceType>,
) -> impl Responder {
    let storage = service.storage_health().await;
    let healthy = storage.status == HealthState::Healthy;

    let status = HealthStatus {
        status: String::from(if healthy { "OK" } else { "DEGRADED" }),
        version: data.version.clone(),
        uptime_seconds: data.start_time.elapsed().as_secs(),
        storage,
    };

    if healthy {
        HttpResponse::Ok().json(status)
    } else {
        HttpResponse::ServiceUnavailable().json(status)
    }
}

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies and query strings answer with the same {error} shape as domain errors
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT_BYTES)
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    );

    cfg.route("/", web::get().to(index));
    cfg.route("/health", web::get().to(health_check));
    links::configure_routes(cfg);
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Instant};

    use actix_web::{
        body::to_bytes,
        dev::ServiceResponse,
        http::{header::LOCATION, StatusCode},
        test, App,
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        config::{
            AppConfig, Config, DatabaseConfig, Environment, ServerConfig, ShortenerConfig,
            StorageBackend,
        },
        models::NewShortLink,
        repositories::{InMemoryLinkRepository, LinkRepository},
        services,
    };

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".parse().unwrap(),
                port: 5000,
                workers: 1,
                trust_proxy_headers: false,
                cors_allowed_origins: vec!["*".to_string()],
            },
            app: AppConfig {
                name: "link-shortener".to_string(),
                version: "0.1.0".to_string(),
                environment: Environment::Testing,
                log_level: "debug".to_string(),
            },
            db: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: String::new(),
                max_connections: 1,
                min_connections: 1,
                use_migrations: false,
                skip_db_exists_check: true,
                connect_timeout_seconds: 1,
                create_database_if_missing: false,
            },
            shortener: ShortenerConfig::default(),
        }
    }

    macro_rules! test_app {
        ($repo:expr) => {{
            let config = test_config();
            let service = services::register($repo, &config.shortener);

            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState {
                        start_time: Instant::now(),
                        version: config.app.version.clone(),
                    }))
                    .app_data(web::Data::new(service))
                    .app_data(web::Data::new(config))
                    .configure(configure_routes),
            )
            .await
        }};
    }

    async fn json_body(res: ServiceResponse) -> Value {
        let body = to_bytes(res.into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[actix_web::test]
    async fn shorten_redirect_info_analytics_flow() {
        let app = test_app!(Arc::new(InMemoryLinkRepository::new()));

        let req = test::TestRequest::post()
            .uri("/shorten")
            .set_json(json!({ "originalUrl": "https://www.rust-lang.org/learn" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let code = json_body(res).await["url"].as_str().unwrap().to_string();
        assert_eq!(code.len(), 6);

        for ip in ["198.51.100.1:1000", "198.51.100.2:2000"] {
            let req = test::TestRequest::get()
                .uri(&format!("/{}", code))
                .peer_addr(ip.parse().unwrap())
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
            assert_eq!(
                res.headers().get(LOCATION).unwrap(),
                "https://www.rust-lang.org/learn"
            );
        }

        let req = test::TestRequest::get()
            .uri(&format!("/info/{}", code))
            .to_request();
        let info = json_body(test::call_service(&app, req).await).await;
        assert_eq!(info["originalUrl"], "https://www.rust-lang.org/learn");
        assert_eq!(info["clickCount"], 2);
        assert!(info["createdAt"].is_string());

        let req = test::TestRequest::get()
            .uri(&format!("/analytics/{}", code))
            .to_request();
        let analytics = json_body(test::call_service(&app, req).await).await;
        assert_eq!(
            analytics,
            json!({ "clickCount": 2, "ipAddresses": ["198.51.100.2", "198.51.100.1"] })
        );

        let req = test::TestRequest::get()
            .uri(&format!("/analytics/{}?limit=1", code))
            .to_request();
        let analytics = json_body(test::call_service(&app, req).await).await;
        assert_eq!(analytics["ipAddresses"], json!(["198.51.100.2"]));

        let req = test::TestRequest::get()
            .uri(&format!("/analytics/{}?limit={}", code, usize::MAX))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["ipAddresses"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn duplicate_alias_is_409() {
        let app = test_app!(Arc::new(InMemoryLinkRepository::new()));
        let body = json!({ "originalUrl": "https://example.com", "alias": "promo", "expiresAt": "" });

        let first = test::TestRequest::post().uri("/shorten").set_json(&body).to_request();
        let res = test::call_service(&app, first).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(json_body(res).await, json!({ "url": "promo" }));

        let second = test::TestRequest::post().uri("/shorten").set_json(&body).to_request();
        let res = test::call_service(&app, second).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert!(json_body(res).await["error"]
            .as_str()
            .unwrap()
            .contains("promo"));
    }

    #[actix_web::test]
    async fn malformed_requests_are_400_with_error_body() {
        let app = test_app!(Arc::new(InMemoryLinkRepository::new()));

        for body in [
            json!({ "originalUrl": "not a url" }),
            json!({ "alias": "missing-url" }),
            json!({ "originalUrl": "https://example.com", "alias": "a/b" }),
            json!({ "originalUrl": "https://example.com", "expiresAt": "someday" }),
        ] {
            let req = test::TestRequest::post().uri("/shorten").set_json(&body).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body: {}", body);
            assert!(json_body(res).await["error"].is_string());
        }

        let req = test::TestRequest::get()
            .uri("/analytics/abc123?limit=lots")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn missing_and_expired_codes() {
        let repo = Arc::new(InMemoryLinkRepository::new());
        repo.create(NewShortLink {
            code: "old123".to_string(),
            original_url: "https://example.com".to_string(),
            expires_at: Some(Utc::now() - Duration::seconds(1)),
            is_custom_code: false,
        })
        .await
        .unwrap();
        let app = test_app!(repo);

        for uri in ["/nope00", "/info/nope00", "/analytics/nope00"] {
            let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "uri: {}", uri);
            assert!(json_body(res).await["error"].is_string());
        }

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/old123").to_request()).await;
        assert_eq!(res.status(), StatusCode::GONE);
        assert!(res.headers().get(LOCATION).is_none());
    }

    #[actix_web::test]
    async fn health_reports_storage() {
        let app = test_app!(Arc::new(InMemoryLinkRepository::new()));

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body = json_body(res).await;
        assert_eq!(body["status"], "OK");
        assert_eq!(body["storage"]["backend"], "memory");
        assert!(body["uptimeSeconds"].is_u64());
    }
}
