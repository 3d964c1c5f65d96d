use actix_web::{http::header::LOCATION, web, HttpRequest, HttpResponse, Responder};
use log::{debug, info};

use crate::{
    config::Config,
    models::{AnalyticsQuery, ShortenRequestDto, ShortenResponseDto},
    services::{LinkServiceTrait, LinkServiceType},
    types::Result,
    utils::client_ip::client_ip,
};

/// POST /shorten
pub async fn shorten_handler(
    dto: web::Json<ShortenRequestDto>,
    service: web::Data<LinkServiceType>,
) -> Result<impl Responder> {
    let link = service.shorten(dto.into_inner()).await?;
    Ok(HttpResponse::Created().json(ShortenResponseDto { url: link.code }))
}

/// GET /info/{code}
pub async fn info_handler(
    code: web::Path<String>,
    service: web::Data<LinkServiceType>,
) -> Result<impl Responder> {
    let info = service.get_info(&code).await?;
    Ok(HttpResponse::Ok().json(info))
}

/// GET /analytics/{code}
pub async fn analytics_handler(
    code: web::Path<String>,
    query: web::Query<AnalyticsQuery>,
    service: web::Data<LinkServiceType>,
) -> Result<impl Responder> {
    let analytics = service.get_analytics(&code, query.limit).await?;
    Ok(HttpResponse::Ok().json(analytics))
}

/// GET /{code}
pub async fn redirect_handler(
    req: HttpRequest,
    code: web::Path<String>,
    service: web::Data<LinkServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let code = code.into_inner();
    let source_ip = client_ip(&req, config.server.trust_proxy_headers);
    debug!("Redirect requested for code '{}' from {}", code, source_ip);

    let target = service.resolve(&code, &source_ip).await?;

    info!("Redirecting '{}' to '{}'", code, target);
    Ok(HttpResponse::TemporaryRedirect()
        .insert_header((LOCATION, target))
        .finish())
}
