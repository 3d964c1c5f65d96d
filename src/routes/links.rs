use actix_web::web;

use crate::handlers::{analytics_handler, info_handler, redirect_handler, shorten_handler};

// Configure link routes; the catch-all redirect must stay last
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/shorten", web::post().to(shorten_handler))
        .route("/info/{code}", web::get().to(info_handler))
        .route("/analytics/{code}", web::get().to(analytics_handler))
        .route("/{code}", web::get().to(redirect_handler));
}
