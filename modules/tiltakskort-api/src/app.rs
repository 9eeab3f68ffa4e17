use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use tiltakskort_graph::CardRepository;

use crate::rate_limit::{self, RateLimit};
use crate::rest;

pub struct AppState {
    pub repo: CardRepository,
    pub rate_limit: RateLimit,
    pub rate_limiter: Mutex<HashMap<IpAddr, Vec<Instant>>>,
}

impl AppState {
    pub fn new(repo: CardRepository, rate_limit: RateLimit) -> Self {
        Self {
            repo,
            rate_limit,
            rate_limiter: Mutex::new(HashMap::new()),
        }
    }
}

/// REST API under `/api`, frontend build served from `static_dir` for
/// everything else (with `index.html` fallback for client-side routing).
pub fn build_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let api = Router::new()
        .route("/categories", get(rest::api_categories))
        .route("/cards", get(rest::api_cards))
        .route("/cards/{id}", get(rest::api_card_detail))
        .route("/cards/{id}/state", put(rest::api_update_state))
        .route("/points", get(rest::api_points))
        .route("/admin/clear-cache", post(rest::api_clear_cache))
        .fallback(rest::api_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_by_ip,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let frontend = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .fallback_service(frontend)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Logging layer: method + path only (no query params, no IP)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}
