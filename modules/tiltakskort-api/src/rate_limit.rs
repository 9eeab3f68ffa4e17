use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use crate::app::AppState;

/// Sliding-window limit: at most `max` requests per IP within `window`.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub max: usize,
    pub window: Duration,
}

/// Record a request at `now` if the IP is under its limit.
pub fn check_rate_limit(entries: &mut Vec<Instant>, now: Instant, limit: RateLimit) -> bool {
    if let Some(cutoff) = now.checked_sub(limit.window) {
        entries.retain(|t| *t > cutoff);
    }
    if entries.len() >= limit.max {
        return false;
    }
    entries.push(now);
    true
}

pub fn prune_empty_entries(limiter: &mut HashMap<IpAddr, Vec<Instant>>, window: Duration) {
    let Some(cutoff) = Instant::now().checked_sub(window) else {
        return;
    };
    limiter.retain(|_, entries| {
        entries.retain(|t| *t > cutoff);
        !entries.is_empty()
    });
}

/// Whole minutes when the window divides evenly, seconds otherwise.
fn retry_after_text(window: Duration) -> String {
    let secs = window.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s >= 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{s} seconds"),
    }
}

/// Middleware for `/api`. Requests without peer info (in-process calls) are
/// not limited.
pub async fn limit_by_ip(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = ip {
        let mut limiter = state.rate_limiter.lock().await;
        // Periodically prune empty entries to prevent unbounded HashMap growth
        if limiter.len() > 1000 {
            prune_empty_entries(&mut limiter, state.rate_limit.window);
        }
        let entries = limiter.entry(ip).or_default();
        if !check_rate_limit(entries, Instant::now(), state.rate_limit) {
            warn!(%ip, "Rate limit exceeded");
            let wait = retry_after_text(state.rate_limit.window);
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "Too many requests",
                    "message": format!(
                        "Too many requests from this IP, please try again after {wait}"
                    ),
                })),
            )
                .into_response();
        }
    }

    next.run(request).await
}
