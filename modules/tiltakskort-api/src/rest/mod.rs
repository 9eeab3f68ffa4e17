pub mod error;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::{debug, warn};

use tiltakskort_common::{Card, StateUpdate};

use crate::app::AppState;
pub use error::ApiError;

const INVALID_STATE_BODY: &str =
    "Invalid request. Body must include 'state' with value 'avhuket' or 'ikke_avhuket'";

// --- Request structs ---

#[derive(Deserialize)]
pub struct StateBody {
    state: Option<String>,
}

#[derive(Deserialize)]
pub struct ClearCacheQuery {
    scope: Option<String>,
}

// --- Helpers ---

/// Parse a path segment as a positive card id.
pub fn parse_card_id(raw: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::BadRequest(format!(
            "Card id must be a positive integer, got '{raw}'"
        ))),
    }
}

// --- Handlers ---

pub async fn api_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<i64>>, ApiError> {
    Ok(Json(state.repo.get_all_category_ids().await?))
}

pub async fn api_cards(State(state): State<Arc<AppState>>) -> Result<Json<Vec<i64>>, ApiError> {
    Ok(Json(state.repo.get_all_cards().await?))
}

/// Responds with a single-element array; the client indexes `[0]`.
pub async fn api_card_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let card_id = parse_card_id(&id)?;
    debug!(card_id, "Card requested");

    match state.repo.get_card_by_id(card_id).await? {
        Some(card) => Ok(Json(vec![card])),
        None => Err(ApiError::NotFound(format!(
            "Card with ID {card_id} not found"
        ))),
    }
}

pub async fn api_update_state(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<StateBody>, JsonRejection>,
) -> Result<Json<StateUpdate>, ApiError> {
    let card_id = parse_card_id(&id)?;
    let new_state = match body {
        Ok(Json(StateBody { state: Some(s) })) => s,
        Ok(_) => return Err(ApiError::BadRequest(INVALID_STATE_BODY.to_string())),
        Err(rejection) => {
            warn!(error = %rejection, "Rejected state body");
            return Err(ApiError::BadRequest(INVALID_STATE_BODY.to_string()));
        }
    };

    let update = state
        .repo
        .update_state(card_id, &new_state)
        .await
        .map_err(|e| match e {
            tiltakskort_graph::GraphError::Validation(_) => {
                ApiError::BadRequest(INVALID_STATE_BODY.to_string())
            }
            other => other.into(),
        })?;
    Ok(Json(update))
}

pub async fn api_points(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let points = state.repo.calculate_points().await?;
    Ok(Json(serde_json::json!({ "points": points })))
}

/// `?scope=all` also drops individual card entries.
pub async fn api_clear_cache(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClearCacheQuery>,
) -> impl IntoResponse {
    match params.scope.as_deref() {
        Some("all") => {
            state.repo.clear_all_caches();
            Json(serde_json::json!({ "message": "All caches cleared successfully" }))
        }
        _ => {
            state.repo.clear_cache();
            Json(serde_json::json!({ "message": "Cache cleared successfully" }))
        }
    }
}

pub async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "message": "API endpoint not found" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_ids_parse() {
        assert_eq!(parse_card_id("7").unwrap(), 7);
        assert_eq!(parse_card_id(" 12 ").unwrap(), 12);
    }

    #[test]
    fn non_positive_or_non_numeric_ids_are_bad_requests() {
        for raw in ["0", "-3", "abc", "1.5", ""] {
            let err = parse_card_id(raw).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{raw:?}");
        }
    }
}
