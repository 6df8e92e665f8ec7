//! HTTP routes and handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use visage_search::{SearchError, SearchMatch};

use crate::response::ApiError;
use crate::AppState;

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/search", post(search))
        .route("/api/images/:id", put(index_image).delete(remove_image))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct IngestParams {
    url: Option<String>,
    source_url: Option<String>,
}

/// One entry of the public search response.
#[derive(Debug, Serialize)]
struct MatchResponse {
    url: String,
    similarity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_url: Option<String>,
}

impl From<SearchMatch> for MatchResponse {
    fn from(m: SearchMatch) -> Self {
        Self {
            url: m.url,
            similarity: m.similarity,
            source_url: m.source_url,
        }
    }
}

/// The payload must declare an image content type; anything else is a
/// client error, checked before any work is done.
fn require_image_payload(headers: &HeaderMap) -> Result<(), ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.starts_with("image/") {
        return Err(SearchError::InvalidInput(format!(
            "expected an image content type, got '{content_type}'"
        ))
        .into());
    }
    Ok(())
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Vec<MatchResponse>>, ApiError> {
    require_image_payload(&headers)?;

    let limit = params.limit.unwrap_or(10);
    if limit == 0 {
        return Err(SearchError::InvalidInput("limit must be >= 1".to_string()).into());
    }

    let matches = state.engine.search_by_image(&body, limit).await?;
    Ok(Json(matches.into_iter().map(MatchResponse::from).collect()))
}

async fn index_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<IngestParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    require_image_payload(&headers)?;

    state
        .engine
        .index_image(&id, &body, params.url.as_deref(), params.source_url.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state.engine.remove_image(&id).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, ApiError> {
    let indexed = state.engine.indexed_count()?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "indexed_images": indexed,
        "dimension": state.engine.dimension(),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
