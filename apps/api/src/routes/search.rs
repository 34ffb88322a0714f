//! Anime title search for the dashboard's autocomplete.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::anilist::SearchPrediction;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub result: SearchResult,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub predictions: Vec<SearchPrediction>,
}

/// GET /api/v1/search
///
/// An empty query short-circuits to an empty prediction list without touching
/// the upstream.
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let search = params.q.trim();
    if search.is_empty() {
        return Ok(Json(SearchResponse {
            result: SearchResult {
                predictions: Vec::new(),
            },
        }));
    }

    let predictions = state
        .anilist
        .search(search)
        .await
        .map_err(|err| AppError::Upstream(err.to_string()))?;

    Ok(Json(SearchResponse {
        result: SearchResult { predictions },
    }))
}
