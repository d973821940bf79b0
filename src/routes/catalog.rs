use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::SearchHit,
};

use super::AppState;

const SEARCH_LIMIT: usize = 20;
const UNKNOWN_ARTIST: &str = "Unknown artist";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    id: String,
}

#[derive(Debug, Serialize)]
pub struct StreamResponse {
    pub url: Option<String>,
}

/// Song search. Catalog failures produce an empty list.
pub async fn search(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<SearchHit>> {
    match state.catalog.search_songs(&params.q, SEARCH_LIMIT).await {
        Ok(songs) => Json(
            songs
                .iter()
                .filter_map(|song| song.to_search_hit(UNKNOWN_ARTIST))
                .collect(),
        ),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, query = %params.q, "Search failed");
            Json(Vec::new())
        }
    }
}

pub async fn suggestions(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<String>> {
    let suggestions = state
        .catalog
        .suggestions(&params.q)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(request_id = %request_id, error = %e, query = %params.q, "Suggestions failed");
            Vec::new()
        });
    Json(suggestions)
}

/// Direct audio URL for playback, `null` when it cannot be resolved
pub async fn stream(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(params): Query<TrackQuery>,
) -> Json<StreamResponse> {
    let url = match state.catalog.stream_source(&params.id).await {
        Ok(source) => source.map(|source| source.url),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, video_id = %params.id, "Stream lookup failed");
            None
        }
    };
    Json(StreamResponse { url })
}

/// Redirects the browser to the audio file
pub async fn download(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(params): Query<TrackQuery>,
) -> AppResult<Redirect> {
    match state.catalog.stream_source(&params.id).await {
        Ok(Some(source)) => {
            tracing::info!(request_id = %request_id, video_id = %params.id, title = %source.title, "Download redirect");
            Ok(Redirect::temporary(&source.url))
        }
        Ok(None) => Err(AppError::NotFound("Not found".to_string())),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, video_id = %params.id, "Download lookup failed");
            Err(AppError::NotFound("Not found".to_string()))
        }
    }
}
