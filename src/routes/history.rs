use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{error::AppResult, middleware::RequestId, models::NewHistoryEntry};

use super::{AppState, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct RecordPlayRequest {
    pub user_id: i64,
    #[serde(flatten)]
    pub track: NewHistoryEntry,
}

/// Records that a user started playing a track
pub async fn record(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<RecordPlayRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .store
        .add_history_entry(request.user_id, &request.track)
        .await?;
    tracing::debug!(
        request_id = %request_id,
        user_id = request.user_id,
        video_id = %request.track.video_id,
        "Play recorded"
    );
    Ok(MessageResponse::ok())
}
