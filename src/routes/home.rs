use axum::{
    extract::{Query, State},
    Json,
};

use crate::{middleware::RequestId, models::HomeFeed};

use super::{AppState, UserQuery};

/// Home screen section. Falls back internally and never errors.
pub async fn home_feed(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(params): Query<UserQuery>,
) -> Json<HomeFeed> {
    let feed = state.feed.home_feed(params.user_id).await;
    tracing::info!(
        request_id = %request_id,
        user_id = params.user_id,
        title = %feed.title,
        tracks = feed.tracks.len(),
        "Home feed served"
    );
    Json(feed)
}
