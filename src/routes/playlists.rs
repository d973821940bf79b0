use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{NewPlaylistEntry, PlaylistEntry, PlaylistWithEntries},
};

use super::{AppState, MessageResponse, UserQuery};

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub user_id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddEntryRequest {
    pub playlist_id: i64,
    #[serde(flatten)]
    pub entry: NewPlaylistEntry,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub id: i64,
    pub name: String,
    pub songs: Vec<PlaylistEntry>,
    pub count: usize,
}

impl From<PlaylistWithEntries> for PlaylistResponse {
    fn from(playlist: PlaylistWithEntries) -> Self {
        Self {
            count: playlist.count(),
            id: playlist.playlist.id,
            name: playlist.playlist.name,
            songs: playlist.entries,
        }
    }
}

/// All playlists of a user, each with its songs
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> AppResult<Json<Vec<PlaylistResponse>>> {
    let playlists = state.store.list_playlists(params.user_id).await?;
    Ok(Json(playlists.into_iter().map(PlaylistResponse::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<CreatePlaylistRequest>,
) -> AppResult<Json<MessageResponse>> {
    let id = state.store.add_playlist(request.user_id, &request.name).await?;
    tracing::debug!(request_id = %request_id, playlist_id = id, user_id = request.user_id, "Playlist created");
    Ok(MessageResponse::ok())
}

pub async fn add_entry(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<AddEntryRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .store
        .add_playlist_entry(request.playlist_id, &request.entry)
        .await?;
    tracing::debug!(
        request_id = %request_id,
        playlist_id = request.playlist_id,
        video_id = %request.entry.video_id,
        "Song added to playlist"
    );
    Ok(MessageResponse::ok())
}
