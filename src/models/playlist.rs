use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-owned playlist. `user_id` is not checked against the users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Playlist {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A song stored in a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct PlaylistEntry {
    pub id: i64,
    pub playlist_id: i64,
    pub video_id: String,
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
    pub added_at: DateTime<Utc>,
}

/// Track data for appending to a playlist
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlaylistEntry {
    pub video_id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub thumbnail: String,
}

/// A playlist together with its entries, oldest first
#[derive(Debug, Clone)]
pub struct PlaylistWithEntries {
    pub playlist: Playlist,
    pub entries: Vec<PlaylistEntry>,
}

impl PlaylistWithEntries {
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
