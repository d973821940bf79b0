use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One play event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub id: i64,
    pub user_id: i64,
    pub video_id: String,
    /// Gateway artist id, when the client knew it
    pub artist_id: Option<String>,
    pub artist_name: String,
    pub title: String,
    pub played_at: DateTime<Utc>,
}

/// Track data for recording a play
#[derive(Debug, Clone, Deserialize)]
pub struct NewHistoryEntry {
    pub video_id: String,
    pub title: String,
    #[serde(rename = "artist")]
    pub artist_name: String,
    #[serde(default)]
    pub artist_id: Option<String>,
}
