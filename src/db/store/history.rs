use chrono::Utc;

use crate::{
    error::AppResult,
    models::{HistoryEntry, NewHistoryEntry},
};

use super::Store;

impl Store {
    /// Logs one play event and returns its id
    pub async fn add_history_entry(&self, user_id: i64, track: &NewHistoryEntry) -> AppResult<i64> {
        let done = sqlx::query(
            "INSERT INTO history (user_id, video_id, artist_id, artist_name, title, played_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&track.video_id)
        .bind(&track.artist_id)
        .bind(&track.artist_name)
        .bind(&track.title)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(done.last_insert_rowid())
    }

    /// The most recent play of a user. Equal timestamps go to the later row.
    pub async fn latest_history_entry(&self, user_id: i64) -> AppResult<Option<HistoryEntry>> {
        let entry = sqlx::query_as::<_, HistoryEntry>(
            "SELECT id, user_id, video_id, artist_id, artist_name, title, played_at
             FROM history
             WHERE user_id = ?
             ORDER BY played_at DESC, id DESC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }
}
