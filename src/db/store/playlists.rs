use std::collections::HashMap;

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{NewPlaylistEntry, Playlist, PlaylistEntry, PlaylistWithEntries},
};

use super::Store;

impl Store {
    /// Creates an empty playlist and returns its id
    pub async fn add_playlist(&self, user_id: i64, name: &str) -> AppResult<i64> {
        let done = sqlx::query("INSERT INTO playlists (user_id, name, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(done.last_insert_rowid())
    }

    /// Appends a track to a playlist and returns the entry id
    pub async fn add_playlist_entry(
        &self,
        playlist_id: i64,
        track: &NewPlaylistEntry,
    ) -> AppResult<i64> {
        let done = sqlx::query(
            "INSERT INTO playlist_songs (playlist_id, video_id, title, artist, thumbnail, added_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(playlist_id)
        .bind(&track.video_id)
        .bind(&track.title)
        .bind(&track.artist)
        .bind(&track.thumbnail)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(done.last_insert_rowid())
    }

    /// Every playlist of a user with its entries in insertion order
    pub async fn list_playlists(&self, user_id: i64) -> AppResult<Vec<PlaylistWithEntries>> {
        let playlists = sqlx::query_as::<_, Playlist>(
            "SELECT id, user_id, name, created_at FROM playlists WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if playlists.is_empty() {
            return Ok(Vec::new());
        }

        let entries = sqlx::query_as::<_, PlaylistEntry>(
            "SELECT s.id, s.playlist_id, s.video_id, s.title, s.artist, s.thumbnail, s.added_at
             FROM playlist_songs s
             JOIN playlists p ON p.id = s.playlist_id
             WHERE p.user_id = ?
             ORDER BY s.added_at ASC, s.id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_playlist: HashMap<i64, Vec<PlaylistEntry>> = HashMap::new();
        for entry in entries {
            by_playlist.entry(entry.playlist_id).or_default().push(entry);
        }

        Ok(playlists
            .into_iter()
            .map(|playlist| {
                let entries = by_playlist.remove(&playlist.id).unwrap_or_default();
                PlaylistWithEntries { playlist, entries }
            })
            .collect())
    }
}
