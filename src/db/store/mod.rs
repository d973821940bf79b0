//! Relational storage for users, playlists, playlist entries and history.
//!
//! Owner ids (`user_id`, `playlist_id`) are soft references: nothing checks
//! that the owner exists and nothing cascades. Every method borrows a pooled
//! connection for its own statements only; no transaction outlives a call.

use sqlx::SqlitePool;

use crate::services::password::PasswordHashing;

mod history;
mod playlists;
mod users;

/// Handle to the persistence store. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    passwords: PasswordHashing,
}

impl Store {
    pub fn new(pool: SqlitePool, passwords: PasswordHashing) -> Self {
        Self { pool, passwords }
    }

    /// Opens (and migrates) the database at `database_url`
    pub async fn connect(database_url: &str, passwords: PasswordHashing) -> anyhow::Result<Self> {
        let pool = super::create_pool(database_url).await?;
        Ok(Self::new(pool, passwords))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
