use crate::{error::AppResult, models::User};

use super::Store;

impl Store {
    /// Registers a new, unverified user.
    ///
    /// Returns `false` when the username or the email is already in use. The
    /// unique constraints decide, so concurrent registrations of the same name
    /// produce exactly one winner.
    pub async fn create_user(
        &self,
        username: &str,
        raw_password: &str,
        email: &str,
        verification_token: &str,
    ) -> AppResult<bool> {
        let password_hash = self.passwords.hash(raw_password).await?;

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, email, verification_token, is_verified)
             VALUES (?, ?, ?, ?, 0)",
        )
        .bind(username)
        .bind(&password_hash)
        .bind(email)
        .bind(verification_token)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                tracing::info!(
                    user_id = done.last_insert_rowid(),
                    username = %username,
                    "User created"
                );
                Ok(true)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::info!(username = %username, "Username or email already taken");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the user when the password matches, `None` otherwise.
    ///
    /// Unverified users are returned too; gating on `is_verified` is up to
    /// the caller.
    pub async fn verify_credentials(
        &self,
        username: &str,
        raw_password: &str,
    ) -> AppResult<Option<User>> {
        let Some(user) = self.user_by_username(username).await? else {
            return Ok(None);
        };

        if self
            .passwords
            .verify(raw_password, &user.password_hash)
            .await?
        {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Marks the user holding `token` as verified and clears the token.
    ///
    /// Single conditional update: the affected row count tells whether the
    /// token matched, so a consumed token (or a concurrent second attempt)
    /// yields `false`.
    pub async fn activate_user(&self, token: &str) -> AppResult<bool> {
        if token.is_empty() {
            return Ok(false);
        }

        let done = sqlx::query(
            "UPDATE users SET is_verified = 1, verification_token = NULL
             WHERE verification_token = ?",
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(done.rows_affected() > 0)
    }

    pub async fn user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, verification_token, is_verified
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn user_count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
