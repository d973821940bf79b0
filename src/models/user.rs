use std::fmt;

/// A registered account.
///
/// `verification_token` is set while the account waits for email
/// confirmation and cleared on activation, together with `is_verified`.
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub verification_token: Option<String>,
    pub is_verified: bool,
}

// Hand-written so hashes and tokens never end up in logs
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("is_verified", &self.is_verified)
            .finish_non_exhaustive()
    }
}
