use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::User,
    services::mailer::Mailer,
};

/// Random bytes behind each verification token
const TOKEN_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum AccountError {
    /// Username or email already registered. Which one is not reported.
    #[error("Username or email is already taken.")]
    Taken,
    #[error(transparent)]
    Store(#[from] AppError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password
    #[error("Invalid username or password.")]
    InvalidCredentials,
    /// Correct credentials, but the email address was never confirmed
    #[error("Account is not active. Check your email.")]
    NotVerified,
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<AccountError> for AppError {
    fn from(error: AccountError) -> Self {
        match error {
            AccountError::Taken => AppError::InvalidInput(error.to_string()),
            AccountError::Store(e) => e,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => AppError::Unauthorized(error.to_string()),
            AuthError::NotVerified => AppError::Forbidden(error.to_string()),
            AuthError::Store(e) => e,
        }
    }
}

/// Generates a URL-safe verification token, independent of any user input
pub fn generate_verification_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Registration, login and activation on top of the store.
///
/// Accounts move one way, from unverified to verified, and only through
/// [`AccountManager::activate`] with the token issued at registration.
#[derive(Clone)]
pub struct AccountManager {
    store: Store,
    mailer: Arc<dyn Mailer>,
    public_url: String,
}

impl AccountManager {
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, public_url: String) -> Self {
        Self {
            store,
            mailer,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates an unverified account and returns its verification token.
    ///
    /// Delivering the token is a separate step (see
    /// [`AccountManager::send_verification`]) that runs only once the account
    /// exists.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<String, AccountError> {
        let token = generate_verification_token();

        if !self
            .store
            .create_user(username, password, email, &token)
            .await?
        {
            return Err(AccountError::Taken);
        }

        Ok(token)
    }

    /// Link the user follows to activate the account
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/verify?token={}", self.public_url, token)
    }

    /// Emails the verification link. Failures are logged and reported as
    /// `false`; the account stays in place, unverified.
    pub async fn send_verification(&self, email: &str, token: &str) -> bool {
        let link = self.verification_link(token);

        match self.mailer.send_verification(email, &link).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, to = %email, "Verification email delivery failed");
                false
            }
        }
    }

    /// Checks credentials and requires a verified account
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .store
            .verify_credentials(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_verified {
            return Err(AuthError::NotVerified);
        }

        Ok(user)
    }

    /// Consumes a verification token
    pub async fn activate(&self, token: &str) -> AppResult<bool> {
        let activated = self.store.activate_user(token).await?;
        if activated {
            tracing::info!("Account activated");
        } else {
            tracing::info!("Activation attempted with unknown or used token");
        }
        Ok(activated)
    }
}
