use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{AppError, AppResult};

/// Argon2id password hashing with a random salt per password.
///
/// Hashing is deliberately slow, so both directions run on the blocking
/// thread pool instead of stalling the async workers.
#[derive(Clone, Default)]
pub struct PasswordHashing {
    argon: Argon2<'static>,
}

impl PasswordHashing {
    /// Argon2id with the crate's recommended default cost
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with explicit cost parameters (memory in KiB, iterations,
    /// parallelism). Tests use this to keep hashing cheap.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> AppResult<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AppError::Internal(format!("Invalid argon2 parameters: {}", e)))?;

        Ok(Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes a password into a PHC string
    pub async fn hash(&self, password: &str) -> AppResult<String> {
        let argon = self.argon.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Checks a password against a stored PHC string
    ///
    /// A mismatch is `Ok(false)`. So is a stored value that is not a PHC
    /// string (e.g. a hash written by another scheme), which is logged.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> AppResult<bool> {
        let argon = self.argon.clone();
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed = match PasswordHash::new(&stored_hash) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(error = %e, "Stored password hash is not a PHC string");
                    return Ok(false);
                }
            };
            Ok(argon.verify_password(password.as_bytes(), &parsed).is_ok())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
