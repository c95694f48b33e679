use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use shop_error::{AppError, AppResult};
use tracing::{debug, error};

/// Slow, salted, one-way credential hashing. Hashing happens only on the
/// plaintext-to-store path; verification only on the login path. The cost
/// parameters are the library defaults - configuration, not a secret.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> AppResult<String>;
    fn verify(&self, password: &str, password_hash: &str) -> AppResult<bool>;
}

/// Production hasher: Argon2id with a fresh OS-random salt per hash.
#[derive(Debug, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!("Failed to hash password: {}", e);
                AppError::ServerError(anyhow::anyhow!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    fn verify(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(password_hash).map_err(|e| {
            error!("Invalid password hash: {}", e);
            AppError::ServerError(anyhow::anyhow!("Invalid password hash: {}", e))
        })?;

        let is_valid = Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();

        debug!("Password verification result: {}", is_valid);
        Ok(is_valid)
    }
}
