use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shop_error::{AppError, AppResult};
use shop_models::Role;
use tracing::{debug, warn};

/// Tokens expire one hour after issuance and are never renewed or revoked
/// server-side.
const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID). A token without a usable subject is not valid.
    pub sub: String,
    /// Role granted at issuance. Tokens lacking the claim still verify, but
    /// a missing role can never satisfy a role allow-list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue(&self, subject_id: &str, role: Role) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(TOKEN_TTL_SECS);

        let claims = Claims {
            sub: subject_id.to_string(),
            role: Some(role),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::ServerError(anyhow::anyhow!("Failed to sign token: {}", e)))
    }

    /// Verify a bearer token. Every defect - malformed token, wrong
    /// signature, expiry, missing subject claim - collapses into the same
    /// rejection so callers cannot probe which check failed.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(|e| {
                warn!("Token verification failed: {}", e);
                AppError::token_invalid()
            })?;

        if token_data.claims.sub.trim().is_empty() {
            warn!("Token verified but carries no subject claim");
            return Err(AppError::token_invalid());
        }

        debug!("Token verified for subject {}", token_data.claims.sub);
        Ok(token_data.claims)
    }
}
