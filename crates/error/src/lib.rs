pub mod middleware_handling;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    ConfigError(anyhow::Error),
    DatabaseError(anyhow::Error),
    ServerError(anyhow::Error),
    ValidationError(String),
    InvalidCredentials,
    ResourceExistsError(String),
    NotFoundError(String),
    AuthenticationError(String),
    AuthorizationError(String),
    RateLimitError(String),
}

impl AppError {
    /// Login failures never reveal whether the account exists.
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }

    pub fn token_missing() -> Self {
        Self::AuthenticationError("No token, authorization denied".to_string())
    }

    /// Uniform rejection for every token defect: bad signature, expiry,
    /// malformed payload, missing subject claim.
    pub fn token_invalid() -> Self {
        Self::AuthenticationError("Token is not valid".to_string())
    }

    pub fn forbidden() -> Self {
        Self::AuthorizationError("Forbidden".to_string())
    }

    pub fn resource_not_found(resource_type: &str) -> Self {
        Self::NotFoundError(format!("{} not found", resource_type))
    }

    /// Re-tag an infrastructure failure for boundaries that report the
    /// generic "Server error" message instead of the database-specific one.
    pub fn server_boundary(self) -> Self {
        match self {
            Self::DatabaseError(e) => Self::ServerError(e),
            other => other,
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::ServerError(error)
    }
}

// Human-friendly error messages
impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(e) => write!(f, "Configuration error: {}", e),
            Self::DatabaseError(e) => write!(f, "Database error: {}", e),
            Self::ServerError(e) => write!(f, "Server error: {}", e),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::InvalidCredentials => write!(f, "Invalid credentials"),
            Self::ResourceExistsError(msg) => write!(f, "Resource exists: {}", msg),
            Self::NotFoundError(msg) => write!(f, "Not found: {}", msg),
            Self::AuthenticationError(msg) => write!(f, "Authentication error: {}", msg),
            Self::AuthorizationError(msg) => write!(f, "Authorization error: {}", msg),
            Self::RateLimitError(msg) => write!(f, "Rate limit error: {}", msg),
        }
    }
}

/// Wire shape for every error response: `{"msg": ...}`, plus the raw error
/// text on infrastructure failures (internal boundary, not sanitized).
#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg, error) = match &self {
            Self::ConfigError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error".to_string(),
                None,
            ),
            Self::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database operation timeout or connection issue".to_string(),
                Some(e.to_string()),
            ),
            Self::ServerError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
                Some(e.to_string()),
            ),
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            Self::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "Invalid credentials".to_string(),
                None,
            ),
            Self::ResourceExistsError(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            Self::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            Self::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            Self::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
            Self::RateLimitError(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone(), None),
        };

        if status.is_server_error() {
            tracing::error!(status_code = %status.as_u16(), "{}", self);
        } else {
            tracing::warn!(status_code = %status.as_u16(), "{}", self);
        }

        (status, Json(ErrorResponse { msg, error })).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

// Extension trait to wrap anyhow errors with specific context
pub trait AppErrorExt<T> {
    fn config_err(self) -> AppResult<T>;
    fn db_err(self) -> AppResult<T>;
    fn server_err(self) -> AppResult<T>;
}

impl<T, E> AppErrorExt<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn config_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::ConfigError(e.into()))
    }

    fn db_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::DatabaseError(e.into()))
    }

    fn server_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::ServerError(e.into()))
    }
}
