use std::env;
use std::time::Duration;

use shop_error::{AppError, AppResult};
use tracing::{debug, warn};

/// Application configuration, loaded from the process environment (with
/// `.env` support via dotenv). `JWT_SECRET` is the only value whose absence
/// is fatal; everything else falls back to a development default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub uploads: UploadsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit: usize,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub namespace: String,
    pub database: String,
    pub pool_size: usize,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt: JwtConfig,
    pub admin_email: String,
    pub login_rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub max_attempts: usize,
    pub window_duration: Duration,
}

#[derive(Debug, Clone)]
pub struct UploadsConfig {
    pub directory: String,
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match optional(name).map(|v| v.parse::<T>()) {
        Some(Ok(value)) => value,
        Some(Err(_)) => {
            warn!("Ignoring unparsable value for {}", name);
            default
        }
        None => default,
    }
}

impl AppConfig {
    /// Load configuration from the environment. A missing `JWT_SECRET` is a
    /// startup failure, not something to limp past with a default.
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let jwt_secret = optional("JWT_SECRET").ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET is not set; refusing to start without a signing key"
            ))
        })?;

        let config = Self {
            environment: optional("APP_ENV").unwrap_or_else(|| "development".to_string()),
            server: ServerConfig {
                host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed_or("PORT", 4000),
                body_limit: parsed_or("BODY_LIMIT", 1_048_576),
                request_timeout: Duration::from_secs(parsed_or("REQUEST_TIMEOUT_SECS", 30)),
            },
            database: DatabaseConfig {
                endpoint: optional("DB_ENDPOINT").unwrap_or_else(|| "memory".to_string()),
                username: optional("SURREALDB_USERNAME").unwrap_or_else(|| "root".to_string()),
                password: optional("SURREALDB_PASSWORD").unwrap_or_else(|| "root".to_string()),
                namespace: optional("DB_NAMESPACE").unwrap_or_else(|| "shop".to_string()),
                database: optional("DB_NAME").unwrap_or_else(|| "shop".to_string()),
                pool_size: parsed_or("DB_POOL_SIZE", 5),
            },
            security: SecurityConfig {
                jwt: JwtConfig {
                    secret: jwt_secret.into_bytes(),
                },
                admin_email: optional("ADMIN_EMAIL").unwrap_or_default(),
                login_rate_limit: RateLimitSettings {
                    max_attempts: parsed_or("LOGIN_RATE_MAX", 5),
                    window_duration: Duration::from_secs(parsed_or(
                        "LOGIN_RATE_WINDOW_SECS",
                        900,
                    )),
                },
            },
            uploads: UploadsConfig {
                directory: optional("UPLOADS_DIR")
                    .unwrap_or_else(|| "public/uploads".to_string()),
            },
        };

        debug!("Configuration loaded for environment: {}", config.environment);

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Vec::new();
        let is_production = self.environment == "production";

        if self.server.host.trim().is_empty() {
            errors.push("Server host cannot be empty".to_string());
        }

        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        if self.database.endpoint.trim().is_empty() {
            errors.push("Database endpoint cannot be empty".to_string());
        }

        if self.database.namespace.trim().is_empty() {
            errors.push("Database namespace cannot be empty".to_string());
        }

        if self.database.database.trim().is_empty() {
            errors.push("Database name cannot be empty".to_string());
        }

        if is_production && self.security.jwt.secret.len() < 32 {
            errors.push("JWT secret is not secure for production use".to_string());
        }

        if is_production && self.database.username == "root" {
            errors.push("Using the default 'root' database username in production".to_string());
        }

        if self.security.login_rate_limit.max_attempts == 0 {
            errors.push("Login rate limit must allow at least one attempt".to_string());
        }

        if self.security.admin_email.trim().is_empty() {
            // Not fatal: with no admin email configured, no login can elevate.
            warn!("ADMIN_EMAIL is not set; no account will receive the admin role");
        }

        if !errors.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Invalid configuration: {}",
                errors.join(", ")
            )));
        }
        Ok(())
    }
}
