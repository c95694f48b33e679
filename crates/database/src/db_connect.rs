use anyhow::Context;
use shop_config::DatabaseConfig;
use shop_error::AppError;
use std::sync::Arc;

use crate::{Database, service::DbCredentials};

pub async fn initialize_db(db_config: &DatabaseConfig) -> Result<Arc<Database>, AppError> {
    tracing::debug!("Connecting to SurrealDB: {}", db_config.endpoint);

    let is_secure = db_config.endpoint.starts_with("wss://");
    if is_secure {
        tracing::info!("Using secure TLS connection to database");
    } else if !db_config.endpoint.contains("memory") {
        tracing::warn!("Using non-secure database connection");
    }

    let credentials = DbCredentials::new(&db_config.username, &db_config.password);

    let db = if db_config.endpoint.contains("memory") {
        Database::initialize_memory_db(
            db_config.pool_size,
            &db_config.namespace,
            &db_config.database,
        )
        .await?
    } else {
        Database::initialize(
            &db_config.endpoint,
            db_config.pool_size,
            &db_config.namespace,
            &db_config.database,
            &credentials,
        )
        .await?
    };

    initialize_schema(&db).await?;

    tracing::info!(
        "Connected to SurrealDB with a pool of {} connections",
        db_config.pool_size
    );

    Ok(Arc::new(db))
}

pub async fn initialize_memory_db() -> Result<Arc<Database>, AppError> {
    let db = Database::initialize_memory_db(10, "shop", "shop").await?;

    initialize_schema(&db).await?;

    tracing::info!("Connected to in-memory SurrealDB");

    Ok(Arc::new(db))
}

/// One user record per email: the unique index is the race-breaker for
/// concurrent registrations that both pass the lookup.
pub async fn initialize_schema(db: &Database) -> Result<(), AppError> {
    let conn = db.get_connection().await?;

    conn.get_ref()
        .query("DEFINE INDEX IF NOT EXISTS unique_email ON TABLE users COLUMNS email UNIQUE")
        .await
        .context("Failed to define unique email index")
        .map_err(AppError::DatabaseError)?
        .check()
        .context("Failed to define unique email index")
        .map_err(AppError::DatabaseError)?;

    Ok(())
}
