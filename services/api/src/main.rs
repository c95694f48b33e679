use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shop_api::{AppState, routes};
use shop_auth::AuthService;
use shop_config::AppConfig;
use shop_database::{DB_ARC, db_connect::initialize_db, service::DbService};
use shop_error::{AppError, AppErrorExt};
use shop_middleware::limits::create_login_rate_limiter;
use shop_models::{cart::Cart, product::Product, user::User};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // A missing JWT_SECRET fails here, before anything is listening.
    let config = AppConfig::from_env()?;

    let db_arc = DB_ARC
        .get_or_init(|| async {
            initialize_db(&config.database).await.unwrap_or_else(|e| {
                error!("Database initialization failed: {}", e);
                panic!("Database initialization failed");
            })
        })
        .await;

    tokio::fs::create_dir_all(&config.uploads.directory)
        .await
        .context("Failed to create uploads directory")
        .server_err()?;

    let user_db = Arc::new(DbService::<User>::new(db_arc, "users"));
    let product_db = Arc::new(DbService::<Product>::new(db_arc, "products"));
    let cart_db = Arc::new(DbService::<Cart>::new(db_arc, "carts"));

    let auth_service = Arc::new(
        AuthService::new(&config.security.jwt.secret, user_db)
            .with_admin_email(config.security.admin_email.clone()),
    );

    let login_limiter = Arc::new(create_login_rate_limiter(
        config.security.login_rate_limit.max_attempts,
        config.security.login_rate_limit.window_duration,
    ));

    let state = AppState {
        auth: auth_service,
        products: product_db,
        carts: cart_db,
        uploads_dir: config.uploads.directory.clone(),
    };

    let app = routes::create_routes(state, login_limiter, &config);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .context(format!("Failed to bind to address: {}", address))
        .server_err()?;

    info!("Server listening on {}", address);

    axum::serve(listener, app)
        .await
        .context("Server error")
        .server_err()?;

    Ok(())
}
