use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use shop_config::AppConfig;
use shop_error::middleware_handling::error_handling_middleware;
use shop_middleware::{
    RequiredRoles,
    api::{authorize, login_rate_limit, request_logging, require_auth, security_headers},
    limits::LoginRateLimiter,
};
use shop_models::Role;

use crate::{handlers, state::AppState};

pub fn create_routes(
    state: AppState,
    login_limiter: Arc<LoginRateLimiter>,
    config: &AppConfig,
) -> Router {
    let jwt_service = state.auth.jwt_service();

    // The login route carries the client throttle; a limited client is
    // rejected before the handler (and the store) is ever reached.
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route(
            "/api/auth/login",
            post(handlers::auth::login)
                .route_layer(from_fn_with_state(login_limiter, login_rate_limit)),
        );

    // require_auth is the outer layer, so it always runs before authorize.
    let gated_routes = Router::new()
        .route("/api/protected", get(handlers::access::protected))
        .route_layer(from_fn_with_state(jwt_service.clone(), require_auth))
        .route(
            "/api/admin",
            get(handlers::access::admin)
                .route_layer(from_fn_with_state(
                    RequiredRoles::any_of([Role::Admin]),
                    authorize,
                ))
                .route_layer(from_fn_with_state(jwt_service, require_auth)),
        );

    let catalog_routes = Router::new()
        .route("/api/products/add", post(handlers::products::add_product))
        .route("/api/products", get(handlers::products::list_products))
        .route(
            "/api/products/{id}",
            put(handlers::products::update_product).delete(handlers::products::delete_product),
        );

    let cart_routes = Router::new()
        .route("/api/cart/add", post(handlers::cart::add_to_cart))
        .route("/api/cart/{user_id}", get(handlers::cart::get_cart))
        .route("/api/cart/remove", delete(handlers::cart::remove_from_cart));

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.server.request_timeout))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/health", get(handlers::access::health_check))
        .merge(auth_routes)
        .merge(gated_routes)
        .merge(catalog_routes)
        .merge(cart_routes)
        .nest_service("/uploads", ServeDir::new(&state.uploads_dir))
        .with_state(state)
        .layer(from_fn(error_handling_middleware))
        .layer(RequestBodyLimitLayer::new(config.server.body_limit))
        .layer(from_fn(request_logging))
        .layer(from_fn(security_headers))
        .layer(middleware_stack)
}
