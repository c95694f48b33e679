use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{net::IpAddr, str::FromStr, sync::Arc};
use tracing::{error, info, warn};

use shop_auth::JwtService;
use shop_error::AppError;
use shop_models::Role;

use crate::limits::{LoginRateLimiter, RateLimitStatus};

// Extract client identifier from request
pub fn extract_client_id(req: &Request<Body>) -> String {
    if let Some(ip) = get_client_ip(req) {
        return ip.to_string();
    }

    "unknown".to_string()
}

// Get client IP from various headers or connection info
pub fn get_client_ip(req: &Request<Body>) -> Option<IpAddr> {
    // Try X-Forwarded-For header first (common for proxies)
    if let Some(forward) = req.headers().get("X-Forwarded-For") {
        if let Ok(forward_str) = forward.to_str() {
            if let Some(ip) = forward_str.split(',').next() {
                if let Ok(ip_addr) = IpAddr::from_str(ip.trim()) {
                    return Some(ip_addr);
                }
            }
        }
    }

    // Try X-Real-IP header (used by some proxies)
    if let Some(real_ip) = req.headers().get("X-Real-IP") {
        if let Ok(real_ip_str) = real_ip.to_str() {
            if let Ok(ip_addr) = IpAddr::from_str(real_ip_str.trim()) {
                return Some(ip_addr);
            }
        }
    }

    req.extensions()
        .get::<axum::extract::connect_info::ConnectInfo<std::net::SocketAddr>>()
        .map(|connect_info| connect_info.ip())
}

// Add rate limit headers to response
fn add_rate_limit_headers(response: &mut Response, status: &RateLimitStatus) {
    let headers = response.headers_mut();

    headers.insert("X-RateLimit-Limit", HeaderValue::from(status.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(status.remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(status.window_reset));
}

/// Login throttle, applied only to the login route. The rejection happens
/// before the handler runs, so a throttled client never reaches the store.
pub async fn login_rate_limit(
    State(rate_limiter): State<Arc<LoginRateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client_id = extract_client_id(&req);

    match rate_limiter.check(&client_id).await {
        Ok(()) => {
            let status = rate_limiter.status(&client_id).await;
            let mut response = next.run(req).await;
            add_rate_limit_headers(&mut response, &status);
            response
        }
        Err(err) => {
            warn!("Login rate limit exceeded for client {}", client_id);
            let status = rate_limiter.status(&client_id).await;
            let mut response = err.into_response();
            add_rate_limit_headers(&mut response, &status);
            response
        }
    }
}

/// First half of the request gate: demand a `Bearer` token, verify it, and
/// attach the claims for downstream role checks.
pub async fn require_auth(
    State(jwt_service): State<Arc<JwtService>>,
    headers: HeaderMap,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_str = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(AppError::token_missing());
    };

    let claims = jwt_service.verify(token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Role allow-list for [`authorize`]; must be layered inside [`require_auth`].
#[derive(Debug, Clone)]
pub struct RequiredRoles(pub Vec<Role>);

impl RequiredRoles {
    pub fn any_of(roles: impl IntoIterator<Item = Role>) -> Self {
        Self(roles.into_iter().collect())
    }
}

/// Second half of the request gate. An absent identity, an identity without
/// a role, and a role outside the allow-list all take the same 403 path.
pub async fn authorize(
    State(required): State<RequiredRoles>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let role = req
        .extensions()
        .get::<shop_auth::Claims>()
        .and_then(|claims| claims.role);

    match role {
        Some(role) if required.0.contains(&role) => Ok(next.run(req).await),
        _ => Err(AppError::forbidden()),
    }
}

// Security headers middleware
pub async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("X-XSS-Protection", HeaderValue::from_static("1; mode=block"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static(
            "default-src 'self'; script-src 'self' 'unsafe-inline'; \
             img-src 'self' data: https://images.unsplash.com; \
             style-src 'self' 'unsafe-inline';",
        ),
    );

    response
}

// Logging middleware with latency tracking
pub async fn request_logging(req: Request<Body>, next: Next) -> Response {
    use std::time::Instant;

    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let client = extract_client_id(&req);

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();

    if status < 400 {
        info!(
            method = %method,
            path = %path,
            client = %client,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    } else if status < 500 {
        warn!(
            method = %method,
            path = %path,
            client = %client,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        error!(
            method = %method,
            path = %path,
            client = %client,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    }

    response
}
