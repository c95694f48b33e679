use axum::Json;
use serde_json::{Value, json};

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Reachable with any verified identity.
pub async fn protected() -> Json<Value> {
    Json(json!({ "msg": "Access granted" }))
}

/// Reachable only with the admin role.
pub async fn admin() -> Json<Value> {
    Json(json!({ "msg": "Admin access granted" }))
}
