use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use shop_api::{AppState, routes::create_routes};
use shop_auth::AuthService;
use shop_config::{
    AppConfig, DatabaseConfig, JwtConfig, RateLimitSettings, SecurityConfig, ServerConfig,
    UploadsConfig,
};
use shop_database::{DB_ARC, db_connect::initialize_memory_db, service::DbService};
use shop_middleware::limits::create_login_rate_limiter;
use shop_models::{cart::Cart, product::Product, user::User};

const JWT_SECRET: &[u8] = b"integration_test_secret";
const ADMIN_EMAIL: &str = "admin@example.com";

fn test_config(uploads_dir: &str) -> AppConfig {
    AppConfig {
        environment: "test".to_string(),
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 4000,
            body_limit: 1_048_576,
            request_timeout: Duration::from_secs(5),
        },
        database: DatabaseConfig {
            endpoint: "memory".to_string(),
            username: "root".to_string(),
            password: "root".to_string(),
            namespace: "shop".to_string(),
            database: "shop".to_string(),
            pool_size: 5,
        },
        security: SecurityConfig {
            jwt: JwtConfig {
                secret: JWT_SECRET.to_vec(),
            },
            admin_email: ADMIN_EMAIL.to_string(),
            login_rate_limit: RateLimitSettings {
                max_attempts: 5,
                window_duration: Duration::from_secs(900),
            },
        },
        uploads: UploadsConfig {
            directory: uploads_dir.to_string(),
        },
    }
}

async fn test_app(uploads_dir: &str) -> Router {
    let db_arc = DB_ARC
        .get_or_init(|| async {
            initialize_memory_db()
                .await
                .expect("Database initialization failed")
        })
        .await;

    let user_db = Arc::new(DbService::<User>::new(db_arc, "users"));
    let product_db = Arc::new(DbService::<Product>::new(db_arc, "products"));
    let cart_db = Arc::new(DbService::<Cart>::new(db_arc, "carts"));

    let auth_service =
        Arc::new(AuthService::new(JWT_SECRET, user_db).with_admin_email(ADMIN_EMAIL));

    let config = test_config(uploads_dir);
    let login_limiter = Arc::new(create_login_rate_limiter(
        config.security.login_rate_limit.max_attempts,
        config.security.login_rate_limit.window_duration,
    ));

    let state = AppState {
        auth: auth_service,
        products: product_db,
        carts: cart_db,
        uploads_dir: uploads_dir.to_string(),
    };

    create_routes(state, login_limiter, &config)
}

async fn app() -> Router {
    test_app(env!("CARGO_TARGET_TMPDIR")).await
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_payload(email: &str) -> Value {
    json!({
        "name": "Test User",
        "email": email,
        "phone": "0123456789",
        "password": "StrongP@ss1",
        "gender": "female",
    })
}

async fn register(app: &Router, email: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            register_payload(email),
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

// ---------------------------------------------------------------------------
// Auth flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_returns_201_with_token() {
    let app = app().await;

    let (status, body) = register(&app, "register-ok@example.com").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["msg"], "User registered successfully");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = app().await;

    let (first, _) = register(&app, "duplicate@example.com").await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, body) = register(&app, "duplicate@example.com").await;
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "User already exists");
}

#[tokio::test]
async fn weak_password_is_rejected() {
    let app = app().await;

    let mut payload = register_payload("weak-pass@example.com");
    payload["password"] = json!("123");

    let response = app
        .oneshot(json_request("POST", "/api/auth/register", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["msg"], "Password is too weak");
}

#[tokio::test]
async fn malicious_email_is_rejected_even_with_strong_password() {
    let app = app().await;

    let payload = register_payload("<script>alert(1)</script>");

    let response = app
        .oneshot(json_request("POST", "/api/auth/register", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["msg"], "Invalid or malicious email");
}

#[tokio::test]
async fn login_succeeds_with_user_role() {
    let app = app().await;

    register(&app, "login-user@example.com").await;

    let (status, body) = login(&app, "login-user@example.com", "StrongP@ss1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "User login successful");
    assert_eq!(body["role"], "user");
    assert!(body["token"].is_string());
    assert!(body["userId"].is_string());
}

#[tokio::test]
async fn admin_email_login_gets_admin_role() {
    let app = app().await;

    // May race with other tests that also provision the admin account.
    register(&app, ADMIN_EMAIL).await;

    let (status, body) = login(&app, ADMIN_EMAIL, "StrongP@ss1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
    assert_eq!(body["msg"], "Admin login successful");
}

#[tokio::test]
async fn wrong_password_and_unknown_account_are_indistinguishable() {
    let app = app().await;

    register(&app, "uniform-msg@example.com").await;

    let (wrong_status, wrong_body) =
        login(&app, "uniform-msg@example.com", "WrongPassword1!").await;
    let (unknown_status, unknown_body) = login(&app, "ghost@example.com", "StrongP@ss1").await;

    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_body["msg"], "Invalid credentials");
    assert_eq!(wrong_body["msg"], unknown_body["msg"]);
}

#[tokio::test]
async fn sixth_login_attempt_from_one_client_is_throttled() {
    let app = app().await;

    register(&app, "throttled@example.com").await;

    // Same originating client for every attempt; credentials are valid, so
    // only the throttle can produce a non-200.
    for _ in 0..5 {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Forwarded-For", "198.51.100.42")
            .body(Body::from(
                json!({ "email": "throttled@example.com", "password": "StrongP@ss1" })
                    .to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Forwarded-For", "198.51.100.42")
        .body(Body::from(
            json!({ "email": "throttled@example.com", "password": "StrongP@ss1" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        json_body(response).await["msg"],
        "Too many login attempts. Please try again later."
    );
}

// ---------------------------------------------------------------------------
// Request gate
// ---------------------------------------------------------------------------

fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn token_for(app: &Router, email: &str) -> String {
    // Tests share one in-memory store; the account may already exist.
    register(app, email).await;
    let (status, body) = login(app, email, "StrongP@ss1").await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn protected_route_without_token_is_denied() {
    let app = app().await;

    let response = app.oneshot(get_with_token("/api/protected", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await["msg"],
        "No token, authorization denied"
    );
}

#[tokio::test]
async fn protected_route_with_garbage_token_is_denied() {
    let app = app().await;

    let response = app
        .oneshot(get_with_token("/api/protected", Some("garbage.token.value")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["msg"], "Token is not valid");
}

#[tokio::test]
async fn protected_route_with_valid_token_is_admitted() {
    let app = app().await;
    let token = token_for(&app, "gate-user@example.com").await;

    let response = app
        .oneshot(get_with_token("/api/protected", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["msg"], "Access granted");
}

#[tokio::test]
async fn admin_route_rejects_plain_users_and_admits_admins() {
    let app = app().await;

    let user_token = token_for(&app, "gate-plain@example.com").await;
    let admin_token = token_for(&app, ADMIN_EMAIL).await;

    let response = app
        .clone()
        .oneshot(get_with_token("/api/admin", Some(&user_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["msg"], "Forbidden");

    let response = app
        .clone()
        .oneshot(get_with_token("/api/admin", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_with_token("/api/admin", Some(&admin_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["msg"], "Admin access granted");
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = app().await;
    let token = token_for(&app, "headers@example.com").await;

    let response = app
        .oneshot(get_with_token("/api/protected", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("Content-Security-Policy"));
    assert_eq!(
        response.headers().get("X-XSS-Protection").unwrap(),
        "1; mode=block"
    );
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
}

// ---------------------------------------------------------------------------
// Product catalog
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn multipart_request(
    method: &str,
    uri: &str,
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn product_fields<'a>(name: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", name),
        ("description", "Test Description"),
        ("price", "19.99"),
        ("category", "Test Category"),
    ]
}

async fn add_product(app: &Router, name: &str, image: Option<(&str, &[u8])>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(multipart_request(
            "POST",
            "/api/products/add",
            &product_fields(name),
            image,
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

#[tokio::test]
async fn product_is_created_without_image() {
    let app = app().await;

    let (status, body) = add_product(&app, "No Image Product", None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product"]["name"], "No Image Product");
    assert_eq!(body["product"]["price"], 19.99);
    assert_eq!(body["product"]["image"], "");
}

#[tokio::test]
async fn product_image_is_stored_under_uploads() {
    let uploads = tempfile::tempdir().unwrap();
    let app = test_app(uploads.path().to_str().unwrap()).await;

    let (status, body) =
        add_product(&app, "Image Product", Some(("photo.jpg", b"test image content"))).await;

    assert_eq!(status, StatusCode::CREATED);
    let image = body["product"]["image"].as_str().unwrap();
    assert!(image.starts_with("/uploads/"));
    assert!(image.ends_with("photo.jpg"));

    let stored = uploads.path().join(image.trim_start_matches("/uploads/"));
    assert_eq!(std::fs::read(stored).unwrap(), b"test image content");
}

#[tokio::test]
async fn products_are_listed() {
    let app = app().await;

    add_product(&app, "List Product A", None).await;
    add_product(&app, "List Product B", None).await;

    let response = app
        .oneshot(Request::builder().uri("/api/products").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert!(names.contains(&"List Product A"));
    assert!(names.contains(&"List Product B"));
}

#[tokio::test]
async fn product_update_patches_fields() {
    let app = app().await;

    let (_, body) = add_product(&app, "Before Update", None).await;
    let id = body["product"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &format!("/api/products/{}", id),
            &[("name", "After Update"), ("price", "29.99")],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["product"]["name"], "After Update");
    assert_eq!(body["product"]["price"], 29.99);
    assert_eq!(body["product"]["description"], "Test Description");
}

#[tokio::test]
async fn updating_a_missing_product_is_404() {
    let app = app().await;

    let response = app
        .oneshot(multipart_request(
            "PUT",
            "/api/products/does-not-exist",
            &[("name", "Whatever")],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["msg"], "Product not found");
}

#[tokio::test]
async fn product_delete_then_404_on_second_delete() {
    let app = app().await;

    let (_, body) = add_product(&app, "Doomed Product", None).await;
    let id = body["product"]["id"].as_str().unwrap().to_string();

    let delete_request = |id: &str| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/products/{}", id))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(delete_request(&id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["msg"],
        "Product deleted successfully"
    );

    let response = app.oneshot(delete_request(&id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["msg"], "Product not found");
}

// ---------------------------------------------------------------------------
// Shopping cart
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cart_add_get_remove_round_trip() {
    let app = app().await;

    let (_, body) = add_product(&app, "Cart Product", None).await;
    let product_id = body["product"]["id"].as_str().unwrap().to_string();

    // Add twice: quantities accumulate on one line item.
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/cart/add",
                json!({ "userId": "cart-user", "productId": &product_id, "quantity": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Product added to cart successfully");
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/cart/cart-user")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["cart"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["cart"]["items"][0]["quantity"], 2);
    assert_eq!(body["total"], 39.98);

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/api/cart/remove",
            json!({ "userId": "cart-user", "productId": &product_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Product removed from cart");
    assert!(body["cart"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn adding_an_unknown_product_to_cart_is_404() {
    let app = app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/cart/add",
            json!({ "userId": "cart-user-2", "productId": "missing", "quantity": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["msg"], "Product not found");
}

#[tokio::test]
async fn unknown_user_has_an_empty_cart() {
    let app = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/cart/nobody-here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["cart"]["items"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 0.0);
}
