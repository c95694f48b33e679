use axum::{
    body::Body,
    http::{Request, Response, StatusCode, header},
    middleware::Next,
    response::IntoResponse,
};
use tracing::error;

use crate::{AppError, ErrorResponse};

/// Normalizes framework-generated failures (body-limit rejections, unhandled
/// server errors) into the `{"msg": ...}` wire shape used everywhere else.
pub async fn error_handling_middleware(
    req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    let response = next.run(req).await;

    let status = response.status();

    if status == StatusCode::PAYLOAD_TOO_LARGE {
        error!("Request body too large");

        let error_response = ErrorResponse {
            msg: "The request body exceeds the maximum allowed size".to_string(),
            error: None,
        };

        return Ok(Response::builder()
            .status(StatusCode::PAYLOAD_TOO_LARGE)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&error_response).unwrap()))
            .unwrap());
    }

    Ok(response)
}
