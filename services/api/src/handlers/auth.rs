use axum::{Json, extract::State, http::StatusCode};
use shop_error::AppResult;
use shop_models::user::{LoginInput, LoginResponse, RegisterInput, RegisterResponse};

use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let response = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let response = state.auth.login(input).await?;
    Ok(Json(response))
}
