//! Authentication handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::auth::{AuthService, LoginInput, LoginResponse, RegisterInput};
use crate::AppState;
use shared::models::User;

/// Register a new staff account (starts pending approval)
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<Json<User>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    let user = service.register(input).await?;
    Ok(Json(user))
}

/// Log in and receive an access token
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    let response = service.login(input).await?;
    Ok(Json(response))
}
