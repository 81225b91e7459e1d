//! Authentication and user management handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::auth::{AuthResponse, AuthService, LoginInput, RegisterInput, UserResponse};
use crate::AppState;

fn service(state: &AppState) -> AuthService {
    AuthService::new(state.db.clone(), state.config.jwt.clone())
}

/// Register a new user account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<Json<UserResponse>> {
    let user = service(&state).register(input).await?;
    Ok(Json(user))
}

/// Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthResponse>> {
    let response = service(&state).login(input).await?;
    Ok(Json(response))
}

/// The authenticated user's own profile
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<UserResponse>> {
    let profile = service(&state).get_user(user.user_id).await?;
    Ok(Json(profile))
}

pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = service(&state).list_users().await?;
    Ok(Json(users))
}

#[derive(Deserialize)]
pub struct ApprovalInput {
    pub approved: bool,
}

pub async fn set_user_approval(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<ApprovalInput>,
) -> AppResult<Json<UserResponse>> {
    let user = service(&state).set_approval(user_id, input.approved).await?;
    Ok(Json(user))
}
