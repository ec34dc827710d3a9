//! Password endpoints: internal verification plus the forgot/reset/update
//! flows.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::error::AppError;
use crate::models::auth::{
    ForgotPasswordRequest, ResetPasswordRequest, UpdatePasswordRequest, VerifyPasswordRequest,
};
use crate::services::session_tokens::AccessClaims;
use crate::state::AppState;
use crate::types::UserId;

/// Service-to-service credential check, addressed by user id.
pub async fn verify_password(
    State(state): State<AppState>,
    Json(payload): Json<VerifyPasswordRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    state
        .passwords
        .verify_user_password(payload.user_id, &payload.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    state.passwords.forgot_password(&payload.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    state
        .passwords
        .reset_password(&payload.reset_token, &payload.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_password(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Path(user_id): Path<UserId>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<StatusCode, AppError> {
    crate::middleware::require_same_user(&claims, user_id)?;
    payload.validate()?;
    state
        .passwords
        .update_password(user_id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
