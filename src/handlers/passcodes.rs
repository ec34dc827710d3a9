//! Email-verification passcode endpoints. Public: the caller has not
//! finished onboarding yet, so there is no session to require.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::error::AppError;
use crate::models::auth::VerifyPasscodeRequest;
use crate::state::AppState;
use crate::types::UserId;

pub async fn verify_passcode(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(payload): Json<VerifyPasscodeRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    state.passcodes.verify_passcode(user_id, &payload.passcode).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_passcode(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode, AppError> {
    state.passcodes.reset_passcode(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
