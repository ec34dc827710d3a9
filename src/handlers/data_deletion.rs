//! Right-to-erasure endpoint, called by the platform when an account is
//! removed.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::types::UserId;

pub async fn delete_user_data(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode, AppError> {
    state.data_deletion.delete_user_data(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
