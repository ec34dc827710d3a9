//! Session endpoints: credential onboarding, login, token refresh, logout.

use axum::{
    extract::{Extension, Path, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

use crate::error::AppError;
use crate::models::auth::{CredentialsRequest, LoginRequest};
use crate::services::session_tokens::{extract_refresh_token, AccessClaims};
use crate::state::AppState;
use crate::types::UserId;

pub async fn create_credentials(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    state.auth.create_credentials(&payload).await?;
    Ok(StatusCode::CREATED)
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;
    let cookies = state.auth.login(&payload).await?;
    with_cookies(StatusCode::OK.into_response(), &cookies)
}

/// Rotates the session named by the refresh cookie. A missing cookie is a
/// plain expired session; a present but bad one is an invalid token.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let cookie_header = headers
        .get(axum::http::header::COOKIE)
        .and_then(|value| value.to_str().ok());
    let token = extract_refresh_token(cookie_header).ok_or(AppError::SessionExpired)?;
    let cookies = state.auth.refresh(&token).await?;
    with_cookies(StatusCode::OK.into_response(), &cookies)
}

/// Retires the presented session. The clearing cookies are attached even
/// when revocation fails so the client always drops its copies.
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    crate::middleware::require_same_user(&claims, user_id)?;

    let cookie_header = headers
        .get(axum::http::header::COOKIE)
        .and_then(|value| value.to_str().ok());
    let refresh_token = extract_refresh_token(cookie_header);
    let result = state.auth.logout(user_id, refresh_token.as_deref()).await;
    let response = match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    };
    with_cookies(response, &state.auth.clear_session_cookies())
}

pub(crate) fn with_cookies(mut response: Response, cookies: &[String]) -> Result<Response, AppError> {
    for cookie in cookies {
        let value = HeaderValue::from_str(cookie)
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("cookie header: {}", e)))?;
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(response)
}
