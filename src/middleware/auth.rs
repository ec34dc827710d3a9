//! Access-cookie gate for routes that act on an authenticated user.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::services::session_tokens::{extract_access_token, AccessClaims};
use crate::state::AppState;
use crate::types::UserId;

/// Validates the access cookie and stashes its claims in request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let cookie_header = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());
    let token = extract_access_token(cookie_header).ok_or(AppError::TokenInvalid)?;
    let claims = state.session_tokens.validate_access_token(&token)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Checks that the session subject matches the user id in the request path.
/// The failure is the same as for any bad token, so a caller probing another
/// user's routes learns nothing.
pub fn require_same_user(claims: &AccessClaims, user_id: UserId) -> Result<(), AppError> {
    if claims.sub != user_id.to_string() {
        return Err(AppError::TokenInvalid);
    }
    Ok(())
}
