use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Domain error taxonomy for the identity service.
///
/// Flows return these directly; the `IntoResponse` impl is the single place
/// where internal failure kinds are mapped to client-visible responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Wrong password or unknown email. The message is fixed so clients can
    /// never distinguish "no such user" from "wrong password".
    #[error("invalid credentials")]
    CredentialsInvalid,
    /// Refresh cookie absent at refresh time.
    #[error("session has expired")]
    SessionExpired,
    /// Bad signature, malformed token, expired token, or a refresh token with
    /// no live server-side row. Deliberately uniform.
    #[error("invalid or expired auth token")]
    TokenInvalid,
    #[error("passcode has expired")]
    PasscodeExpired,
    #[error("invalid passcode")]
    PasscodeInvalid,
    /// Covers both expired and mismatched reset tokens with one message.
    #[error("invalid reset token")]
    ResetTokenInvalid,
    /// User status does not permit access (suspended/locked/inactive).
    #[error("account is restricted: {0}")]
    AccountSuspended(String),
    /// Profile service or notification transport failed. Upstream error
    /// bodies are logged here and never exposed to the client.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// Missing row lookups internal to flows. Converted into one of the
    /// domain kinds at the service boundary; a bare not-found reaching the
    /// client means a flow forgot to translate it.
    #[error("{0}")]
    NotFound(String),
    #[error("internal server error")]
    InternalServerError(anyhow::Error),
    #[error("validation failed")]
    Validation(Vec<String>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code, details) = match self {
            AppError::CredentialsInvalid => (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
                "CREDENTIALS_INVALID".to_string(),
                None,
            ),
            AppError::SessionExpired => (
                StatusCode::FORBIDDEN,
                "Session has expired".to_string(),
                "SESSION_EXPIRED".to_string(),
                None,
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired auth token".to_string(),
                "TOKEN_INVALID".to_string(),
                None,
            ),
            AppError::PasscodeExpired => (
                StatusCode::BAD_REQUEST,
                "Passcode has expired".to_string(),
                "PASSCODE_EXPIRED".to_string(),
                None,
            ),
            AppError::PasscodeInvalid => (
                StatusCode::BAD_REQUEST,
                "Invalid passcode".to_string(),
                "PASSCODE_INVALID".to_string(),
                None,
            ),
            AppError::ResetTokenInvalid => (
                StatusCode::BAD_REQUEST,
                "Invalid reset token".to_string(),
                "RESET_TOKEN_INVALID".to_string(),
                None,
            ),
            AppError::AccountSuspended(status) => {
                tracing::warn!(status = %status, "Rejected request for restricted account");
                (
                    StatusCode::FORBIDDEN,
                    "Account does not permit access".to_string(),
                    "ACCOUNT_SUSPENDED".to_string(),
                    None,
                )
            }
            AppError::UpstreamUnavailable(context) => {
                tracing::error!(context = %context, "Upstream dependency failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Service temporarily unavailable, try again later".to_string(),
                    "UPSTREAM_UNAVAILABLE".to_string(),
                    None,
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND".to_string(), None),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR".to_string(),
                    None,
                )
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                "VALIDATION_ERROR".to_string(),
                Some(serde_json::json!({ "errors": errors })),
            ),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code,
            details,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::InternalServerError(err.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let code = e.code.as_ref();
                    format!("{}: {}", field, code)
                })
            })
            .collect();
        AppError::Validation(messages)
    }
}
