use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::accounts::AccountError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Unparseable or incomplete JSON bodies are always a 400 here, including
/// the cases axum would report as 415 or 422.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text())
}

/// Internal details are logged by the service, never returned.
pub fn account_error_to_response(err: AccountError) -> axum::response::Response {
    match err {
        AccountError::Malformed(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_request", msg),
        AccountError::DuplicateUsername => {
            json_error(StatusCode::CONFLICT, "duplicate_username", "username already taken")
        }
        AccountError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid username or password",
        ),
        AccountError::Storage(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "account storage unavailable")
        }
        AccountError::Internal(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}
