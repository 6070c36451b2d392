use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::dto::{CredentialsRequest, SigninResponse, SignupResponse};
use crate::app::errors::{account_error_to_response, json_rejection_to_response};
use crate::app::services::AppServices;

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return json_rejection_to_response(rejection),
    };

    match services.accounts.signup(&req.username, &req.password).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(SignupResponse {
                message: "user registered",
            }),
        )
            .into_response(),
        Err(e) => account_error_to_response(e),
    }
}

pub async fn signin(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return json_rejection_to_response(rejection),
    };

    match services.accounts.signin(&req.username, &req.password).await {
        Ok(issued) => Json(SigninResponse {
            token: issued.token,
            expires_at: issued.claims.exp,
        })
        .into_response(),
        Err(e) => account_error_to_response(e),
    }
}
