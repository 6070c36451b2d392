//! Broker proxy callbacks. Authorization outcomes are always HTTP 200 with
//! the broker envelope; only an unreadable body gets a plain 400.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::HeaderMap,
    response::IntoResponse,
};

use crate::app::dto::{PublishRequest, SubscribeRequest};
use crate::app::errors::json_rejection_to_response;
use crate::app::services::AppServices;

pub async fn subscribe(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Json<SubscribeRequest>, JsonRejection>,
) -> axum::response::Response {
    match body {
        Ok(Json(req)) => services.gateway.handle_subscription(&headers, &req).into_response(),
        Err(rejection) => json_rejection_to_response(rejection),
    }
}

pub async fn publish(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Json<PublishRequest>, JsonRejection>,
) -> axum::response::Response {
    match body {
        Ok(Json(req)) => services.gateway.handle_publication(&headers, &req).into_response(),
        Err(rejection) => json_rejection_to_response(rejection),
    }
}
