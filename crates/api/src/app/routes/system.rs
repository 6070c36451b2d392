use std::sync::Arc;

use axum::{Json, extract::Extension};

use crate::app::dto::HealthResponse;
use crate::app::services::AppServices;

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> Json<HealthResponse> {
    let snapshot = services.policy.snapshot();
    Json(HealthResponse {
        status: "ok",
        policy_loaded_at: snapshot.loaded_at(),
        rules: snapshot.rule_count(),
        assignments: snapshot.assignment_count(),
    })
}
