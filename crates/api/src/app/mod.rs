//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, policy engine and codec wiring
//! - `routes/`: HTTP handlers (accounts, broker proxy, health)
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, ProxyRoutes, ServiceParts, build_services};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let proxy = Router::new()
        .route(&services.routes.subscribe, post(routes::proxy::subscribe))
        .route(&services.routes.publish, post(routes::proxy::publish));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/signup", post(routes::accounts::signup))
        .route("/signin", post(routes::accounts::signin))
        .merge(proxy)
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
