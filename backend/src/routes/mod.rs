//! Route definitions for the Pet Care API
//!
//! This module organizes all API routes and applies middleware.

use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod alerts;
mod assistant;
mod care;
mod health;
mod meals;
mod metrics;
mod notifications;
mod pets;
mod preferences;

pub use alerts::alert_routes;
pub use assistant::assistant_routes;
pub use care::care_routes;
pub use meals::meal_routes;
pub use notifications::notification_routes;
pub use pets::pet_routes;
pub use preferences::preference_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::render))
        .nest("/api/v1", api_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Pet Care API v1" }))
        .nest("/pets", pets::pet_routes())
        .nest("/meals", meals::meal_routes())
        .nest("/care", care::care_routes())
        .nest("/alerts", alerts::alert_routes())
        .nest("/preferences", preferences::preference_routes())
        .nest("/notifications", notifications::notification_routes())
        .nest("/assistant", assistant::assistant_routes())
}
