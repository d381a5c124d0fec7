//! Outbox inspection routes

use crate::notifications::{DeliveredNotification, ScheduledNotification};
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};

/// Create notification routes
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/scheduled", get(list_scheduled))
        .route("/delivered", get(list_delivered))
}

/// GET /api/v1/notifications/scheduled - pending, soonest first
async fn list_scheduled(State(state): State<AppState>) -> Json<Vec<ScheduledNotification>> {
    Json(state.outbox.pending().await)
}

/// GET /api/v1/notifications/delivered - newest first
async fn list_delivered(State(state): State<AppState>) -> Json<Vec<DeliveredNotification>> {
    Json(state.outbox.delivered().await)
}
