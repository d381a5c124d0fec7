//! Diet alert routes

use crate::error::ApiResult;
use crate::services::AlertService;
use crate::state::AppState;
use crate::store::Collection;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use pet_care_shared::models::DietAlert;
use pet_care_shared::types::AlertsQuery;
use uuid::Uuid;

/// Create alert routes
pub fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_alerts))
        .route("/:id/dismiss", post(dismiss_alert))
}

/// GET /api/v1/alerts
async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> Json<Vec<DietAlert>> {
    let ledger = state.ledger.lock().await;
    Json(AlertService::list(&ledger, &query))
}

/// POST /api/v1/alerts/:id/dismiss
async fn dismiss_alert(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<DietAlert>> {
    let mut ledger = state.ledger.lock().await;
    let alert = AlertService::dismiss(&mut ledger, id)?;
    state.persist(&ledger, &[Collection::DietAlerts]).await?;
    Ok(Json(alert))
}
