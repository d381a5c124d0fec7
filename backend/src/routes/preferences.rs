//! Notification preference routes
//!
//! Any change triggers a replan so toggles take effect immediately.

use crate::error::ApiResult;
use crate::services::PreferencesService;
use crate::state::AppState;
use crate::store::Collection;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use pet_care_shared::{NotificationPreferences, PreferencesPatch};

/// Create preference routes
pub fn preference_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_preferences).put(update_preferences))
        .route("/reset", post(reset_preferences))
}

/// GET /api/v1/preferences
async fn get_preferences(State(state): State<AppState>) -> Json<NotificationPreferences> {
    let ledger = state.ledger.lock().await;
    Json(PreferencesService::get(&ledger))
}

/// PUT /api/v1/preferences
async fn update_preferences(
    State(state): State<AppState>,
    Json(patch): Json<PreferencesPatch>,
) -> ApiResult<Json<NotificationPreferences>> {
    let preferences = {
        let mut ledger = state.ledger.lock().await;
        let preferences = PreferencesService::update(&mut ledger, &patch)?;
        state.persist(&ledger, &[Collection::Preferences]).await?;
        preferences
    };

    state.replan().await;
    Ok(Json(preferences))
}

/// POST /api/v1/preferences/reset
async fn reset_preferences(State(state): State<AppState>) -> ApiResult<Json<NotificationPreferences>> {
    let preferences = {
        let mut ledger = state.ledger.lock().await;
        let preferences = PreferencesService::reset(&mut ledger);
        state.persist(&ledger, &[Collection::Preferences]).await?;
        preferences
    };

    state.replan().await;
    Ok(Json(preferences))
}
