//! Meal tracking routes
//!
//! Logging a meal may raise diet alerts. Those are announced right away,
//! then reminders are replanned so the logged meal's checks disappear.

use crate::error::ApiResult;
use crate::services::{MealService, PlanReport};
use crate::state::AppState;
use crate::store::Collection;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use pet_care_shared::models::{DietAlert, MealRecord};
use pet_care_shared::types::{CompleteMealRequest, PetFilter, PlanMealRequest};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct MealCompletionResponse {
    pub meal: MealRecord,
    pub new_alerts: Vec<DietAlert>,
    pub alert_notices: PlanReport,
    pub reminders: PlanReport,
}

/// Create meal routes
pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_meals).post(plan_meal))
        .route("/today", get(todays_meals))
        .route("/:id/complete", post(complete_meal))
}

/// GET /api/v1/meals
async fn list_meals(
    State(state): State<AppState>,
    Query(filter): Query<PetFilter>,
) -> Json<Vec<MealRecord>> {
    let ledger = state.ledger.lock().await;
    Json(MealService::list(&ledger, &filter))
}

/// GET /api/v1/meals/today
async fn todays_meals(
    State(state): State<AppState>,
    Query(filter): Query<PetFilter>,
) -> Json<Vec<MealRecord>> {
    let ctx = state.schedule_context();
    let ledger = state.ledger.lock().await;
    Json(MealService::today(&ledger, &filter, &ctx))
}

/// POST /api/v1/meals
async fn plan_meal(
    State(state): State<AppState>,
    Json(req): Json<PlanMealRequest>,
) -> ApiResult<(StatusCode, Json<MealRecord>)> {
    let meal = {
        let mut ledger = state.ledger.lock().await;
        let meal = MealService::plan(&mut ledger, req)?;
        state.persist(&ledger, &[Collection::Meals]).await?;
        meal
    };

    state.replan().await;
    Ok((StatusCode::CREATED, Json(meal)))
}

/// POST /api/v1/meals/:id/complete
async fn complete_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteMealRequest>,
) -> ApiResult<Json<MealCompletionResponse>> {
    let (completion, pet_name, preferences) = {
        let mut ledger = state.ledger.lock().await;
        let completion = MealService::complete(&mut ledger, id, req, Utc::now())?;

        let mut changed = vec![Collection::Meals];
        if !completion.new_alerts.is_empty() {
            changed.push(Collection::DietAlerts);
        }
        state.persist(&ledger, &changed).await?;

        let pet_name = ledger
            .pet_name(completion.meal.pet_id)
            .map(str::to_string)
            .unwrap_or_default();
        (completion, pet_name, ledger.preferences.clone())
    };

    let alert_notices = state
        .planner
        .announce_diet_alerts(&completion.new_alerts, &pet_name, &preferences)
        .await;
    let reminders = state.replan().await;

    Ok(Json(MealCompletionResponse {
        meal: completion.meal,
        new_alerts: completion.new_alerts,
        alert_notices,
        reminders,
    }))
}
