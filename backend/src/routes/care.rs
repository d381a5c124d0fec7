//! Care schedule routes

use crate::error::ApiResult;
use crate::services::{CareService, PlanReport};
use crate::state::AppState;
use crate::store::Collection;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use pet_care_shared::models::{CareHistoryEntry, CareTask, TaskCompletion};
use pet_care_shared::types::{CreateCareTaskRequest, PetFilter, UpcomingTasksQuery};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct TaskCompletionResponse {
    #[serde(flatten)]
    pub completion: TaskCompletion,
    pub reminders: PlanReport,
}

/// Create care routes
pub fn care_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/upcoming", get(upcoming_tasks))
        .route("/tasks/:id", delete(delete_task))
        .route("/tasks/:id/complete", post(complete_task))
        .route("/history", get(care_history))
}

/// GET /api/v1/care/tasks
async fn list_tasks(
    State(state): State<AppState>,
    Query(filter): Query<PetFilter>,
) -> Json<Vec<CareTask>> {
    let ledger = state.ledger.lock().await;
    Json(CareService::list(&ledger, &filter))
}

/// GET /api/v1/care/tasks/upcoming
async fn upcoming_tasks(
    State(state): State<AppState>,
    Query(query): Query<UpcomingTasksQuery>,
) -> ApiResult<Json<Vec<CareTask>>> {
    query.validate()?;
    let ledger = state.ledger.lock().await;
    Ok(Json(CareService::upcoming(&ledger, query.pet_id, query.days, Utc::now())))
}

/// POST /api/v1/care/tasks
async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateCareTaskRequest>,
) -> ApiResult<(StatusCode, Json<CareTask>)> {
    let task = {
        let mut ledger = state.ledger.lock().await;
        let task = CareService::create(&mut ledger, req)?;
        state.persist(&ledger, &[Collection::CareTasks]).await?;
        task
    };

    state.replan().await;
    Ok((StatusCode::CREATED, Json(task)))
}

/// POST /api/v1/care/tasks/:id/complete
async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskCompletionResponse>> {
    let completion = {
        let mut ledger = state.ledger.lock().await;
        let completion = CareService::complete(&mut ledger, id, Utc::now())?;
        state
            .persist(&ledger, &[Collection::CareTasks, Collection::CareHistory])
            .await?;
        completion
    };

    let reminders = state.replan().await;
    Ok(Json(TaskCompletionResponse { completion, reminders }))
}

/// DELETE /api/v1/care/tasks/:id
async fn delete_task(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    {
        let mut ledger = state.ledger.lock().await;
        CareService::delete(&mut ledger, id)?;
        state.persist(&ledger, &[Collection::CareTasks]).await?;
    }

    state.replan().await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/care/history
async fn care_history(
    State(state): State<AppState>,
    Query(filter): Query<PetFilter>,
) -> Json<Vec<CareHistoryEntry>> {
    let ledger = state.ledger.lock().await;
    Json(CareService::history(&ledger, &filter))
}
