//! Assistant chat routes

use crate::error::ApiResult;
use crate::services::assistant::AssistantReply;
use crate::services::AssistantService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use pet_care_shared::types::SendMessageRequest;
use tracing::debug;
use uuid::Uuid;

/// Create assistant routes
pub fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route("/:pet_id", delete(clear_conversation))
        .route("/:pet_id/messages", post(send_message))
}

/// POST /api/v1/assistant/:pet_id/messages
async fn send_message(
    State(state): State<AppState>,
    Path(pet_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<AssistantReply>> {
    let reply = AssistantService::send_message(
        &state.ledger,
        &state.sessions,
        state.adviser.as_ref(),
        pet_id,
        req,
    )
    .await?;
    Ok(Json(reply))
}

/// DELETE /api/v1/assistant/:pet_id
async fn clear_conversation(State(state): State<AppState>, Path(pet_id): Path<Uuid>) -> StatusCode {
    let existed = state.sessions.clear(pet_id).await;
    debug!(pet_id = %pet_id, existed, "Conversation cleared");
    StatusCode::NO_CONTENT
}
