//! Pet registry routes

use crate::error::ApiResult;
use crate::services::PetService;
use crate::state::AppState;
use crate::store::Collection;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use pet_care_shared::models::PetProfile;
use pet_care_shared::types::CreatePetRequest;
use uuid::Uuid;

/// Create pet routes
pub fn pet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pets).post(create_pet))
        .route("/:id", get(get_pet))
}

/// GET /api/v1/pets
async fn list_pets(State(state): State<AppState>) -> Json<Vec<PetProfile>> {
    let ledger = state.ledger.lock().await;
    Json(PetService::list(&ledger))
}

/// POST /api/v1/pets
async fn create_pet(
    State(state): State<AppState>,
    Json(req): Json<CreatePetRequest>,
) -> ApiResult<(StatusCode, Json<PetProfile>)> {
    let mut ledger = state.ledger.lock().await;
    let pet = PetService::create(&mut ledger, req, Utc::now())?;
    state.persist(&ledger, &[Collection::Pets]).await?;
    Ok((StatusCode::CREATED, Json(pet)))
}

/// GET /api/v1/pets/:id
async fn get_pet(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<PetProfile>> {
    let ledger = state.ledger.lock().await;
    Ok(Json(PetService::get(&ledger, id)?))
}
