//! Actor API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::dto::{
    ApplyEffectsRequestDto, CreateActorRequestDto, PlaceTokenResponseDto,
};
use crate::application::services::{ActorService, EffectReport};
use crate::domain::entities::Actor;
use crate::domain::value_objects::ActorId;
use crate::infrastructure::state::AppState;

pub(super) fn parse_actor_id(raw: &str) -> Result<ActorId, (StatusCode, String)> {
    Uuid::parse_str(raw)
        .map(ActorId::from_uuid)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid actor ID".to_string()))
}

/// Create an actor
pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateActorRequestDto>,
) -> Result<(StatusCode, Json<Actor>), (StatusCode, String)> {
    let actor = state
        .actor_service
        .create_actor(Actor::from(req))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok((StatusCode::CREATED, Json(actor)))
}

/// Get an actor by ID
pub async fn get_actor(
    State(state): State<Arc<AppState>>,
    Path(actor_id): Path<String>,
) -> Result<Json<Actor>, (StatusCode, String)> {
    let actor_id = parse_actor_id(&actor_id)?;

    let actor = state
        .actor_service
        .get_actor(actor_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Actor not found".to_string()))?;

    Ok(Json(actor))
}

/// Place a token for an actor so it can be targeted by token
pub async fn place_token(
    State(state): State<Arc<AppState>>,
    Path(actor_id): Path<String>,
) -> Result<(StatusCode, Json<PlaceTokenResponseDto>), (StatusCode, String)> {
    let actor_id = parse_actor_id(&actor_id)?;

    let token_id = state
        .actor_service
        .place_token(actor_id)
        .await
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;

    Ok((StatusCode::CREATED, Json(PlaceTokenResponseDto { token_id })))
}

/// Apply JSON effect changes to an actor's system document
pub async fn apply_effects(
    State(state): State<Arc<AppState>>,
    Path(actor_id): Path<String>,
    Json(req): Json<ApplyEffectsRequestDto>,
) -> Result<Json<EffectReport>, (StatusCode, String)> {
    let actor_id = parse_actor_id(&actor_id)?;

    let (_, report) = state
        .effect_service
        .apply_effects(actor_id, &req.changes)
        .await
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;

    Ok(Json(report))
}
