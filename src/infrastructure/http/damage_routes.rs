//! Damage roll API routes

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use uuid::Uuid;

use super::actor_routes::parse_actor_id;
use crate::application::dto::{DamageRollRequestDto, DamageRollResponseDto};
use crate::application::services::{DamageRollRequest, DamageRollService};
use crate::domain::value_objects::ItemId;
use crate::infrastructure::state::AppState;

/// Run the damage flow for an actor
///
/// A flow halted by one of its steps is reported with `success: false`, not as an error.
pub async fn roll_damage(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DamageRollRequestDto>,
) -> Result<Json<DamageRollResponseDto>, (StatusCode, String)> {
    let actor_id = parse_actor_id(&req.actor_id)?;
    let item_id = match req.item_id.as_deref() {
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map(ItemId::from_uuid)
                .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid item ID".to_string()))?,
        ),
        None => None,
    };

    let outcome = state
        .damage_roll_service
        .roll_damage(DamageRollRequest {
            actor_id,
            item_id,
            input: req.input,
            card_template: req.card_template,
        })
        .await
        .map_err(|e| {
            if e.is_not_found() {
                (StatusCode::NOT_FOUND, e.to_string())
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        })?;

    Ok(Json(DamageRollResponseDto {
        success: outcome.success,
        chat_message_id: outcome.data.as_ref().and_then(|d| d.chat_message_id),
        completed_steps: outcome.completed_steps,
        data: outcome.data,
    }))
}
