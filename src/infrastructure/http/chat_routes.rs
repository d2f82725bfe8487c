//! Chat card API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::dto::{ApplyDamageRequestDto, ApplyDamageResponseDto, MultiplierInput};
use crate::application::ports::outbound::ChatLogPort;
use crate::application::services::{ApplyDamageError, ApplyDamageRequest, DamageApplicationService};
use crate::domain::entities::ChatMessage;
use crate::domain::value_objects::ChatMessageId;
use crate::infrastructure::state::AppState;

fn parse_message_id(raw: &str) -> Result<ChatMessageId, (StatusCode, String)> {
    Uuid::parse_str(raw)
        .map(ChatMessageId::from_uuid)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid chat message ID".to_string()))
}

/// Get a chat card with its flags
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<String>,
) -> Result<Json<ChatMessage>, (StatusCode, String)> {
    let message_id = parse_message_id(&message_id)?;

    let message = state
        .chat_log
        .get(message_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Chat message not found".to_string()))?;

    Ok(Json(message))
}

/// Apply a damage card to one target
pub async fn apply_damage(
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<String>,
    Json(req): Json<ApplyDamageRequestDto>,
) -> Result<Json<ApplyDamageResponseDto>, (StatusCode, String)> {
    let message_id = parse_message_id(&message_id)?;

    let applied = state
        .damage_application_service
        .apply_damage(ApplyDamageRequest {
            message_id,
            target: req.target,
            multiple: req.multiple.map(MultiplierInput::into_raw),
        })
        .await
        .map_err(|e| {
            let status = match &e {
                ApplyDamageError::AlreadyApplied(_) => StatusCode::CONFLICT,
                ApplyDamageError::NoDamageData(_) | ApplyDamageError::InvalidTarget(_) => {
                    StatusCode::NOT_FOUND
                }
                ApplyDamageError::MissingTarget | ApplyDamageError::InvalidMultiplier(_) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string())
        })?;

    Ok(Json(ApplyDamageResponseDto {
        target: applied.target_key,
        report: applied.report,
    }))
}
