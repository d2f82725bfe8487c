//! HTTP REST API routes

mod actor_routes;
mod chat_routes;
mod damage_routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

pub use actor_routes::*;
pub use chat_routes::*;
pub use damage_routes::*;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Actor routes
        .route("/api/actors", post(actor_routes::create_actor))
        .route("/api/actors/{id}", get(actor_routes::get_actor))
        .route("/api/actors/{id}/tokens", post(actor_routes::place_token))
        .route("/api/actors/{id}/effects", post(actor_routes::apply_effects))
        // Damage routes
        .route("/api/damage/roll", post(damage_routes::roll_damage))
        // Chat card routes
        .route("/api/chat/{id}", get(chat_routes::get_message))
        .route(
            "/api/chat/{id}/apply-damage",
            post(chat_routes::apply_damage),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::ports::outbound::{HudDecision, NotificationLevel};
    use crate::infrastructure::config::{AppConfig, ChatBackend};
    use crate::infrastructure::persistence::{InMemoryActorRepository, InMemoryChatLog};
    use crate::infrastructure::state::Adapters;
    use crate::test_support::{RecordingNotifier, ScriptedDiceRoller, ScriptedHud};

    fn app() -> Router {
        app_with_notifier().0
    }

    fn app_with_notifier() -> (Router, Arc<RecordingNotifier>) {
        let config = AppConfig {
            server_port: 0,
            chat_backend: ChatBackend::Memory,
            sqlite_url: String::new(),
            damage_card_template: "templates/chat/damage-card.hbs".to_string(),
            overkill_explode_face: None,
            dice_seed: None,
        };
        let notifier = Arc::new(RecordingNotifier::default());
        let adapters = Adapters {
            actors: Arc::new(InMemoryActorRepository::new()),
            chat: Arc::new(InMemoryChatLog::new()),
            dice: Arc::new(ScriptedDiceRoller::new(vec![3, 4])),
            hud: Arc::new(ScriptedHud::new(HudDecision::Confirmed)),
            notifier: notifier.clone(),
        };
        let state = Arc::new(AppState::from_adapters(&config, adapters));
        (create_routes().with_state(state), notifier)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create_actor(app: &Router, body: Value) -> Value {
        let (status, actor) = send(app, "POST", "/api/actors", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        actor
    }

    #[tokio::test]
    async fn test_roll_then_apply_once() {
        let app = app();
        let attacker = create_actor(
            &app,
            json!({
                "name": "Everest",
                "items": [{
                    "id": "5b0f5c2e-3f8e-4a53-9f0e-1c2d3e4f5a6b",
                    "name": "Assault Rifle",
                    "kind": {"type": "weapon", "data": {
                        "source": "mech_weapon",
                        "damage": [{"type": "Kinetic", "val": "2d6"}]
                    }}
                }]
            }),
        )
        .await;
        let target = create_actor(&app, json!({"name": "Target"})).await;
        let target_id = target["id"].as_str().unwrap().to_string();

        let (status, rolled) = send(
            &app,
            "POST",
            "/api/damage/roll",
            Some(json!({
                "actor_id": attacker["id"],
                "item_id": "5b0f5c2e-3f8e-4a53-9f0e-1c2d3e4f5a6b",
                "hit_results": [{
                    "target": {"actor_id": target_id, "name": "Target"},
                    "total": 15,
                    "hit": true,
                    "crit": false
                }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rolled["success"], true);
        assert_eq!(rolled["data"]["damage_total"], 7);
        let message_id = rolled["chat_message_id"].as_str().unwrap().to_string();

        let (status, card) = send(&app, "GET", &format!("/api/chat/{}", message_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(card["flags"]["damage_data"]["targets_applied"][&target_id], false);

        let apply_uri = format!("/api/chat/{}/apply-damage", message_id);
        let (status, applied) =
            send(&app, "POST", &apply_uri, Some(json!({"target": target_id}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(applied["report"]["hp_damage"], 7);

        let (status, _) = send(&app, "POST", &apply_uri, Some(json!({"target": target_id}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, after) = send(&app, "GET", &format!("/api/actors/{}", target_id), None).await;
        assert_eq!(after["stats"]["hp"], 3);
    }

    /// Roll a 2d6 kinetic card against a fresh target; returns the apply uri and target id
    async fn rolled_card(app: &Router) -> (String, String) {
        let attacker = create_actor(
            app,
            json!({
                "name": "Everest",
                "items": [{
                    "id": "5b0f5c2e-3f8e-4a53-9f0e-1c2d3e4f5a6b",
                    "name": "Assault Rifle",
                    "kind": {"type": "weapon", "data": {
                        "source": "mech_weapon",
                        "damage": [{"type": "Kinetic", "val": "2d6"}]
                    }}
                }]
            }),
        )
        .await;
        let target = create_actor(app, json!({"name": "Target"})).await;
        let target_id = target["id"].as_str().unwrap().to_string();
        let (_, rolled) = send(
            app,
            "POST",
            "/api/damage/roll",
            Some(json!({
                "actor_id": attacker["id"],
                "item_id": "5b0f5c2e-3f8e-4a53-9f0e-1c2d3e4f5a6b",
                "hit_results": [{
                    "target": {"actor_id": target_id, "name": "Target"},
                    "total": 15,
                    "hit": true,
                    "crit": false
                }]
            })),
        )
        .await;
        let message_id = rolled["chat_message_id"].as_str().unwrap();
        (format!("/api/chat/{}/apply-damage", message_id), target_id)
    }

    #[tokio::test]
    async fn test_apply_accepts_numeric_multiplier() {
        let (app, notifier) = app_with_notifier();
        let (apply_uri, target_id) = rolled_card(&app).await;

        let (status, _) = send(
            &app,
            "POST",
            &apply_uri,
            Some(json!({"target": target_id, "multiple": true})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            notifier.with_level(NotificationLevel::Error),
            vec!["Data multiplication factor is not a number!".to_string()]
        );

        let (status, applied) = send(
            &app,
            "POST",
            &apply_uri,
            Some(json!({"target": target_id, "multiple": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(applied["report"]["hp_damage"], 14);
        assert_eq!(applied["report"]["structure_lost"], 1);
    }

    #[tokio::test]
    async fn test_roll_without_damage_reports_failure() {
        let app = app();
        let actor = create_actor(&app, json!({"name": "Everest"})).await;

        let (status, rolled) = send(
            &app,
            "POST",
            "/api/damage/roll",
            Some(json!({"actor_id": actor["id"]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(rolled["success"], false);
        assert!(rolled["chat_message_id"].is_null());
    }

    #[tokio::test]
    async fn test_roll_for_unknown_actor_or_item() {
        let app = app();
        let actor = create_actor(&app, json!({"name": "Everest"})).await;
        let missing = uuid::Uuid::new_v4().to_string();

        let (status, _) = send(
            &app,
            "POST",
            "/api/damage/roll",
            Some(json!({"actor_id": missing})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "POST",
            "/api/damage/roll",
            Some(json!({"actor_id": actor["id"], "item_id": missing})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_ids() {
        let app = app();
        let (status, _) = send(&app, "GET", "/api/actors/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = uuid::Uuid::new_v4();
        let (status, _) = send(&app, "GET", &format!("/api/actors/{}", missing), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/chat/{}/apply-damage", missing),
            Some(json!({"target": missing.to_string()})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_apply_effects_route() {
        let app = app();
        let actor = create_actor(&app, json!({"name": "Everest"})).await;
        let id = actor["id"].as_str().unwrap();

        let (status, report) = send(
            &app,
            "POST",
            &format!("/api/actors/{}/effects", id),
            Some(json!({"changes": [
                {"key": "statuses", "mode": "append_json", "value": "\"prone\""},
                {"key": "overshield", "mode": 11, "value": "2"}
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["applied"], 2);

        let (_, stored) = send(&app, "GET", &format!("/api/actors/{}", id), None).await;
        assert_eq!(stored["system"], json!({"statuses": ["prone"], "overshield": 2}));

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/actors/{}/effects", uuid::Uuid::new_v4()),
            Some(json!({"changes": []})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
