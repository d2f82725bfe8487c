//! Damage Application Service - applies the damage printed on a card, once per target
//!
//! The ledger stored on the chat message is the only guard against applying the
//! same card twice. It is checked before the damage lands and only the applied
//! target's entry is flipped afterwards, so applications to different targets on
//! one card never undo each other. Two near-simultaneous requests for the same
//! target can still both pass the check.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::application::ports::outbound::{
    ActorRepositoryError, ActorRepositoryPort, ChatLogError, ChatLogPort, DamageSinkError,
    DamageSinkPort, NotificationPort,
};
use crate::domain::entities::DamageReport;
use crate::domain::value_objects::{AppliedDamage, ChatMessageId, DamageOptions};

#[derive(Debug, Clone)]
pub struct ApplyDamageRequest {
    pub message_id: ChatMessageId,
    /// Actor or token reference taken from the card button
    pub target: Option<String>,
    /// Raw multiplier text; defaults to 1
    pub multiple: Option<String>,
}

/// Outcome of a successful application
#[derive(Debug, Clone, PartialEq)]
pub struct DamageApplication {
    pub target_key: String,
    pub damage: AppliedDamage,
    pub report: DamageReport,
}

#[derive(Debug, thiserror::Error)]
pub enum ApplyDamageError {
    #[error("Damage application button has no damage data available")]
    NoDamageData(ChatMessageId),
    #[error("No target for damage application")]
    MissingTarget,
    #[error("Data multiplication factor is not a number!")]
    InvalidMultiplier(String),
    #[error("Damage has already been applied to this target")]
    AlreadyApplied(String),
    #[error("Invalid target for damage application")]
    InvalidTarget(String),
    #[error(transparent)]
    ChatLog(#[from] ChatLogError),
    #[error(transparent)]
    Actors(#[from] ActorRepositoryError),
    #[error(transparent)]
    Sink(#[from] DamageSinkError),
}

impl ApplyDamageError {
    /// Refusals that are expected user outcomes rather than faults
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::AlreadyApplied(_))
    }
}

#[async_trait]
pub trait DamageApplicationService: Send + Sync {
    /// Apply a card's damage to one target, unless the ledger says it already was
    async fn apply_damage(
        &self,
        request: ApplyDamageRequest,
    ) -> Result<DamageApplication, ApplyDamageError>;
}

/// Default implementation of DamageApplicationService using port abstractions
#[derive(Clone)]
pub struct DamageApplicationServiceImpl {
    chat: Arc<dyn ChatLogPort>,
    actors: Arc<dyn ActorRepositoryPort>,
    sink: Arc<dyn DamageSinkPort>,
    notifier: Arc<dyn NotificationPort>,
}

impl DamageApplicationServiceImpl {
    pub fn new(
        chat: Arc<dyn ChatLogPort>,
        actors: Arc<dyn ActorRepositoryPort>,
        sink: Arc<dyn DamageSinkPort>,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            chat,
            actors,
            sink,
            notifier,
        }
    }

    async fn try_apply(
        &self,
        request: ApplyDamageRequest,
    ) -> Result<DamageApplication, ApplyDamageError> {
        let message = self.chat.get(request.message_id).await?;
        let flag = message
            .and_then(|m| m.flags.damage_data)
            .ok_or(ApplyDamageError::NoDamageData(request.message_id))?;

        let reference = request
            .target
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ApplyDamageError::MissingTarget)?;
        let multiple = parse_multiple(request.multiple.as_deref())?;

        if flag.is_applied(&reference) {
            return Err(ApplyDamageError::AlreadyApplied(reference));
        }
        let actor = self
            .actors
            .resolve_target(&reference)
            .await?
            .ok_or_else(|| ApplyDamageError::InvalidTarget(reference.clone()))?;
        // Tokens resolve to their actor, which is what the ledger is keyed by
        let key = actor.id.to_string();
        if flag.is_applied(&key) {
            return Err(ApplyDamageError::AlreadyApplied(key));
        }

        let damage = AppliedDamage::from_results(flag.results_for(&key));
        let report = self
            .sink
            .apply_damage(
                actor.id,
                &damage,
                DamageOptions {
                    multiple,
                    add_burn: false,
                },
            )
            .await?;

        if !self.chat.mark_target_applied(request.message_id, &key).await? {
            warn!(target_key = %key, "Ledger entry was already marked by a concurrent application");
        }

        info!(
            actor = %actor.name,
            total = damage.total(),
            multiple,
            hp_damage = report.hp_damage,
            "Damage applied"
        );
        Ok(DamageApplication {
            target_key: key,
            damage,
            report,
        })
    }
}

fn parse_multiple(raw: Option<&str>) -> Result<f64, ApplyDamageError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(1.0),
        Some(raw) => raw,
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ApplyDamageError::InvalidMultiplier(raw.to_string())),
    }
}

#[async_trait]
impl DamageApplicationService for DamageApplicationServiceImpl {
    #[instrument(skip(self), fields(message_id = %request.message_id))]
    async fn apply_damage(
        &self,
        request: ApplyDamageRequest,
    ) -> Result<DamageApplication, ApplyDamageError> {
        let result = self.try_apply(request).await;
        match &result {
            Ok(applied) => self.notifier.info(&format!(
                "Applied {} damage ({} to hp)",
                applied.damage.total(),
                applied.report.hp_damage
            )),
            Err(e) => {
                warn!(error = %e, "Damage not applied");
                if e.is_refusal() {
                    self.notifier.warn(&e.to_string());
                } else {
                    self.notifier.error(&e.to_string());
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::NotificationLevel;
    use crate::domain::dice::{DiceExpression, Roll};
    use crate::domain::entities::{Actor, ChatFlags, ChatMessage, DamageFlag};
    use crate::domain::value_objects::{ActorId, DamageResult, DamageType};
    use crate::infrastructure::persistence::{InMemoryActorRepository, InMemoryChatLog};
    use crate::test_support::{mech, RecordingNotifier, ScriptedDiceRoller};

    struct Fixture {
        service: DamageApplicationServiceImpl,
        chat: Arc<InMemoryChatLog>,
        actors: Arc<InMemoryActorRepository>,
        notifier: Arc<RecordingNotifier>,
        target: Actor,
        message_id: ChatMessageId,
    }

    fn result(expr: &str, faces: Vec<u32>, damage_type: DamageType) -> DamageResult {
        let roll = Roll::evaluate(
            &DiceExpression::parse(expr).unwrap(),
            &ScriptedDiceRoller::new(faces),
        );
        DamageResult::new(roll, damage_type)
    }

    async fn fixture(crit: bool) -> Fixture {
        let chat = Arc::new(InMemoryChatLog::new());
        let actors = Arc::new(InMemoryActorRepository::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let target = mech("Target");
        actors.save_actor(target.clone()).await.unwrap();

        let key = target.id.to_string();
        let mut flag = DamageFlag {
            damage_results: vec![result("1d6", vec![4], DamageType::Kinetic)],
            crit_damage_results: vec![result("2d6kh1", vec![4, 6], DamageType::Kinetic)],
            ..Default::default()
        };
        flag.targets_applied.insert(key.clone(), false);
        if crit {
            flag.crit_targets.insert(key);
        }
        let message_id = chat
            .create(ChatMessage::new(
                target.id,
                "card",
                serde_json::Value::Null,
                ChatFlags {
                    damage_data: Some(flag),
                },
            ))
            .await
            .unwrap();

        let service = DamageApplicationServiceImpl::new(
            chat.clone(),
            actors.clone(),
            actors.clone(),
            notifier.clone(),
        );
        Fixture {
            service,
            chat,
            actors,
            notifier,
            target,
            message_id,
        }
    }

    fn request(f: &Fixture, target: Option<String>, multiple: Option<&str>) -> ApplyDamageRequest {
        ApplyDamageRequest {
            message_id: f.message_id,
            target,
            multiple: multiple.map(str::to_string),
        }
    }

    async fn hp(f: &Fixture) -> i32 {
        f.actors.get_actor(f.target.id).await.unwrap().unwrap().stats.hp
    }

    async fn ledger(f: &Fixture) -> DamageFlag {
        f.chat
            .get(f.message_id)
            .await
            .unwrap()
            .unwrap()
            .flags
            .damage_data
            .unwrap()
    }

    #[tokio::test]
    async fn test_applies_once_and_flips_ledger() {
        let f = fixture(false).await;

        let applied = f
            .service
            .apply_damage(request(&f, Some(f.target.id.to_string()), None))
            .await
            .unwrap();

        assert_eq!(applied.damage.get(DamageType::Kinetic), 4);
        assert_eq!(hp(&f).await, 6);
        assert!(ledger(&f).await.is_applied(&f.target.id.to_string()));
        assert_eq!(
            f.notifier.with_level(NotificationLevel::Info),
            vec!["Applied 4 damage (4 to hp)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_second_application_is_refused_without_mutation() {
        let f = fixture(false).await;
        let target = Some(f.target.id.to_string());
        f.service
            .apply_damage(request(&f, target.clone(), None))
            .await
            .unwrap();
        let ledger_before = ledger(&f).await;

        let err = f
            .service
            .apply_damage(request(&f, target, None))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplyDamageError::AlreadyApplied(_)));
        assert_eq!(hp(&f).await, 6);
        assert_eq!(ledger(&f).await, ledger_before);
        assert_eq!(
            f.notifier.with_level(NotificationLevel::Warn),
            vec!["Damage has already been applied to this target".to_string()]
        );
    }

    #[tokio::test]
    async fn test_token_reference_uses_actor_ledger_entry() {
        let f = fixture(false).await;
        let token = f.actors.place_token(f.target.id).await.unwrap();
        f.service
            .apply_damage(request(&f, Some(f.target.id.to_string()), None))
            .await
            .unwrap();

        let err = f
            .service
            .apply_damage(request(&f, Some(token.to_string()), None))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplyDamageError::AlreadyApplied(_)));
        assert_eq!(hp(&f).await, 6);
    }

    #[tokio::test]
    async fn test_crit_target_takes_crit_bucket() {
        let f = fixture(true).await;

        let applied = f
            .service
            .apply_damage(request(&f, Some(f.target.id.to_string()), None))
            .await
            .unwrap();

        assert_eq!(applied.damage.total(), 6);
        assert_eq!(hp(&f).await, 4);
    }

    #[tokio::test]
    async fn test_multiplier_scales_damage() {
        let f = fixture(false).await;

        f.service
            .apply_damage(request(&f, Some(f.target.id.to_string()), Some("0.5")))
            .await
            .unwrap();

        assert_eq!(hp(&f).await, 8);
    }

    #[tokio::test]
    async fn test_input_faults_leave_state_untouched() {
        let f = fixture(false).await;

        let missing = f.service.apply_damage(request(&f, None, None)).await;
        let blank = f.service.apply_damage(request(&f, Some("  ".into()), None)).await;
        let bad_multiple = f
            .service
            .apply_damage(request(&f, Some(f.target.id.to_string()), Some("lots")))
            .await;
        let unknown = f
            .service
            .apply_damage(request(&f, Some(uuid::Uuid::new_v4().to_string()), None))
            .await;

        assert!(matches!(missing, Err(ApplyDamageError::MissingTarget)));
        assert!(matches!(blank, Err(ApplyDamageError::MissingTarget)));
        assert!(matches!(bad_multiple, Err(ApplyDamageError::InvalidMultiplier(_))));
        assert!(matches!(unknown, Err(ApplyDamageError::InvalidTarget(_))));
        assert_eq!(hp(&f).await, 10);
        assert!(!ledger(&f).await.is_applied(&f.target.id.to_string()));
        assert_eq!(f.notifier.with_level(NotificationLevel::Error).len(), 4);
    }

    #[tokio::test]
    async fn test_message_without_damage_data() {
        let f = fixture(false).await;
        let id = f
            .chat
            .create(ChatMessage::new(
                f.target.id,
                "card",
                serde_json::Value::Null,
                ChatFlags::default(),
            ))
            .await
            .unwrap();

        let err = f
            .service
            .apply_damage(ApplyDamageRequest {
                message_id: id,
                target: Some(f.target.id.to_string()),
                multiple: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApplyDamageError::NoDamageData(_)));
    }

    /// Holds every application until both have reached the sink
    struct GatedSink {
        inner: Arc<InMemoryActorRepository>,
        gate: tokio::sync::Barrier,
    }

    #[async_trait]
    impl DamageSinkPort for GatedSink {
        async fn apply_damage(
            &self,
            target: ActorId,
            damage: &AppliedDamage,
            options: DamageOptions,
        ) -> Result<DamageReport, DamageSinkError> {
            self.gate.wait().await;
            self.inner.apply_damage(target, damage, options).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_targets_keep_each_others_ledger_entry() {
        let chat = Arc::new(InMemoryChatLog::new());
        let actors = Arc::new(InMemoryActorRepository::new());
        let first = mech("First");
        let second = mech("Second");
        actors.save_actor(first.clone()).await.unwrap();
        actors.save_actor(second.clone()).await.unwrap();

        let mut flag = DamageFlag {
            damage_results: vec![result("1d6", vec![2], DamageType::Kinetic)],
            ..Default::default()
        };
        for actor in [&first, &second] {
            flag.targets_applied.insert(actor.id.to_string(), false);
        }
        let message_id = chat
            .create(ChatMessage::new(
                first.id,
                "card",
                serde_json::Value::Null,
                ChatFlags {
                    damage_data: Some(flag),
                },
            ))
            .await
            .unwrap();
        let apply = |actor: &Actor| ApplyDamageRequest {
            message_id,
            target: Some(actor.id.to_string()),
            multiple: None,
        };

        let gated = DamageApplicationServiceImpl::new(
            chat.clone(),
            actors.clone(),
            Arc::new(GatedSink {
                inner: actors.clone(),
                gate: tokio::sync::Barrier::new(2),
            }),
            Arc::new(RecordingNotifier::default()),
        );
        let (a, b) = tokio::join!(
            gated.apply_damage(apply(&first)),
            gated.apply_damage(apply(&second))
        );
        a.unwrap();
        b.unwrap();

        let stored = chat.get(message_id).await.unwrap().unwrap();
        let stored = stored.flags.damage_data.unwrap();
        assert!(stored.is_applied(&first.id.to_string()));
        assert!(stored.is_applied(&second.id.to_string()));

        let service = DamageApplicationServiceImpl::new(
            chat.clone(),
            actors.clone(),
            actors.clone(),
            Arc::new(RecordingNotifier::default()),
        );
        for actor in [&first, &second] {
            let err = service.apply_damage(apply(actor)).await.unwrap_err();
            assert!(matches!(err, ApplyDamageError::AlreadyApplied(_)));
            let hp = actors.get_actor(actor.id).await.unwrap().unwrap().stats.hp;
            assert_eq!(hp, 8);
        }
    }

    #[test]
    fn test_parse_multiple() {
        assert_eq!(parse_multiple(None).unwrap(), 1.0);
        assert_eq!(parse_multiple(Some("")).unwrap(), 1.0);
        assert_eq!(parse_multiple(Some("2")).unwrap(), 2.0);
        assert!(parse_multiple(Some("NaN")).is_err());
        assert!(parse_multiple(Some("inf")).is_err());
        assert!(parse_multiple(Some("-1")).is_err());
    }
}
