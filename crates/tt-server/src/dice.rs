//! The dice resolution service.
//!
//! A roll runs as one pass with strictly ordered side effects:
//! 1. `diceRoll` goes to the subject's portrait room before anything is rolled
//! 2. the result is computed and handed back to the caller
//! 3. the caller dispatches the returned [`PendingBroadcast`], which sends
//!    `diceResult` to the admin room (unless the caller is admin) and to the
//!    portrait room

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tt_dice::{Classifier, DiceEngine, DiceRequest, DiceResponse};
use tt_realtime::{BroadcastError, Broadcaster, Channel, RealtimeEvent};

use crate::error::{ServiceError, ServiceResult};
use crate::flags::FeatureFlags;
use crate::session::Player;

/// Default cap on dice per single-mode roll and entries per array-mode roll.
pub const DEFAULT_MAX_DICE: usize = 100;

/// A parsed roll request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollCommand {
    /// What to roll.
    pub dices: DiceRequest,
    /// Raw resolver key as sent by the client; empty strings are dropped.
    pub resolver_key: Option<String>,
    /// Roll on behalf of another character; zero is dropped.
    pub npc_id: Option<i64>,
}

impl RollCommand {
    /// A roll for the caller with no classification.
    pub fn new(dices: impl Into<DiceRequest>) -> Self {
        Self {
            dices: dices.into(),
            resolver_key: None,
            npc_id: None,
        }
    }

    /// Ask for classification against a table.
    pub fn with_resolver_key(mut self, key: impl Into<String>) -> Self {
        self.resolver_key = Some(key.into()).filter(|k: &String| !k.is_empty());
        self
    }

    /// Roll on behalf of a non-player character.
    pub fn with_npc(mut self, npc_id: i64) -> Self {
        self.npc_id = Some(npc_id).filter(|id| *id != 0);
        self
    }

    /// Parse `{dices, resolverKey?, npcId?}`.
    pub fn from_json(body: &Value) -> ServiceResult<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| ServiceError::InvalidDices("request body must be an object".into()))?;

        let dices = match object.get("dices") {
            None | Some(Value::Null) => {
                return Err(ServiceError::InvalidDices("missing dices".into()));
            }
            Some(value) => serde_json::from_value::<DiceRequest>(value.clone())
                .map_err(|e| ServiceError::InvalidDices(e.to_string()))?,
        };

        let resolver_key = match object.get("resolverKey") {
            Some(Value::String(key)) => Some(key.clone()),
            Some(Value::Number(key)) => Some(key.to_string()),
            _ => None,
        }
        .filter(|key| !key.is_empty());

        let npc_id = match object.get("npcId") {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_i64().ok_or_else(|| {
                ServiceError::InvalidDices("npcId must be an integer".into())
            })?),
        }
        .filter(|id| *id != 0);

        Ok(Self {
            dices,
            resolver_key,
            npc_id,
        })
    }

    /// Whose portrait room the roll is addressed to.
    pub fn subject_id(&self, caller: &Player) -> i64 {
        self.npc_id.unwrap_or(caller.id)
    }
}

/// The synchronous result of a roll and the broadcast still owed for it.
#[derive(Debug)]
pub struct RollOutcome {
    /// Resolved values, aligned with the request.
    pub results: Vec<DiceResponse>,
    /// Fan-out to run after the caller has its answer.
    pub broadcast: PendingBroadcast,
}

/// The post-roll fan-out of a finished roll.
pub struct PendingBroadcast {
    broadcaster: Arc<dyn Broadcaster>,
    notify_admin: bool,
    subject_id: i64,
    results: Vec<DiceResponse>,
    dices: DiceRequest,
}

impl std::fmt::Debug for PendingBroadcast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingBroadcast")
            .field("notify_admin", &self.notify_admin)
            .field("subject_id", &self.subject_id)
            .field("results", &self.results)
            .finish_non_exhaustive()
    }
}

impl PendingBroadcast {
    /// The character the roll was made for.
    pub fn subject_id(&self) -> i64 {
        self.subject_id
    }

    /// Whether the admin room will receive the result.
    pub fn notifies_admin(&self) -> bool {
        self.notify_admin
    }

    fn event(&self) -> RealtimeEvent {
        RealtimeEvent::DiceResult {
            subject_id: self.subject_id,
            results: self.results.clone(),
            dices: self.dices.clone(),
        }
    }

    /// Emit the result to its rooms. Failures are logged and returned; none
    /// of them stops the remaining emits.
    pub async fn dispatch(self) -> Vec<BroadcastError> {
        let mut targets = Vec::with_capacity(2);
        if self.notify_admin {
            targets.push(Channel::Admin);
        }
        targets.push(Channel::portrait(self.subject_id));

        let mut failures = Vec::new();
        for channel in targets {
            if let Err(e) = self.broadcaster.emit(channel, self.event()).await {
                tracing::warn!(
                    subject_id = self.subject_id,
                    room = %channel,
                    error = %e,
                    "Failed to broadcast dice result"
                );
                failures.push(e);
            }
        }
        failures
    }

    /// Run [`dispatch`](Self::dispatch) on its own task.
    ///
    /// The task yields once before emitting so the caller can finish writing
    /// its reply first. The ordering is best-effort: on a multi-threaded
    /// runtime a room may still see the result before the HTTP client does.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            self.dispatch().await;
        })
    }
}

/// Authorizes, resolves and announces dice rolls.
pub struct DiceService {
    engine: Arc<DiceEngine>,
    broadcaster: Arc<dyn Broadcaster>,
    flags: Arc<dyn FeatureFlags>,
    max_dice: usize,
}

impl DiceService {
    /// Wire the service to its collaborators.
    pub fn new(
        engine: Arc<DiceEngine>,
        broadcaster: Arc<dyn Broadcaster>,
        flags: Arc<dyn FeatureFlags>,
    ) -> Self {
        Self {
            engine,
            broadcaster,
            flags,
            max_dice: DEFAULT_MAX_DICE,
        }
    }

    /// Override the dice limit.
    pub fn with_max_dice(mut self, max_dice: usize) -> Self {
        self.max_dice = max_dice;
        self
    }

    /// The broadcaster rolls are announced on.
    pub fn broadcaster(&self) -> Arc<dyn Broadcaster> {
        self.broadcaster.clone()
    }

    /// Authorize, then parse a raw JSON body and roll it.
    pub async fn roll_body(&self, caller: Option<Player>, body: &[u8]) -> ServiceResult<RollOutcome> {
        let caller = caller.ok_or(ServiceError::Unauthorized)?;
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ServiceError::InvalidDices(e.to_string()))?;
        let command = RollCommand::from_json(&value)?;
        self.roll(Some(caller), command).await
    }

    /// Roll a parsed command for `caller`.
    pub async fn roll(&self, caller: Option<Player>, command: RollCommand) -> ServiceResult<RollOutcome> {
        let caller = caller.ok_or(ServiceError::Unauthorized)?;
        command.dices.validate(self.max_dice)?;

        let subject_id = command.subject_id(&caller);
        // Flags are only consulted when a table was asked for.
        let classifier = match command.resolver_key.as_deref() {
            Some(raw) => self
                .flags
                .success_types_enabled()
                .await?
                .then(|| Classifier::new(raw.parse().ok())),
            None => None,
        };

        self.broadcaster
            .emit(Channel::portrait(subject_id), RealtimeEvent::DiceRoll)
            .await?;

        let results = self.engine.resolve(&command.dices, classifier).await?;
        tracing::info!(
            player_id = caller.id,
            subject_id,
            array = command.dices.is_array(),
            count = results.len(),
            "Dice rolled"
        );

        Ok(RollOutcome {
            results: results.clone(),
            broadcast: PendingBroadcast {
                broadcaster: self.broadcaster.clone(),
                notify_admin: !caller.admin,
                subject_id,
                results,
                dices: command.dices,
            },
        })
    }
}
