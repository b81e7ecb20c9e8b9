//! Events pushed to subscribed clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tt_dice::{DiceRequest, DiceResponse};

use crate::error::{BroadcastError, BroadcastResult};

/// An event addressed to a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    /// A roll has started for the room's subject.
    DiceRoll,
    /// A roll has finished.
    DiceResult {
        /// The character the roll was made for.
        subject_id: i64,
        /// Resolved values, aligned with `dices`.
        results: Vec<DiceResponse>,
        /// The original request, for correlation.
        dices: DiceRequest,
    },
    /// The game master changed the scene environment.
    EnvironmentChange {
        /// New environment name (e.g. `idle`, `combat`).
        value: String,
    },
}

impl RealtimeEvent {
    /// The event name clients listen on.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DiceRoll => "diceRoll",
            Self::DiceResult { .. } => "diceResult",
            Self::EnvironmentChange { .. } => "environmentChange",
        }
    }

    /// Positional arguments of the event.
    pub fn args(&self) -> BroadcastResult<Vec<Value>> {
        let encode = |e: serde_json::Error| BroadcastError::Encode(e.to_string());
        Ok(match self {
            Self::DiceRoll => Vec::new(),
            Self::DiceResult {
                subject_id,
                results,
                dices,
            } => vec![
                Value::from(*subject_id),
                serde_json::to_value(results).map_err(encode)?,
                serde_json::to_value(dices).map_err(encode)?,
            ],
            Self::EnvironmentChange { value } => vec![Value::from(value.clone())],
        })
    }

    /// Wrap the event for the wire.
    pub fn envelope(&self) -> BroadcastResult<Envelope> {
        Ok(Envelope {
            event: self.name().to_string(),
            args: self.args()?,
        })
    }
}

/// The wire form of an event: `{"event": name, "args": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name.
    pub event: String,
    /// Positional arguments.
    pub args: Vec<Value>,
}
