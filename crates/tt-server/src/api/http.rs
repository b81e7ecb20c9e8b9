//! HTTP routes.
//!
//! Replies are always `200 OK` with a `status` field; failures carry a
//! `reason`. Unsupported methods get axum's empty `405`.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tt_dice::{DiceConfig, DiceResponse};
use tt_realtime::{Broadcaster, RealtimeEvent};

use super::AppState;

/// Reply to `POST /api/dice`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RollReply {
    /// The roll was resolved.
    Success {
        /// Resolved values, aligned with the request.
        results: Vec<DiceResponse>,
    },
    /// The roll was refused or failed.
    Failure {
        /// `unauthorized`, `invalid_dices` or `unknown_error`.
        reason: &'static str,
    },
}

/// Reply to commands without a payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusReply {
    /// The command was carried out.
    Success,
    /// The command was refused or failed.
    Failure {
        /// Why.
        reason: &'static str,
    },
}

#[derive(Debug, Deserialize)]
struct EnvironmentBody {
    value: Option<String>,
}

/// Create the HTTP routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/dice", post(roll_dice))
        .route("/api/dice/config", get(dice_config))
        .route("/api/environment", post(change_environment))
}

async fn health() -> &'static str {
    "OK"
}

async fn roll_dice(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<RollReply> {
    let caller = state.sessions.resolve(&headers).await;
    match state.service.roll_body(caller, &body).await {
        Ok(outcome) => {
            // Detached and deferred; the rooms usually hear after the reply.
            outcome.broadcast.spawn();
            Json(RollReply::Success {
                results: outcome.results,
            })
        }
        Err(e) => {
            if e.is_client_error() {
                tracing::debug!(reason = e.reason(), error = %e, "Roll rejected");
            } else {
                tracing::error!(error = %e, "Roll failed");
            }
            Json(RollReply::Failure { reason: e.reason() })
        }
    }
}

async fn dice_config(State(state): State<AppState>) -> Json<DiceConfig> {
    Json(state.dice_config)
}

async fn change_environment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<StatusReply> {
    let caller = state.sessions.resolve(&headers).await;
    if !caller.is_some_and(|p| p.admin) {
        return Json(StatusReply::Failure {
            reason: "unauthorized",
        });
    }

    let value = serde_json::from_slice::<EnvironmentBody>(&body)
        .ok()
        .and_then(|b| b.value)
        .filter(|v| !v.trim().is_empty());
    let Some(value) = value else {
        return Json(StatusReply::Failure {
            reason: "invalid_body",
        });
    };

    let event = RealtimeEvent::EnvironmentChange {
        value: value.clone(),
    };
    match state.service.broadcaster().emit_all(event).await {
        Ok(delivered) => {
            tracing::info!(environment = %value, delivered, "Environment changed");
            Json(StatusReply::Success)
        }
        Err(e) => {
            tracing::error!(environment = %value, error = %e, "Failed to broadcast environment");
            Json(StatusReply::Failure {
                reason: "unknown_error",
            })
        }
    }
}
