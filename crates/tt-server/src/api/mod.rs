//! API layer - HTTP and WebSocket entry points.

pub mod http;
pub mod websocket;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tt_dice::{DiceConfig, DiceEngine, NoDelay, RollDelay, TokioDelay};
use tt_realtime::RoomHub;

use crate::config::ServerConfig;
use crate::dice::DiceService;
use crate::flags::StaticFlags;
use crate::session::SessionResolver;

pub use http::{RollReply, StatusReply};
pub use websocket::{ClientMessage, ServerMessage};

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    /// The dice service.
    pub service: Arc<DiceService>,
    /// Room memberships of WebSocket connections.
    pub hub: Arc<RoomHub>,
    /// Resolves callers from request headers.
    pub sessions: Arc<dyn SessionResolver>,
    /// Served read-only at `/api/dice/config`.
    pub dice_config: DiceConfig,
}

impl AppState {
    /// Assemble state from prebuilt parts.
    pub fn new(
        service: Arc<DiceService>,
        hub: Arc<RoomHub>,
        sessions: Arc<dyn SessionResolver>,
        dice_config: DiceConfig,
    ) -> Self {
        Self {
            service,
            hub,
            sessions,
            dice_config,
        }
    }

    /// Build the production wiring: rolls are announced on the room hub.
    pub fn from_config(config: &ServerConfig) -> Self {
        let (min_ms, max_ms) = config.roll_delay_ms;
        let delay: Arc<dyn RollDelay> = if max_ms == 0 {
            Arc::new(NoDelay)
        } else {
            Arc::new(TokioDelay)
        };
        let engine = Arc::new(DiceEngine::new(delay).with_latency(min_ms, max_ms));
        let hub = Arc::new(RoomHub::new());
        let flags = Arc::new(StaticFlags::new(config.enable_success_types));
        let service = DiceService::new(engine, hub.clone(), flags).with_max_dice(config.max_dice);

        Self::new(
            Arc::new(service),
            hub,
            Arc::new(config.session_table()),
            config.dice,
        )
    }
}

/// Create the full router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(http::routes())
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the listener fails.
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let app = router(AppState::from_config(&config));
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        address = %addr,
        success_types = config.enable_success_types,
        sessions = config.sessions.len(),
        max_dice = config.max_dice,
        "Dice server listening"
    );

    axum::serve(listener, app).await
}
