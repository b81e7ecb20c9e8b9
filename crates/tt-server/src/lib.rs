//! Dice resolution service for the tabletop console.
//!
//! [`DiceService`] authorizes a roll, validates the request, resolves it with
//! the dice engine and hands back both the synchronous result and a
//! [`PendingBroadcast`] that fans the result out to the admin and portrait
//! rooms. The [`api`] module exposes the service over HTTP and serves the
//! WebSocket rooms.

pub mod api;
pub mod config;
pub mod dice;
pub mod error;
pub mod flags;
pub mod session;

pub use api::{AppState, router, serve};
pub use config::{ConfigError, ConfigResult, ServerConfig};
pub use dice::{DiceService, PendingBroadcast, RollCommand, RollOutcome};
pub use error::{ServiceError, ServiceResult};
pub use flags::{FeatureFlags, FlagError, StaticFlags};
pub use session::{Player, SESSION_HEADER, SessionResolver, StaticSessions};
