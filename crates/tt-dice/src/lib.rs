//! Dice engine for the tabletop console.
//!
//! Provides the request/response model for dice rolls, a random roll engine
//! with an injectable "rolling" delay, the success classification tables
//! (`20`, `20b`, `100`, `100b`) and the per-sheet dice configuration that
//! selects which table a check uses.

pub mod config;
pub mod engine;
pub mod error;
pub mod request;
pub mod success;

pub use config::{DiceConfig, DieConfig};
pub use engine::{DiceEngine, NoDelay, RollDelay, RollRange, TokioDelay};
pub use error::{DiceError, DiceResult};
pub use request::{DiceRequest, DiceResponse, DiceSpec};
pub use success::{Classifier, DiceResolverKey, SuccessType, classify};
