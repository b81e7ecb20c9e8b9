//! Error types for the dice service.

use thiserror::Error;
use tt_dice::DiceError;
use tt_realtime::BroadcastError;

use crate::flags::FlagError;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors a roll can fail with.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No player session was presented.
    #[error("unauthorized")]
    Unauthorized,

    /// The request body or dice payload is missing or malformed.
    #[error("invalid dices: {0}")]
    InvalidDices(String),

    /// The request was rejected by the dice engine.
    #[error("dice error: {0}")]
    Dice(#[from] DiceError),

    /// The feature-flag store failed.
    #[error("flag lookup failed: {0}")]
    Flags(#[from] FlagError),

    /// The broadcaster failed before the result was computed.
    #[error("broadcast failed: {0}")]
    Broadcast(#[from] BroadcastError),
}

impl ServiceError {
    /// The `reason` reported to the caller.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidDices(_) | Self::Dice(_) => "invalid_dices",
            Self::Flags(_) | Self::Broadcast(_) => "unknown_error",
        }
    }

    /// Returns true for failures the caller caused.
    pub fn is_client_error(&self) -> bool {
        !matches!(self.reason(), "unknown_error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons() {
        assert_eq!(ServiceError::Unauthorized.reason(), "unauthorized");
        assert_eq!(
            ServiceError::InvalidDices("missing".into()).reason(),
            "invalid_dices"
        );
        assert_eq!(
            ServiceError::Dice(DiceError::NegativeCount(-1)).reason(),
            "invalid_dices"
        );
        assert_eq!(
            ServiceError::Broadcast(BroadcastError::Unavailable("down".into())).reason(),
            "unknown_error"
        );
        assert!(!ServiceError::Flags(FlagError("db".into())).is_client_error());
        assert!(ServiceError::Unauthorized.is_client_error());
    }
}
