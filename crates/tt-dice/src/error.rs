//! Error types for the dice engine.

/// Errors that can occur while validating or resolving a dice request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    /// A specification asked for a negative number of dice.
    #[error("negative dice count: {0}")]
    NegativeCount(i64),

    /// A request exceeds the configured dice limit.
    #[error("too many dice: {count} exceeds the limit of {limit}")]
    TooManyDice {
        /// Requested dice (or entries, in array mode).
        count: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The sampling range contains no integer.
    #[error("empty roll range [{min}, {max}]")]
    EmptyRange {
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },

    /// `num * roll` does not fit in an integer.
    #[error("roll bound overflow: {num} x {size}")]
    Overflow {
        /// Number of dice.
        num: i64,
        /// Faces per die.
        size: i64,
    },

    /// A resolver key string did not name a known table.
    #[error("unknown resolver key: {0}")]
    UnknownResolverKey(String),

    /// The dice configuration JSON is malformed.
    #[error("invalid dice config: {0}")]
    InvalidConfig(String),
}

/// Convenience result type for dice operations.
pub type DiceResult<T> = Result<T, DiceError>;
