//! Success classification for rolled values.
//!
//! A [`DiceResolverKey`] selects one of four threshold tables:
//! - **`20`**: roll over `20 - reference` on a d20
//! - **`20b`**: branched d20, adds good and extreme bands at a half and a fifth
//!   of the reference
//! - **`100`**: roll at or under the reference on a d100
//! - **`100b`**: branched d100, good at half and extreme at a fifth of the
//!   reference
//!
//! Bands are checked from extreme down to success; the first match wins.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiceError;

/// Which success table applies to a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiceResolverKey {
    /// Plain d20 roll-over.
    #[serde(rename = "20")]
    D20,
    /// Branched d20 roll-over with good and extreme bands.
    #[serde(rename = "20b")]
    D20Branched,
    /// Plain d100 roll-under.
    #[serde(rename = "100")]
    D100,
    /// Branched d100 roll-under with good and extreme bands.
    #[serde(rename = "100b")]
    D100Branched,
}

impl DiceResolverKey {
    /// The wire name of this key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::D20 => "20",
            Self::D20Branched => "20b",
            Self::D100 => "100",
            Self::D100Branched => "100b",
        }
    }
}

impl FromStr for DiceResolverKey {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "20" => Ok(Self::D20),
            "20b" => Ok(Self::D20Branched),
            "100" => Ok(Self::D100),
            "100b" => Ok(Self::D100Branched),
            other => Err(DiceError::UnknownResolverKey(other.to_string())),
        }
    }
}

impl std::fmt::Display for DiceResolverKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classified outcome of a single rolled value.
///
/// On the wire this is `{"description": ..., "successWeight": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "SuccessTypeRepr", try_from = "SuccessTypeRepr")]
pub enum SuccessType {
    /// Weight 2.
    Extreme,
    /// Weight 1.
    Good,
    /// Weight 0.
    Success,
    /// Weight -1.
    Failure,
    /// No table was selected. Weight 0.
    Unknown,
}

impl SuccessType {
    /// The numeric weight clients sort and color by.
    pub fn weight(self) -> i8 {
        match self {
            Self::Extreme => 2,
            Self::Good => 1,
            Self::Success | Self::Unknown => 0,
            Self::Failure => -1,
        }
    }

    /// Human-readable label.
    pub fn description(self) -> &'static str {
        match self {
            Self::Extreme => "Extreme",
            Self::Good => "Good",
            Self::Success => "Success",
            Self::Failure => "Failure",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns true for every band except failure.
    pub fn is_success(self) -> bool {
        self.weight() >= 0 && self != Self::Unknown
    }
}

impl std::fmt::Display for SuccessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.weight())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuccessTypeRepr {
    description: String,
    success_weight: i8,
}

impl From<SuccessType> for SuccessTypeRepr {
    fn from(value: SuccessType) -> Self {
        Self {
            description: value.description().to_string(),
            success_weight: value.weight(),
        }
    }
}

impl TryFrom<SuccessTypeRepr> for SuccessType {
    type Error = String;

    fn try_from(repr: SuccessTypeRepr) -> Result<Self, Self::Error> {
        let kind = match repr.description.as_str() {
            "Extreme" => Self::Extreme,
            "Good" => Self::Good,
            "Success" => Self::Success,
            "Failure" => Self::Failure,
            "Unknown" => Self::Unknown,
            other => return Err(format!("unknown success type: {other}")),
        };
        if kind.weight() != repr.success_weight {
            return Err(format!(
                "success weight {} does not match {}",
                repr.success_weight,
                kind.description()
            ));
        }
        Ok(kind)
    }
}

/// Classification settings for a single-mode roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classifier {
    key: Option<DiceResolverKey>,
}

impl Classifier {
    /// Classify with the table selected by `key`, or as unknown without one.
    pub fn new(key: Option<DiceResolverKey>) -> Self {
        Self { key }
    }

    /// The selected table.
    pub fn key(&self) -> Option<DiceResolverKey> {
        self.key
    }

    /// Classify one rolled value.
    pub fn classify(&self, reference: i64, rolled: i64) -> SuccessType {
        classify(self.key, reference, rolled)
    }
}

/// Classify `rolled` against `reference` using the table selected by `key`.
///
/// With no key the result is [`SuccessType::Unknown`].
pub fn classify(key: Option<DiceResolverKey>, reference: i64, rolled: i64) -> SuccessType {
    let Some(key) = key else {
        return SuccessType::Unknown;
    };

    // floor(reference * 0.2) and floor(reference * 0.5)
    let fifth = reference.div_euclid(5);
    let half = reference.div_euclid(2);
    // Roll-over tables compare in i128 so any client reference stays in range.
    let over = |threshold: i64| i128::from(rolled) > 20 - i128::from(threshold);

    match key {
        DiceResolverKey::D20 => {
            if over(reference) {
                SuccessType::Success
            } else {
                SuccessType::Failure
            }
        }
        DiceResolverKey::D20Branched => {
            if over(fifth) {
                SuccessType::Extreme
            } else if over(half) {
                SuccessType::Good
            } else if over(reference) {
                SuccessType::Success
            } else {
                SuccessType::Failure
            }
        }
        DiceResolverKey::D100 => {
            if rolled <= reference {
                SuccessType::Success
            } else {
                SuccessType::Failure
            }
        }
        DiceResolverKey::D100Branched => {
            if rolled <= fifth {
                SuccessType::Extreme
            } else if rolled <= half {
                SuccessType::Good
            } else if rolled <= reference {
                SuccessType::Success
            } else {
                SuccessType::Failure
            }
        }
    }
}
