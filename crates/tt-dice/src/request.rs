//! Dice request and response types.

use serde::{Deserialize, Serialize};

use crate::error::{DiceError, DiceResult};
use crate::success::SuccessType;

/// One dice specification: `num` dice of `roll` faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSpec {
    /// Number of dice, or the multiplier in array mode.
    pub num: i64,
    /// Faces per die. In single mode this is also the upper bound per die.
    pub roll: i64,
    /// Reference value (skill or attribute) used for classification.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<i64>,
}

impl DiceSpec {
    /// A specification without a reference value.
    pub fn new(num: i64, roll: i64) -> Self {
        Self {
            num,
            roll,
            reference: None,
        }
    }

    /// Attach a reference value.
    pub fn with_reference(mut self, reference: i64) -> Self {
        self.reference = Some(reference);
        self
    }

    /// The value this specification resolves to without any randomness, if
    /// one of the fixed-value rules applies.
    ///
    /// `num == 0` or `roll < 1` passes `roll` through; `roll == 1` collapses
    /// to `num`.
    pub fn fixed_value(&self) -> Option<i64> {
        if self.num == 0 || self.roll < 1 {
            Some(self.roll)
        } else if self.roll == 1 {
            Some(self.num)
        } else {
            None
        }
    }

    /// The reference value, treating zero as absent.
    pub fn effective_reference(&self) -> Option<i64> {
        self.reference.filter(|r| *r != 0)
    }
}

impl std::fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.num, self.roll)?;
        if let Some(reference) = self.reference {
            write!(f, " vs {reference}")?;
        }
        Ok(())
    }
}

/// A roll request: one specification, or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiceRequest {
    /// Array mode: each entry resolves to one summed value.
    Many(Vec<DiceSpec>),
    /// Single mode: `num` individual dice, optionally classified.
    Single(DiceSpec),
}

impl DiceRequest {
    /// Returns true for array mode.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Check the request shape before any dice are rolled.
    ///
    /// Negative dice counts are rejected in both modes. `limit` caps the
    /// number of dice in single mode and the number of entries in array mode.
    pub fn validate(&self, limit: usize) -> DiceResult<()> {
        match self {
            Self::Single(spec) => {
                if spec.num < 0 {
                    return Err(DiceError::NegativeCount(spec.num));
                }
                let count = usize::try_from(spec.num).unwrap_or(usize::MAX);
                if count > limit {
                    return Err(DiceError::TooManyDice { count, limit });
                }
            }
            Self::Many(specs) => {
                if specs.len() > limit {
                    return Err(DiceError::TooManyDice {
                        count: specs.len(),
                        limit,
                    });
                }
                if let Some(spec) = specs.iter().find(|s| s.num < 0) {
                    return Err(DiceError::NegativeCount(spec.num));
                }
                for spec in specs {
                    if spec.fixed_value().is_none() {
                        spec.num
                            .checked_mul(spec.roll)
                            .ok_or(DiceError::Overflow {
                                num: spec.num,
                                size: spec.roll,
                            })?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl From<DiceSpec> for DiceRequest {
    fn from(spec: DiceSpec) -> Self {
        Self::Single(spec)
    }
}

impl From<Vec<DiceSpec>> for DiceRequest {
    fn from(specs: Vec<DiceSpec>) -> Self {
        Self::Many(specs)
    }
}

/// One resolved roll, positionally aligned with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceResponse {
    /// The rolled (or fixed) value.
    pub roll: i64,
    /// Classification, when one was requested and enabled.
    #[serde(
        rename = "resultType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub result_type: Option<SuccessType>,
}

impl DiceResponse {
    /// An unclassified result.
    pub fn new(roll: i64) -> Self {
        Self {
            roll,
            result_type: None,
        }
    }

    /// A classified result.
    pub fn classified(roll: i64, result_type: SuccessType) -> Self {
        Self {
            roll,
            result_type: Some(result_type),
        }
    }
}
