//! Per-sheet dice configuration.
//!
//! Each kind of check (characteristic, skill, attribute) names the die it is
//! rolled with and whether it uses the branched tables. The pair maps onto a
//! [`DiceResolverKey`].

use serde::{Deserialize, Serialize};

use crate::error::{DiceError, DiceResult};
use crate::success::DiceResolverKey;

/// How one kind of check is rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieConfig {
    /// Faces on the check die (20 or 100 for the built-in tables).
    pub value: i64,
    /// Whether good and extreme bands apply.
    #[serde(default)]
    pub branched: bool,
    /// Whether sheet values carry a modifier next to them.
    #[serde(default)]
    pub enable_modifiers: bool,
}

impl DieConfig {
    /// A plain, unbranched configuration for a die.
    pub fn new(value: i64) -> Self {
        Self {
            value,
            branched: false,
            enable_modifiers: false,
        }
    }

    /// Set whether the branched table applies.
    pub fn with_branched(mut self, branched: bool) -> Self {
        self.branched = branched;
        self
    }

    /// The table this configuration selects, if the die has one.
    pub fn resolver_key(&self) -> Option<DiceResolverKey> {
        match (self.value, self.branched) {
            (20, false) => Some(DiceResolverKey::D20),
            (20, true) => Some(DiceResolverKey::D20Branched),
            (100, false) => Some(DiceResolverKey::D100),
            (100, true) => Some(DiceResolverKey::D100Branched),
            _ => None,
        }
    }
}

/// Dice configuration for a whole character sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceConfig {
    /// Characteristic checks.
    pub characteristic: DieConfig,
    /// Skill checks.
    pub skill: DieConfig,
    /// Attribute checks.
    pub attribute: DieConfig,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            characteristic: DieConfig::new(20),
            skill: DieConfig::new(20),
            attribute: DieConfig::new(100),
        }
    }
}

impl DiceConfig {
    /// Parse a configuration from its JSON form.
    pub fn from_json(json: &str) -> DiceResult<Self> {
        serde_json::from_str(json).map_err(|e| DiceError::InvalidConfig(e.to_string()))
    }
}
