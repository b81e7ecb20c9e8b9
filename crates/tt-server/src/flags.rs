//! Server-side feature flags.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;

/// The flag store could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FlagError(pub String);

/// Reads global feature flags.
#[async_trait]
pub trait FeatureFlags: Send + Sync {
    /// Whether rolls with a resolver key are classified.
    async fn success_types_enabled(&self) -> Result<bool, FlagError>;
}

/// Flags held in memory, set from configuration.
#[derive(Debug, Default)]
pub struct StaticFlags {
    success_types: AtomicBool,
}

impl StaticFlags {
    /// Create the store with success classification on or off.
    pub fn new(success_types: bool) -> Self {
        Self {
            success_types: AtomicBool::new(success_types),
        }
    }

    /// Toggle success classification at runtime.
    pub fn set_success_types(&self, enabled: bool) {
        self.success_types.store(enabled, Ordering::Relaxed);
    }
}

#[async_trait]
impl FeatureFlags for StaticFlags {
    async fn success_types_enabled(&self) -> Result<bool, FlagError> {
        Ok(self.success_types.load(Ordering::Relaxed))
    }
}
