//! Replication configuration

use serde::{Deserialize, Serialize};

/// How the frozen state of a deep-frozen root is carried into the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreezeStrategy {
    /// Freeze the cloned spine and the new value only
    ///
    /// Everything else in the result is shared with the frozen original.
    #[default]
    PathOnly,

    /// Re-freeze the whole result graph
    ///
    /// Cost grows with the size of the graph, not the path.
    FullTraversal,
}

/// What a transform sees when the target slot is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTarget {
    /// Transform receives `Value::Null`
    #[default]
    TreatAsNull,

    /// Fail with a navigation error
    Reject,
}

/// Replication configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicatorConfig {
    /// Freezing of results derived from deep-frozen roots
    pub freeze_strategy: FreezeStrategy,
    /// Handling of absent target slots for transforms
    pub missing_target: MissingTarget,
}

impl ReplicatorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With freeze strategy
    #[inline]
    #[must_use]
    pub fn with_freeze_strategy(mut self, strategy: FreezeStrategy) -> Self {
        self.freeze_strategy = strategy;
        self
    }

    /// With missing-target handling
    #[inline]
    #[must_use]
    pub fn with_missing_target(mut self, missing: MissingTarget) -> Self {
        self.missing_target = missing;
        self
    }
}
