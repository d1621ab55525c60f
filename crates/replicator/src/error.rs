//! Error types for replication
//!
//! Every failure is raised before a result root is returned; there is no
//! partially replicated state.

use crate::modification::TransformError;
use crate::node::SlotError;
use crate::path::{Key, Path};

/// Main replication error type
#[derive(Debug, thiserror::Error)]
pub enum ReplicateError {
    /// Entry point received something that is not a container
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Intent is missing or duplicating its modification
    #[error("invalid builder state: {0}")]
    InvalidBuilderState(String),

    /// A path key does not resolve on the runtime graph
    #[error("cannot navigate to '{key}' under {}: {reason}", .path.describe())]
    Navigation {
        /// Offending key
        key: Key,
        /// Keys successfully walked before `key`
        path: Path,
        /// Why `key` could not be used
        reason: NavigationFailure,
    },

    /// Caller-supplied transform failed
    #[error("transformation failed: {0}")]
    Transform(#[from] TransformError),
}

impl ReplicateError {
    /// Check for a navigation failure
    #[inline]
    #[must_use]
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Navigation { .. })
    }

    pub(crate) fn navigation(key: &Key, path: &Path, reason: impl Into<NavigationFailure>) -> Self {
        Self::Navigation {
            key: key.clone(),
            path: path.clone(),
            reason: reason.into(),
        }
    }
}

/// Why a key could not be navigated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationFailure {
    /// No such property or element
    #[error("key not found")]
    Missing,

    /// Value under the previous key is a scalar
    #[error("found a {found}, not a container")]
    NotAContainer {
        /// Type name of the value found
        found: &'static str,
    },

    /// Key does not fit the container
    #[error(transparent)]
    Slot(#[from] SlotError),
}
