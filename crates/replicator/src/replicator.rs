//! Fluent replication builder
//!
//! ```text
//! Replicator ──child*──▶ Replicator ──modify──▶ PendingModification
//!     │                                              │ to / by / try_by
//!     ▼ replicate (empty path only)                  ▼
//!   NodeRef                          ReadyReplication ──replicate──▶ NodeRef
//! ```
//!
//! Each step consumes the previous one, so a builder cannot be reused after
//! `replicate()` and cannot hold two unresolved modifications.

use crate::config::ReplicatorConfig;
use crate::engine::{replicate_with, Replication};
use crate::error::ReplicateError;
use crate::modification::{Modification, TransformError};
use crate::node::{NodeRef, Value};
use crate::path::{Key, Path};
use std::sync::Arc;

/// Builder bound to a root, accumulating a navigation path
#[derive(Debug)]
#[must_use]
pub struct Replicator {
    root: NodeRef,
    path: Path,
    config: ReplicatorConfig,
}

impl Replicator {
    /// Bind a builder to `root`
    ///
    /// # Errors
    /// Returns [`ReplicateError::InvalidArgument`] if `root` is not a node
    pub fn for_object(root: impl Into<Value>) -> Result<Self, ReplicateError> {
        match root.into() {
            Value::Node(node) => Ok(Self::for_node(&node)),
            other => Err(ReplicateError::InvalidArgument(format!(
                "root must be a container, got {}",
                other.type_name()
            ))),
        }
    }

    /// Bind a builder to a known node
    pub fn for_node(root: &NodeRef) -> Self {
        Self {
            root: Arc::clone(root),
            path: Path::root(),
            config: ReplicatorConfig::default(),
        }
    }

    /// Use `config` instead of the default configuration
    pub fn with_config(mut self, config: ReplicatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Navigate one level further
    ///
    /// The key is resolved only when replicating.
    pub fn child(mut self, key: impl Into<Key>) -> Self {
        self.path.push(key);
        self
    }

    /// Declare the slot to modify in the current container
    pub fn modify(self, key: impl Into<Key>) -> PendingModification {
        PendingModification {
            replicator: self,
            target: key.into(),
        }
    }

    /// Path accumulated so far
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shallow copy of the root
    ///
    /// # Errors
    /// Returns [`ReplicateError::InvalidBuilderState`] if a path was given
    /// without a modification
    pub fn replicate(self) -> Result<NodeRef, ReplicateError> {
        let (root, intent, config) = self.into_parts(None);
        replicate_with(&root, intent, &config)
    }

    /// Root and intent value, for use with [`crate::replicate`]
    #[must_use]
    pub fn into_intent(self) -> (NodeRef, Replication) {
        let (root, intent, _) = self.into_parts(None);
        (root, intent)
    }

    fn into_parts(self, modification: Option<Modification>) -> (NodeRef, Replication, ReplicatorConfig) {
        let intent = Replication {
            path: self.path,
            modification,
        };
        (self.root, intent, self.config)
    }
}

/// Builder awaiting the operation for its declared target
#[derive(Debug)]
#[must_use]
pub struct PendingModification {
    replicator: Replicator,
    target: Key,
}

impl PendingModification {
    /// Replace the target with `value`
    pub fn to(self, value: impl Into<Value>) -> ReadyReplication {
        let modification = Modification::replace(self.target, value);
        ReadyReplication {
            replicator: self.replicator,
            modification,
        }
    }

    /// Derive the target from its old value
    pub fn by<F>(self, f: F) -> ReadyReplication
    where
        F: FnOnce(&Value) -> Value + 'static,
    {
        self.try_by(move |old| Ok(f(old)))
    }

    /// Derive the target from its old value with a fallible function
    ///
    /// An error from `f` is returned unchanged from
    /// [`ReadyReplication::replicate`].
    pub fn try_by<F>(self, f: F) -> ReadyReplication
    where
        F: FnOnce(&Value) -> Result<Value, TransformError> + 'static,
    {
        let modification = Modification::transform(self.target, f);
        ReadyReplication {
            replicator: self.replicator,
            modification,
        }
    }
}

/// Builder with a resolved modification, ready to replicate
#[derive(Debug)]
#[must_use]
pub struct ReadyReplication {
    replicator: Replicator,
    modification: Modification,
}

impl ReadyReplication {
    /// Build the new root
    ///
    /// # Errors
    /// - [`ReplicateError::Navigation`] if a key does not resolve
    /// - [`ReplicateError::Transform`] if the transform function fails
    pub fn replicate(self) -> Result<NodeRef, ReplicateError> {
        let (root, intent, config) = self.replicator.into_parts(Some(self.modification));
        replicate_with(&root, intent, &config)
    }

    /// Root and intent value, for use with [`crate::replicate`]
    #[must_use]
    pub fn into_intent(self) -> (NodeRef, Replication) {
        let (root, intent, _) = self.replicator.into_parts(Some(self.modification));
        (root, intent)
    }
}
