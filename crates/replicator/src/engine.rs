//! Clone-and-splice replication
//!
//! Given a root, a [`Path`] and at most one [`Modification`], builds a new
//! root that differs from the original only along the path:
//!
//! 1. Walk the path from the root, collecting the visited nodes (the spine).
//! 2. Shallow-clone the leaf and apply the modification to the clone.
//! 3. Shallow-clone every ancestor bottom-up, splicing in the clone below.
//!
//! Every slot not on the path keeps the exact value of the original, so the
//! cost is the path depth times the width of each spine node, independent
//! of the size of the graph.
//!
//! # Frozen state
//! If the original root is deep-frozen, the result is deep-frozen too.
//! Otherwise nothing is frozen by replication.

use crate::config::{FreezeStrategy, MissingTarget, ReplicatorConfig};
use crate::error::{NavigationFailure, ReplicateError};
use crate::freeze::{deep_freeze, deep_freeze_value, is_deep_frozen};
use crate::modification::Modification;
use crate::node::{Node, NodeRef, ShallowClone, Value};
use crate::path::{Key, Path};
use std::sync::Arc;

/// What to replicate: a path and an optional modification at its end
///
/// An empty path with no modification is a plain shallow copy of the root.
#[derive(Debug, Default)]
pub struct Replication {
    pub(crate) path: Path,
    pub(crate) modification: Option<Modification>,
}

impl Replication {
    /// Empty intent (shallow copy of the root)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intent navigating `path`
    #[inline]
    #[must_use]
    pub fn at(path: Path) -> Self {
        Self {
            path,
            modification: None,
        }
    }

    /// Append a navigation key
    #[inline]
    #[must_use]
    pub fn child(mut self, key: impl Into<Key>) -> Self {
        self.path.push(key);
        self
    }

    /// Set the modification
    ///
    /// # Errors
    /// Returns [`ReplicateError::InvalidBuilderState`] if one is already set
    pub fn with_modification(mut self, modification: Modification) -> Result<Self, ReplicateError> {
        if let Some(existing) = &self.modification {
            return Err(ReplicateError::InvalidBuilderState(format!(
                "modification of '{}' already set, cannot also modify '{}'",
                existing.target(),
                modification.target()
            )));
        }
        self.modification = Some(modification);
        Ok(self)
    }

    /// Navigation path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pending modification
    #[inline]
    #[must_use]
    pub fn modification(&self) -> Option<&Modification> {
        self.modification.as_ref()
    }

    /// Check the intent can be replicated
    ///
    /// # Errors
    /// Returns [`ReplicateError::InvalidBuilderState`] for a non-empty path
    /// without a modification
    pub fn validate(&self) -> Result<(), ReplicateError> {
        if !self.path.is_empty() && self.modification.is_none() {
            return Err(ReplicateError::InvalidBuilderState(format!(
                "path '{}' has no modification",
                self.path
            )));
        }
        Ok(())
    }
}

/// Replicate `root` per `intent` with the default configuration
///
/// # Errors
/// See [`replicate_with`]
pub fn replicate(root: &NodeRef, intent: Replication) -> Result<NodeRef, ReplicateError> {
    replicate_with(root, intent, &ReplicatorConfig::default())
}

/// Replicate `root` per `intent`
///
/// `root` is never written to. The result is always a new node, even for an
/// empty intent.
///
/// # Errors
/// - [`ReplicateError::InvalidBuilderState`] if the intent is invalid
/// - [`ReplicateError::Navigation`] if a key does not resolve
/// - [`ReplicateError::Transform`] if the transform function fails
pub fn replicate_with(
    root: &NodeRef,
    intent: Replication,
    config: &ReplicatorConfig,
) -> Result<NodeRef, ReplicateError> {
    intent.validate()?;
    let frozen = is_deep_frozen(root);
    tracing::debug!(
        path = %intent.path.describe(),
        frozen,
        modifies = intent.modification.is_some(),
        "replicating"
    );

    let Replication { path, modification } = intent;
    let (ancestors, leaf) = walk(root, &path)?;
    let freeze_spine = frozen && config.freeze_strategy == FreezeStrategy::PathOnly;

    let mut clone = leaf.shallow_clone();
    let placed = match modification {
        Some(modification) => Some(apply(&mut clone, &leaf, &path, modification, config)?),
        None => None,
    };
    if freeze_spine {
        clone.freeze();
    }
    let mut current = Arc::new(clone);

    // ancestors[i] is left through path key i
    for (node, key) in ancestors.iter().zip(path.keys()).rev() {
        let mut parent = node.shallow_clone();
        parent
            .container_mut()
            .set(key.clone(), Value::Node(current))
            .map_err(|e| ReplicateError::navigation(key, &path, e))?;
        if freeze_spine {
            parent.freeze();
        }
        current = Arc::new(parent);
    }

    // caller-supplied values are frozen only once nothing can fail
    if freeze_spine {
        if let Some(value) = &placed {
            deep_freeze_value(value);
        }
    }
    if frozen && config.freeze_strategy == FreezeStrategy::FullTraversal {
        deep_freeze(&current);
    }
    tracing::trace!(cloned = ancestors.len() + 1, "replication complete");
    Ok(current)
}

/// Walk `path` from `root`, returning the nodes passed through and the leaf
fn walk(root: &NodeRef, path: &Path) -> Result<(Vec<NodeRef>, NodeRef), ReplicateError> {
    let mut ancestors = Vec::with_capacity(path.len());
    let mut current = Arc::clone(root);

    for (depth, key) in path.iter().enumerate() {
        let next = match current.get(key) {
            Some(Value::Node(node)) => node,
            Some(other) => {
                return Err(ReplicateError::navigation(
                    key,
                    &path.prefix(depth),
                    NavigationFailure::NotAContainer {
                        found: other.type_name(),
                    },
                ))
            }
            None => {
                return Err(ReplicateError::navigation(
                    key,
                    &path.prefix(depth),
                    NavigationFailure::Missing,
                ))
            }
        };
        ancestors.push(std::mem::replace(&mut current, next));
    }
    Ok((ancestors, current))
}

/// Apply `modification` to `clone`, a fresh copy of `leaf`, returning the
/// value placed in the target slot
fn apply(
    clone: &mut Node,
    leaf: &Node,
    path: &Path,
    modification: Modification,
    config: &ReplicatorConfig,
) -> Result<Value, ReplicateError> {
    let (target, operation) = modification.into_parts();
    let old = match leaf.get(&target) {
        Some(value) => value,
        None if operation.reads_state() && config.missing_target == MissingTarget::Reject => {
            return Err(ReplicateError::navigation(&target, path, NavigationFailure::Missing));
        }
        None => Value::Null,
    };

    let new = operation.apply(&old)?;
    clone
        .container_mut()
        .set(target.clone(), new.clone())
        .map_err(|e| ReplicateError::navigation(&target, path, e))?;
    Ok(new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modification::TransformError;
    use crate::node::SlotError;
    use serde_json::json;

    fn tree() -> NodeRef {
        Value::from(json!({
            "a": {"b": {"leaf": 1, "other": {"deep": true}}},
            "sibling": {"x": 1}
        }))
        .as_node()
        .cloned()
        .unwrap()
    }

    fn node_at(root: &NodeRef, path: &str) -> NodeRef {
        let path: Path = path.parse().unwrap();
        path.iter().fold(Arc::clone(root), |node, key| {
            node.get(key).unwrap().as_node().cloned().unwrap()
        })
    }

    #[test]
    fn replace_clones_only_the_spine() {
        let root = tree();
        let intent = Replication::new()
            .child("a")
            .child("b")
            .with_modification(Modification::replace("leaf", 2))
            .unwrap();
        let result = replicate(&root, intent).unwrap();

        assert!(!Arc::ptr_eq(&root, &result));
        assert!(!Arc::ptr_eq(&node_at(&root, "a.b"), &node_at(&result, "a.b")));
        assert!(Arc::ptr_eq(&node_at(&root, "sibling"), &node_at(&result, "sibling")));
        assert!(Arc::ptr_eq(&node_at(&root, "a.b.other"), &node_at(&result, "a.b.other")));

        assert_eq!(node_at(&root, "a.b").get(&Key::from("leaf")), Some(Value::Int(1)));
        assert_eq!(node_at(&result, "a.b").get(&Key::from("leaf")), Some(Value::Int(2)));
    }

    #[test]
    fn empty_intent_is_shallow_copy() {
        let root = tree();
        let result = replicate(&root, Replication::new()).unwrap();
        assert!(!Arc::ptr_eq(&root, &result));
        assert!(Arc::ptr_eq(&node_at(&root, "a"), &node_at(&result, "a")));
    }

    #[test]
    fn modification_at_root() {
        let root = tree();
        let intent = Replication::new()
            .with_modification(Modification::replace("added", "yes"))
            .unwrap();
        let result = replicate(&root, intent).unwrap();
        assert_eq!(root.get(&Key::from("added")), None);
        assert_eq!(result.get(&Key::from("added")), Some(Value::from("yes")));
        assert_eq!(result.len(), root.len() + 1);
    }

    #[test]
    fn path_without_modification_is_rejected() {
        let err = replicate(&tree(), Replication::new().child("a")).unwrap_err();
        assert!(matches!(err, ReplicateError::InvalidBuilderState(_)));
    }

    #[test]
    fn second_modification_is_rejected() {
        let err = Replication::new()
            .with_modification(Modification::replace("a", 1))
            .unwrap()
            .with_modification(Modification::replace("b", 2))
            .unwrap_err();
        assert!(matches!(err, ReplicateError::InvalidBuilderState(_)));
    }

    #[test]
    fn missing_key_reports_partial_path() {
        let intent = Replication::at("a.nope.c".parse().unwrap())
            .with_modification(Modification::replace("x", 1))
            .unwrap();
        match replicate(&tree(), intent).unwrap_err() {
            ReplicateError::Navigation { key, path, reason } => {
                assert_eq!(key, Key::from("nope"));
                assert_eq!(path.to_string(), "a");
                assert_eq!(reason, NavigationFailure::Missing);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn scalar_on_path_is_not_a_container() {
        let intent = Replication::at("a.b.leaf".parse().unwrap())
            .with_modification(Modification::replace("x", 1))
            .unwrap();
        let err = replicate(&tree(), intent).unwrap_err();
        assert!(matches!(
            err,
            ReplicateError::Navigation {
                reason: NavigationFailure::NotAContainer { found: "int" },
                ..
            }
        ));
    }

    #[test]
    fn transform_error_passes_through_and_root_is_untouched() {
        let root = tree();
        let before = Value::from(&root).to_json().unwrap();
        let intent = Replication::at("a.b".parse().unwrap())
            .with_modification(Modification::transform("leaf", |_| {
                Err(TransformError::Failed("nope".into()))
            }))
            .unwrap();
        let err = replicate(&root, intent).unwrap_err();
        assert!(matches!(err, ReplicateError::Transform(TransformError::Failed(_))));
        assert_eq!(Value::from(&root).to_json().unwrap(), before);
    }

    #[test]
    fn missing_target_policy() {
        let increment = || {
            Modification::transform("absent", |old| match old {
                Value::Null => Ok(Value::Int(0)),
                other => Ok(other.clone()),
            })
        };

        let intent = Replication::new().with_modification(increment()).unwrap();
        let result = replicate(&tree(), intent).unwrap();
        assert_eq!(result.get(&Key::from("absent")), Some(Value::Int(0)));

        let config = ReplicatorConfig::new().with_missing_target(MissingTarget::Reject);
        let intent = Replication::new().with_modification(increment()).unwrap();
        let err = replicate_with(&tree(), intent, &config).unwrap_err();
        assert!(err.is_navigation());
    }

    #[test]
    fn sequence_leaf_index_out_of_bounds() {
        let root = Value::from(json!({"items": [1, 2]})).as_node().cloned().unwrap();
        let intent = Replication::new()
            .child("items")
            .with_modification(Modification::replace(5usize, 0))
            .unwrap();
        let err = replicate(&root, intent).unwrap_err();
        assert!(err.is_navigation());
    }

    #[test]
    fn failed_splice_leaves_new_value_unfrozen() {
        let root = Value::from(json!({"items": [1, 2]})).as_node().cloned().unwrap();
        deep_freeze(&root);
        let mine = Node::new_record([("n", Value::from(1))]);

        let intent = Replication::new()
            .child("items")
            .with_modification(Modification::replace(5usize, &mine))
            .unwrap();
        let err = replicate(&root, intent).unwrap_err();

        assert!(matches!(
            err,
            ReplicateError::Navigation {
                reason: NavigationFailure::Slot(SlotError::IndexOutOfBounds { index: 5, len: 2 }),
                ..
            }
        ));
        assert!(!mine.is_frozen());
        assert!(mine.set("n", 2).is_ok());
    }

    #[test]
    fn frozen_root_yields_frozen_result_for_both_strategies() {
        for strategy in [FreezeStrategy::PathOnly, FreezeStrategy::FullTraversal] {
            let root = tree();
            deep_freeze(&root);
            let config = ReplicatorConfig::new().with_freeze_strategy(strategy);
            let intent = Replication::at("a.b".parse().unwrap())
                .with_modification(Modification::replace("leaf", Value::from(json!({"n": 1}))))
                .unwrap();
            let result = replicate_with(&root, intent, &config).unwrap();
            assert!(is_deep_frozen(&result), "{strategy:?}");
        }
    }

    #[test]
    fn unfrozen_root_freezes_nothing() {
        let root = tree();
        let intent = Replication::at("a.b".parse().unwrap())
            .with_modification(Modification::replace("leaf", 2))
            .unwrap();
        let result = replicate(&root, intent).unwrap();
        assert!(!result.is_frozen());
        assert!(!node_at(&result, "a").is_frozen());
        assert!(!node_at(&result, "a.b").is_frozen());
    }
}
