//! Deep freezing of object graphs
//!
//! Both traversals keep a visited set keyed by node identity, so they
//! terminate on cyclic graphs and visit shared subtrees once.

use crate::node::{Node, NodeRef, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Freeze `root` and every node reachable from it
///
/// Idempotent. Returns `root` itself for chaining.
pub fn deep_freeze(root: &NodeRef) -> &NodeRef {
    let mut visited: HashSet<*const Node> = HashSet::new();
    let mut stack = vec![Arc::clone(root)];

    while let Some(node) = stack.pop() {
        if !visited.insert(Arc::as_ptr(&node)) {
            continue;
        }
        node.freeze();
        stack.extend(node.children());
    }

    tracing::trace!(nodes = visited.len(), "deep-froze object graph");
    root
}

/// [`deep_freeze`] for any value; scalars are left as they are
pub fn deep_freeze_value(value: &Value) -> &Value {
    if let Value::Node(node) = value {
        deep_freeze(node);
    }
    value
}

/// Check that `root` and every node reachable from it are frozen
#[must_use]
pub fn is_deep_frozen(root: &NodeRef) -> bool {
    let mut visited: HashSet<*const Node> = HashSet::new();
    let mut stack = vec![Arc::clone(root)];

    while let Some(node) = stack.pop() {
        if !visited.insert(Arc::as_ptr(&node)) {
            continue;
        }
        if !node.is_frozen() {
            return false;
        }
        stack.extend(node.children());
    }
    true
}

/// [`is_deep_frozen`] for any value; scalars are immutable and count as frozen
#[must_use]
pub fn is_deep_frozen_value(value: &Value) -> bool {
    match value {
        Value::Node(node) => is_deep_frozen(node),
        _ => true,
    }
}
