//! Replicator
//!
//! Structural-sharing, copy-on-write updates to nested object graphs.
//!
//! # Core Concepts
//!
//! - [`Node`] / [`NodeRef`]: containers of the object graph (records,
//!   sequences, tagged class instances), each with its own frozen marker
//! - [`Replicator`]: fluent builder that navigates to a container and
//!   declares one modification
//! - [`Replication`] + [`replicate`]: the same intent as a plain value and a
//!   pure function over it
//! - [`deep_freeze`] / [`is_deep_frozen`]: recursive immutability
//!
//! Replication clones only the nodes on the navigated path; every other
//! subtree of the result is the original subtree, shared by reference. A
//! result derived from a deep-frozen root is itself deep-frozen.
//!
//! # Example
//!
//! ```rust
//! use replicator::{deep_freeze, is_deep_frozen, Key, Replicator, Value};
//! use serde_json::json;
//!
//! let state = Value::from(json!({"user": {"name": "initial", "tags": []}}));
//! let root = state.as_node().cloned().unwrap();
//! deep_freeze(&root);
//!
//! let next = Replicator::for_node(&root)
//!     .child("user")
//!     .modify("name")
//!     .to("Test")
//!     .replicate()?;
//!
//! assert!(is_deep_frozen(&next));
//! let user = next.get(&Key::from("user")).unwrap();
//! assert_eq!(user.as_node().unwrap().get(&Key::from("name")), Some(Value::from("Test")));
//! # Ok::<(), replicator::ReplicateError>(())
//! ```

mod config;
mod engine;
mod error;
mod freeze;
mod json;
mod modification;
mod node;
mod path;
mod replicator;

pub use config::{FreezeStrategy, MissingTarget, ReplicatorConfig};
pub use engine::{replicate, replicate_with, Replication};
pub use error::{NavigationFailure, ReplicateError};
pub use freeze::{deep_freeze, deep_freeze_value, is_deep_frozen, is_deep_frozen_value};
pub use modification::{Modification, Operation, TransformError, TransformFn};
pub use node::{ClassName, Container, Node, NodeError, NodeKind, NodeRef, ShallowClone, SlotError, Value};
pub use path::{Key, Path, PathError};
pub use replicator::{PendingModification, ReadyReplication, Replicator};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
