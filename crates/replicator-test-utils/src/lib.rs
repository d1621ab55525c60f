//! Testing utilities for the replicator workspace
//!
//! Shared fixtures and lookup helpers.

#![allow(missing_docs)]

use replicator::{Node, NodeRef, Path, Value};
use std::sync::Arc;

pub const CLASSORIENTED_TESTSTATE: &str = "ClassorientedTeststate";
pub const SUB_TYPE_A: &str = "SubTypeA";
pub const SUB_TYPE_B: &str = "SubTypeB";
pub const OBJECT_ARRAY: &str = "ObjectArray";
pub const TEST_OBJECT: &str = "TestObject";

/// `SubTypeB { subTypeBAttribute: null, subTypeBArray: [] }`
pub fn sub_type_b() -> NodeRef {
    Node::new_instance(
        SUB_TYPE_B,
        [
            ("subTypeBAttribute", Value::Null),
            ("subTypeBArray", Value::from(Node::sequence())),
        ],
    )
}

/// `SubTypeA { subTypeB: SubTypeB, subTypeAAttribute: "a" }`
pub fn sub_type_a() -> NodeRef {
    Node::new_instance(
        SUB_TYPE_A,
        [
            ("subTypeB", Value::from(sub_type_b())),
            ("subTypeAAttribute", Value::from("a")),
        ],
    )
}

/// Class-oriented root: `ClassorientedTeststate { subTypeA: SubTypeA }`
pub fn classoriented_state() -> NodeRef {
    Node::new_instance(
        CLASSORIENTED_TESTSTATE,
        [
            ("subTypeA", Value::from(sub_type_a())),
            ("rootAttribute", Value::Int(1)),
        ],
    )
}

/// Untyped root: `{ subTypeB: { subtypeBAttribute: "initial" } }`
pub fn simple_state() -> NodeRef {
    let value = Value::from(serde_json::json!({
        "subTypeB": {"subtypeBAttribute": "initial"},
        "untouched": {"flag": true}
    }));
    value.as_node().cloned().expect("object literal is a record")
}

/// `ObjectArray { objects: [TestObject; count] }`
pub fn object_array(count: usize) -> NodeRef {
    let objects = (0..count).map(|i| {
        let id = i64::try_from(i).expect("fixture count fits i64");
        Value::from(Node::new_instance(
            TEST_OBJECT,
            [
                ("id", Value::Int(id)),
                ("name", Value::from(format!("object-{i}"))),
                ("details", Value::from(Node::new_record([("index", Value::Int(id))]))),
            ],
        ))
    });
    Node::new_instance(OBJECT_ARRAY, [("objects", Value::from(Node::new_sequence(objects)))])
}

/// Value at `path` below `root`, panicking if it does not resolve
pub fn value_at(root: &NodeRef, path: &str) -> Value {
    let path: Path = path.parse().expect("valid test path");
    let mut current = Value::from(Arc::clone(root));
    for key in path.iter() {
        let node = current
            .as_node()
            .unwrap_or_else(|| panic!("'{key}' below a scalar in {path}"))
            .clone();
        current = node
            .get(key)
            .unwrap_or_else(|| panic!("'{key}' missing in {path}"));
    }
    current
}

/// Node at `path` below `root`
pub fn node_at(root: &NodeRef, path: &str) -> NodeRef {
    value_at(root, path)
        .as_node()
        .cloned()
        .unwrap_or_else(|| panic!("no node at {path}"))
}

/// Install a fmt subscriber honoring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
