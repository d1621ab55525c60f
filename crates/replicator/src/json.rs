//! Conversion between `serde_json` values and the object graph

use crate::node::{Node, NodeError, NodeKind, NodeRef, Value};
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::HashSet;
use std::sync::Arc;

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            JsonValue::String(s) => Self::from(s),
            JsonValue::Array(items) => {
                Self::Node(Node::new_sequence(items.into_iter().map(Self::from)))
            }
            JsonValue::Object(fields) => Self::Node(Node::new_record(
                fields.into_iter().map(|(k, v)| (k, Self::from(v))),
            )),
        }
    }
}

impl Value {
    /// Render the graph reachable from this value as JSON
    ///
    /// Instances render as objects. Shared subtrees are rendered once per
    /// occurrence.
    ///
    /// # Errors
    /// Returns [`NodeError::Cycle`] if a node is reachable from itself
    pub fn to_json(&self) -> Result<JsonValue, NodeError> {
        let mut ancestors = HashSet::new();
        to_json_inner(self, &mut ancestors)
    }
}

fn to_json_inner(value: &Value, ancestors: &mut HashSet<*const Node>) -> Result<JsonValue, NodeError> {
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(n) => JsonValue::Number((*n).into()),
        Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Str(s) => JsonValue::String(s.to_string()),
        Value::Node(node) => node_to_json(node, ancestors)?,
    })
}

fn node_to_json(node: &NodeRef, ancestors: &mut HashSet<*const Node>) -> Result<JsonValue, NodeError> {
    let ptr = Arc::as_ptr(node);
    if !ancestors.insert(ptr) {
        return Err(NodeError::Cycle);
    }

    let json = if node.kind() == NodeKind::Sequence {
        let items = node
            .values()
            .iter()
            .map(|v| to_json_inner(v, ancestors))
            .collect::<Result<Vec<_>, _>>()?;
        JsonValue::Array(items)
    } else {
        let mut fields = Map::new();
        for (key, v) in node.entries() {
            fields.insert(key.as_name().into_owned(), to_json_inner(&v, ancestors)?);
        }
        JsonValue::Object(fields)
    };

    ancestors.remove(&ptr);
    Ok(json)
}
