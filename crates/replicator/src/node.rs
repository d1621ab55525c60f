//! Runtime object graph
//!
//! A graph is made of [`Node`]s shared through [`NodeRef`] (`Arc<Node>`).
//! Each node owns one [`Container`] and carries its own frozen marker, so
//! immutability is an explicit, per-node tag rather than a property of the
//! Rust types involved.
//!
//! # Sharing
//! Cloning a [`Value`] or a [`Container`] never copies a node: nested nodes
//! are carried over by reference. This is what makes structural sharing
//! between an original root and a replicated root possible.

use crate::path::Key;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared handle to a node
pub type NodeRef = Arc<Node>;

/// A value stored in a container slot
///
/// Scalars are stored inline; containers are stored as [`NodeRef`].
/// Equality compares scalars by value and nodes by identity.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent / null
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    Str(Arc<str>),
    /// Nested container
    Node(NodeRef),
}

impl Value {
    /// Check for [`Value::Null`]
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Nested node, if this value is one
    #[inline]
    #[must_use]
    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// String contents, if this value is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer contents, if this value is an integer
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Node(node) => node.kind().name(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(Arc::from(s))
    }
}

impl From<NodeRef> for Value {
    fn from(node: NodeRef) -> Self {
        Self::Node(node)
    }
}

impl From<&NodeRef> for Value {
    fn from(node: &NodeRef) -> Self {
        Self::Node(Arc::clone(node))
    }
}

/// Class tag of an [`Container::Instance`]
///
/// Two instances belong to the same class iff their tags are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassName(Arc<str>);

impl ClassName {
    /// Create a class tag
    #[inline]
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Tag as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ClassName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Kind of a container, as observed at runtime
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Plain keyed record
    Record,
    /// Indexable sequence
    Sequence,
    /// Instance of a tagged class
    Instance(ClassName),
}

impl NodeKind {
    /// Short name of the kind
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Sequence => "sequence",
            Self::Instance(_) => "instance",
        }
    }
}

/// Contents of a node
#[derive(Debug, Clone)]
pub enum Container {
    /// Plain keyed record, insertion ordered
    Record(IndexMap<String, Value>),
    /// Indexable sequence
    Sequence(Vec<Value>),
    /// Tagged class instance
    Instance {
        /// Class tag
        class: ClassName,
        /// Own properties, insertion ordered
        fields: IndexMap<String, Value>,
    },
}

impl Container {
    /// Kind of this container
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Record(_) => NodeKind::Record,
            Self::Sequence(_) => NodeKind::Sequence,
            Self::Instance { class, .. } => NodeKind::Instance(class.clone()),
        }
    }

    /// Number of own properties / elements
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Record(fields) | Self::Instance { fields, .. } => fields.len(),
            Self::Sequence(items) => items.len(),
        }
    }

    /// Check for no properties / elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read one slot
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Value> {
        match self {
            Self::Record(fields) | Self::Instance { fields, .. } => fields.get(&*key.as_name()),
            Self::Sequence(items) => key.as_index().and_then(|i| items.get(i)),
        }
    }

    /// Write one slot, returning the previous value
    ///
    /// Records and instances insert missing properties. Sequences replace in
    /// bounds and append at `index == len`.
    ///
    /// # Errors
    /// Returns error if a sequence key is not an index or is past the end
    pub fn set(&mut self, key: Key, value: Value) -> Result<Option<Value>, SlotError> {
        match self {
            Self::Record(fields) | Self::Instance { fields, .. } => {
                Ok(fields.insert(key.as_name().into_owned(), value))
            }
            Self::Sequence(items) => {
                let index = key.as_index().ok_or_else(|| SlotError::NotAnIndex(key.clone()))?;
                let len = items.len();
                if index < len {
                    Ok(Some(std::mem::replace(&mut items[index], value)))
                } else if index == len {
                    items.push(value);
                    Ok(None)
                } else {
                    Err(SlotError::IndexOutOfBounds { index, len })
                }
            }
        }
    }

    /// Keys of all slots, in order
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        match self {
            Self::Record(fields) | Self::Instance { fields, .. } => {
                fields.keys().map(|k| Key::Name(k.clone())).collect()
            }
            Self::Sequence(items) => (0..items.len()).map(Key::Index).collect(),
        }
    }

    /// Iterator over slot values, in order
    pub fn values(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Self::Record(fields) | Self::Instance { fields, .. } => Box::new(fields.values()),
            Self::Sequence(items) => Box::new(items.iter()),
        }
    }
}

/// Capability to copy one level of a container
///
/// The copy keeps the concrete kind (record, sequence, class instance with
/// its class tag) and carries nested nodes over by reference.
pub trait ShallowClone {
    /// Produce the one-level copy
    #[must_use]
    fn shallow_clone(&self) -> Self;
}

impl ShallowClone for Container {
    fn shallow_clone(&self) -> Self {
        match self {
            Self::Record(fields) => Self::Record(fields.clone()),
            Self::Sequence(items) => Self::Sequence(items.clone()),
            Self::Instance { class, fields } => Self::Instance {
                class: class.clone(),
                fields: fields.clone(),
            },
        }
    }
}

/// A container in the object graph
///
/// Interior mutability lets callers build graphs (including cycles) through
/// shared [`NodeRef`]s; the frozen marker turns every later write into an
/// error.
pub struct Node {
    frozen: AtomicBool,
    container: RwLock<Container>,
}

impl Node {
    /// Wrap a container into a fresh, unfrozen node
    #[inline]
    #[must_use]
    pub fn new(container: Container) -> Self {
        Self {
            frozen: AtomicBool::new(false),
            container: RwLock::new(container),
        }
    }

    /// Empty record
    #[must_use]
    pub fn record() -> NodeRef {
        Arc::new(Self::new(Container::Record(IndexMap::new())))
    }

    /// Empty sequence
    #[must_use]
    pub fn sequence() -> NodeRef {
        Arc::new(Self::new(Container::Sequence(Vec::new())))
    }

    /// Record with the given properties
    #[must_use]
    pub fn new_record<K, I>(fields: I) -> NodeRef
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Arc::new(Self::new(Container::Record(fields)))
    }

    /// Sequence with the given elements
    #[must_use]
    pub fn new_sequence<I>(items: I) -> NodeRef
    where
        I: IntoIterator<Item = Value>,
    {
        Arc::new(Self::new(Container::Sequence(items.into_iter().collect())))
    }

    /// Instance of `class` with the given properties
    #[must_use]
    pub fn new_instance<K, I>(class: impl Into<ClassName>, fields: I) -> NodeRef
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Arc::new(Self::new(Container::Instance {
            class: class.into(),
            fields,
        }))
    }

    /// Kind of the contained container
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.container.read().kind()
    }

    /// Class tag, for instances
    #[must_use]
    pub fn class(&self) -> Option<ClassName> {
        match &*self.container.read() {
            Container::Instance { class, .. } => Some(class.clone()),
            _ => None,
        }
    }

    /// Read one slot
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<Value> {
        self.container.read().get(key).cloned()
    }

    /// Write one slot, returning the previous value
    ///
    /// # Errors
    /// Returns [`NodeError::Frozen`] if the node is frozen, or a slot error
    /// if the key does not fit the container
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<Option<Value>, NodeError> {
        let mut container = self.container.write();
        if self.is_frozen() {
            return Err(NodeError::Frozen);
        }
        Ok(container.set(key.into(), value.into())?)
    }

    /// Append to a sequence
    ///
    /// # Errors
    /// Returns error if the node is frozen or is not a sequence
    pub fn push(&self, value: impl Into<Value>) -> Result<(), NodeError> {
        let mut container = self.container.write();
        if self.is_frozen() {
            return Err(NodeError::Frozen);
        }
        match &mut *container {
            Container::Sequence(items) => {
                items.push(value.into());
                Ok(())
            }
            other => Err(NodeError::NotASequence(other.kind().name())),
        }
    }

    /// Number of own properties / elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.container.read().len()
    }

    /// Check for no properties / elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.container.read().is_empty()
    }

    /// Keys of all slots, in order
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.container.read().keys()
    }

    /// Snapshot of all slot values, in order
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.container.read().values().cloned().collect()
    }

    /// Snapshot of all slots, in order
    #[must_use]
    pub fn entries(&self) -> Vec<(Key, Value)> {
        let container = self.container.read();
        container.keys().into_iter().zip(container.values().cloned()).collect()
    }

    /// Nested nodes directly referenced by this node
    pub(crate) fn children(&self) -> Vec<NodeRef> {
        self.container
            .read()
            .values()
            .filter_map(Value::as_node)
            .cloned()
            .collect()
    }

    /// Check the frozen marker
    #[inline]
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Mark this node (only this node) as frozen
    ///
    /// Idempotent. See [`crate::deep_freeze`] for the recursive form.
    #[inline]
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    /// Write access to an owned node, bypassing the lock
    pub(crate) fn container_mut(&mut self) -> &mut Container {
        self.container.get_mut()
    }
}

impl ShallowClone for Node {
    /// One-level copy; the copy is never frozen
    fn shallow_clone(&self) -> Self {
        Self::new(self.container.read().shallow_clone())
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Contents are not printed: graphs may be cyclic.
        let container = self.container.read();
        f.debug_struct("Node")
            .field("kind", &container.kind())
            .field("len", &container.len())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

/// Errors from addressing a container slot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    /// Sequence addressed with a non-numeric key
    #[error("key '{0}' is not a sequence index")]
    NotAnIndex(Key),

    /// Sequence index past the end
    #[error("index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds {
        /// Requested position
        index: usize,
        /// Sequence length
        len: usize,
    },
}

/// Errors from node operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// Write attempted on a frozen node
    #[error("node is frozen")]
    Frozen,

    /// Sequence-only operation on another kind
    #[error("expected a sequence, found a {0}")]
    NotASequence(&'static str),

    /// Slot addressing failed
    #[error(transparent)]
    Slot(#[from] SlotError),

    /// Graph contains a cycle where a tree was required
    #[error("cycle detected in object graph")]
    Cycle,
}
