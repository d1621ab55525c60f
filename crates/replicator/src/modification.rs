//! Pending modifications
//!
//! A [`Modification`] names the slot of the leaf container to change and the
//! [`Operation`] that produces its new value.

use crate::node::Value;
use crate::path::Key;
use std::fmt::{self, Debug, Formatter};

/// Caller-supplied transform from old value to new value
///
/// Must not mutate what it is given; errors surface unchanged from
/// replication.
pub type TransformFn = Box<dyn FnOnce(&Value) -> Result<Value, TransformError>>;

/// How the new value is produced
pub enum Operation {
    /// Replace with a literal value
    Replace(Value),

    /// Derive the new value from the old one
    Transform(TransformFn),
}

impl Operation {
    /// Check if operation reads the old value
    #[inline]
    #[must_use]
    pub fn reads_state(&self) -> bool {
        matches!(self, Self::Transform(_))
    }

    /// Produce the new value
    ///
    /// # Errors
    /// Returns whatever the transform function returns
    pub fn apply(self, old: &Value) -> Result<Value, TransformError> {
        match self {
            Self::Replace(value) => Ok(value),
            Self::Transform(f) => f(old),
        }
    }
}

impl Debug for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Self::Transform(_) => f.write_str("Transform(<fn>)"),
        }
    }
}

/// Single change applied to the leaf container of a replication
#[derive(Debug)]
pub struct Modification {
    target: Key,
    operation: Operation,
}

impl Modification {
    /// Create modification
    #[inline]
    #[must_use]
    pub fn new(target: impl Into<Key>, operation: Operation) -> Self {
        Self {
            target: target.into(),
            operation,
        }
    }

    /// Replace `target` with `value`
    #[inline]
    #[must_use]
    pub fn replace(target: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::new(target, Operation::Replace(value.into()))
    }

    /// Derive `target` from its old value with a fallible function
    #[inline]
    #[must_use]
    pub fn transform<F>(target: impl Into<Key>, f: F) -> Self
    where
        F: FnOnce(&Value) -> Result<Value, TransformError> + 'static,
    {
        Self::new(target, Operation::Transform(Box::new(f)))
    }

    /// Slot of the leaf container being changed
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Key {
        &self.target
    }

    /// Operation
    #[inline]
    #[must_use]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Split into target and operation
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (Key, Operation) {
        (self.target, self.operation)
    }
}

/// Errors raised by transform functions
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// Generic failure
    #[error("{0}")]
    Failed(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Old value has the wrong type
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        /// Type name the transform accepts
        expected: &'static str,
        /// Type name it received
        found: &'static str,
    },
}

impl TransformError {
    /// Type mismatch against `value`
    #[inline]
    #[must_use]
    pub fn unexpected(expected: &'static str, value: &Value) -> Self {
        Self::UnexpectedType {
            expected,
            found: value.type_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_ignores_old_value() {
        let m = Modification::replace("name", "new");
        assert_eq!(m.target(), &Key::from("name"));
        assert!(!m.operation().reads_state());

        let (_, op) = m.into_parts();
        assert_eq!(op.apply(&Value::from("old")).unwrap(), Value::from("new"));
    }

    #[test]
    fn transform_sees_old_value() {
        let m = Modification::transform("count", |old| match old {
            Value::Int(n) => Ok(Value::Int(n + 1)),
            other => Err(TransformError::unexpected("int", other)),
        });
        assert!(m.operation().reads_state());

        let (_, op) = m.into_parts();
        assert_eq!(op.apply(&Value::Int(41)).unwrap(), Value::Int(42));
    }

    #[test]
    fn transform_errors_pass_through() {
        let m = Modification::transform("count", |old| Err(TransformError::unexpected("int", old)));
        let (_, op) = m.into_parts();
        assert_eq!(
            op.apply(&Value::from("x")),
            Err(TransformError::UnexpectedType {
                expected: "int",
                found: "string"
            })
        );
    }

    #[test]
    fn debug_hides_closure() {
        let m = Modification::transform(0usize, |v| Ok(v.clone()));
        assert!(format!("{m:?}").contains("Transform(<fn>)"));
    }
}
