//! Navigation keys and paths
//!
//! Provides [`Key`] for addressing one slot of a container and [`Path`] for
//! the ordered walk from a root to the container being modified.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One navigation step
///
/// Records and instances are addressed by name, sequences by index. The two
/// forms convert into each other where that is meaningful: `Index(3)` reads
/// the record field `"3"`, and `Name("3")` reads sequence element 3.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Property name
    Name(String),
    /// Sequence position
    Index(usize),
}

impl Key {
    /// Sequence position this key denotes, if any
    #[inline]
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Name(name) => canonical_index(name),
        }
    }

    /// Property name this key denotes
    #[inline]
    #[must_use]
    pub fn as_name(&self) -> Cow<'_, str> {
        match self {
            Self::Name(name) => Cow::Borrowed(name),
            Self::Index(i) => Cow::Owned(i.to_string()),
        }
    }
}

/// `seg` as a sequence index, only in its canonical decimal form
///
/// `"7"` is an index; `"007"`, `"+7"` and out-of-range digit strings are names.
fn canonical_index(seg: &str) -> Option<usize> {
    let index: usize = seg.parse().ok()?;
    (index.to_string() == seg).then_some(index)
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Path from a root to a container
///
/// # Examples
/// - `["subTypeA", "subTypeB"]` → `subTypeA.subTypeB`
/// - `["items", 3]` → `items.3`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Path(Vec<Key>);

impl Path {
    /// Empty path (root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path keys from root to leaf
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    /// Number of keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First `len` keys
    ///
    /// Saturates at the full path.
    #[inline]
    #[must_use]
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Append a key in place
    #[inline]
    pub fn push(&mut self, key: impl Into<Key>) {
        self.0.push(key.into());
    }

    /// Iterator over keys from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.0.iter()
    }

    /// Human-readable form, `<root>` for the empty path
    #[must_use]
    pub fn describe(&self) -> String {
        if self.is_empty() {
            "<root>".to_string()
        } else {
            self.to_string()
        }
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let keys: Vec<Key> = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else if seg.chars().any(|c| c.is_whitespace() || c.is_control()) {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(canonical_index(seg).map_or_else(|| Key::Name(seg.to_string()), Key::Index))
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(keys))
    }
}

impl<K: Into<Key>> FromIterator<K> for Path {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Errors related to paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid segment: {0:?} (whitespace and control characters are not allowed)")]
    InvalidSegment(String),
}
