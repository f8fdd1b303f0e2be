//! Structured cache keys

use std::fmt;

use entigate_domain::{Entity, SearchParams};

/// One segment of a [`QueryKey`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    /// Text segment.
    Str(String),
    /// Integer segment.
    Int(i64),
    /// Boolean segment.
    Bool(bool),
}

/// Ordered tuple of primitives, compared structurally
///
/// Prefix matching is segment-wise: `[users, list]` matches
/// `[users, list, {..}]` but not `[users, lists]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    /// Empty key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment.
    #[must_use]
    pub fn push(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    /// Segments in order.
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Segment-wise prefix test.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<P: Into<KeyPart>> FromIterator<P> for QueryKey {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => write!(f, "{value:?}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, part) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part}")?;
        }
        f.write_str("]")
    }
}

/// Key scheme shared by every entity collection
///
/// ```text
/// [collection]                      all
/// [collection, "list"]              lists (also the unfiltered list)
/// [collection, "list", <params>]    search results
/// [collection, "detail"]            details
/// [collection, "detail", <id>]      one entity
/// ```
pub struct EntityKeys;

impl EntityKeys {
    /// Prefix of every key of the collection.
    pub fn all<E: Entity>() -> QueryKey {
        QueryKey::new().push(E::COLLECTION)
    }

    /// Prefix of every list key; also the unfiltered list.
    pub fn lists<E: Entity>() -> QueryKey {
        Self::all::<E>().push("list")
    }

    /// Key of a parameterized list. Equal parameters give equal keys.
    pub fn list<E: Entity>(params: &SearchParams) -> QueryKey {
        // serde_json emits fields in declaration order, so the text is canonical
        let encoded = serde_json::to_string(params).unwrap_or_else(|_| format!("{params:?}"));
        Self::lists::<E>().push(encoded)
    }

    /// Prefix of every detail key.
    pub fn details<E: Entity>() -> QueryKey {
        Self::all::<E>().push("detail")
    }

    /// Key of the entity with `id`.
    pub fn detail<E: Entity>(id: &str) -> QueryKey {
        Self::details::<E>().push(id)
    }
}
