//! Persistent ordered key-value context.
//!
//! A [`ContextList`] is an append-only list of `(key, value)` pairs. Appending
//! never touches the receiver: every append allocates exactly one new entry
//! that points back at the shared, immutable prefix. Two lists forked from
//! the same base therefore never observe each other's pairs, and concurrent
//! readers of a shared base are safe.
//!
//! Pairs are kept in insertion order. Keys may repeat; nothing is sorted or
//! deduplicated.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

use crate::karma::Karma;
use crate::reason::Reason;

/// Single immutable list entry, linked to the entry appended before it.
#[derive(Debug)]
struct Entry {
    key: String,
    value: Value,
    prev: Option<Arc<Entry>>,
}

/// Ordered, persistent list of context pairs.
///
/// Cloning is O(1): clones share every entry.
#[derive(Clone, Default)]
pub struct ContextList {
    last: Option<Arc<Entry>>,
    len: usize,
}

/// Start a new context list holding a single pair.
pub fn describe(key: impl Into<String>, value: impl Into<Value>) -> ContextList {
    ContextList::new().append(key, value)
}

impl ContextList {
    /// Create an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None, len: 0 }
    }

    /// Return a new list with `(key, value)` after every existing pair.
    ///
    /// `self` and all of its clones are left untouched.
    #[must_use]
    pub fn append(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            last: Some(Arc::new(Entry {
                key: key.into(),
                value: value.into(),
                prev: self.last.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Alias of [`append`](Self::append), reads better in call chains.
    #[must_use]
    pub fn describe(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.append(key, value)
    }

    /// Return a new list with every pair of `other` appended after this
    /// list's pairs.
    #[must_use]
    pub fn extend(&self, other: &Self) -> Self {
        other
            .iter()
            .fold(self.clone(), |list, (key, value)| list.append(key, value.clone()))
    }

    /// Number of pairs.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the list holds no pairs.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Call `callback` for every pair, head to tail.
    pub fn visit<'a>(&'a self, mut callback: impl FnMut(&'a str, &'a Value)) {
        for (key, value) in self.iter() {
            callback(key, value);
        }
    }

    /// Iterate pairs head to tail.
    pub fn iter(&self) -> Iter<'_> {
        let mut entries = Vec::with_capacity(self.len);
        let mut cursor = self.last.as_deref();
        while let Some(entry) = cursor {
            entries.push(entry);
            cursor = entry.prev.as_deref();
        }
        Iter { entries }
    }

    /// All pairs, in append order.
    pub fn pairs(&self) -> Vec<(&str, &Value)> {
        self.iter().collect()
    }

    /// Attach this context to `reason`.
    ///
    /// A hierarchical reason keeps its message and nested reason and gets
    /// these pairs appended to its own context, so no extra level appears in
    /// the tree. Anything else is wrapped in a new node with an empty
    /// message.
    pub fn reason(&self, reason: impl Into<Reason>) -> Karma {
        match reason.into() {
            Reason::Karma(previous) => {
                let mut previous = *previous;
                previous.context = previous.context.extend(self);
                previous
            }
            other => Karma::from_parts(String::new(), Some(other), self.clone()),
        }
    }

    /// Create a node with `message`, wrapping `reason`, carrying this context.
    pub fn format(&self, reason: impl Into<Reason>, message: impl Into<String>) -> Karma {
        Karma::from_parts(message.into(), Some(reason.into()), self.clone())
    }

    /// Create a leaf node with `message` carrying this context.
    pub fn message(&self, message: impl Into<String>) -> Karma {
        Karma::from_parts(message.into(), None, self.clone())
    }
}

impl fmt::Debug for ContextList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for ContextList {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<'a> IntoIterator for &'a ContextList {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ContextList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |list, (key, value)| list.append(key, value))
    }
}

/// Head-to-tail iterator over a [`ContextList`].
#[derive(Debug)]
pub struct Iter<'a> {
    // Stored tail first; popped from the back.
    entries: Vec<&'a Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries
            .pop()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.entries.len(), Some(self.entries.len()))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Plain text form of a context value: strings verbatim, everything else as
/// compact JSON.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        other => Cow::Owned(other.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serde: ordered sequence of {key, value} records
// ─────────────────────────────────────────────────────────────────────────────

#[derive(serde::Serialize)]
struct KeyValueRef<'a> {
    key: &'a str,
    value: &'a Value,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct KeyValue {
    key: String,
    #[serde(default)]
    value: Value,
}

impl Serialize for ContextList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len))?;
        for (key, value) in self {
            seq.serialize_element(&KeyValueRef { key, value })?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ContextList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `null` is accepted as an empty list.
        let records = Option::<Vec<KeyValue>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(records
            .into_iter()
            .map(|record| (record.key, record.value))
            .collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
