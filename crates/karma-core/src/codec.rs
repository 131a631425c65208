//! JSON representation of hierarchical messages.
//!
//! A node is encoded as an object with three optional fields:
//!
//! ```json
//! {
//!   "reason": "access denied",
//!   "message": "unable to connect",
//!   "context": [{"key": "host", "value": "example.com"}]
//! }
//! ```
//!
//! `reason` is polymorphic and untagged. Nested nodes encode as objects,
//! sibling sequences as arrays, native errors as their message, bytes as
//! text. Decoding tries a nested node first and falls back to a plain
//! reason, so native error identity does not survive the round-trip; the
//! rendered text does.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::context::ContextList;
use crate::errors::Result;
use crate::karma::Karma;
use crate::reason::Reason;

#[derive(serde::Serialize)]
struct DocumentRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a Reason>,
    #[serde(skip_serializing_if = "str::is_empty")]
    message: &'a str,
    #[serde(skip_serializing_if = "ContextList::is_empty")]
    context: &'a ContextList,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    #[serde(default)]
    reason: Option<Value>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    context: ContextList,
}

impl Serialize for Karma {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        DocumentRef {
            reason: self.reason(),
            message: self.message(),
            context: self.context(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Karma {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let document = Document::deserialize(deserializer)?;
        Ok(Self::from_parts(
            document.message,
            document.reason.and_then(decode_reason),
            document.context,
        ))
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Karma(karma) => karma.serialize(serializer),
            Self::Many(reasons) => reasons.serialize(serializer),
            Self::Error(error) => serializer.collect_str(error),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Bytes(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            Self::Value(value) => value.serialize(serializer),
        }
    }
}

/// `null` decodes as a `null` value reason.
impl<'de> Deserialize<'de> for Reason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(decode_reason(value).unwrap_or(Reason::Value(Value::Null)))
    }
}

/// Decode an untagged reason. `null` means no reason.
fn decode_reason(value: Value) -> Option<Reason> {
    if value.is_object() {
        match serde_json::from_value::<Karma>(value.clone()) {
            Ok(karma) => return Some(karma.into()),
            Err(error) => debug!(%error, "reason is not a node, decoding as plain value"),
        }
    }

    match value {
        Value::Null => None,
        Value::String(text) => Some(Reason::Text(text)),
        Value::Array(items) => Some(Reason::Many(
            items
                .into_iter()
                .map(|item| decode_reason(item).unwrap_or(Reason::Value(Value::Null)))
                .collect(),
        )),
        other => Some(Reason::Value(other)),
    }
}

/// Encode a node as compact JSON.
pub fn to_json(karma: &Karma) -> Result<String> {
    Ok(serde_json::to_string(karma)?)
}

/// Encode a node as indented JSON.
pub fn to_json_pretty(karma: &Karma) -> Result<String> {
    Ok(serde_json::to_string_pretty(karma)?)
}

/// Decode a node from JSON text.
pub fn from_json(json: &str) -> Result<Karma> {
    Ok(serde_json::from_str(json)?)
}

/// Encode a node as a JSON value.
pub fn to_value(karma: &Karma) -> Result<Value> {
    Ok(serde_json::to_value(karma)?)
}

/// Decode a node from a JSON value.
pub fn from_value(value: Value) -> Result<Karma> {
    Ok(serde_json::from_value(value)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
