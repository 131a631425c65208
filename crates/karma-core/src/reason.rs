//! The polymorphic cause slot of a hierarchical message.
//!
//! A [`Reason`] is one of:
//!
//! - [`Reason::Karma`]: another hierarchical node
//! - [`Reason::Many`]: several sibling causes at the same level
//! - [`Reason::Error`]: a native error, rendered through its `Display`
//! - [`Reason::Text`]: a plain message
//! - [`Reason::Bytes`]: a byte payload, rendered as (lossy) UTF-8 text
//! - [`Reason::Value`]: any other structured payload
//!
//! Absence of a reason is expressed as `Option<Reason>` on the node.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::karma::Karma;

/// Shared native error carried as a reason.
pub type DynError = Arc<dyn StdError + Send + Sync + 'static>;

/// Cause attached to a [`Karma`] node.
#[derive(Clone, Debug)]
pub enum Reason {
    /// Nested hierarchical message.
    Karma(Box<Karma>),
    /// Ordered sibling causes.
    Many(Vec<Reason>),
    /// Native error. Only its message survives serialization.
    Error(DynError),
    /// Plain text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Opaque structured payload.
    Value(Value),
}

impl Reason {
    /// Wrap a native error.
    pub fn error(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::Error(Arc::new(error))
    }

    /// The nested node, if this reason is hierarchical.
    pub fn as_karma(&self) -> Option<&Karma> {
        match self {
            Self::Karma(karma) => Some(karma),
            _ => None,
        }
    }

    /// Whether rendering this reason produces nested levels of its own.
    ///
    /// Nodes count only when they carry nested reasons; context pairs alone
    /// do not make a node hierarchical.
    pub fn is_hierarchical(&self) -> bool {
        match self {
            Self::Karma(karma) => !karma.reasons().is_empty(),
            Self::Many(reasons) => !reasons.is_empty(),
            Self::Error(_) | Self::Text(_) | Self::Bytes(_) | Self::Value(_) => false,
        }
    }
}

/// Renders with the effective configuration, same as [`Karma`]'s `Display`.
impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::render_reason(self, &crate::render::config()))
    }
}

impl From<Karma> for Reason {
    fn from(karma: Karma) -> Self {
        Self::Karma(Box::new(karma))
    }
}

impl From<Vec<Reason>> for Reason {
    fn from(reasons: Vec<Reason>) -> Self {
        Self::Many(reasons)
    }
}

impl From<&str> for Reason {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Reason {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for Reason {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Reason {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Value> for Reason {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<std::io::Error> for Reason {
    fn from(error: std::io::Error) -> Self {
        Self::error(error)
    }
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for Reason {
    fn from(error: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self::Error(Arc::from(error))
    }
}

impl From<DynError> for Reason {
    fn from(error: DynError) -> Self {
        Self::Error(error)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
