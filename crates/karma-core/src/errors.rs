//! Errors raised while encoding, decoding, or describing values.
//!
//! Rendering, flattening, and search are infallible. Only the conversions
//! to and from JSON can fail:
//!
//! - [`CodecError::Json`]: malformed input or an unrepresentable value
//! - [`CodecError::Structure`]: a value that cannot be walked into context

use thiserror::Error;

/// Failure of a codec or structure-describing operation.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The underlying JSON (de)serialization failed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// A value could not be described as context pairs.
    #[error("unable to describe structure at {path}: {message}")]
    Structure {
        /// Dotted key of the offending value.
        path: String,
        /// What went wrong.
        message: String,
    },
}

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
