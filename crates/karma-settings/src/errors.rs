//! Failures while loading render settings.

use std::path::PathBuf;

use thiserror::Error;

/// Why the render settings could not be produced.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("unable to read render settings from {}: {source}", path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The settings document is not valid JSON or does not match the
    /// settings shape, e.g. an unknown glyph style.
    #[error("malformed render settings: {0}")]
    Json(#[from] serde_json::Error),
    /// A well-formed setting the renderer cannot use.
    #[error("render setting {field} rejected: {reason}")]
    InvalidValue {
        /// Dotted path of the setting, e.g. `render.indent`.
        field: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn read_error_names_the_file() {
        let err = SettingsError::Read {
            path: PathBuf::from("/home/user/.karma/settings.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(
            err.to_string(),
            "unable to read render settings from /home/user/.karma/settings.json: permission denied"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn unknown_glyph_style_is_malformed() {
        let json_err = serde_json::from_str::<crate::types::GlyphStyle>(r#""fancy""#).unwrap_err();
        let err: SettingsError = json_err.into();
        assert!(matches!(err, SettingsError::Json(_)));
        assert!(err.to_string().starts_with("malformed render settings: unknown variant `fancy`"));
    }

    #[test]
    fn invalid_value_names_the_setting() {
        let err = SettingsError::InvalidValue {
            field: "render.indent",
            reason: "40 columns is wider than 16".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "render setting render.indent rejected: 40 columns is wider than 16"
        );
    }
}
