//! Settings type definitions.
//!
//! Field names are camelCase in JSON. Every type implements [`Default`] and
//! is marked `#[serde(default)]`, so a partial file only overrides what it
//! names.

use karma_core::RenderConfig;
use karma_core::render::BRANCH_INDENT;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Largest accepted branch indent.
pub const MAX_INDENT: usize = 16;

/// Root settings type.
///
/// ```json
/// { "render": { "style": "ascii", "indent": 2 } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KarmaSettings {
    /// Tree rendering.
    pub render: RenderSettings,
}

impl KarmaSettings {
    /// Reject values the renderer cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.render.indent > MAX_INDENT {
            return Err(SettingsError::InvalidValue {
                field: "render.indent",
                reason: format!("{} columns is wider than {MAX_INDENT}", self.render.indent),
            });
        }
        Ok(())
    }
}

/// Glyph preset the explicit glyph overrides apply on top of.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphStyle {
    /// Box-drawing characters.
    #[default]
    Box,
    /// Plain ASCII.
    Ascii,
}

/// Tree rendering settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    /// Base glyph preset.
    pub style: GlyphStyle,
    /// Replaces the preset's last-branch delimiter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    /// Replaces the preset's chainer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chainer: Option<String>,
    /// Replaces the preset's splitter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splitter: Option<String>,
    /// Width nested levels are indented by.
    pub indent: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            style: GlyphStyle::Box,
            delimiter: None,
            chainer: None,
            splitter: None,
            indent: BRANCH_INDENT,
        }
    }
}

impl RenderSettings {
    /// Resolve the preset and overrides into a render configuration.
    pub fn to_config(&self) -> RenderConfig {
        let mut config = match self.style {
            GlyphStyle::Box => RenderConfig::box_drawing(),
            GlyphStyle::Ascii => RenderConfig::ascii(),
        };
        if let Some(delimiter) = &self.delimiter {
            config.delimiter.clone_from(delimiter);
        }
        if let Some(chainer) = &self.chainer {
            config.chainer.clone_from(chainer);
        }
        if let Some(splitter) = &self.splitter {
            config.splitter.clone_from(splitter);
        }
        config.indent = self.indent;
        config
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
