//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`KarmaSettings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Apply `KARMA_*` environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::{GlyphStyle, KarmaSettings, MAX_INDENT};

/// Environment variable naming an explicit settings file.
pub const SETTINGS_PATH_ENV: &str = "KARMA_SETTINGS_PATH";

/// Resolve the settings file: `$KARMA_SETTINGS_PATH`, else
/// `~/.karma/settings.json`.
pub fn settings_path() -> PathBuf {
    if let Some(path) = read_env_string(SETTINGS_PATH_ENV) {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".karma").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<KarmaSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or out-of-range values are
/// errors.
pub fn load_settings_from_path(path: &Path) -> Result<KarmaSettings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<KarmaSettings> {
    let defaults = serde_json::to_value(KarmaSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `KARMA_*` environment overrides to loaded settings.
///
/// Invalid values are logged and ignored.
pub fn apply_env_overrides(settings: &mut KarmaSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`, keyed by environment variable
/// name.
pub fn apply_overrides(settings: &mut KarmaSettings, lookup: impl Fn(&str) -> Option<String>) {
    let render = &mut settings.render;

    if let Some(v) = read_style(&lookup, "KARMA_BRANCH_STYLE") {
        render.style = v;
    }
    if let Some(v) = read_glyph(&lookup, "KARMA_BRANCH_DELIMITER") {
        render.delimiter = Some(v);
    }
    if let Some(v) = read_glyph(&lookup, "KARMA_BRANCH_CHAINER") {
        render.chainer = Some(v);
    }
    if let Some(v) = read_glyph(&lookup, "KARMA_BRANCH_SPLITTER") {
        render.splitter = Some(v);
    }
    if let Some(v) = read_usize(&lookup, "KARMA_BRANCH_INDENT", 0, MAX_INDENT) {
        render.indent = v;
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a glyph style name (case-insensitive).
pub fn parse_style(val: &str) -> Option<GlyphStyle> {
    match val.to_lowercase().as_str() {
        "box" => Some(GlyphStyle::Box),
        "ascii" => Some(GlyphStyle::Ascii),
        _ => None,
    }
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Override readers ────────────────────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_glyph(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.is_empty())
}

fn read_style(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<GlyphStyle> {
    let val = lookup(name)?;
    let result = parse_style(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid glyph style env var, ignoring");
    }
    result
}

fn read_usize(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    min: usize,
    max: usize,
) -> Option<usize> {
    let val = lookup(name)?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
