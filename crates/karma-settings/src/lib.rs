//! # karma-settings
//!
//! Layered render configuration for karma hierarchical messages.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`KarmaSettings::default()`]
//! 2. **User file**: `~/.karma/settings.json` or `$KARMA_SETTINGS_PATH`
//!    (deep-merged over defaults)
//! 3. **Environment variables**: `KARMA_BRANCH_*` overrides
//!
//! [`install`] applies the loaded settings to the process-wide render
//! configuration used by `Display`.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

use karma_core::RenderConfig;
use tracing::warn;

/// Global settings singleton.
static SETTINGS: OnceLock<KarmaSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings with env var overrides. If loading fails
/// the failure is logged and compiled defaults are used.
pub fn get_settings() -> &'static KarmaSettings {
    SETTINGS.get_or_init(|| {
        load_settings().unwrap_or_else(|error| {
            warn!(%error, "unable to load settings, using defaults");
            KarmaSettings::default()
        })
    })
}

/// Initialize the global settings with a specific value.
///
/// Returns the settings back if the global was already initialized.
pub fn init_settings(settings: KarmaSettings) -> std::result::Result<(), KarmaSettings> {
    SETTINGS.set(settings)
}

/// Make `settings` the process-wide render configuration, returning the
/// previous one.
pub fn apply(settings: &KarmaSettings) -> RenderConfig {
    karma_core::set_config(settings.render.to_config())
}

/// Load the global settings and install them.
pub fn install() -> RenderConfig {
    apply(get_settings())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
