//! # jester-settings
//!
//! Layered configuration for the Jester humor engine.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`JesterSettings::default()`]
//! 2. **User file**: `~/.jester/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `JESTER_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use jester_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("throttle: {}ms", settings.delivery.throttle_ms);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

static SETTINGS: OnceLock<JesterSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from disk with env var overrides. If loading
/// fails, logs the reason and returns compiled defaults.
pub fn get_settings() -> &'static JesterSettings {
    SETTINGS.get_or_init(|| {
        load_settings().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to load settings, using defaults");
            JesterSettings::default()
        })
    })
}

/// Initialize the global settings with a specific value.
///
/// Returns the settings back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: JesterSettings) -> std::result::Result<(), JesterSettings> {
    SETTINGS.set(settings)
}
