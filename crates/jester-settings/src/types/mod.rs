//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`
//! so a settings file may set any subset of fields. Each type implements
//! [`Default`] with production values.

mod delivery;
mod humor;

pub use delivery::*;
pub use humor::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// # JSON Format
///
/// ```json
/// {
///   "delivery": { "throttleMs": 250 },
///   "personality": { "name": "snarky" }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JesterSettings {
    /// Settings schema version.
    pub version: String,
    /// Throttling and display of deliveries.
    pub delivery: DeliverySettings,
    /// Browser context caching.
    pub context: ContextCacheSettings,
    /// Repeat avoidance.
    pub selection: SelectionSettings,
    /// Voice and intensity of messages.
    pub personality: PersonalitySettings,
    /// Where content comes from.
    pub catalog: CatalogSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl Default for JesterSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            delivery: DeliverySettings::default(),
            context: ContextCacheSettings::default(),
            selection: SelectionSettings::default(),
            personality: PersonalitySettings::default(),
            catalog: CatalogSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl JesterSettings {
    /// Check cross-field and range constraints.
    pub fn validate(&self) -> Result<()> {
        if self.selection.max_recent == 0 {
            return Err(SettingsError::InvalidValue(
                "selection.maxRecent must be at least 1".into(),
            ));
        }
        if self.delivery.display_duration_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "delivery.displayDurationMs must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}
