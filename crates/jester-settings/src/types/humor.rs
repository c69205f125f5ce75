//! Personality and catalog settings.

use jester_core::content::HumorLevel;
use serde::{Deserialize, Serialize};

/// Voice and intensity of messages.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalitySettings {
    /// Personality name (`deadpan`, `playful`, `snarky`).
    pub name: String,
    /// Intensity override. `None` uses the personality's own level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<HumorLevel>,
}

impl Default for PersonalitySettings {
    fn default() -> Self {
        Self {
            name: "deadpan".to_string(),
            level: None,
        }
    }
}

/// Where content comes from.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    /// Path to a catalog JSON file. `None` uses the bundled catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parses_lowercase() {
        let p: PersonalitySettings =
            serde_json::from_str(r#"{"name": "deadpan", "level": "spicy"}"#).unwrap();
        assert_eq!(p.name, "deadpan");
        assert_eq!(p.level, Some(HumorLevel::Spicy));
    }

    #[test]
    fn catalog_defaults_to_bundled() {
        assert!(CatalogSettings::default().path.is_none());
    }
}
