//! Deliverable content.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::trigger::TriggerType;

/// Shortest allowed message text, in characters.
pub const MIN_TEXT_CHARS: usize = 10;

/// Longest allowed message text, in characters.
pub const MAX_TEXT_CHARS: usize = 200;

/// Intensity tier of a message.
///
/// Ordered: a query at a given level also returns entries from milder tiers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum HumorLevel {
    /// Gentle, safe for any audience.
    #[default]
    Mild,
    /// Some edge.
    Medium,
    /// Roasts the user.
    Spicy,
}

impl HumorLevel {
    /// Lowercase name used in catalogs and settings.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Medium => "medium",
            Self::Spicy => "spicy",
        }
    }
}

impl fmt::Display for HumorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HumorLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mild" => Ok(Self::Mild),
            "medium" => Ok(Self::Medium),
            "spicy" => Ok(Self::Spicy),
            other => Err(format!("unknown humor level: {other}")),
        }
    }
}

/// A unit of deliverable text.
///
/// Regular quips list the trigger kinds they apply to; easter-egg entries
/// carry the rule type they belong to instead. An entry may hold several
/// text variants, one of which is picked at delivery time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    /// Catalog-unique identifier, used for deduplication.
    pub id: String,
    /// Text variants (at least one).
    pub texts: Vec<String>,
    /// Trigger kinds this quip applies to. Empty for easter-egg entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<TriggerType>,
    /// Rule type this entry belongs to, for easter-egg entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    /// Intensity tier.
    #[serde(default)]
    pub level: HumorLevel,
    /// Free-form authoring metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ContentEntry {
    /// Single-text quip for the given trigger kinds.
    #[must_use]
    pub fn quip(id: impl Into<String>, text: impl Into<String>, triggers: &[TriggerType]) -> Self {
        Self {
            id: id.into(),
            texts: vec![text.into()],
            triggers: triggers.to_vec(),
            rule_type: None,
            level: HumorLevel::Mild,
            metadata: None,
        }
    }

    /// Easter-egg entry for a rule type.
    #[must_use]
    pub fn easter_egg(id: impl Into<String>, rule_type: impl Into<String>, texts: Vec<String>) -> Self {
        Self {
            id: id.into(),
            texts,
            triggers: Vec::new(),
            rule_type: Some(rule_type.into()),
            level: HumorLevel::Mild,
            metadata: None,
        }
    }

    /// Set the intensity tier.
    #[must_use]
    pub fn with_level(mut self, level: HumorLevel) -> Self {
        self.level = level;
        self
    }

    /// Whether this quip applies to the trigger kind.
    pub fn applies_to(&self, trigger: TriggerType) -> bool {
        self.triggers.contains(&trigger)
    }

    /// Whether this entry is available at the requested level.
    pub fn allowed_at(&self, level: HumorLevel) -> bool {
        self.level <= level
    }
}
