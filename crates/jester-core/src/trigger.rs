//! Delivery triggers.
//!
//! A [`Trigger`] is an external event from tab-management logic that may
//! warrant a message. Its [`TriggerType`] keys the regular quip catalog.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Known trigger kinds.
///
/// Serialized with the variant name (`"TabOpened"`), which is also the key
/// used in the quip catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TriggerType {
    /// A tab was created.
    TabOpened,
    /// A tab was closed.
    TabClosed,
    /// The user switched to a different tab.
    TabActivated,
    /// A tab finished navigating.
    TabUpdated,
    /// A tab group was created.
    GroupCreated,
    /// Tabs were auto-grouped.
    TabsGrouped,
    /// A tab group was removed.
    GroupRemoved,
    /// A browser window gained focus.
    WindowFocused,
    /// The user has been idle for a while.
    Idle,
}

impl TriggerType {
    /// All trigger kinds, in declaration order.
    #[must_use]
    pub fn all() -> &'static [TriggerType] {
        &[
            Self::TabOpened,
            Self::TabClosed,
            Self::TabActivated,
            Self::TabUpdated,
            Self::GroupCreated,
            Self::TabsGrouped,
            Self::GroupRemoved,
            Self::WindowFocused,
            Self::Idle,
        ]
    }

    /// Catalog key for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TabOpened => "TabOpened",
            Self::TabClosed => "TabClosed",
            Self::TabActivated => "TabActivated",
            Self::TabUpdated => "TabUpdated",
            Self::GroupCreated => "GroupCreated",
            Self::TabsGrouped => "TabsGrouped",
            Self::GroupRemoved => "GroupRemoved",
            Self::WindowFocused => "WindowFocused",
            Self::Idle => "Idle",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized trigger name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trigger type: {0}")]
pub struct UnknownTriggerType(pub String);

impl FromStr for TriggerType {
    type Err = UnknownTriggerType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTriggerType(s.to_owned()))
    }
}

/// An event that may produce a delivery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    /// Kind of event.
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    /// Trigger-specific payload (tab id, group name, ...).
    #[serde(default)]
    pub data: serde_json::Value,
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
}

impl Trigger {
    /// Create a trigger stamped with the current time and no payload.
    #[must_use]
    pub fn now(trigger_type: TriggerType) -> Self {
        Self {
            trigger_type,
            data: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}
