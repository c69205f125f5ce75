//! Delivery outputs: notification records and per-trigger results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::NotificationId;
use crate::trigger::TriggerType;

/// Where a message ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    /// The in-page notification stream.
    Primary,
    /// The fallback sink, used when nobody listens on the stream.
    Secondary,
    /// Nothing was delivered.
    None,
}

/// A record emitted on the notification stream for the UI layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification ID.
    pub id: NotificationId,
    /// Rendered message text.
    pub text: String,
    /// Whether the text came from an easter-egg rule.
    pub is_rule_match: bool,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
    /// How long the UI should keep the message on screen.
    pub display_duration_ms: u64,
    /// Trigger that caused the delivery.
    pub trigger_type: TriggerType,
    /// Matched rule, for easter-egg deliveries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

/// Outcome of a single delivery attempt, as returned to the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResult {
    /// Whether a message went out.
    pub delivered: bool,
    /// The delivered text.
    pub text: Option<String>,
    /// Channel used.
    pub channel: DeliveryChannel,
    /// Whether the text came from an easter-egg rule.
    pub is_rule_match: bool,
    /// When the attempt completed.
    pub timestamp: DateTime<Utc>,
    /// Why nothing was delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DeliveryResult {
    /// A successful delivery.
    #[must_use]
    pub fn delivered(text: String, channel: DeliveryChannel, is_rule_match: bool) -> Self {
        Self {
            delivered: true,
            text: Some(text),
            channel,
            is_rule_match,
            timestamp: Utc::now(),
            reason: None,
        }
    }

    /// A silent non-delivery carrying the reason.
    #[must_use]
    pub fn silent(reason: impl Into<String>) -> Self {
        Self {
            delivered: false,
            text: None,
            channel: DeliveryChannel::None,
            is_rule_match: false,
            timestamp: Utc::now(),
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivered_result_fields() {
        let result = DeliveryResult::delivered("Hello there, tab.".into(), DeliveryChannel::Primary, true);
        assert!(result.delivered);
        assert!(result.is_rule_match);
        assert_eq!(result.channel, DeliveryChannel::Primary);
        assert!(result.reason.is_none());
    }

    #[test]
    fn silent_result_fields() {
        let result = DeliveryResult::silent("throttled");
        assert!(!result.delivered);
        assert!(result.text.is_none());
        assert_eq!(result.channel, DeliveryChannel::None);
        assert_eq!(result.reason.as_deref(), Some("throttled"));
    }

    #[test]
    fn notification_serde_is_camel_case() {
        let n = Notification {
            id: NotificationId::from("n-1"),
            text: "Forty-two tabs. Of course.".into(),
            is_rule_match: true,
            timestamp: Utc::now(),
            display_duration_ms: 4000,
            trigger_type: TriggerType::TabOpened,
            rule_id: Some("EE-001".into()),
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["isRuleMatch"], true);
        assert_eq!(json["displayDurationMs"], 4000);
        assert_eq!(json["triggerType"], "TabOpened");
        assert_eq!(json["ruleId"], "EE-001");
    }

    #[test]
    fn channel_serde_lowercase() {
        let json = serde_json::to_string(&DeliveryChannel::Secondary).unwrap();
        assert_eq!(json, "\"secondary\"");
    }
}
