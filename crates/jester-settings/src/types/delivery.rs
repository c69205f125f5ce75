//! Delivery, caching, and selection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Throttling and display of deliveries.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliverySettings {
    /// Master switch. When off, every trigger falls silent.
    pub enabled: bool,
    /// Minimum time between two successful deliveries.
    pub throttle_ms: u64,
    /// How long the UI shows a message.
    pub display_duration_ms: u64,
    /// Capacity of the notification broadcast channel.
    pub stream_capacity: usize,
}

impl DeliverySettings {
    /// Throttle window as a [`Duration`].
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            throttle_ms: 100,
            display_duration_ms: 4000,
            stream_capacity: 64,
        }
    }
}

/// Browser context caching.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextCacheSettings {
    /// How long a snapshot is reused before the provider is queried again.
    pub cache_ttl_ms: u64,
}

impl ContextCacheSettings {
    /// TTL as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

impl Default for ContextCacheSettings {
    fn default() -> Self {
        Self { cache_ttl_ms: 500 }
    }
}

/// Repeat avoidance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionSettings {
    /// Number of recently shown entry IDs to avoid.
    pub max_recent: usize,
    /// Fixed RNG seed. Only meant for reproducible demos and tests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            max_recent: 10,
            seed: None,
        }
    }
}
