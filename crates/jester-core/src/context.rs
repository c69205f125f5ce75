//! Browser state snapshots.
//!
//! A [`BrowserContext`] is an immutable point-in-time view of the browser that
//! easter-egg rules are evaluated against. Snapshots are produced on demand by
//! a [`ContextProvider`] owned by the host application and cached briefly by
//! the engine.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// Default capacity of a [`RecentEvents`] ring.
pub const DEFAULT_RECENT_EVENTS: usize = 20;

/// The tab the user is currently looking at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTab {
    /// Full URL of the tab.
    pub url: String,
    /// Page title.
    pub title: String,
    /// Host portion of the URL, lowercased.
    pub domain: String,
}

impl ActiveTab {
    /// Build an active tab, deriving `domain` from the URL host.
    ///
    /// URLs without a host (`about:blank`, `file:///`) get an empty domain.
    #[must_use]
    pub fn from_url(url: impl Into<String>, title: impl Into<String>) -> Self {
        let url = url.into();
        let domain = url::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_default();
        Self {
            url,
            title: title.into(),
            domain,
        }
    }
}

/// Point-in-time snapshot of observable browser state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserContext {
    /// Number of open tabs across the window.
    pub tab_count: u32,
    /// Focused tab, if any.
    pub active_tab: Option<ActiveTab>,
    /// Local hour of day, `0..=23`.
    pub current_hour: u8,
    /// Recent event names, oldest first.
    pub recent_events: Vec<String>,
    /// Number of tab groups.
    pub group_count: u32,
}

impl BrowserContext {
    /// Snapshot with only a tab count set. Hour defaults to noon.
    #[must_use]
    pub fn with_tabs(tab_count: u32) -> Self {
        Self {
            tab_count,
            current_hour: 12,
            ..Self::default()
        }
    }

    /// Domain of the active tab, if there is one.
    pub fn active_domain(&self) -> Option<&str> {
        self.active_tab.as_ref().map(|t| t.domain.as_str())
    }

    /// Title of the active tab, if there is one.
    pub fn active_title(&self) -> Option<&str> {
        self.active_tab.as_ref().map(|t| t.title.as_str())
    }

    /// Check the snapshot invariants.
    ///
    /// Providers should call this before handing a snapshot to the engine.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.current_hour > 23 {
            return Err(ProviderError::InvalidSnapshot(format!(
                "current hour {} outside 0..=23",
                self.current_hour
            )));
        }
        Ok(())
    }
}

/// Bounded ring of recent event names, most-recent-last.
///
/// Providers push every browser event they observe; the oldest name is
/// evicted once the ring is full.
#[derive(Clone, Debug)]
pub struct RecentEvents {
    events: VecDeque<String>,
    capacity: usize,
}

impl RecentEvents {
    /// Create an empty ring holding at most `capacity` names.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record an event, evicting the oldest if at capacity.
    pub fn push(&mut self, event: impl Into<String>) {
        if self.events.len() == self.capacity {
            let _ = self.events.pop_front();
        }
        self.events.push_back(event.into());
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Copy the ring into the snapshot representation.
    pub fn to_vec(&self) -> Vec<String> {
        self.events.iter().cloned().collect()
    }

    /// Forget all events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for RecentEvents {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_EVENTS)
    }
}

/// Source of [`BrowserContext`] snapshots.
///
/// Implemented by the host application. Calls may be slow (they query browser
/// APIs), which is why the engine fronts them with a short-TTL cache.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Produce a fresh snapshot.
    async fn snapshot(&self) -> Result<BrowserContext, ProviderError>;
}

/// Provider that always returns the same snapshot.
///
/// Useful for tests and for hosts that push state rather than having it pulled.
#[derive(Clone, Debug, Default)]
pub struct StaticContextProvider {
    context: BrowserContext,
}

impl StaticContextProvider {
    /// Wrap a fixed snapshot.
    #[must_use]
    pub fn new(context: BrowserContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ContextProvider for StaticContextProvider {
    async fn snapshot(&self) -> Result<BrowserContext, ProviderError> {
        Ok(self.context.clone())
    }
}
