//! Short-lived cache in front of a [`ContextProvider`].

use std::sync::Arc;
use std::time::Duration;

use jester_core::context::{BrowserContext, ContextProvider};
use jester_core::errors::ProviderError;
use tokio::time::Instant;
use tracing::trace;

/// Default snapshot lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_millis(500);

/// Reuses a provider snapshot for a short TTL.
///
/// Not internally synchronized: the orchestrator owns it behind its state
/// mutex.
pub struct ContextCache {
    provider: Arc<dyn ContextProvider>,
    ttl: Duration,
    slot: Option<(Arc<BrowserContext>, Instant)>,
    fetches: u64,
}

impl ContextCache {
    /// Cache snapshots from `provider` for `ttl`.
    pub fn new(provider: Arc<dyn ContextProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            slot: None,
            fetches: 0,
        }
    }

    /// Current context, fetched from the provider if the slot is stale.
    ///
    /// A provider error is returned as-is and the slot is left untouched.
    pub async fn get_context(&mut self) -> Result<Arc<BrowserContext>, ProviderError> {
        if let Some((ctx, fetched_at)) = &self.slot {
            if fetched_at.elapsed() < self.ttl {
                trace!("context cache hit");
                return Ok(Arc::clone(ctx));
            }
        }

        self.fetches += 1;
        let snapshot = self.provider.snapshot().await?;
        snapshot.validate()?;
        let ctx = Arc::new(snapshot);
        self.slot = Some((Arc::clone(&ctx), Instant::now()));
        trace!(tab_count = ctx.tab_count, "context cache refreshed");
        Ok(ctx)
    }

    /// Drop the cached snapshot.
    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    /// Number of provider calls made.
    pub fn fetch_count(&self) -> u64 {
        self.fetches
    }

    /// Configured lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl std::fmt::Debug for ContextCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCache")
            .field("ttl", &self.ttl)
            .field("cached", &self.slot.is_some())
            .field("fetches", &self.fetch_count())
            .finish_non_exhaustive()
    }
}
