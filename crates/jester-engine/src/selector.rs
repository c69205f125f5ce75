//! Content selection with recent-history deduplication.

use std::collections::{HashSet, VecDeque};

use jester_core::content::ContentEntry;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{RngCore, SeedableRng};

/// Default number of recently shown entries to avoid.
pub const DEFAULT_MAX_RECENT: usize = 10;

/// Picks entries uniformly at random, avoiding the last few shown.
///
/// When every candidate was shown recently the full candidate set is used
/// again, so a small catalog repeats rather than going quiet.
pub struct ContentSelector {
    recent: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
    rng: StdRng,
}

impl ContentSelector {
    /// Create a selector remembering `capacity` entries (at least one).
    ///
    /// A `seed` makes choices reproducible.
    #[must_use]
    pub fn new(capacity: usize, seed: Option<u64>) -> Self {
        let capacity = capacity.max(1);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            recent: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            rng,
        }
    }

    /// Choose one of `candidates` and record it as shown.
    ///
    /// Returns `None` only when `candidates` is empty.
    pub fn select(&mut self, candidates: &[ContentEntry]) -> Option<ContentEntry> {
        let fresh: Vec<&ContentEntry> = candidates
            .iter()
            .filter(|c| !self.recent.contains(&c.id))
            .collect();

        let chosen = if fresh.is_empty() {
            candidates.choose(&mut self.rng)?
        } else {
            *fresh.choose(&mut self.rng)?
        };

        self.remember(&chosen.id);
        Some(chosen.clone())
    }

    /// Random source shared with rendering.
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    fn remember(&mut self, id: &str) {
        if self.recent.contains(id) {
            self.order.retain(|existing| existing != id);
        } else {
            if self.order.len() == self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    let _ = self.recent.remove(&oldest);
                }
            }
            let _ = self.recent.insert(id.to_string());
        }
        self.order.push_back(id.to_string());
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.recent.clear();
        self.order.clear();
    }

    /// Number of entries currently remembered.
    pub fn recent_len(&self) -> usize {
        self.order.len()
    }

    /// Whether `id` is in the recent history.
    pub fn was_recent(&self, id: &str) -> bool {
        self.recent.contains(id)
    }
}

impl Default for ContentSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECENT, None)
    }
}

impl std::fmt::Debug for ContentSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentSelector")
            .field("capacity", &self.capacity)
            .field("recent", &self.order)
            .finish_non_exhaustive()
    }
}
