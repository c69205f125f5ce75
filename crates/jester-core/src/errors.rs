//! Error types shared across Jester crates.

use thiserror::Error;

/// Errors raised by a [`ContextProvider`](crate::context::ContextProvider).
///
/// The engine never inspects these beyond logging; they propagate to the
/// caller of a delivery unchanged.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The browser state could not be read (API unavailable, permission denied).
    #[error("browser state unavailable: {0}")]
    Unavailable(String),

    /// The provider produced a snapshot that violates the context invariants.
    #[error("invalid context snapshot: {0}")]
    InvalidSnapshot(String),

    /// Any other provider-side failure.
    #[error("context provider error: {0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
