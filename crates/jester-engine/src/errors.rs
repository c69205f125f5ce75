//! Error types for the engine.
//!
//! Every failure is returned as a value. The orchestrator treats
//! [`DeliveryError::Throttled`] and [`DeliveryError::NoContentAvailable`] as
//! routine outcomes; the rest point at setup problems the host should log.

use std::fmt;

use jester_core::errors::ProviderError;
use jester_core::trigger::TriggerType;
use serde::Serialize;
use thiserror::Error;

/// A predicate that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// The domain pattern is not a valid regular expression.
    #[error("invalid domain pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },
}

/// Rule registry and matcher errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A rule with this ID is already registered.
    #[error("duplicate rule id: {rule_id}")]
    DuplicateId {
        /// The colliding ID.
        rule_id: String,
    },

    /// The rule has no evaluable predicate.
    #[error("rule {rule_id} has no conditions")]
    EmptyConditions {
        /// The rule ID.
        rule_id: String,
    },

    /// A condition is out of range or self-contradictory.
    #[error("rule {rule_id} has invalid conditions: {message}")]
    InvalidConditions {
        /// The rule ID.
        rule_id: String,
        /// What is wrong.
        message: String,
    },

    /// Matching was requested against an empty registry.
    #[error("no rules registered")]
    NoRulesRegistered,
}

/// One schema or content problem found while validating a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Location in the catalog, e.g. `quips.TabOpened[2].texts[0]`.
    pub path: String,
    /// What is wrong.
    pub message: String,
}

impl Violation {
    /// Create a violation at `path`.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// The catalog could not be loaded at all.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the catalog failed.
    #[error("failed to read catalog {source_name}: {error}")]
    Io {
        /// Catalog source name.
        source_name: String,
        /// Underlying I/O error.
        #[source]
        error: std::io::Error,
    },

    /// The catalog document is not valid JSON or has the wrong shape.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Every entry failed validation.
    #[error("catalog failed validation with {} violation(s)", .violations.len())]
    Invalid {
        /// All violations found.
        violations: Vec<Violation>,
    },
}

/// Content store query errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store was queried before a successful `initialize`.
    #[error("content store is not initialized")]
    NotReady,
}

/// A secondary notification sink failed.
#[derive(Debug, Error)]
#[error("notification sink {sink} failed: {message}")]
pub struct SinkError {
    /// Sink name.
    pub sink: String,
    /// What went wrong.
    pub message: String,
}

/// Reasons a trigger did not produce a delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// A delivery happened within the throttle window.
    #[error("delivery throttled: {elapsed_ms}ms since last delivery, window is {window_ms}ms")]
    Throttled {
        /// Time since the last successful delivery.
        elapsed_ms: u64,
        /// Configured window.
        window_ms: u64,
    },

    /// Neither a rule nor the trigger produced any candidate content.
    #[error("no content available for {trigger}")]
    NoContentAvailable {
        /// The trigger kind that found nothing.
        trigger: TriggerType,
    },

    /// Deliveries are switched off in settings.
    #[error("deliveries are disabled")]
    Disabled,

    /// The content store is not ready.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The context provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl DeliveryError {
    /// Whether this is a routine, non-fatal outcome.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Throttled { .. } | Self::NoContentAvailable { .. } | Self::Disabled
        )
    }
}

/// Engine construction failed.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No context provider was supplied.
    #[error("a context provider is required")]
    MissingProvider,

    /// The catalog could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_display() {
        let v = Violation::new("quips.TabOpened[0]", "text too short");
        assert_eq!(v.to_string(), "quips.TabOpened[0]: text too short");
    }

    #[test]
    fn invalid_load_error_counts_violations() {
        let err = LoadError::Invalid {
            violations: vec![Violation::new("a", "x"), Violation::new("b", "y")],
        };
        assert_eq!(err.to_string(), "catalog failed validation with 2 violation(s)");
    }

    #[test]
    fn expected_delivery_errors() {
        assert!(DeliveryError::Throttled { elapsed_ms: 5, window_ms: 100 }.is_expected());
        assert!(
            DeliveryError::NoContentAvailable {
                trigger: TriggerType::Idle
            }
            .is_expected()
        );
        assert!(!DeliveryError::Store(StoreError::NotReady).is_expected());
    }

    #[test]
    fn store_error_is_transparent() {
        let err: DeliveryError = StoreError::NotReady.into();
        assert_eq!(err.to_string(), "content store is not initialized");
    }

    #[test]
    fn rule_error_display() {
        let err = RuleError::DuplicateId {
            rule_id: "EE-001".into(),
        };
        assert_eq!(err.to_string(), "duplicate rule id: EE-001");
    }
}
