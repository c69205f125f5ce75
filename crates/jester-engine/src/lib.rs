//! # jester-engine
//!
//! Contextual-trigger humor engine: decides whether a browser event deserves
//! a quip, picks one, and delivers it.
//!
//! ## Pipeline
//!
//! A [`Trigger`](jester_core::trigger::Trigger) enters the
//! [`DeliveryOrchestrator`](orchestrator::DeliveryOrchestrator), which:
//!
//! - rejects it if a message went out within the throttle window
//! - snapshots browser state through the [`ContextCache`](cache::ContextCache)
//! - asks the [`RuleRegistry`](rules::RuleRegistry) for the highest-priority
//!   easter-egg rule whose [`ConditionSet`](conditions::ConditionSet) holds
//! - queries the [`ContentStore`](store::ContentStore) for the rule's content,
//!   or for the trigger's regular quips when no rule applies
//! - picks one with the [`ContentSelector`](selector::ContentSelector),
//!   avoiding recent repeats
//! - renders it through the active [`Personality`](personality::Personality)
//!   and emits a [`Notification`](jester_core::delivery::Notification)
//!
//! ## Failure Model
//!
//! Nothing panics and nothing is thrown: every trigger yields a
//! [`DeliveryResult`](jester_core::delivery::DeliveryResult) or a
//! [`DeliveryError`](errors::DeliveryError). Throttling and "nothing to say"
//! are routine outcomes. A catalog with some bad entries still loads; the bad
//! entries are dropped and reported.
//!
//! ## Setup
//!
//! [`JesterBuilder`](builder::JesterBuilder) wires settings, a context
//! provider, and a catalog source into a ready orchestrator.

#![deny(unsafe_code)]

pub mod builder;
pub mod cache;
pub mod catalog;
pub mod conditions;
pub mod emitter;
pub mod errors;
pub mod orchestrator;
pub mod personality;
pub mod rules;
pub mod selector;
pub mod store;

pub use builder::JesterBuilder;
pub use errors::{BuildError, DeliveryError};
pub use orchestrator::{DeliveryOrchestrator, DeliveryPhase, DeliveryStats};

use jester_settings::LoggingSettings;

/// Install the process-wide log subscriber described by `settings`.
///
/// `RUST_LOG` still wins when set. Calling this more than once is harmless.
pub fn init_logging(settings: &LoggingSettings) {
    if settings.json {
        jester_core::logging::init_json_subscriber(&settings.level);
    } else {
        jester_core::logging::init_subscriber(&settings.level);
    }
}
