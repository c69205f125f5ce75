//! # jester-core
//!
//! Foundation types, errors, branded IDs, and logging for the Jester humor engine.
//!
//! This crate provides the shared vocabulary that the other Jester crates depend on:
//!
//! - **Context**: [`BrowserContext`](context::BrowserContext) snapshots and the
//!   [`ContextProvider`](context::ContextProvider) trait that produces them
//! - **Triggers**: [`Trigger`](trigger::Trigger) and the closed set of
//!   [`TriggerType`](trigger::TriggerType) kinds
//! - **Content**: [`ContentEntry`](content::ContentEntry) and
//!   [`HumorLevel`](content::HumorLevel) intensity tiers
//! - **Delivery**: [`Notification`](delivery::Notification) stream records and
//!   [`DeliveryResult`](delivery::DeliveryResult) values
//! - **Errors**: [`ProviderError`](errors::ProviderError) via `thiserror`
//! - **Logging**: `tracing` subscriber setup and log capture for tests

#![deny(unsafe_code)]

pub mod content;
pub mod context;
pub mod delivery;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod trigger;
