//! Delivery orchestrator.
//!
//! Turns a [`Trigger`] into at most one notification:
//!
//! 1. Throttle check against the last successful delivery.
//! 2. Context snapshot (cached) and rule matching.
//! 3. Easter-egg content for the matched rule, else regular content for the
//!    trigger kind.
//! 4. Deduplicated selection, personality rendering, emission.
//!
//! Triggers are handled one at a time: concurrent callers queue on the state
//! mutex.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jester_core::content::{ContentEntry, HumorLevel};
use jester_core::context::ContextProvider;
use jester_core::delivery::{DeliveryChannel, DeliveryResult, Notification};
use jester_core::ids::NotificationId;
use jester_core::trigger::Trigger;
use jester_settings::JesterSettings;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::ContextCache;
use crate::emitter::{NotificationEmitter, NotificationSink};
use crate::errors::{DeliveryError, RuleError};
use crate::personality::{Cue, Personality};
use crate::rules::{Rule, RuleRegistry};
use crate::selector::ContentSelector;
use crate::store::ContentStore;

/// Where the orchestrator is in handling a trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPhase {
    /// Waiting for a trigger.
    #[default]
    Idle,
    /// Fetching context and choosing content.
    Evaluating,
    /// Rejected by the throttle window.
    Throttled,
    /// Rendering and emitting.
    Delivering,
}

impl fmt::Display for DeliveryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Evaluating => "evaluating",
            Self::Throttled => "throttled",
            Self::Delivering => "delivering",
        };
        f.write_str(s)
    }
}

/// Running counters since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStats {
    /// Successful deliveries.
    pub delivered: u64,
    /// Successful deliveries that came from a rule.
    pub rule_matches: u64,
    /// Triggers rejected by the throttle.
    pub throttled: u64,
    /// Triggers with nothing to say.
    pub no_content: u64,
    /// Triggers that failed on store or provider errors.
    pub failed: u64,
}

/// Runtime knobs, usually derived from [`JesterSettings`].
#[derive(Clone, Debug)]
pub struct DeliveryOptions {
    /// When `false`, every trigger returns [`DeliveryError::Disabled`].
    pub enabled: bool,
    /// Minimum gap between successful deliveries.
    pub throttle: Duration,
    /// Base display duration handed to the personality.
    pub display_duration_ms: u64,
    /// Overrides the personality's own humor level.
    pub level_override: Option<HumorLevel>,
    /// Context snapshot lifetime.
    pub cache_ttl: Duration,
    /// Recent-history size for deduplication.
    pub max_recent: usize,
    /// RNG seed for reproducible selection.
    pub seed: Option<u64>,
    /// Notification stream capacity.
    pub stream_capacity: usize,
}

impl DeliveryOptions {
    /// Map settings onto options.
    pub fn from_settings(settings: &JesterSettings) -> Self {
        Self {
            enabled: settings.delivery.enabled,
            throttle: settings.delivery.throttle(),
            display_duration_ms: settings.delivery.display_duration_ms,
            level_override: settings.personality.level,
            cache_ttl: settings.context.ttl(),
            max_recent: settings.selection.max_recent,
            seed: settings.selection.seed,
            stream_capacity: settings.delivery.stream_capacity,
        }
    }
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self::from_settings(&JesterSettings::default())
    }
}

/// Per-trigger mutable state, owned behind the async mutex.
struct DeliveryState {
    cache: ContextCache,
    selector: ContentSelector,
    last_delivery: Option<Instant>,
}

/// Chosen content and the rule it came from, if any.
struct Selection {
    entry: ContentEntry,
    rule_id: Option<String>,
}

/// Coordinates context, rules, content, and delivery.
pub struct DeliveryOrchestrator {
    store: Arc<ContentStore>,
    rules: RwLock<RuleRegistry>,
    personality: RwLock<Arc<dyn Personality>>,
    emitter: NotificationEmitter,
    secondary: Option<Arc<dyn NotificationSink>>,
    state: tokio::sync::Mutex<DeliveryState>,
    phase: Mutex<DeliveryPhase>,
    stats: Mutex<DeliveryStats>,
    options: DeliveryOptions,
}

impl DeliveryOrchestrator {
    /// Create an orchestrator over an initialized store.
    pub fn new(
        store: Arc<ContentStore>,
        provider: Arc<dyn ContextProvider>,
        personality: Arc<dyn Personality>,
        options: DeliveryOptions,
    ) -> Self {
        let state = DeliveryState {
            cache: ContextCache::new(provider, options.cache_ttl),
            selector: ContentSelector::new(options.max_recent, options.seed),
            last_delivery: None,
        };
        Self {
            store,
            rules: RwLock::new(RuleRegistry::new()),
            personality: RwLock::new(personality),
            emitter: NotificationEmitter::with_capacity(options.stream_capacity),
            secondary: None,
            state: tokio::sync::Mutex::new(state),
            phase: Mutex::new(DeliveryPhase::Idle),
            stats: Mutex::new(DeliveryStats::default()),
            options,
        }
    }

    /// Attach a secondary sink used when the stream has no subscribers.
    #[must_use]
    pub fn with_secondary_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.secondary = Some(sink);
        self
    }

    /// Handle a trigger.
    ///
    /// Returns the delivery or the reason there was none. Throttled and
    /// no-content outcomes are routine; see [`DeliveryError::is_expected`].
    pub async fn deliver(&self, trigger: &Trigger) -> Result<DeliveryResult, DeliveryError> {
        if !self.options.enabled {
            return Err(DeliveryError::Disabled);
        }

        let mut state = self.state.lock().await;
        let result = self.deliver_locked(&mut state, trigger).await;
        self.set_phase(DeliveryPhase::Idle);
        drop(state);

        self.record(&result);
        result
    }

    /// Like [`deliver`](Self::deliver), but folds errors into a silent
    /// [`DeliveryResult`] carrying the reason.
    pub async fn deliver_quietly(&self, trigger: &Trigger) -> DeliveryResult {
        match self.deliver(trigger).await {
            Ok(result) => result,
            Err(error) => {
                if error.is_expected() {
                    debug!(trigger = %trigger.trigger_type, %error, "no delivery");
                } else {
                    warn!(trigger = %trigger.trigger_type, %error, "delivery failed");
                }
                DeliveryResult::silent(error.to_string())
            }
        }
    }

    async fn deliver_locked(
        &self,
        state: &mut DeliveryState,
        trigger: &Trigger,
    ) -> Result<DeliveryResult, DeliveryError> {
        if let Some(last) = state.last_delivery {
            let elapsed = last.elapsed();
            if elapsed < self.options.throttle {
                self.set_phase(DeliveryPhase::Throttled);
                return Err(DeliveryError::Throttled {
                    elapsed_ms: millis(elapsed),
                    window_ms: millis(self.options.throttle),
                });
            }
        }

        self.set_phase(DeliveryPhase::Evaluating);
        let ctx = state.cache.get_context().await?;
        let personality = self.personality();
        let level = self.options.level_override.unwrap_or_else(|| personality.level());

        let rule_match = match self.rules.read().match_context(&ctx) {
            Ok(found) => found,
            Err(RuleError::NoRulesRegistered) => {
                debug!("no rules registered, skipping rule matching");
                None
            }
            Err(error) => {
                warn!(%error, "rule matching failed");
                None
            }
        };

        let mut selection = None;
        if let Some(matched) = rule_match {
            let candidates = self.store.query_by_rule_type(&matched.rule_type, level)?;
            match state.selector.select(&candidates) {
                Some(entry) => {
                    selection = Some(Selection {
                        entry,
                        rule_id: Some(matched.rule_id),
                    });
                }
                None => {
                    debug!(rule_id = %matched.rule_id, %level, "matched rule has no content at this level");
                }
            }
        }
        if selection.is_none() {
            let candidates = self.store.query_by_trigger(level, Some(trigger.trigger_type))?;
            selection = state
                .selector
                .select(&candidates)
                .map(|entry| Selection { entry, rule_id: None });
        }
        let Some(Selection { entry, rule_id }) = selection else {
            return Err(DeliveryError::NoContentAvailable {
                trigger: trigger.trigger_type,
            });
        };

        self.set_phase(DeliveryPhase::Delivering);
        let is_rule_match = rule_id.is_some();
        let cue = Cue {
            entry: &entry,
            trigger: trigger.trigger_type,
            is_rule_match,
        };
        let text = personality.render(&cue, state.selector.rng());
        let notification = Notification {
            id: NotificationId::new(),
            text: text.clone(),
            is_rule_match,
            timestamp: Utc::now(),
            display_duration_ms: personality.display_duration_ms(self.options.display_duration_ms),
            trigger_type: trigger.trigger_type,
            rule_id,
        };

        let channel = self.dispatch(notification).await;
        state.last_delivery = Some(Instant::now());
        info!(
            trigger = %trigger.trigger_type,
            entry_id = %entry.id,
            is_rule_match,
            ?channel,
            "delivered"
        );
        Ok(DeliveryResult::delivered(text, channel, is_rule_match))
    }

    /// Emit on the stream, falling back to the secondary sink if nobody is
    /// subscribed.
    async fn dispatch(&self, notification: Notification) -> DeliveryChannel {
        if self.emitter.emit(notification.clone()) > 0 {
            return DeliveryChannel::Primary;
        }
        let Some(sink) = &self.secondary else {
            return DeliveryChannel::Primary;
        };
        match sink.dispatch(&notification).await {
            Ok(()) => DeliveryChannel::Secondary,
            Err(error) => {
                warn!(sink = sink.name(), %error, "secondary sink failed");
                DeliveryChannel::Primary
            }
        }
    }

    fn record(&self, result: &Result<DeliveryResult, DeliveryError>) {
        let mut stats = self.stats.lock();
        match result {
            Ok(delivery) => {
                stats.delivered += 1;
                if delivery.is_rule_match {
                    stats.rule_matches += 1;
                }
            }
            Err(DeliveryError::Throttled { .. }) => stats.throttled += 1,
            Err(DeliveryError::NoContentAvailable { .. }) => stats.no_content += 1,
            Err(DeliveryError::Disabled) => {}
            Err(_) => stats.failed += 1,
        }
    }

    fn set_phase(&self, phase: DeliveryPhase) {
        let mut current = self.phase.lock();
        if *current != phase {
            debug!(from = %*current, to = %phase, "delivery phase");
            *current = phase;
        }
    }

    /// Clear the context cache, selection history, and throttle timestamp.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.cache.invalidate();
        state.selector.reset();
        state.last_delivery = None;
        self.set_phase(DeliveryPhase::Idle);
        debug!("delivery state reset");
    }

    /// Receive every notification emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.emitter.subscribe()
    }

    /// Number of live stream subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.emitter.subscriber_count()
    }

    /// Current phase.
    pub fn phase(&self) -> DeliveryPhase {
        *self.phase.lock()
    }

    /// Counters since construction.
    pub fn stats(&self) -> DeliveryStats {
        *self.stats.lock()
    }

    /// Register an easter-egg rule.
    pub fn register_rule(&self, rule: Rule) -> Result<(), RuleError> {
        self.rules.write().register(rule)
    }

    /// Register several rules, returning the ones rejected.
    pub fn register_rules(&self, rules: impl IntoIterator<Item = Rule>) -> Vec<RuleError> {
        self.rules.write().register_all(rules)
    }

    /// Remove a rule by ID.
    pub fn unregister_rule(&self, rule_id: &str) -> bool {
        self.rules.write().unregister(rule_id)
    }

    /// Remove every rule.
    pub fn clear_rules(&self) {
        self.rules.write().clear();
    }

    /// Snapshot of registered rules, in evaluation order.
    pub fn rules(&self) -> Vec<Rule> {
        self.rules.read().all().to_vec()
    }

    /// Active personality.
    pub fn personality(&self) -> Arc<dyn Personality> {
        self.personality.read().clone()
    }

    /// Swap the active personality. Takes effect on the next trigger.
    pub fn set_personality(&self, personality: Arc<dyn Personality>) {
        info!(personality = personality.name(), "personality changed");
        *self.personality.write() = personality;
    }

    /// Humor level used for content queries.
    pub fn level(&self) -> HumorLevel {
        self.options
            .level_override
            .unwrap_or_else(|| self.personality().level())
    }

    /// The content store.
    pub fn store(&self) -> &Arc<ContentStore> {
        &self.store
    }

    /// Options in effect.
    pub fn options(&self) -> &DeliveryOptions {
        &self.options
    }
}

impl fmt::Debug for DeliveryOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryOrchestrator")
            .field("phase", &self.phase())
            .field("rules", &self.rules.read().len())
            .field("personality", &self.personality().name().to_string())
            .finish_non_exhaustive()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::JsonCatalog;
    use crate::conditions::{ConditionSet, NumericSpec};
    use crate::errors::{SinkError, StoreError};
    use crate::personality::{Deadpan, Snarky};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use jester_core::context::{BrowserContext, StaticContextProvider};
    use jester_core::errors::ProviderError;
    use jester_core::trigger::TriggerType;
    use jester_core::logging::capture_logs;

    const CATALOG: &str = r#"{
        "quips": {
            "TabOpened": [
                {"id": "open-mild", "text": "Another tab. Bold move.", "level": "mild"},
                {"id": "open-spicy", "text": "You will never read this one.", "level": "spicy"}
            ],
            "Idle": [{"id": "idle-spicy", "text": "Staring contest lost.", "level": "spicy"}]
        },
        "easterEggs": {
            "42-tabs": [{"id": "egg-42", "texts": ["The answer to everything."], "level": "mild"}],
            "spicy-only": [{"id": "egg-spicy", "text": "Way too many tabs, friend.", "level": "spicy"}]
        }
    }"#;

    async fn store() -> Arc<ContentStore> {
        let mut store = ContentStore::new();
        let _ = store.initialize(&JsonCatalog::new("test", CATALOG)).await.unwrap();
        Arc::new(store)
    }

    fn options() -> DeliveryOptions {
        DeliveryOptions {
            seed: Some(7),
            ..DeliveryOptions::default()
        }
    }

    async fn orchestrator_with(ctx: BrowserContext, options: DeliveryOptions) -> DeliveryOrchestrator {
        DeliveryOrchestrator::new(
            store().await,
            Arc::new(StaticContextProvider::new(ctx)),
            Arc::new(Deadpan),
            options,
        )
    }

    fn forty_two() -> Rule {
        Rule::new(
            "EE-001",
            "42-tabs",
            100,
            ConditionSet {
                tab_count: Some(NumericSpec::Exact(42)),
                ..ConditionSet::default()
            },
        )
    }

    #[tokio::test]
    async fn rule_match_delivers_easter_egg() {
        let orch = orchestrator_with(BrowserContext::with_tabs(42), options()).await;
        orch.register_rule(forty_two()).unwrap();

        let result = orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.unwrap();
        assert!(result.delivered);
        assert!(result.is_rule_match);
        assert_eq!(result.text.as_deref(), Some("The answer to everything."));
        assert_eq!(orch.stats().rule_matches, 1);
    }

    #[tokio::test]
    async fn no_rules_falls_back_to_trigger_content() {
        let (logs, _guard) = capture_logs();
        let orch = orchestrator_with(BrowserContext::with_tabs(5), options()).await;

        let result = orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.unwrap();
        assert!(result.delivered);
        assert!(!result.is_rule_match);
        assert_eq!(result.text.as_deref(), Some("Another tab. Bold move."));
        assert!(logs.has_event(tracing::Level::DEBUG, "no rules registered"));
    }

    #[tokio::test]
    async fn matched_rule_without_content_at_level_falls_through() {
        let orch = orchestrator_with(BrowserContext::with_tabs(3), options()).await;
        orch.register_rule(Rule::new(
            "EE-spicy",
            "spicy-only",
            1,
            ConditionSet {
                tab_count: Some(NumericSpec::at_least(1)),
                ..ConditionSet::default()
            },
        ))
        .unwrap();

        let result = orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.unwrap();
        assert!(!result.is_rule_match);
        assert_eq!(result.text.as_deref(), Some("Another tab. Bold move."));
    }

    #[tokio::test]
    async fn level_override_unlocks_spicier_content() {
        let orch = orchestrator_with(
            BrowserContext::with_tabs(3),
            DeliveryOptions {
                level_override: Some(HumorLevel::Spicy),
                ..options()
            },
        )
        .await;
        let result = orch.deliver(&Trigger::now(TriggerType::Idle)).await.unwrap();
        assert_eq!(result.text.as_deref(), Some("Staring contest lost."));
        assert_eq!(orch.level(), HumorLevel::Spicy);
    }

    #[tokio::test]
    async fn nothing_at_level_is_no_content() {
        let orch = orchestrator_with(BrowserContext::with_tabs(3), options()).await;
        let err = orch.deliver(&Trigger::now(TriggerType::Idle)).await.unwrap_err();
        assert_matches!(err, DeliveryError::NoContentAvailable { trigger: TriggerType::Idle });
        assert!(err.is_expected());
        assert_eq!(orch.stats().no_content, 1);
    }

    #[tokio::test]
    async fn personality_swap_changes_level() {
        let orch = orchestrator_with(BrowserContext::with_tabs(3), options()).await;
        assert_eq!(orch.level(), HumorLevel::Mild);
        orch.set_personality(Arc::new(Snarky));
        assert_eq!(orch.level(), HumorLevel::Spicy);
        let result = orch.deliver(&Trigger::now(TriggerType::Idle)).await.unwrap();
        assert_eq!(result.text.as_deref(), Some("Staring contest lost."));
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_window_blocks_then_releases() {
        let orch = orchestrator_with(BrowserContext::with_tabs(3), options()).await;
        let _ = orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.unwrap();

        tokio::time::advance(Duration::from_millis(50)).await;
        let err = orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.unwrap_err();
        assert_matches!(err, DeliveryError::Throttled { elapsed_ms: 50, window_ms: 100 });

        tokio::time::advance(Duration::from_millis(50)).await;
        assert!(orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.is_ok());
        assert_eq!(orch.stats().throttled, 1);
        assert_eq!(orch.stats().delivered, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn no_content_does_not_start_throttle() {
        let orch = orchestrator_with(BrowserContext::with_tabs(3), options()).await;
        assert!(orch.deliver(&Trigger::now(TriggerType::Idle)).await.is_err());
        assert!(orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_throttle() {
        let orch = orchestrator_with(BrowserContext::with_tabs(3), options()).await;
        let _ = orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.unwrap();
        orch.reset().await;
        assert!(orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.is_ok());
    }

    #[tokio::test]
    async fn disabled_never_delivers() {
        let orch = orchestrator_with(
            BrowserContext::with_tabs(3),
            DeliveryOptions {
                enabled: false,
                ..options()
            },
        )
        .await;
        let result = orch.deliver_quietly(&Trigger::now(TriggerType::TabOpened)).await;
        assert!(!result.delivered);
        assert_eq!(result.channel, DeliveryChannel::None);
        assert_eq!(result.reason.as_deref(), Some("deliveries are disabled"));
    }

    #[tokio::test]
    async fn store_not_ready_surfaces() {
        let orch = DeliveryOrchestrator::new(
            Arc::new(ContentStore::new()),
            Arc::new(StaticContextProvider::new(BrowserContext::with_tabs(1))),
            Arc::new(Deadpan),
            options(),
        );
        let err = orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.unwrap_err();
        assert_matches!(err, DeliveryError::Store(StoreError::NotReady));
        assert!(!err.is_expected());
        assert_eq!(orch.stats().failed, 1);
    }

    #[tokio::test]
    async fn provider_failure_is_quietly_reported() {
        struct Offline;

        #[async_trait]
        impl ContextProvider for Offline {
            async fn snapshot(&self) -> Result<BrowserContext, ProviderError> {
                Err(ProviderError::Unavailable("no browser".into()))
            }
        }

        let (logs, _guard) = capture_logs();
        let orch = DeliveryOrchestrator::new(store().await, Arc::new(Offline), Arc::new(Deadpan), options());
        let result = orch.deliver_quietly(&Trigger::now(TriggerType::TabOpened)).await;
        assert!(!result.delivered);
        assert!(result.reason.unwrap().contains("no browser"));
        assert!(logs.has_event(tracing::Level::WARN, "delivery failed"));
        assert_eq!(orch.phase(), DeliveryPhase::Idle);
    }

    #[tokio::test]
    async fn subscriber_receives_notification_on_primary() {
        let orch = orchestrator_with(BrowserContext::with_tabs(42), options()).await;
        orch.register_rule(forty_two()).unwrap();
        let mut rx = orch.subscribe();

        let result = orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.unwrap();
        assert_eq!(result.channel, DeliveryChannel::Primary);

        let note = rx.recv().await.unwrap();
        assert_eq!(note.text, "The answer to everything.");
        assert_eq!(note.rule_id.as_deref(), Some("EE-001"));
        assert_eq!(note.trigger_type, TriggerType::TabOpened);
        assert_eq!(note.display_duration_ms, 4000);
    }

    struct RecordingSink {
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn dispatch(&self, notification: &Notification) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError {
                    sink: "recording".into(),
                    message: "offline".into(),
                });
            }
            self.seen.lock().push(notification.text.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn secondary_sink_used_without_subscribers() {
        let sink = Arc::new(RecordingSink {
            seen: Mutex::new(Vec::new()),
            fail: false,
        });
        let orch = orchestrator_with(BrowserContext::with_tabs(3), options())
            .await
            .with_secondary_sink(sink.clone());

        let result = orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.unwrap();
        assert_eq!(result.channel, DeliveryChannel::Secondary);
        assert_eq!(sink.seen.lock().as_slice(), ["Another tab. Bold move."]);
    }

    #[tokio::test]
    async fn failing_sink_reports_primary() {
        let sink = Arc::new(RecordingSink {
            seen: Mutex::new(Vec::new()),
            fail: true,
        });
        let orch = orchestrator_with(BrowserContext::with_tabs(3), options())
            .await
            .with_secondary_sink(sink);

        let result = orch.deliver(&Trigger::now(TriggerType::TabOpened)).await.unwrap();
        assert!(result.delivered);
        assert_eq!(result.channel, DeliveryChannel::Primary);
    }

    #[tokio::test]
    async fn rule_management() {
        let orch = orchestrator_with(BrowserContext::with_tabs(3), options()).await;
        orch.register_rule(forty_two()).unwrap();
        assert_matches!(orch.register_rule(forty_two()), Err(RuleError::DuplicateId { .. }));
        assert_eq!(orch.rules().len(), 1);
        assert!(orch.unregister_rule("EE-001"));
        assert!(orch.register_rules([forty_two()]).is_empty());
        orch.clear_rules();
        assert!(orch.rules().is_empty());
    }

    #[test]
    fn options_follow_settings() {
        let mut settings = JesterSettings::default();
        settings.delivery.throttle_ms = 250;
        settings.personality.level = Some(HumorLevel::Medium);
        let opts = DeliveryOptions::from_settings(&settings);
        assert_eq!(opts.throttle, Duration::from_millis(250));
        assert_eq!(opts.level_override, Some(HumorLevel::Medium));
        assert_eq!(opts.cache_ttl, Duration::from_millis(500));
    }

    #[test]
    fn phase_display() {
        assert_eq!(DeliveryPhase::Throttled.to_string(), "throttled");
        assert_eq!(DeliveryPhase::default(), DeliveryPhase::Idle);
    }
}
