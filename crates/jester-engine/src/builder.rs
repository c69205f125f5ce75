//! One-stop construction of a ready [`DeliveryOrchestrator`].

use std::sync::Arc;

use jester_core::context::ContextProvider;
use jester_settings::JesterSettings;
use tracing::{info, warn};

use crate::catalog::{CatalogSource, FileCatalog, builtin_catalog};
use crate::emitter::NotificationSink;
use crate::errors::BuildError;
use crate::orchestrator::{DeliveryOptions, DeliveryOrchestrator};
use crate::personality::{Personality, personality_by_name};
use crate::rules::Rule;
use crate::store::ContentStore;

/// Builder for [`DeliveryOrchestrator`].
///
/// Only the context provider is required. The catalog defaults to
/// `catalog.path` from settings, or the bundled catalog when unset; the
/// personality defaults to `personality.name`.
pub struct JesterBuilder {
    settings: JesterSettings,
    provider: Option<Arc<dyn ContextProvider>>,
    catalog: Option<Box<dyn CatalogSource>>,
    sink: Option<Arc<dyn NotificationSink>>,
    personality: Option<Arc<dyn Personality>>,
    rules: Vec<Rule>,
}

impl JesterBuilder {
    /// Start from `settings`.
    pub fn new(settings: JesterSettings) -> Self {
        Self {
            settings,
            provider: None,
            catalog: None,
            sink: None,
            personality: None,
            rules: Vec::new(),
        }
    }

    /// Browser state source.
    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Catalog source, overriding settings.
    #[must_use]
    pub fn catalog(mut self, source: impl CatalogSource + 'static) -> Self {
        self.catalog = Some(Box::new(source));
        self
    }

    /// Secondary notification sink.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Personality, overriding settings.
    #[must_use]
    pub fn personality(mut self, personality: Arc<dyn Personality>) -> Self {
        self.personality = Some(personality);
        self
    }

    /// Extra rule registered after the catalog's own.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Load the catalog, register rules, and assemble the orchestrator.
    ///
    /// Rejected rules are logged and skipped. A catalog that cannot be
    /// loaded at all fails the build.
    pub async fn build(self) -> Result<DeliveryOrchestrator, BuildError> {
        let provider = self.provider.ok_or(BuildError::MissingProvider)?;

        let source: Box<dyn CatalogSource> = match (self.catalog, &self.settings.catalog.path) {
            (Some(source), _) => source,
            (None, Some(path)) => Box::new(FileCatalog::new(path)),
            (None, None) => Box::new(builtin_catalog()),
        };

        let mut store = ContentStore::new();
        let report = store.initialize(source.as_ref()).await?;
        if !report.dropped.is_empty() {
            warn!(
                source = source.name(),
                dropped = report.dropped.len(),
                "catalog loaded with invalid entries"
            );
        }
        let catalog_rules = store.rules().map(<[Rule]>::to_vec).unwrap_or_default();

        let personality = self
            .personality
            .unwrap_or_else(|| personality_by_name(&self.settings.personality.name));

        let options = DeliveryOptions::from_settings(&self.settings);
        let mut orchestrator =
            DeliveryOrchestrator::new(Arc::new(store), provider, personality, options);
        if let Some(sink) = self.sink {
            orchestrator = orchestrator.with_secondary_sink(sink);
        }

        for error in orchestrator.register_rules(catalog_rules.into_iter().chain(self.rules)) {
            warn!(%error, "dropping rule");
        }

        info!(
            source = source.name(),
            rules = orchestrator.rules().len(),
            personality = orchestrator.personality().name(),
            level = %orchestrator.level(),
            "jester ready"
        );
        Ok(orchestrator)
    }
}

impl std::fmt::Debug for JesterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JesterBuilder")
            .field("has_provider", &self.provider.is_some())
            .field("has_catalog", &self.catalog.is_some())
            .field("has_sink", &self.sink.is_some())
            .field("extra_rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}
