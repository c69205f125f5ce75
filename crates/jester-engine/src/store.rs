//! In-memory content store.
//!
//! Loaded once from a [`CatalogSource`] and read-only afterwards. Queries
//! filter by trigger or rule type and by humor level.

use std::collections::HashMap;

use jester_core::content::{ContentEntry, HumorLevel};
use jester_core::trigger::TriggerType;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{CatalogSource, parse_catalog};
use crate::errors::{LoadError, StoreError, Violation};
use crate::rules::Rule;

/// Summary of a successful load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    /// Regular quips loaded.
    pub quips: usize,
    /// Easter-egg entries loaded.
    pub easter_eggs: usize,
    /// Rule definitions loaded.
    pub rules: usize,
    /// Entries dropped for failing validation.
    pub dropped: Vec<Violation>,
}

#[derive(Debug, Default)]
struct Indexed {
    /// Every regular quip, catalog order.
    quips: Vec<ContentEntry>,
    /// Indices into `quips` per trigger.
    by_trigger: HashMap<TriggerType, Vec<usize>>,
    by_rule_type: HashMap<String, Vec<ContentEntry>>,
    rules: Vec<Rule>,
}

/// Validated catalog content, served from memory.
#[derive(Debug, Default)]
pub struct ContentStore {
    content: Option<Indexed>,
}

impl ContentStore {
    /// Create an empty, uninitialized store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and index a catalog.
    ///
    /// Invalid entries are dropped and logged. On error the store keeps
    /// whatever it held before.
    pub async fn initialize(&mut self, source: &dyn CatalogSource) -> Result<LoadReport, LoadError> {
        let json = source.read().await?;
        let parsed = parse_catalog(&json).inspect_err(|error| {
            warn!(source = source.name(), %error, "catalog load failed");
        })?;

        for violation in &parsed.violations {
            warn!(source = source.name(), path = %violation.path, message = %violation.message, "dropping invalid catalog entry");
        }

        let catalog = parsed.catalog;
        let mut by_trigger: HashMap<TriggerType, Vec<usize>> = HashMap::new();
        for (index, quip) in catalog.quips.iter().enumerate() {
            for trigger in &quip.triggers {
                by_trigger.entry(*trigger).or_default().push(index);
            }
        }
        let mut by_rule_type: HashMap<String, Vec<ContentEntry>> = HashMap::new();
        for egg in &catalog.easter_eggs {
            if let Some(rule_type) = &egg.rule_type {
                by_rule_type.entry(rule_type.clone()).or_default().push(egg.clone());
            }
        }

        let report = LoadReport {
            quips: catalog.quips.len(),
            easter_eggs: catalog.easter_eggs.len(),
            rules: catalog.rules.len(),
            dropped: parsed.violations,
        };
        info!(
            source = source.name(),
            quips = report.quips,
            easter_eggs = report.easter_eggs,
            rules = report.rules,
            dropped = report.dropped.len(),
            "catalog loaded"
        );

        self.content = Some(Indexed {
            quips: catalog.quips,
            by_trigger,
            by_rule_type,
            rules: catalog.rules,
        });
        Ok(report)
    }

    /// Whether a catalog has been loaded.
    pub fn is_ready(&self) -> bool {
        self.content.is_some()
    }

    fn indexed(&self) -> Result<&Indexed, StoreError> {
        self.content.as_ref().ok_or(StoreError::NotReady)
    }

    /// Regular quips for `trigger` at or below `level`.
    ///
    /// `None` returns every quip at or below `level`.
    pub fn query_by_trigger(
        &self,
        level: HumorLevel,
        trigger: Option<TriggerType>,
    ) -> Result<Vec<ContentEntry>, StoreError> {
        let indexed = self.indexed()?;
        let entries: Vec<&ContentEntry> = match trigger {
            Some(trigger) => indexed
                .by_trigger
                .get(&trigger)
                .map(|ids| ids.iter().map(|&i| &indexed.quips[i]).collect())
                .unwrap_or_default(),
            None => indexed.quips.iter().collect(),
        };
        Ok(entries
            .into_iter()
            .filter(|e| e.allowed_at(level))
            .cloned()
            .collect())
    }

    /// Easter-egg entries for `rule_type` at or below `level`.
    pub fn query_by_rule_type(
        &self,
        rule_type: &str,
        level: HumorLevel,
    ) -> Result<Vec<ContentEntry>, StoreError> {
        let indexed = self.indexed()?;
        Ok(indexed
            .by_rule_type
            .get(rule_type)
            .map(|entries| entries.iter().filter(|e| e.allowed_at(level)).cloned().collect())
            .unwrap_or_default())
    }

    /// Trigger kinds with at least one quip, in declaration order.
    pub fn available_trigger_types(&self) -> Result<Vec<String>, StoreError> {
        let indexed = self.indexed()?;
        Ok(TriggerType::all()
            .iter()
            .filter(|t| indexed.by_trigger.contains_key(*t))
            .map(|t| t.as_str().to_string())
            .collect())
    }

    /// Rule definitions carried by the catalog.
    pub fn rules(&self) -> Result<&[Rule], StoreError> {
        Ok(&self.indexed()?.rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{JsonCatalog, builtin_catalog};
    use assert_matches::assert_matches;
    use jester_core::logging::capture_logs;

    const SMALL: &str = r#"{
        "quips": {
            "TabOpened": [
                {"id": "o-mild", "text": "A mild opening line.", "level": "mild"},
                {"id": "o-spicy", "text": "A spicy opening line.", "level": "spicy"}
            ],
            "Idle": [
                {"id": "i-med", "text": "A medium idle line.", "level": "medium", "triggers": ["WindowFocused"]}
            ]
        },
        "easterEggs": {
            "42-tabs": [
                {"id": "e-mild", "text": "The answer to everything.", "level": "mild"},
                {"id": "e-spicy", "text": "The spicy answer to everything.", "level": "spicy"}
            ]
        },
        "rules": [{"id": "EE-001", "type": "42-tabs", "conditions": {"tabCount": 42}}]
    }"#;

    async fn loaded(json: &str) -> ContentStore {
        let mut store = ContentStore::new();
        let _ = store.initialize(&JsonCatalog::new("test", json)).await.unwrap();
        store
    }

    fn ids(entries: &[ContentEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn queries_before_initialize_fail() {
        let store = ContentStore::new();
        assert!(!store.is_ready());
        assert_matches!(store.query_by_trigger(HumorLevel::Spicy, None), Err(StoreError::NotReady));
        assert_matches!(store.query_by_rule_type("42-tabs", HumorLevel::Mild), Err(StoreError::NotReady));
        assert_matches!(store.available_trigger_types(), Err(StoreError::NotReady));
        assert_matches!(store.rules(), Err(StoreError::NotReady));
    }

    #[tokio::test]
    async fn level_filter_includes_milder_tiers() {
        let store = loaded(SMALL).await;
        let mild = store.query_by_trigger(HumorLevel::Mild, Some(TriggerType::TabOpened)).unwrap();
        assert_eq!(ids(&mild), vec!["o-mild"]);
        let spicy = store.query_by_trigger(HumorLevel::Spicy, Some(TriggerType::TabOpened)).unwrap();
        assert_eq!(ids(&spicy), vec!["o-mild", "o-spicy"]);
    }

    #[tokio::test]
    async fn none_trigger_returns_all_quips() {
        let store = loaded(SMALL).await;
        let all = store.query_by_trigger(HumorLevel::Medium, None).unwrap();
        assert_eq!(ids(&all), vec!["i-med", "o-mild"]);
    }

    #[tokio::test]
    async fn extra_triggers_are_indexed() {
        let store = loaded(SMALL).await;
        let focused = store.query_by_trigger(HumorLevel::Spicy, Some(TriggerType::WindowFocused)).unwrap();
        assert_eq!(ids(&focused), vec!["i-med"]);
        assert!(store.query_by_trigger(HumorLevel::Spicy, Some(TriggerType::GroupRemoved)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn rule_type_query() {
        let store = loaded(SMALL).await;
        assert_eq!(ids(&store.query_by_rule_type("42-tabs", HumorLevel::Mild).unwrap()), vec!["e-mild"]);
        assert_eq!(store.query_by_rule_type("42-tabs", HumorLevel::Spicy).unwrap().len(), 2);
        assert!(store.query_by_rule_type("unknown", HumorLevel::Spicy).unwrap().is_empty());
    }

    #[tokio::test]
    async fn available_triggers_in_declaration_order() {
        let store = loaded(SMALL).await;
        assert_eq!(
            store.available_trigger_types().unwrap(),
            vec!["TabOpened", "WindowFocused", "Idle"]
        );
    }

    #[tokio::test]
    async fn rules_come_from_catalog() {
        let store = loaded(SMALL).await;
        let rules = store.rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_type, "42-tabs");
    }

    #[tokio::test]
    async fn partial_catalog_degrades_gracefully() {
        let (logs, _guard) = capture_logs();
        let mut store = ContentStore::new();
        let report = store
            .initialize(&JsonCatalog::new(
                "partial",
                r#"{"quips": {"Idle": [
                    {"id": "good", "text": "Still there? Hello?"},
                    {"id": "bad", "text": "short"}
                ]}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(report.quips, 1);
        assert_eq!(report.dropped.len(), 1);
        assert!(store.is_ready());
        assert!(logs.has_event(tracing::Level::WARN, "dropping invalid catalog entry"));
    }

    #[tokio::test]
    async fn failed_load_keeps_store_unready() {
        let mut store = ContentStore::new();
        let err = store
            .initialize(&JsonCatalog::new("broken", "not json"))
            .await
            .unwrap_err();
        assert_matches!(err, LoadError::Parse(_));
        assert!(!store.is_ready());
    }

    #[tokio::test]
    async fn builtin_catalog_loads() {
        let mut store = ContentStore::new();
        let report = store.initialize(&builtin_catalog()).await.unwrap();
        assert!(report.dropped.is_empty());
        assert_eq!(store.available_trigger_types().unwrap().len(), TriggerType::all().len());
        assert_eq!(store.query_by_rule_type("42-tabs", HumorLevel::Mild).unwrap().len(), 1);
    }
}
