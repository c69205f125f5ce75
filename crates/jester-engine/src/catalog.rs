//! Catalog sources, parsing, and validation.
//!
//! A catalog is a JSON document with three sections:
//!
//! ```json
//! {
//!   "quips":      { "TabOpened": [ {"id": "q1", "text": "...", "level": "mild"} ] },
//!   "easterEggs": { "42-tabs":   [ {"id": "e1", "texts": ["..."]} ] },
//!   "rules":      [ {"id": "EE-001", "type": "42-tabs", "priority": 10,
//!                    "conditions": {"tabCount": 42}} ]
//! }
//! ```
//!
//! Parsing is lenient per entry: a malformed entry becomes a [`Violation`]
//! and is dropped while the rest of the catalog loads. Only an unreadable
//! document or a catalog with no usable entry is a [`LoadError`].

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use async_trait::async_trait;
use jester_core::content::{ContentEntry, HumorLevel, MAX_TEXT_CHARS, MIN_TEXT_CHARS};
use jester_core::trigger::TriggerType;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{LoadError, Violation};
use crate::rules::Rule;

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

/// Where catalog JSON comes from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Read the raw catalog document.
    async fn read(&self) -> Result<String, LoadError>;
}

/// Catalog held in memory.
#[derive(Clone, Debug)]
pub struct JsonCatalog {
    name: String,
    json: String,
}

impl JsonCatalog {
    /// Wrap a JSON document.
    pub fn new(name: impl Into<String>, json: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            json: json.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for JsonCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<String, LoadError> {
        Ok(self.json.clone())
    }
}

/// Catalog read from disk on each load.
#[derive(Clone, Debug)]
pub struct FileCatalog {
    path: PathBuf,
    name: String,
}

impl FileCatalog {
    /// Catalog at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<String, LoadError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|error| LoadError::Io {
                source_name: self.name.clone(),
                error,
            })
    }
}

/// The catalog compiled into the crate.
pub fn builtin_catalog() -> JsonCatalog {
    JsonCatalog::new("builtin", BUILTIN_CATALOG)
}

/// Validated catalog contents.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    /// Regular quips. Each lists the triggers it applies to.
    pub quips: Vec<ContentEntry>,
    /// Easter-egg entries. Each carries its rule type.
    pub easter_eggs: Vec<ContentEntry>,
    /// Rule definitions.
    pub rules: Vec<Rule>,
}

impl Catalog {
    fn entry_count(&self) -> usize {
        self.quips.len() + self.easter_eggs.len() + self.rules.len()
    }
}

/// A parsed catalog and the entries that were dropped from it.
#[derive(Clone, Debug)]
pub struct ParsedCatalog {
    /// Valid entries.
    pub catalog: Catalog,
    /// Every problem found, in document order.
    pub violations: Vec<Violation>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawCatalog {
    #[serde(default)]
    quips: BTreeMap<String, Vec<Value>>,
    #[serde(default)]
    easter_eggs: BTreeMap<String, Vec<Value>>,
    #[serde(default)]
    rules: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    id: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    texts: Option<Vec<String>>,
    #[serde(default)]
    level: HumorLevel,
    /// Triggers beyond the section key the quip is filed under.
    #[serde(default)]
    triggers: Vec<TriggerType>,
    #[serde(default)]
    metadata: Option<Value>,
}

/// Parse and validate a catalog document.
pub fn parse_catalog(json: &str) -> Result<ParsedCatalog, LoadError> {
    let raw: RawCatalog = serde_json::from_str(json)?;
    let mut validator = Validator::default();
    let mut catalog = Catalog::default();

    for (key, entries) in raw.quips {
        let trigger = key.parse::<TriggerType>().ok();
        for (index, value) in entries.into_iter().enumerate() {
            let path = format!("quips.{key}[{index}]");
            let Some(trigger) = trigger else {
                validator.reject(&path, format!("unknown trigger type '{key}'"));
                continue;
            };
            if let Some(mut entry) = validator.entry(&path, value) {
                if !entry.triggers.contains(&trigger) {
                    entry.triggers.insert(0, trigger);
                }
                catalog.quips.push(entry);
            }
        }
    }

    for (rule_type, entries) in raw.easter_eggs {
        for (index, value) in entries.into_iter().enumerate() {
            let path = format!("easterEggs.{rule_type}[{index}]");
            if let Some(mut entry) = validator.entry(&path, value) {
                if !entry.triggers.is_empty() {
                    validator.reject(&path, "easter-egg entries cannot list triggers");
                    continue;
                }
                entry.rule_type = Some(rule_type.clone());
                catalog.easter_eggs.push(entry);
            }
        }
    }

    let mut rule_ids = HashSet::new();
    for (index, value) in raw.rules.into_iter().enumerate() {
        let path = format!("rules[{index}]");
        let rule: Rule = match serde_json::from_value(value) {
            Ok(rule) => rule,
            Err(e) => {
                validator.reject(&path, e.to_string());
                continue;
            }
        };
        if let Err(e) = rule.validate() {
            validator.reject(&path, e.to_string());
            continue;
        }
        if !rule_ids.insert(rule.id.clone()) {
            validator.reject(&path, format!("duplicate rule id '{}'", rule.id));
            continue;
        }
        catalog.rules.push(rule);
    }

    if catalog.entry_count() == 0 {
        if validator.violations.is_empty() {
            validator.reject("$", "catalog contains no entries");
        }
        return Err(LoadError::Invalid {
            violations: validator.violations,
        });
    }

    Ok(ParsedCatalog {
        catalog,
        violations: validator.violations,
    })
}

#[derive(Default)]
struct Validator {
    violations: Vec<Violation>,
    seen_ids: HashSet<String>,
}

impl Validator {
    fn reject(&mut self, path: &str, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    /// Validate one content entry, recording every problem found in it.
    fn entry(&mut self, path: &str, value: Value) -> Option<ContentEntry> {
        let raw: RawEntry = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                self.reject(path, e.to_string());
                return None;
            }
        };

        let before = self.violations.len();
        if raw.id.trim().is_empty() {
            self.reject(&format!("{path}.id"), "id must not be empty");
        } else if self.seen_ids.contains(&raw.id) {
            self.reject(&format!("{path}.id"), format!("duplicate content id '{}'", raw.id));
        }

        let texts = match (raw.text, raw.texts) {
            (Some(text), None) => vec![text],
            (None, Some(texts)) if !texts.is_empty() => texts,
            (None, Some(_)) => {
                self.reject(&format!("{path}.texts"), "texts must not be empty");
                Vec::new()
            }
            (Some(_), Some(_)) => {
                self.reject(path, "entry has both 'text' and 'texts'");
                Vec::new()
            }
            (None, None) => {
                self.reject(path, "entry has neither 'text' nor 'texts'");
                Vec::new()
            }
        };
        for (i, text) in texts.iter().enumerate() {
            let chars = text.trim().chars().count();
            if !(MIN_TEXT_CHARS..=MAX_TEXT_CHARS).contains(&chars) {
                self.reject(
                    &format!("{path}.texts[{i}]"),
                    format!("text length {chars} outside {MIN_TEXT_CHARS}..={MAX_TEXT_CHARS}"),
                );
            }
        }

        if self.violations.len() > before {
            return None;
        }
        let _ = self.seen_ids.insert(raw.id.clone());
        Some(ContentEntry {
            id: raw.id,
            texts,
            triggers: raw.triggers,
            rule_type: None,
            level: raw.level,
            metadata: raw.metadata,
        })
    }
}
