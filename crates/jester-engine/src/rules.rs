//! Easter-egg rule registry.
//!
//! Rules are kept sorted by priority (descending). Ties keep registration
//! order. Matching walks that order and returns the first rule whose
//! conditions all hold.

use std::collections::{HashMap, HashSet};

use jester_core::context::BrowserContext;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conditions::{ConditionSet, compile_domain_pattern, evaluate_compiled};
use crate::errors::RuleError;

/// A named set of conditions that unlocks special content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Unique rule ID, e.g. `EE-001`.
    pub id: String,
    /// Content key for the rule's messages, e.g. `42-tabs`.
    #[serde(rename = "type")]
    pub rule_type: String,
    /// Higher runs first.
    #[serde(default)]
    pub priority: i32,
    /// Predicates that must all hold.
    pub conditions: ConditionSet,
    /// Free-form data carried through to the match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Rule {
    /// Create a rule with no metadata.
    pub fn new(
        id: impl Into<String>,
        rule_type: impl Into<String>,
        priority: i32,
        conditions: ConditionSet,
    ) -> Self {
        Self {
            id: id.into(),
            rule_type: rule_type.into(),
            priority,
            conditions,
            metadata: None,
        }
    }

    /// Reject rules that can never be evaluated meaningfully.
    pub fn validate(&self) -> Result<(), RuleError> {
        self.compile_domain().map(|_| ())
    }

    /// Validate, then compile the domain pattern if there is one.
    fn compile_domain(&self) -> Result<Option<Regex>, RuleError> {
        if self.conditions.is_empty() {
            return Err(RuleError::EmptyConditions {
                rule_id: self.id.clone(),
            });
        }
        let invalid = |message: String| RuleError::InvalidConditions {
            rule_id: self.id.clone(),
            message,
        };
        self.conditions.validate().map_err(invalid)?;
        self.conditions
            .domain_pattern
            .as_deref()
            .map(compile_domain_pattern)
            .transpose()
            .map_err(|e| invalid(e.to_string()))
    }
}

/// The winning rule for a context.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    /// Matched rule ID.
    pub rule_id: String,
    /// Content key to look up.
    pub rule_type: String,
    /// Predicates that passed.
    pub matched_conditions: Vec<&'static str>,
    /// Rule priority.
    pub priority: i32,
    /// Rule metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Priority-ordered collection of [`Rule`]s.
#[derive(Default)]
pub struct RuleRegistry {
    /// Sorted by priority descending, stable within a priority.
    rules: Vec<Rule>,
    ids: HashSet<String>,
    /// Compiled domain patterns by rule ID.
    patterns: HashMap<String, Regex>,
}

impl RuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule.
    ///
    /// Fails without modifying the registry if the ID is taken or the
    /// conditions are empty or invalid.
    pub fn register(&mut self, rule: Rule) -> Result<(), RuleError> {
        if self.ids.contains(&rule.id) {
            return Err(RuleError::DuplicateId { rule_id: rule.id });
        }
        let pattern = rule.compile_domain()?;

        debug!(rule_id = %rule.id, rule_type = %rule.rule_type, priority = rule.priority, "registering rule");
        let _ = self.ids.insert(rule.id.clone());
        if let Some(regex) = pattern {
            let _ = self.patterns.insert(rule.id.clone(), regex);
        }
        self.rules.push(rule);
        self.rules.sort_by_key(|r| std::cmp::Reverse(r.priority));
        Ok(())
    }

    /// Register several rules, returning the failures.
    ///
    /// A rejected rule does not stop the ones after it.
    pub fn register_all(&mut self, rules: impl IntoIterator<Item = Rule>) -> Vec<RuleError> {
        rules
            .into_iter()
            .filter_map(|rule| self.register(rule).err())
            .collect()
    }

    /// Remove a rule by ID. Returns `true` if it existed.
    pub fn unregister(&mut self, rule_id: &str) -> bool {
        if !self.ids.remove(rule_id) {
            return false;
        }
        self.rules.retain(|r| r.id != rule_id);
        let _ = self.patterns.remove(rule_id);
        debug!(rule_id, "unregistered rule");
        true
    }

    /// Look up a rule by ID.
    #[must_use]
    pub fn get(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    /// All rules in evaluation order.
    #[must_use]
    pub fn all(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Remove every rule.
    pub fn clear(&mut self) {
        self.rules.clear();
        self.ids.clear();
        self.patterns.clear();
    }

    /// Find the highest-priority rule satisfied by `ctx`.
    ///
    /// Returns [`RuleError::NoRulesRegistered`] on an empty registry so
    /// callers can tell "nothing to check" from "nothing matched". Domain
    /// patterns compiled at registration are reused; a rule whose conditions
    /// still fail to evaluate is logged and skipped.
    pub fn match_context(&self, ctx: &BrowserContext) -> Result<Option<RuleMatch>, RuleError> {
        if self.rules.is_empty() {
            return Err(RuleError::NoRulesRegistered);
        }

        for rule in &self.rules {
            match evaluate_compiled(ctx, &rule.conditions, self.patterns.get(&rule.id)) {
                Ok(outcome) if outcome.satisfied => {
                    debug!(rule_id = %rule.id, matched = ?outcome.matched, "rule matched");
                    return Ok(Some(RuleMatch {
                        rule_id: rule.id.clone(),
                        rule_type: rule.rule_type.clone(),
                        matched_conditions: outcome.matched,
                        priority: rule.priority,
                        metadata: rule.metadata.clone(),
                    }));
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(rule_id = %rule.id, %error, "skipping rule with unusable conditions");
                }
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rule_count", &self.len())
            .finish()
    }
}
