//! Condition evaluation.
//!
//! A [`ConditionSet`] is a bag of optional predicates that must ALL hold for a
//! rule to match. Evaluation is pure: no I/O and no shared state. Each present
//! predicate that passes is reported by name in [`ConditionOutcome::matched`]
//! so callers can log why a rule fired.

use jester_core::context::BrowserContext;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ConditionError;

/// Inclusive numeric range. Either bound may be omitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumericRange {
    /// Lower bound, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    /// Upper bound, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

/// A numeric predicate: an exact value or a range.
///
/// Deserializes from either `42` or `{"min": 40, "max": 50}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericSpec {
    /// Matches only this value.
    Exact(u32),
    /// Matches values within the range.
    Range(NumericRange),
}

impl NumericSpec {
    /// Range with both bounds.
    pub fn between(min: u32, max: u32) -> Self {
        Self::Range(NumericRange {
            min: Some(min),
            max: Some(max),
        })
    }

    /// Range with only a lower bound.
    pub fn at_least(min: u32) -> Self {
        Self::Range(NumericRange {
            min: Some(min),
            max: None,
        })
    }

    /// Range with only an upper bound.
    pub fn at_most(max: u32) -> Self {
        Self::Range(NumericRange {
            min: None,
            max: Some(max),
        })
    }
}

/// Inclusive hour-of-day window. `start > end` spans midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    /// First hour, `0..=23`.
    pub start: u8,
    /// Last hour, `0..=23`.
    pub end: u8,
}

/// AND-combined predicates for an easter-egg rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConditionSet {
    /// Number of open tabs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_count: Option<NumericSpec>,
    /// Number of tab groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_count: Option<NumericSpec>,
    /// Regex tested against the active tab's domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_pattern: Option<String>,
    /// Case-insensitive substring of the active tab's title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_contains: Option<String>,
    /// Local hour window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour_range: Option<HourRange>,
    /// Event name that must appear among the recent events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_event: Option<String>,
    /// Named custom predicates. Reserved: accepted but never evaluated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<String>,
}

impl ConditionSet {
    /// Whether no evaluable predicate is present.
    ///
    /// Custom predicates do not count: they are never evaluated, so a set
    /// holding only those would match every context.
    pub fn is_empty(&self) -> bool {
        self.tab_count.is_none()
            && self.group_count.is_none()
            && self.domain_pattern.is_none()
            && self.title_contains.is_none()
            && self.hour_range.is_none()
            && self.recent_event.is_none()
    }

    /// Check ranges that can never be satisfied and text predicates that
    /// would match every tab.
    pub fn validate(&self) -> Result<(), String> {
        for (name, spec) in [("tabCount", self.tab_count), ("groupCount", self.group_count)] {
            if let Some(NumericSpec::Range(NumericRange {
                min: Some(min),
                max: Some(max),
            })) = spec
            {
                if min > max {
                    return Err(format!("{name} range min {min} exceeds max {max}"));
                }
            }
        }
        if self.domain_pattern.as_deref().is_some_and(str::is_empty) {
            return Err("domainPattern is empty".into());
        }
        if self
            .title_contains
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            return Err("titleContains is empty".into());
        }
        if let Some(range) = self.hour_range {
            if range.start > 23 || range.end > 23 {
                return Err(format!(
                    "hourRange {}..{} outside 0..=23",
                    range.start, range.end
                ));
            }
        }
        Ok(())
    }
}

/// Result of evaluating a [`ConditionSet`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionOutcome {
    /// Whether every present predicate passed.
    pub satisfied: bool,
    /// Names of present predicates that passed.
    pub matched: Vec<&'static str>,
}

/// Exact or inclusive-range comparison.
pub fn evaluate_numeric(actual: u32, spec: &NumericSpec) -> bool {
    match spec {
        NumericSpec::Exact(expected) => actual == *expected,
        NumericSpec::Range(NumericRange { min, max }) => {
            min.is_none_or(|min| actual >= min) && max.is_none_or(|max| actual <= max)
        }
    }
}

/// Inclusive hour window with wraparound across midnight.
pub fn evaluate_hour_range(hour: u8, range: &HourRange) -> bool {
    if range.start <= range.end {
        range.start <= hour && hour <= range.end
    } else {
        hour >= range.start || hour <= range.end
    }
}

/// Compile a domain pattern.
pub fn compile_domain_pattern(pattern: &str) -> Result<Regex, ConditionError> {
    Regex::new(pattern).map_err(|e| ConditionError::InvalidPattern {
        pattern: pattern.to_owned(),
        message: e.to_string(),
    })
}

/// Test an already-compiled pattern. No active tab never matches.
pub fn matches_domain(domain: Option<&str>, regex: &Regex) -> bool {
    domain.is_some_and(|d| regex.is_match(d))
}

/// Regex test against the active tab's domain, compiling `pattern` first.
/// No active tab never matches.
pub fn evaluate_domain(domain: Option<&str>, pattern: &str) -> Result<bool, ConditionError> {
    Ok(matches_domain(domain, &compile_domain_pattern(pattern)?))
}

/// Case-insensitive substring test. No active tab never matches.
pub fn evaluate_title_contains(title: Option<&str>, needle: &str) -> bool {
    title.is_some_and(|t| t.to_lowercase().contains(&needle.to_lowercase()))
}

/// Whether `name` is among the recent events.
pub fn evaluate_recent_event(events: &[String], name: &str) -> bool {
    events.iter().any(|e| e == name)
}

/// Evaluate every present predicate against the context.
///
/// All predicates are evaluated (no short-circuit) so `matched` is complete.
/// A malformed domain pattern fails the whole set with an error.
pub fn evaluate_all(
    ctx: &BrowserContext,
    conditions: &ConditionSet,
) -> Result<ConditionOutcome, ConditionError> {
    evaluate_compiled(ctx, conditions, None)
}

/// Like [`evaluate_all`], testing the domain against `domain` when given
/// instead of compiling `conditions.domain_pattern`.
pub fn evaluate_compiled(
    ctx: &BrowserContext,
    conditions: &ConditionSet,
    domain: Option<&Regex>,
) -> Result<ConditionOutcome, ConditionError> {
    let mut satisfied = true;
    let mut matched = Vec::new();
    let mut record = |name: &'static str, passed: bool| {
        if passed {
            matched.push(name);
        } else {
            satisfied = false;
        }
    };

    if let Some(spec) = &conditions.tab_count {
        record("tabCount", evaluate_numeric(ctx.tab_count, spec));
    }
    if let Some(spec) = &conditions.group_count {
        record("groupCount", evaluate_numeric(ctx.group_count, spec));
    }
    if let Some(pattern) = &conditions.domain_pattern {
        let passed = match domain {
            Some(regex) => matches_domain(ctx.active_domain(), regex),
            None => evaluate_domain(ctx.active_domain(), pattern)?,
        };
        record("domainPattern", passed);
    }
    if let Some(needle) = &conditions.title_contains {
        record(
            "titleContains",
            evaluate_title_contains(ctx.active_title(), needle),
        );
    }
    if let Some(range) = &conditions.hour_range {
        record("hourRange", evaluate_hour_range(ctx.current_hour, range));
    }
    if let Some(name) = &conditions.recent_event {
        record(
            "recentEvent",
            evaluate_recent_event(&ctx.recent_events, name),
        );
    }

    Ok(ConditionOutcome { satisfied, matched })
}
