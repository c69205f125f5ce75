//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`JesterSettings::default()`]
//! 2. If `~/.jester/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `JESTER_*` environment variable overrides (highest priority)
//! 4. Validate ranges
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use jester_core::content::HumorLevel;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::JesterSettings;

/// Resolve the path to the settings file (`~/.jester/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".jester").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<JesterSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or out-of-range values are
/// errors.
pub fn load_settings_from_path(path: &Path) -> Result<JesterSettings> {
    load_with_env(path, |key| std::env::var(key).ok())
}

/// Load settings from `path`, reading overrides through `env`.
pub fn load_with_env<F>(path: &Path, env: F) -> Result<JesterSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(JesterSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: JesterSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, env);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `JESTER_*` overrides.
///
/// Invalid values are ignored with a warning and the file/default value is
/// kept.
pub fn apply_env_overrides<F>(settings: &mut JesterSettings, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| env(key).filter(|v| !v.is_empty());

    if let Some(v) = read("JESTER_ENABLED") {
        match parse_bool(&v) {
            Some(b) => settings.delivery.enabled = b,
            None => warn!(key = "JESTER_ENABLED", value = %v, "invalid boolean env var, ignoring"),
        }
    }
    if let Some(v) = read("JESTER_THROTTLE_MS") {
        match parse_u64_range(&v, 0, 60_000) {
            Some(n) => settings.delivery.throttle_ms = n,
            None => warn!(key = "JESTER_THROTTLE_MS", value = %v, "invalid u64 env var, ignoring"),
        }
    }
    if let Some(v) = read("JESTER_DISPLAY_DURATION_MS") {
        match parse_u64_range(&v, 500, 60_000) {
            Some(n) => settings.delivery.display_duration_ms = n,
            None => {
                warn!(key = "JESTER_DISPLAY_DURATION_MS", value = %v, "invalid u64 env var, ignoring");
            }
        }
    }
    if let Some(v) = read("JESTER_CACHE_TTL_MS") {
        match parse_u64_range(&v, 0, 60_000) {
            Some(n) => settings.context.cache_ttl_ms = n,
            None => warn!(key = "JESTER_CACHE_TTL_MS", value = %v, "invalid u64 env var, ignoring"),
        }
    }
    if let Some(v) = read("JESTER_MAX_RECENT") {
        match parse_usize_range(&v, 1, 1000) {
            Some(n) => settings.selection.max_recent = n,
            None => warn!(key = "JESTER_MAX_RECENT", value = %v, "invalid usize env var, ignoring"),
        }
    }
    if let Some(v) = read("JESTER_PERSONALITY") {
        settings.personality.name = v.to_lowercase();
    }
    if let Some(v) = read("JESTER_LEVEL") {
        match v.parse::<HumorLevel>() {
            Ok(level) => settings.personality.level = Some(level),
            Err(_) => warn!(key = "JESTER_LEVEL", value = %v, "invalid humor level env var, ignoring"),
        }
    }
    if let Some(v) = read("JESTER_CATALOG") {
        settings.catalog.path = Some(v);
    }
    if let Some(v) = read("JESTER_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within an inclusive range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::errors::SettingsError;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"delivery": {"throttleMs": 100, "enabled": true}});
        let source = serde_json::json!({"delivery": {"throttleMs": 250}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["delivery"]["throttleMs"], 250);
        assert_eq!(merged["delivery"]["enabled"], true);
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1});
        let source = serde_json::json!({"a": null});
        assert_eq!(deep_merge(target, source)["a"], 1);
    }

    #[test]
    fn merge_array_replaces() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4]});
        assert_eq!(deep_merge(target, source)["items"], serde_json::json!([4]));
    }

    // ── load_with_env ───────────────────────────────────────────────

    #[test]
    fn missing_file_returns_defaults() {
        let settings = load_with_env(Path::new("/nonexistent/settings.json"), no_env).unwrap();
        assert_eq!(settings.delivery.throttle_ms, 100);
        assert_eq!(settings.context.cache_ttl_ms, 500);
        assert_eq!(settings.selection.max_recent, 10);
        assert_eq!(settings.personality.name, "deadpan");
    }

    #[test]
    fn partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"personality": {"name": "snarky"}, "context": {"cacheTtlMs": 1000}}"#,
        )
        .unwrap();

        let settings = load_with_env(&path, no_env).unwrap();
        assert_eq!(settings.personality.name, "snarky");
        assert_eq!(settings.context.cache_ttl_ms, 1000);
        assert_eq!(settings.delivery.throttle_ms, 100);
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        let err = load_with_env(&path, no_env).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn out_of_range_file_value_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"selection": {"maxRecent": 0}}"#).unwrap();
        let err = load_with_env(&path, no_env).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"delivery": {"throttleMs": 300}}"#).unwrap();

        let env = env_of(&[
            ("JESTER_THROTTLE_MS", "50"),
            ("JESTER_LEVEL", "spicy"),
            ("JESTER_PERSONALITY", "Snarky"),
            ("JESTER_ENABLED", "off"),
        ]);
        let settings = load_with_env(&path, env).unwrap();
        assert_eq!(settings.delivery.throttle_ms, 50);
        assert_eq!(settings.personality.level, Some(HumorLevel::Spicy));
        assert_eq!(settings.personality.name, "snarky");
        assert!(!settings.delivery.enabled);
    }

    #[test]
    fn invalid_env_values_ignored() {
        let env = env_of(&[
            ("JESTER_MAX_RECENT", "0"),
            ("JESTER_CACHE_TTL_MS", "soon"),
            ("JESTER_LEVEL", "nuclear"),
        ]);
        let settings = load_with_env(Path::new("/nonexistent/settings.json"), env).unwrap();
        assert_eq!(settings.selection.max_recent, 10);
        assert_eq!(settings.context.cache_ttl_ms, 500);
        assert!(settings.personality.level.is_none());
    }

    #[test]
    fn empty_env_values_ignored() {
        let env = env_of(&[("JESTER_CATALOG", "")]);
        let settings = load_with_env(Path::new("/nonexistent/settings.json"), env).unwrap();
        assert!(settings.catalog.path.is_none());
    }

    // ── parsers ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        for val in &["true", "1", "yes", "ON"] {
            assert_eq!(parse_bool(val), Some(true), "failed for {val}");
        }
        for val in &["false", "0", "No", "off"] {
            assert_eq!(parse_bool(val), Some(false), "failed for {val}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parse_ranges() {
        assert_eq!(parse_u64_range("100", 0, 60_000), Some(100));
        assert_eq!(parse_u64_range("70000", 0, 60_000), None);
        assert_eq!(parse_usize_range("0", 1, 1000), None);
        assert_eq!(parse_usize_range("x", 1, 1000), None);
    }
}
