//! Personalities: how selected content is voiced.
//!
//! A [`Personality`] fixes the humor level used for content queries and
//! turns a selected [`ContentEntry`] into the final notification text.

use std::sync::Arc;

use jester_core::content::{ContentEntry, HumorLevel};
use jester_core::trigger::TriggerType;
use rand::RngCore;
use rand::seq::IndexedRandom;
use tracing::warn;

/// Names accepted by [`personality_by_name`].
pub const PERSONALITY_NAMES: &[&str] = &["deadpan", "playful", "snarky"];

/// What is being rendered.
#[derive(Clone, Copy, Debug)]
pub struct Cue<'a> {
    /// The selected entry.
    pub entry: &'a ContentEntry,
    /// The trigger being answered.
    pub trigger: TriggerType,
    /// Whether the entry came from an easter-egg rule.
    pub is_rule_match: bool,
}

/// Voice applied to every delivered message.
///
/// # Level
///
/// [`level`](Personality::level) bounds which entries are eligible; the
/// configured `personality.level` setting overrides it.
pub trait Personality: Send + Sync {
    /// Lowercase name, as used in settings.
    fn name(&self) -> &str;

    /// Humor level used for content queries.
    fn level(&self) -> HumorLevel;

    /// How long the notification stays visible. Default: `base_ms`.
    fn display_duration_ms(&self, base_ms: u64) -> u64 {
        base_ms
    }

    /// Produce the final text.
    fn render(&self, cue: &Cue<'_>, rng: &mut dyn RngCore) -> String;
}

fn pick_variant<'a>(entry: &'a ContentEntry, rng: &mut dyn RngCore) -> &'a str {
    entry.texts.choose(rng).map_or("", String::as_str)
}

/// Says it straight. Mild content, text shown verbatim.
#[derive(Clone, Copy, Debug, Default)]
pub struct Deadpan;

impl Personality for Deadpan {
    fn name(&self) -> &str {
        "deadpan"
    }

    fn level(&self) -> HumorLevel {
        HumorLevel::Mild
    }

    fn render(&self, cue: &Cue<'_>, rng: &mut dyn RngCore) -> String {
        pick_variant(cue.entry, rng).trim().to_string()
    }
}

/// Adds an emoji for the occasion. Medium content.
#[derive(Clone, Copy, Debug, Default)]
pub struct Playful;

impl Playful {
    fn flourish(cue: &Cue<'_>) -> &'static str {
        if cue.is_rule_match {
            return "🎉";
        }
        match cue.trigger {
            TriggerType::TabOpened => "✨",
            TriggerType::TabClosed => "👋",
            TriggerType::TabActivated => "👀",
            TriggerType::TabUpdated => "🔄",
            TriggerType::GroupCreated | TriggerType::TabsGrouped => "📦",
            TriggerType::GroupRemoved => "💥",
            TriggerType::WindowFocused => "🪟",
            TriggerType::Idle => "💤",
        }
    }
}

impl Personality for Playful {
    fn name(&self) -> &str {
        "playful"
    }

    fn level(&self) -> HumorLevel {
        HumorLevel::Medium
    }

    fn render(&self, cue: &Cue<'_>, rng: &mut dyn RngCore) -> String {
        format!("{} {}", pick_variant(cue.entry, rng).trim(), Self::flourish(cue))
    }
}

/// Goes for the longest line and lingers on it. Spicy content.
#[derive(Clone, Copy, Debug, Default)]
pub struct Snarky;

impl Personality for Snarky {
    fn name(&self) -> &str {
        "snarky"
    }

    fn level(&self) -> HumorLevel {
        HumorLevel::Spicy
    }

    fn display_duration_ms(&self, base_ms: u64) -> u64 {
        base_ms.saturating_add(base_ms / 4)
    }

    fn render(&self, cue: &Cue<'_>, _rng: &mut dyn RngCore) -> String {
        let longest = cue
            .entry
            .texts
            .iter()
            .max_by_key(|t| t.chars().count())
            .map_or("", |t| t.trim());
        if cue.is_rule_match {
            format!("Oh, look. {longest}")
        } else {
            longest.to_string()
        }
    }
}

/// Resolve a configured name, falling back to [`Deadpan`].
pub fn personality_by_name(name: &str) -> Arc<dyn Personality> {
    match name.trim().to_lowercase().as_str() {
        "deadpan" => Arc::new(Deadpan),
        "playful" => Arc::new(Playful),
        "snarky" => Arc::new(Snarky),
        other => {
            warn!(name = other, known = ?PERSONALITY_NAMES, "unknown personality, using deadpan");
            Arc::new(Deadpan)
        }
    }
}
