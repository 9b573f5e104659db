//! Locale pattern tables and the registry that merges them.
//!
//! Language packs are plain data (see [`lang`]). All selection, merge and override behavior
//! lives in [`PatternRegistry::load`]; detectors only ever see merged [`PatternSet`]s.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::config::{CustomPatterns, LanguageSelection, PatternMode};

pub mod lang;

pub use lang::{builtin_packs, LanguagePack};

/// Captured topics shorter than this (in characters, after trimming) are discarded.
pub const TOPIC_MIN_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    Correction,
    ShortNegative,
    Dissatisfaction,
    SatisfactionOverride,
    Resolution,
    SystemClaim,
    Hedge,
    Decision,
    Topic,
}

impl PatternCategory {
    pub const ALL: [PatternCategory; 9] = [
        PatternCategory::Correction,
        PatternCategory::ShortNegative,
        PatternCategory::Dissatisfaction,
        PatternCategory::SatisfactionOverride,
        PatternCategory::Resolution,
        PatternCategory::SystemClaim,
        PatternCategory::Hedge,
        PatternCategory::Decision,
        PatternCategory::Topic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PatternCategory::Correction => "correction",
            PatternCategory::ShortNegative => "short_negative",
            PatternCategory::Dissatisfaction => "dissatisfaction",
            PatternCategory::SatisfactionOverride => "satisfaction_override",
            PatternCategory::Resolution => "resolution",
            PatternCategory::SystemClaim => "system_claim",
            PatternCategory::Hedge => "hedge",
            PatternCategory::Decision => "decision",
            PatternCategory::Topic => "topic",
        }
    }
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a compiled pattern came from. Custom topic patterns are checked against the noise
/// lists of every selected language.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PatternOrigin {
    Builtin(&'static str),
    Custom,
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    regex: Regex,
    origin: PatternOrigin,
}

/// Union of patterns for one category: a text matches when any member matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.regex.is_match(text))
    }

    /// Text matched by the first matching pattern.
    pub fn first_match<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.patterns
            .iter()
            .find_map(|p| p.regex.find(text))
            .map(|m| m.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn origins(&self) -> impl Iterator<Item = PatternOrigin> + '_ {
        self.patterns.iter().map(|p| p.origin)
    }

    fn push(&mut self, regex: Regex, origin: PatternOrigin) {
        self.patterns.push(CompiledPattern { regex, origin });
    }
}

/// Merged, compiled view of the selected language packs plus custom patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    languages: Vec<&'static str>,
    sets: BTreeMap<PatternCategory, PatternSet>,
    noise: BTreeMap<&'static str, HashSet<String>>,
    keywords: Vec<String>,
}

impl PatternRegistry {
    /// Builds the registry. Never fails: unknown language codes, invalid regexes and topic
    /// patterns without exactly one capture group are dropped with a warning.
    pub fn load(
        languages: &LanguageSelection,
        custom: &BTreeMap<PatternCategory, CustomPatterns>,
    ) -> Self {
        let packs = select_packs(languages);

        let mut registry = Self {
            languages: packs.iter().map(|p| p.code).collect(),
            ..Self::default()
        };

        for pack in &packs {
            registry.noise.insert(
                pack.code,
                pack.noise_words.iter().map(|w| fold(w)).collect(),
            );
            for keyword in pack.keywords {
                let keyword = keyword.to_lowercase();
                if !registry.keywords.contains(&keyword) {
                    registry.keywords.push(keyword);
                }
            }
        }

        for category in PatternCategory::ALL {
            let overrides = custom
                .get(&category)
                .is_some_and(|c| c.mode == PatternMode::Override);

            let mut set = PatternSet::default();
            if !overrides {
                for pack in &packs {
                    for raw in pack.patterns(category) {
                        let origin = PatternOrigin::Builtin(pack.code);
                        if let Some(regex) = compile(category, raw, origin) {
                            set.push(regex, origin);
                        }
                    }
                }
            }
            if let Some(extra) = custom.get(&category) {
                for raw in &extra.patterns {
                    if let Some(regex) = compile(category, raw, PatternOrigin::Custom) {
                        set.push(regex, PatternOrigin::Custom);
                    }
                }
            }
            debug!(category = %category, patterns = set.len(), "merged pattern category");
            registry.sets.insert(category, set);
        }

        registry
    }

    /// Registry over every builtin language with no custom patterns.
    pub fn builtin() -> Self {
        Self::load(&LanguageSelection::All, &BTreeMap::new())
    }

    pub fn languages(&self) -> &[&'static str] {
        &self.languages
    }

    pub fn set(&self, category: PatternCategory) -> &PatternSet {
        static EMPTY: PatternSet = PatternSet {
            patterns: Vec::new(),
        };
        self.sets.get(&category).unwrap_or(&EMPTY)
    }

    pub fn is_match(&self, category: PatternCategory, text: &str) -> bool {
        self.set(category).is_match(text)
    }

    /// Lower-cased claim keywords of every selected language.
    pub fn claim_keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn has_claim_keyword(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    /// First acceptable topic captured by a topic pattern.
    ///
    /// The single capture group is trimmed and rejected when it is too short or listed in the
    /// noise blacklist of the pattern's language (any selected language for custom patterns).
    pub fn capture_topic(&self, text: &str) -> Option<String> {
        for pattern in &self.set(PatternCategory::Topic).patterns {
            let Some(captured) = pattern
                .regex
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
            else {
                continue;
            };
            if captured.chars().count() < TOPIC_MIN_CHARS {
                continue;
            }
            if self.is_noise(captured, pattern.origin) {
                continue;
            }
            return Some(captured.to_string());
        }
        None
    }

    fn is_noise(&self, topic: &str, origin: PatternOrigin) -> bool {
        let folded = fold(topic);
        match origin {
            PatternOrigin::Builtin(code) => self
                .noise
                .get(code)
                .is_some_and(|words| words.contains(&folded)),
            PatternOrigin::Custom => self.noise.values().any(|words| words.contains(&folded)),
        }
    }
}

fn select_packs(selection: &LanguageSelection) -> Vec<&'static LanguagePack> {
    let mut packs: Vec<&'static LanguagePack> = match selection {
        LanguageSelection::All => builtin_packs().iter().collect(),
        LanguageSelection::Codes(codes) => {
            let mut picked: Vec<&'static LanguagePack> = Vec::new();
            for code in codes {
                match lang::pack(code) {
                    Some(pack) if !picked.iter().any(|p| p.code == pack.code) => picked.push(pack),
                    Some(_) => {}
                    None => warn!(language = %code, "unknown language code; skipping"),
                }
            }
            picked
        }
    };
    if packs.is_empty() {
        warn!("no usable language selected; falling back to `en`");
        packs.extend(lang::pack("en"));
    }
    packs
}

fn compile(category: PatternCategory, raw: &str, origin: PatternOrigin) -> Option<Regex> {
    let regex = match build(raw) {
        Ok(regex) => regex,
        Err(err) => {
            warn!(
                category = %category,
                pattern = raw,
                origin = ?origin,
                error = %err,
                "dropping invalid pattern"
            );
            return None;
        }
    };
    // Group 0 is the whole match, so exactly one capture group means a length of 2.
    if category == PatternCategory::Topic && regex.captures_len() != 2 {
        warn!(
            pattern = raw,
            origin = ?origin,
            groups = regex.captures_len() - 1,
            "dropping topic pattern without exactly one capture group"
        );
        return None;
    }
    // Short negatives must cover the whole message.
    if category == PatternCategory::ShortNegative {
        return build(&format!(r"^\s*(?:{raw})\s*$")).ok();
    }
    Some(regex)
}

fn build(raw: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(raw).case_insensitive(true).build()
}

/// Lower-cases and strips diacritics so blacklist checks ignore case and accents.
pub fn fold(text: &str) -> String {
    text.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
