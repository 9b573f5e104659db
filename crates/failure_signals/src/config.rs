use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use trace_events::{ChainOptions, DEFAULT_MAX_CHAIN_LENGTH, DEFAULT_MAX_GAP_SECONDS};

use crate::patterns::PatternCategory;
use crate::signal::SignalKind;

pub const DEFAULT_REPEAT_FAIL_MAX_FINGERPRINTS: usize = 10_000;
pub const DEFAULT_DOOM_LOOP_THRESHOLD: usize = 3;
pub const DEFAULT_DOOM_LOOP_WINDOW: usize = 10;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which builtin language packs to merge.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum LanguageSelection {
    #[default]
    All,
    Codes(Vec<String>),
}

impl LanguageSelection {
    pub fn codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Codes(codes.into_iter().map(Into::into).collect())
    }
}

impl Serialize for LanguageSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LanguageSelection::All => serializer.serialize_str("all"),
            LanguageSelection::Codes(codes) => codes.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for LanguageSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::One(code) if code.eq_ignore_ascii_case("all") => LanguageSelection::All,
            Repr::One(code) => LanguageSelection::Codes(vec![code]),
            Repr::Many(codes) if codes.iter().any(|c| c.eq_ignore_ascii_case("all")) => {
                LanguageSelection::All
            }
            Repr::Many(codes) => LanguageSelection::Codes(codes),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternMode {
    /// Append to the merged builtin patterns.
    #[default]
    Extend,
    /// Replace the builtin patterns of the category.
    Override,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomPatterns {
    pub mode: PatternMode,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub languages: LanguageSelection,
    pub chain_gap_seconds: u64,
    pub max_chain_length: usize,
    pub repeat_fail_max_fingerprints: usize,
    pub doom_loop_threshold: usize,
    pub doom_loop_window: usize,
    pub similarity_threshold: f64,
    pub custom_patterns: BTreeMap<PatternCategory, CustomPatterns>,
    pub enabled_signals: BTreeMap<SignalKind, bool>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            languages: LanguageSelection::All,
            chain_gap_seconds: DEFAULT_MAX_GAP_SECONDS,
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
            repeat_fail_max_fingerprints: DEFAULT_REPEAT_FAIL_MAX_FINGERPRINTS,
            doom_loop_threshold: DEFAULT_DOOM_LOOP_THRESHOLD,
            doom_loop_window: DEFAULT_DOOM_LOOP_WINDOW,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            custom_patterns: BTreeMap::new(),
            enabled_signals: BTreeMap::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(invalid(
                "similarityThreshold",
                format!("must be within [0, 1], got {}", self.similarity_threshold),
            ));
        }
        if self.doom_loop_threshold < 2 {
            return Err(invalid(
                "doomLoopThreshold",
                format!("must be at least 2, got {}", self.doom_loop_threshold),
            ));
        }
        for (field, value) in [
            ("chainGapSeconds", self.chain_gap_seconds as usize),
            ("maxChainLength", self.max_chain_length),
            ("repeatFailMaxFingerprints", self.repeat_fail_max_fingerprints),
            ("doomLoopWindow", self.doom_loop_window),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be greater than zero".to_string()));
            }
        }
        Ok(())
    }

    /// Signals default to enabled unless switched off explicitly.
    pub fn is_enabled(&self, kind: SignalKind) -> bool {
        self.enabled_signals.get(&kind).copied().unwrap_or(true)
    }

    pub fn chain_options(&self) -> ChainOptions {
        ChainOptions {
            max_gap_seconds: self.chain_gap_seconds,
            max_chain_length: self.max_chain_length,
        }
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AnalyzerConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert!(config.is_enabled(SignalKind::RepeatFail));
    }

    #[test]
    fn full_document_parses() {
        let raw = r#"
languages = ["en", "es"]
chainGapSeconds = 120
maxChainLength = 50
repeatFailMaxFingerprints = 500
doomLoopThreshold = 4
doomLoopWindow = 12
similarityThreshold = 0.8

[customPatterns.decision]
mode = "override"
patterns = ["foo"]

[enabledSignals]
unverified_claim = false
"#;
        let config = AnalyzerConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.languages, LanguageSelection::codes(["en", "es"]));
        assert_eq!(config.chain_options().max_gap_seconds, 120);
        assert_eq!(
            config.custom_patterns[&PatternCategory::Decision].mode,
            PatternMode::Override
        );
        assert!(!config.is_enabled(SignalKind::UnverifiedClaim));
        assert!(config.is_enabled(SignalKind::ToolFail));
    }

    #[test]
    fn all_keyword_selects_every_language() {
        let config = AnalyzerConfig::from_toml_str("languages = \"all\"").unwrap();
        assert_eq!(config.languages, LanguageSelection::All);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = AnalyzerConfig::from_toml_str("similarityThreshold = 1.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "similarityThreshold",
                ..
            }
        ));
        assert!(AnalyzerConfig::from_toml_str("doomLoopThreshold = 1").is_err());
        assert!(AnalyzerConfig::from_toml_str("maxChainLength = 0").is_err());
        assert!(matches!(
            AnalyzerConfig::from_toml_str("unknownKey = 1").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }
}
