//! Cross-session repeat-failure detection.
//!
//! Every failed tool exchange is reduced to a fingerprint that survives incidental noise
//! (timestamps, ids, temp paths, volatile parameters). The caller owns the
//! [`RepeatFailState`] and hands it to every pass; a fingerprint that reappears in a session
//! it has not been seen in before raises a `repeat_fail` signal.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use trace_events::ConversationChain;
use tracing::debug;

use super::{preview, tool_exchanges};
use crate::config::DEFAULT_REPEAT_FAIL_MAX_FINGERPRINTS;
use crate::signal::{EventRange, FailureSignal, Severity, SignalKind};

/// Normalized errors are cut to this many characters before hashing.
pub const NORMALIZED_ERROR_CHARS: usize = 200;
pub const ERROR_PREVIEW_CHARS: usize = 120;
const FINGERPRINT_HEX_CHARS: usize = 32;
const FIELD_SEPARATOR: char = '\u{1f}';
const VOLATILE_KEY_FRAGMENTS: [&str; 3] = ["timeout", "timestamp", "seq"];

/// One multi-worker handle around the state; hold the lock for a whole repeat-fail phase.
pub type SharedRepeatFailState = Mutex<RepeatFailState>;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintEntry {
    pub count: u32,
    pub last_seen_timestamp: i64,
    pub sessions: BTreeSet<String>,
    pub tool_name: String,
    pub error_preview: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RecordOutcome {
    /// First sighting; nothing to report.
    New,
    /// Already recorded for this session.
    SameSession,
    /// Seen again in a new session; carries the updated count.
    Repeated(u32),
}

/// Fingerprint map bounded by recency eviction. Plain owned data; wrap it in
/// [`SharedRepeatFailState`] to share it between workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatFailState {
    #[serde(
        default = "default_max_entries",
        deserialize_with = "deserialize_max_entries"
    )]
    max_entries: usize,
    #[serde(default)]
    entries: BTreeMap<String, FingerprintEntry>,
}

fn default_max_entries() -> usize {
    DEFAULT_REPEAT_FAIL_MAX_FINGERPRINTS
}

/// Same floor as [`RepeatFailState::new`], so a stored cap of zero cannot wipe the map.
fn deserialize_max_entries<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(usize::deserialize(deserializer)?.max(1))
}

impl Default for RepeatFailState {
    fn default() -> Self {
        Self::new(DEFAULT_REPEAT_FAIL_MAX_FINGERPRINTS)
    }
}

impl RepeatFailState {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            entries: BTreeMap::new(),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Applies a new cap. Takes effect at the next [`evict`](Self::evict).
    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries.max(1);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, fingerprint: &str) -> Option<&FingerprintEntry> {
        self.entries.get(fingerprint)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &FingerprintEntry)> {
        self.entries.iter().map(|(fp, entry)| (fp.as_str(), entry))
    }

    pub fn record(
        &mut self,
        fingerprint: &str,
        session_id: &str,
        timestamp: i64,
        tool_name: &str,
        error_preview: &str,
    ) -> RecordOutcome {
        match self.entries.get_mut(fingerprint) {
            None => {
                self.entries.insert(
                    fingerprint.to_string(),
                    FingerprintEntry {
                        count: 1,
                        last_seen_timestamp: timestamp,
                        sessions: BTreeSet::from([session_id.to_string()]),
                        tool_name: tool_name.to_string(),
                        error_preview: error_preview.to_string(),
                    },
                );
                RecordOutcome::New
            }
            Some(entry) if entry.sessions.contains(session_id) => RecordOutcome::SameSession,
            Some(entry) => {
                entry.count = entry.count.saturating_add(1);
                entry.sessions.insert(session_id.to_string());
                entry.last_seen_timestamp = timestamp;
                RecordOutcome::Repeated(entry.count)
            }
        }
    }

    /// Drops the least recently seen entries (ties broken by fingerprint) until the map is
    /// within its cap. Returns how many entries were removed.
    pub fn evict(&mut self) -> usize {
        let excess = self.entries.len().saturating_sub(self.max_entries);
        if excess == 0 {
            return 0;
        }
        let mut by_age: Vec<(i64, String)> = self
            .entries
            .iter()
            .map(|(fp, entry)| (entry.last_seen_timestamp, fp.clone()))
            .collect();
        by_age.sort();
        for (_, fingerprint) in by_age.into_iter().take(excess) {
            self.entries.remove(&fingerprint);
        }
        debug!(
            evicted = excess,
            remaining = self.entries.len(),
            "evicted repeat-fail fingerprints"
        );
        excess
    }
}

/// Stateful detector; the state is passed in by the caller on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatFailDetector;

impl RepeatFailDetector {
    pub fn new() -> Self {
        Self
    }

    /// Records every failed exchange of `chain` and reports fingerprints that recur in a new
    /// session. Does not evict; callers evict once per pass.
    pub fn detect(
        &self,
        chain: &ConversationChain,
        state: &mut RepeatFailState,
    ) -> Vec<FailureSignal> {
        let mut signals = Vec::new();

        for exchange in tool_exchanges(chain) {
            let Some(result) = exchange.result_event(chain) else {
                continue;
            };
            if !result.is_tool_error() {
                continue;
            }
            let call = exchange.call_event(chain);
            let tool = call.tool_name().or(result.tool_name()).unwrap_or("unknown");
            let raw_error = result.error().unwrap_or("success=false");
            let normalized = normalize_error(raw_error);
            let fp = fingerprint(tool, call.params(), &normalized);

            let outcome = state.record(
                &fp,
                &chain.session_id,
                result.timestamp,
                tool,
                &preview(raw_error, ERROR_PREVIEW_CHARS),
            );
            let RecordOutcome::Repeated(count) = outcome else {
                continue;
            };

            let severity = if count >= 3 {
                Severity::Critical
            } else {
                Severity::High
            };
            let sessions = state
                .get(&fp)
                .map(|entry| entry.sessions.len())
                .unwrap_or_default();
            signals.push(
                FailureSignal::new(
                    SignalKind::RepeatFail,
                    severity,
                    EventRange::spanning(exchange.call, exchange.last_index()),
                    format!("tool `{tool}` failed the same way in {count} sessions"),
                )
                .with_evidence("fingerprint", fp.as_str())
                .with_evidence("tool", tool)
                .with_evidence("count", count.to_string())
                .with_evidence("sessions", sessions.to_string())
                .with_evidence("error", normalized),
            );
        }
        signals
    }
}

fn error_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (
                r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?",
                "<ts>",
            ),
            (r"\b\d{1,2}:\d{2}:\d{2}(?:\.\d+)?\b", "<time>"),
            (
                r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b",
                "<uuid>",
            ),
            (r"(?i)\b0x[0-9a-f]+\b", "<hex>"),
            (r"(?i)\b[0-9a-f]{8,}\b", "<hex>"),
            (r"(?i)\bpid[\s:=]*\d+", "pid <pid>"),
            (
                r#"(?i)(?:/tmp/|/var/folders/|[a-z]:\\[^\s"']*\\temp\\)[^\s"':,;)]*"#,
                "<tmp>",
            ),
            (r"(?i)\bseq[\s:=#]*\d+", "<n>"),
            (r"#\d+", "<n>"),
            (r"\d{4,}", "<n>"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| {
            (Regex::new(pattern).expect("hardcoded regex"), replacement)
        })
        .collect()
    })
}

/// Replaces incidental detail (timestamps, ids, temp paths, long numbers) with placeholders,
/// collapses whitespace and truncates to [`NORMALIZED_ERROR_CHARS`].
pub fn normalize_error(error: &str) -> String {
    let mut text = error.to_string();
    for (regex, replacement) in error_rules() {
        if regex.is_match(&text) {
            text = regex.replace_all(&text, *replacement).into_owned();
        }
    }
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(NORMALIZED_ERROR_CHARS).collect()
}

/// Removes, at any depth, keys containing `timeout`, `timestamp` or `seq` (case-insensitive).
pub fn strip_volatile_params(params: &Map<String, Value>) -> Map<String, Value> {
    params
        .iter()
        .filter(|(key, _)| !is_volatile_key(key))
        .map(|(key, value)| (key.clone(), strip_value(value)))
        .collect()
}

fn strip_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(strip_volatile_params(map)),
        Value::Array(items) => Value::Array(items.iter().map(strip_value).collect()),
        other => other.clone(),
    }
}

fn is_volatile_key(key: &str) -> bool {
    let lowered = key.to_ascii_lowercase();
    VOLATILE_KEY_FRAGMENTS
        .iter()
        .any(|fragment| lowered.contains(fragment))
}

/// First 32 hex chars of `sha256(tool \x1f canonical params \x1f normalized error)`.
///
/// `serde_json::Map` keeps keys sorted, so serializing the stripped params is canonical.
pub fn fingerprint(
    tool: &str,
    params: Option<&Map<String, Value>>,
    normalized_error: &str,
) -> String {
    let stable = params.map(strip_volatile_params).unwrap_or_default();
    let canonical = Value::Object(stable).to_string();

    let mut hasher = Sha256::new();
    hasher.update(tool.as_bytes());
    hasher.update(FIELD_SEPARATOR.to_string().as_bytes());
    hasher.update(canonical.as_bytes());
    hasher.update(FIELD_SEPARATOR.to_string().as_bytes());
    hasher.update(normalized_error.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_HEX_CHARS);
    digest
}
