use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    ToolFail,
    Correction,
    DoomLoop,
    Dissatisfaction,
    UnverifiedClaim,
    RepeatFail,
}

impl SignalKind {
    pub const ALL: [SignalKind; 6] = [
        SignalKind::ToolFail,
        SignalKind::Correction,
        SignalKind::DoomLoop,
        SignalKind::Dissatisfaction,
        SignalKind::UnverifiedClaim,
        SignalKind::RepeatFail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::ToolFail => "tool_fail",
            SignalKind::Correction => "correction",
            SignalKind::DoomLoop => "doom_loop",
            SignalKind::Dissatisfaction => "dissatisfaction",
            SignalKind::UnverifiedClaim => "unverified_claim",
            SignalKind::RepeatFail => "repeat_fail",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    High,
    Critical,
}

/// Half-open index range `[start, end)` into a chain's events.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct EventRange {
    pub start: usize,
    pub end: usize,
}

impl EventRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Range covering the events at `first..=last`.
    pub fn spanning(first: usize, last: usize) -> Self {
        Self::new(first, last + 1)
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A detector's evidenced claim that a failure pattern occurred in a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureSignal {
    pub kind: SignalKind,
    pub severity: Severity,
    pub event_range: EventRange,
    pub summary: String,
    pub evidence: BTreeMap<String, String>,
}

impl FailureSignal {
    pub fn new(
        kind: SignalKind,
        severity: Severity,
        event_range: EventRange,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            event_range,
            summary: summary.into(),
            evidence: BTreeMap::new(),
        }
    }

    pub fn with_evidence(mut self, key: &str, value: impl Into<String>) -> Self {
        self.evidence.insert(key.to_string(), value.into());
        self
    }
}
