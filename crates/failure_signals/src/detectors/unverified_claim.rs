use std::sync::Arc;

use trace_events::{ConversationChain, EventType};

use super::{preview, SignalDetector};
use crate::patterns::{PatternCategory, PatternRegistry};
use crate::signal::{EventRange, FailureSignal, Severity, SignalKind};

const CLAIM_EVIDENCE_CHARS: usize = 200;

/// Assertions about live system state made before any tool call in the chain succeeded.
#[derive(Debug, Clone)]
pub struct UnverifiedClaimDetector {
    patterns: Arc<PatternRegistry>,
}

impl UnverifiedClaimDetector {
    pub fn new(patterns: Arc<PatternRegistry>) -> Self {
        Self { patterns }
    }

    fn first_claim<'t>(&self, text: &'t str) -> Option<&'t str> {
        let claims = self.patterns.set(PatternCategory::SystemClaim);
        let hedges = self.patterns.set(PatternCategory::Hedge);
        sentences(text).find(|sentence| {
            self.patterns.has_claim_keyword(sentence)
                && !hedges.is_match(sentence)
                && claims.is_match(sentence)
        })
    }
}

impl SignalDetector for UnverifiedClaimDetector {
    fn kind(&self) -> SignalKind {
        SignalKind::UnverifiedClaim
    }

    fn detect(&self, chain: &ConversationChain) -> Vec<FailureSignal> {
        let mut signals = Vec::new();
        for (idx, event) in chain.events.iter().enumerate() {
            if event.is_tool_success() {
                // Everything after a successful tool result counts as verified.
                break;
            }
            if event.event_type != EventType::MessageOut {
                continue;
            }
            let Some(claim) = event.text().and_then(|text| self.first_claim(text)) else {
                continue;
            };
            signals.push(
                FailureSignal::new(
                    SignalKind::UnverifiedClaim,
                    Severity::Low,
                    EventRange::spanning(idx, idx),
                    "reply states system facts without any successful tool call",
                )
                .with_evidence("claim", preview(claim, CLAIM_EVIDENCE_CHARS)),
            );
        }
        signals
    }
}

/// Splits on line breaks and on `.`, `!`, `?` followed by whitespace or the end of the text,
/// so decimals like `95.5%` stay intact.
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    let mut bounds = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        let at_end = match ch {
            '\n' | '\r' => true,
            '.' | '!' | '?' => chars.peek().map_or(true, |(_, next)| next.is_whitespace()),
            _ => false,
        };
        if at_end {
            let end = idx + ch.len_utf8();
            bounds.push((start, end));
            start = end;
        }
    }
    bounds.push((start, text.len()));
    bounds
        .into_iter()
        .map(move |(from, to)| text[from..to].trim())
        .filter(|sentence| !sentence.is_empty())
}
