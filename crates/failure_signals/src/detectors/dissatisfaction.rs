use std::sync::Arc;

use trace_events::{ConversationChain, EventType};

use super::{preview, SignalDetector};
use crate::patterns::{PatternCategory, PatternRegistry};
use crate::signal::{EventRange, FailureSignal, Severity, SignalKind};

const MATCH_EVIDENCE_CHARS: usize = 120;

/// Frustrated user messages that the rest of the chain never resolved.
#[derive(Debug, Clone)]
pub struct DissatisfactionDetector {
    patterns: Arc<PatternRegistry>,
}

impl DissatisfactionDetector {
    pub fn new(patterns: Arc<PatternRegistry>) -> Self {
        Self { patterns }
    }

    fn resolved_after(&self, chain: &ConversationChain, idx: usize) -> bool {
        chain.events[idx + 1..].iter().any(|event| {
            let Some(text) = event.text() else {
                return false;
            };
            match event.event_type {
                // A message that is itself a complaint never counts as satisfaction.
                EventType::MessageIn => {
                    self.patterns
                        .is_match(PatternCategory::SatisfactionOverride, text)
                        && !self.patterns.is_match(PatternCategory::Dissatisfaction, text)
                }
                EventType::MessageOut => self.patterns.is_match(PatternCategory::Resolution, text),
                _ => false,
            }
        })
    }
}

impl SignalDetector for DissatisfactionDetector {
    fn kind(&self) -> SignalKind {
        SignalKind::Dissatisfaction
    }

    fn detect(&self, chain: &ConversationChain) -> Vec<FailureSignal> {
        let set = self.patterns.set(PatternCategory::Dissatisfaction);
        chain
            .events
            .iter()
            .enumerate()
            .filter(|(_, event)| event.event_type == EventType::MessageIn)
            .filter_map(|(idx, event)| {
                let matched = set.first_match(event.text()?)?;
                if self.resolved_after(chain, idx) {
                    return None;
                }
                Some(
                    FailureSignal::new(
                        SignalKind::Dissatisfaction,
                        Severity::High,
                        EventRange::spanning(idx, idx),
                        "user expressed dissatisfaction that was never resolved",
                    )
                    .with_evidence("matched", preview(matched, MATCH_EVIDENCE_CHARS)),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::{chain, events};

    fn detect(steps: &[(&str, &str, &str)]) -> Vec<FailureSignal> {
        DissatisfactionDetector::new(Arc::new(PatternRegistry::builtin()))
            .detect(&chain("s", events("s", steps)))
    }

    #[test]
    fn unresolved_frustration_is_flagged() {
        let signals = detect(&[
            ("out", "Here is the patch.", ""),
            ("in", "Forget it, this is useless", ""),
        ]);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].severity, Severity::High);
        assert_eq!(signals[0].event_range, EventRange::new(1, 2));
        assert_eq!(signals[0].evidence["matched"], "Forget it");
    }

    #[test]
    fn later_thanks_suppresses() {
        let signals = detect(&[
            ("in", "this still doesn't work", ""),
            ("out", "Try restarting the server.", ""),
            ("in", "thanks, perfect!", ""),
        ]);
        assert!(signals.is_empty());
    }

    #[test]
    fn later_apology_from_the_agent_suppresses() {
        let signals = detect(&[
            ("in", "olvídalo, no sirve para nada", ""),
            ("out", "Lo siento, voy a corregirlo.", ""),
        ]);
        assert!(signals.is_empty());
    }

    #[test]
    fn negated_french_satisfaction_is_a_complaint() {
        let signals = detect(&[
            ("in", "laisse tomber", ""),
            ("out", "Je relance la commande.", ""),
            ("in", "ça marche pas", ""),
        ]);
        let ranges: Vec<_> = signals.iter().map(|s| s.event_range).collect();
        assert_eq!(ranges, vec![EventRange::new(0, 1), EventRange::new(2, 3)]);
    }

    #[test]
    fn negated_german_satisfaction_is_a_complaint() {
        let signals = detect(&[
            ("in", "vergiss es", ""),
            ("out", "Ich starte den Build neu.", ""),
            ("in", "das funktioniert nicht", ""),
        ]);
        let ranges: Vec<_> = signals.iter().map(|s| s.event_range).collect();
        assert_eq!(ranges, vec![EventRange::new(0, 1), EventRange::new(2, 3)]);
    }

    #[test]
    fn plain_french_and_german_satisfaction_still_suppress() {
        assert!(detect(&[
            ("in", "laisse tomber", ""),
            ("out", "Je relance la commande.", ""),
            ("in", "ça marche maintenant, merci", ""),
        ])
        .is_empty());
        assert!(detect(&[
            ("in", "vergiss es", ""),
            ("out", "Ich starte den Build neu.", ""),
            ("in", "das hat funktioniert!", ""),
        ])
        .is_empty());
    }

    #[test]
    fn negated_spanish_satisfaction_does_not_suppress() {
        let signals = detect(&[
            ("in", "olvídalo", ""),
            ("out", "Reintento la instalación.", ""),
            ("in", "no funcionó", ""),
        ]);
        assert_eq!(signals.len(), 2);
    }

    #[test]
    fn earlier_thanks_does_not_suppress() {
        let signals = detect(&[
            ("in", "thank you", ""),
            ("out", "sure", ""),
            ("in", "never mind, I give up", ""),
        ]);
        assert_eq!(signals.len(), 1);
    }
}
