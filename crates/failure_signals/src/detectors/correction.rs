use std::sync::Arc;

use trace_events::{ConversationChain, EventType};

use super::{preview, SignalDetector};
use crate::patterns::{PatternCategory, PatternRegistry};
use crate::signal::{EventRange, FailureSignal, Severity, SignalKind};

const MATCH_EVIDENCE_CHARS: usize = 120;

/// User messages that push back on the agent's previous reply.
#[derive(Debug, Clone)]
pub struct CorrectionDetector {
    patterns: Arc<PatternRegistry>,
}

impl CorrectionDetector {
    pub fn new(patterns: Arc<PatternRegistry>) -> Self {
        Self { patterns }
    }

    fn classify<'t>(&self, text: &'t str) -> Option<(&'static str, &'t str)> {
        if let Some(matched) = self
            .patterns
            .set(PatternCategory::Correction)
            .first_match(text)
        {
            return Some(("phrase", matched));
        }
        let trimmed = text.trim();
        self.patterns
            .set(PatternCategory::ShortNegative)
            .is_match(trimmed)
            .then_some(("short_negative", trimmed))
    }
}

impl SignalDetector for CorrectionDetector {
    fn kind(&self) -> SignalKind {
        SignalKind::Correction
    }

    fn detect(&self, chain: &ConversationChain) -> Vec<FailureSignal> {
        let mut signals = Vec::new();
        let mut last_message: Option<(usize, EventType)> = None;

        for (idx, event) in chain.events.iter().enumerate() {
            if !event.event_type.is_message() {
                continue;
            }
            let previous = last_message.replace((idx, event.event_type));
            if event.event_type != EventType::MessageIn {
                continue;
            }
            let Some((reply_idx, EventType::MessageOut)) = previous else {
                continue;
            };
            let Some(text) = event.text() else {
                continue;
            };
            let Some((trigger, matched)) = self.classify(text) else {
                continue;
            };

            let mut signal = FailureSignal::new(
                SignalKind::Correction,
                Severity::Low,
                EventRange::spanning(reply_idx, idx),
                "user corrected the previous reply",
            )
            .with_evidence("trigger", trigger)
            .with_evidence("matched", preview(matched, MATCH_EVIDENCE_CHARS));
            if let Some(topic) = self.patterns.capture_topic(text) {
                signal = signal.with_evidence("topic", topic);
            }
            signals.push(signal);
        }
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::detectors::test_support::{chain, events};

    fn detector() -> CorrectionDetector {
        CorrectionDetector::new(Arc::new(PatternRegistry::builtin()))
    }

    #[test]
    fn phrase_after_reply_is_flagged_with_topic() {
        let chain = chain(
            "s",
            events(
                "s",
                &[
                    ("in", "fix the config", ""),
                    ("out", "I updated README.md", ""),
                    ("in", "That's wrong, I meant the deploy script", ""),
                ],
            ),
        );
        let signals = detector().detect(&chain);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].event_range, EventRange::new(1, 3));
        assert_eq!(signals[0].evidence["trigger"], "phrase");
        assert_eq!(signals[0].evidence["topic"], "deploy script");
    }

    #[test]
    fn custom_short_negative_does_not_match_inside_a_sentence() {
        let config = AnalyzerConfig::from_toml_str(
            "[customPatterns.short_negative]\nmode = \"override\"\npatterns = [\"no\"]\n",
        )
        .unwrap();
        let detector = CorrectionDetector::new(Arc::new(PatternRegistry::load(
            &config.languages,
            &config.custom_patterns,
        )));

        let casual = chain(
            "s",
            events("s", &[("out", "done", ""), ("in", "no worries, ship it", "")]),
        );
        assert!(detector.detect(&casual).is_empty());

        let bare = chain("s", events("s", &[("out", "done", ""), ("in", " no ", "")]));
        assert_eq!(detector.detect(&bare).len(), 1);
    }

    #[test]
    fn bare_negative_counts_only_as_whole_message() {
        let flagged = chain("s", events("s", &[("out", "done", ""), ("in", "  Nope! ", "")]));
        let signals = detector().detect(&flagged);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].evidence["trigger"], "short_negative");
        assert_eq!(signals[0].evidence["matched"], "Nope!");

        let ignored = chain(
            "s",
            events("s", &[("out", "done", ""), ("in", "no worries, ship it", "")]),
        );
        assert!(detector().detect(&ignored).is_empty());
    }

    #[test]
    fn requires_a_preceding_reply() {
        let chain = chain(
            "s",
            events(
                "s",
                &[("in", "hello", ""), ("in", "that's wrong", ""), ("call", "ls", "{}")],
            ),
        );
        assert!(detector().detect(&chain).is_empty());
    }

    #[test]
    fn tool_events_between_reply_and_message_are_ignored() {
        let chain = chain(
            "s",
            events(
                "s",
                &[
                    ("out", "ran it", ""),
                    ("call", "ls", "{}"),
                    ("ok", "ls", ""),
                    ("in", "no me refería a eso, deshaz el cambio", ""),
                ],
            ),
        );
        let signals = detector().detect(&chain);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].event_range, EventRange::new(0, 4));
        assert!(!signals[0].evidence.contains_key("topic"));
    }
}
