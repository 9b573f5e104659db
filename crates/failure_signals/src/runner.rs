use std::sync::Arc;

use trace_events::{ChainOptions, ConversationChain};
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::detectors::{
    CorrectionDetector, DissatisfactionDetector, DoomLoopDetector, RepeatFailDetector,
    RepeatFailState, SignalDetector, ToolFailDetector, UnverifiedClaimDetector,
};
use crate::patterns::PatternRegistry;
use crate::signal::{FailureSignal, SignalKind};

/// The configured detector set. Cheap to clone and safe to share across worker threads.
#[derive(Clone)]
pub struct SignalRunner {
    stateless: Arc<Vec<Box<dyn SignalDetector>>>,
    repeat_fail: Option<RepeatFailDetector>,
    patterns: Arc<PatternRegistry>,
    chain_options: ChainOptions,
}

impl std::fmt::Debug for SignalRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRunner")
            .field(
                "stateless",
                &self.stateless.iter().map(|d| d.kind()).collect::<Vec<_>>(),
            )
            .field("repeat_fail", &self.repeat_fail.is_some())
            .field("languages", &self.patterns.languages())
            .field("chain_options", &self.chain_options)
            .finish()
    }
}

impl SignalRunner {
    /// Builds the registry and the enabled detectors, in their fixed execution order.
    pub fn new(config: &AnalyzerConfig) -> Self {
        let patterns = Arc::new(PatternRegistry::load(
            &config.languages,
            &config.custom_patterns,
        ));

        let all: Vec<Box<dyn SignalDetector>> = vec![
            Box::new(ToolFailDetector::new(config.similarity_threshold)),
            Box::new(CorrectionDetector::new(Arc::clone(&patterns))),
            Box::new(DoomLoopDetector::new(
                config.doom_loop_threshold,
                config.doom_loop_window,
                config.similarity_threshold,
            )),
            Box::new(DissatisfactionDetector::new(Arc::clone(&patterns))),
            Box::new(UnverifiedClaimDetector::new(Arc::clone(&patterns))),
        ];
        let stateless: Vec<_> = all
            .into_iter()
            .filter(|detector| config.is_enabled(detector.kind()))
            .collect();
        let repeat_fail = config
            .is_enabled(SignalKind::RepeatFail)
            .then(RepeatFailDetector::new);

        debug!(
            stateless = stateless.len(),
            repeat_fail = repeat_fail.is_some(),
            languages = ?patterns.languages(),
            "signal runner ready"
        );

        Self {
            stateless: Arc::new(stateless),
            repeat_fail,
            patterns,
            chain_options: config.chain_options(),
        }
    }

    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    /// Chain reconstruction settings taken from the same config.
    pub fn chain_options(&self) -> ChainOptions {
        self.chain_options
    }

    /// Kinds this runner will emit, in execution order.
    pub fn enabled_kinds(&self) -> Vec<SignalKind> {
        let mut kinds: Vec<_> = self.stateless.iter().map(|d| d.kind()).collect();
        if self.repeat_fail.is_some() {
            kinds.push(SignalKind::RepeatFail);
        }
        kinds
    }

    /// Tool-fail, correction, doom-loop, dissatisfaction and unverified-claim, concatenated.
    pub fn detect_stateless(&self, chain: &ConversationChain) -> Vec<FailureSignal> {
        self.stateless
            .iter()
            .flat_map(|detector| detector.detect(chain))
            .collect()
    }

    /// Repeat-fail detection alone. Does not evict.
    pub fn detect_repeat_fail(
        &self,
        chain: &ConversationChain,
        state: &mut RepeatFailState,
    ) -> Vec<FailureSignal> {
        match &self.repeat_fail {
            Some(detector) => detector.detect(chain, state),
            None => Vec::new(),
        }
    }

    /// Every enabled detector over one chain, then eviction of the repeat-fail state.
    pub fn detect_all(
        &self,
        chain: &ConversationChain,
        state: &mut RepeatFailState,
    ) -> Vec<FailureSignal> {
        let mut signals = self.detect_stateless(chain);
        signals.extend(self.detect_repeat_fail(chain, state));
        state.evict();
        signals
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::detectors::test_support::{chain, events};

    fn noisy_chain(session: &str) -> ConversationChain {
        chain(
            session,
            events(
                session,
                &[
                    ("in", "check the server", ""),
                    ("out", "The server is down.", ""),
                    ("in", "that's wrong", ""),
                    ("call", "bash", r#"{"cmd":"systemctl status api"}"#),
                    ("err", "bash", "unit api.service not found"),
                    ("out", "Could not query it.", ""),
                    ("in", "forget it", ""),
                ],
            ),
        )
    }

    #[test]
    fn detectors_run_in_fixed_order() {
        let runner = SignalRunner::new(&AnalyzerConfig::default());
        let mut state = RepeatFailState::default();
        runner.detect_all(&noisy_chain("a"), &mut state);
        let kinds: Vec<_> = runner
            .detect_all(&noisy_chain("b"), &mut state)
            .into_iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                SignalKind::ToolFail,
                SignalKind::Correction,
                SignalKind::Dissatisfaction,
                SignalKind::UnverifiedClaim,
                SignalKind::RepeatFail,
            ]
        );
    }

    #[test]
    fn disabled_signals_are_skipped() {
        let config = AnalyzerConfig {
            enabled_signals: BTreeMap::from([
                (SignalKind::UnverifiedClaim, false),
                (SignalKind::RepeatFail, false),
            ]),
            ..AnalyzerConfig::default()
        };
        let runner = SignalRunner::new(&config);
        assert!(!runner.enabled_kinds().contains(&SignalKind::RepeatFail));

        let mut state = RepeatFailState::default();
        let signals = runner.detect_all(&noisy_chain("a"), &mut state);
        assert!(signals.iter().all(|s| s.kind != SignalKind::UnverifiedClaim));
        assert!(state.is_empty());
    }

    #[test]
    fn detect_all_enforces_the_state_cap() {
        let runner = SignalRunner::new(&AnalyzerConfig::default());
        let mut state = RepeatFailState::new(1);
        state.record("older", "x", -1, "bash", "boom");
        runner.detect_all(&noisy_chain("a"), &mut state);
        assert_eq!(state.len(), 1);
        assert!(state.get("older").is_none());
    }
}
