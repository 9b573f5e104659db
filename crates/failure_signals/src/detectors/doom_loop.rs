use trace_events::ConversationChain;

use super::{tool_exchanges, SignalDetector, ToolExchange};
use crate::signal::{EventRange, FailureSignal, Severity, SignalKind};
use crate::similarity::param_similarity;

/// Repeated near-identical calls to one tool with nothing succeeding in between.
#[derive(Debug, Clone)]
pub struct DoomLoopDetector {
    threshold: usize,
    window: usize,
    similarity_threshold: f64,
}

#[derive(Debug)]
struct Run<'c> {
    tool: &'c str,
    calls: Vec<ToolExchange>,
}

impl Run<'_> {
    fn first(&self) -> ToolExchange {
        self.calls[0]
    }

    fn last(&self) -> ToolExchange {
        self.calls[self.calls.len() - 1]
    }
}

impl DoomLoopDetector {
    pub fn new(threshold: usize, window: usize, similarity_threshold: f64) -> Self {
        Self {
            threshold,
            window,
            similarity_threshold,
        }
    }

    fn extends(&self, chain: &ConversationChain, run: &Run<'_>, next: &ToolExchange) -> bool {
        let next_call = next.call_event(chain);
        if next_call.tool_name() != Some(run.tool) {
            return false;
        }
        let similarity =
            param_similarity(run.first().call_event(chain).params(), next_call.params());
        similarity >= self.similarity_threshold
    }

    /// Runs stay open while calls keep arriving within the window and nothing succeeds.
    fn still_open(&self, chain: &ConversationChain, run: &Run<'_>, at: usize) -> bool {
        let last = run.last().call;
        at - last <= self.window
            && !chain.events[last + 1..at]
                .iter()
                .any(|ev| ev.is_tool_success())
    }

    fn signal(&self, chain: &ConversationChain, run: &Run<'_>) -> FailureSignal {
        let repeats = run.calls.len();
        let severity = if repeats >= self.threshold.saturating_mul(2) {
            Severity::Critical
        } else {
            Severity::High
        };
        let end = run.last().last_index().min(chain.events.len().saturating_sub(1));
        FailureSignal::new(
            SignalKind::DoomLoop,
            severity,
            EventRange::spanning(run.first().call, end),
            format!("tool `{}` called {repeats} times with near-identical parameters", run.tool),
        )
        .with_evidence("tool", run.tool)
        .with_evidence("repeats", repeats.to_string())
    }
}

impl SignalDetector for DoomLoopDetector {
    fn kind(&self) -> SignalKind {
        SignalKind::DoomLoop
    }

    fn detect(&self, chain: &ConversationChain) -> Vec<FailureSignal> {
        let mut open: Vec<Run<'_>> = Vec::new();
        let mut closed: Vec<Run<'_>> = Vec::new();

        for exchange in tool_exchanges(chain) {
            let Some(tool) = exchange.call_event(chain).tool_name() else {
                continue;
            };

            let (alive, stale): (Vec<_>, Vec<_>) = open
                .into_iter()
                .partition(|run| self.still_open(chain, run, exchange.call));
            closed.extend(stale);
            open = alive;

            match open.iter_mut().find(|run| self.extends(chain, run, &exchange)) {
                Some(run) => run.calls.push(exchange),
                None => open.push(Run {
                    tool,
                    calls: vec![exchange],
                }),
            }
        }
        closed.extend(open);

        let mut loops: Vec<&Run<'_>> = closed
            .iter()
            .filter(|run| run.calls.len() >= self.threshold)
            .collect();
        loops.sort_by_key(|run| run.first().call);
        loops.into_iter().map(|run| self.signal(chain, run)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::{chain, events};

    fn detect(steps: &[(&str, &str, &str)]) -> Vec<FailureSignal> {
        DoomLoopDetector::new(3, 10, 0.7).detect(&chain("s", events("s", steps)))
    }

    fn failing_calls(times: usize) -> Vec<(&'static str, &'static str, &'static str)> {
        (0..times)
            .flat_map(|_| {
                [
                    ("call", "bash", r#"{"cmd":"cargo build"}"#),
                    ("err", "bash", "error[E0433]"),
                ]
            })
            .collect()
    }

    #[test]
    fn three_identical_failing_calls_form_a_loop() {
        let signals = detect(&failing_calls(3));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].severity, Severity::High);
        assert_eq!(signals[0].evidence["repeats"], "3");
        assert_eq!(signals[0].event_range, EventRange::new(0, 6));
    }

    #[test]
    fn twice_the_threshold_is_critical() {
        let signals = detect(&failing_calls(6));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].severity, Severity::Critical);
    }

    #[test]
    fn two_calls_are_below_threshold() {
        assert!(detect(&failing_calls(2)).is_empty());
    }

    #[test]
    fn success_in_between_breaks_the_run() {
        let mut steps = failing_calls(2);
        steps.push(("call", "read", r#"{"path":"Cargo.toml"}"#));
        steps.push(("ok", "read", "[package]"));
        steps.extend(failing_calls(2));
        assert!(detect(&steps).is_empty());
    }

    #[test]
    fn interleaved_tools_keep_their_own_runs() {
        let mut steps = Vec::new();
        for _ in 0..3 {
            steps.push(("call", "bash", r#"{"cmd":"cargo build"}"#));
            steps.push(("err", "bash", "boom"));
            steps.push(("call", "read", r#"{"path":"src/main.rs"}"#));
            steps.push(("err", "read", "denied"));
        }
        let signals = detect(&steps);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].evidence["tool"], "bash");
        assert_eq!(signals[1].evidence["tool"], "read");
    }

    #[test]
    fn calls_outside_the_window_do_not_chain() {
        let mut steps = Vec::new();
        for _ in 0..3 {
            steps.push(("call", "bash", r#"{"cmd":"cargo build"}"#));
            steps.push(("err", "bash", "boom"));
            for _ in 0..10 {
                steps.push(("in", "still there?", ""));
            }
        }
        assert!(detect(&steps).is_empty());
    }
}
