//! Signal detectors.
//!
//! Stateless detectors implement [`SignalDetector`] and look at a single chain only. The
//! cross-session repeat-fail detector lives in [`repeat_fail`] and takes its state explicitly.

use trace_events::{ConversationChain, EventType, NormalizedEvent};

use crate::signal::{FailureSignal, SignalKind};

mod correction;
mod dissatisfaction;
mod doom_loop;
pub mod repeat_fail;
mod tool_fail;
mod unverified_claim;

pub use correction::CorrectionDetector;
pub use dissatisfaction::DissatisfactionDetector;
pub use doom_loop::DoomLoopDetector;
pub use repeat_fail::{
    fingerprint, normalize_error, strip_volatile_params, FingerprintEntry, RecordOutcome,
    RepeatFailDetector, RepeatFailState, SharedRepeatFailState, ERROR_PREVIEW_CHARS,
};
pub use tool_fail::ToolFailDetector;
pub use unverified_claim::UnverifiedClaimDetector;

/// A pure function of one chain. Implementations must tolerate missing fields and never panic.
pub trait SignalDetector: Send + Sync {
    fn kind(&self) -> SignalKind;

    fn detect(&self, chain: &ConversationChain) -> Vec<FailureSignal>;
}

/// A tool call and the result paired with it, as indexes into `chain.events`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ToolExchange {
    pub call: usize,
    pub result: Option<usize>,
}

impl ToolExchange {
    pub fn call_event<'c>(&self, chain: &'c ConversationChain) -> &'c NormalizedEvent {
        &chain.events[self.call]
    }

    pub fn result_event<'c>(&self, chain: &'c ConversationChain) -> Option<&'c NormalizedEvent> {
        self.result.map(|idx| &chain.events[idx])
    }

    pub fn failed(&self, chain: &ConversationChain) -> bool {
        self.result_event(chain)
            .is_some_and(NormalizedEvent::is_tool_error)
    }

    pub fn succeeded(&self, chain: &ConversationChain) -> bool {
        self.result_event(chain)
            .is_some_and(NormalizedEvent::is_tool_success)
    }

    /// Index of the last event belonging to the exchange.
    pub fn last_index(&self) -> usize {
        self.result.unwrap_or(self.call)
    }
}

/// Pairs every tool call with the first later, not yet claimed tool result whose tool name
/// matches. A missing name on either side matches anything.
pub fn tool_exchanges(chain: &ConversationChain) -> Vec<ToolExchange> {
    let events = &chain.events;
    let mut claimed = vec![false; events.len()];
    let mut exchanges = Vec::new();

    for (call, event) in events.iter().enumerate() {
        if event.event_type != EventType::ToolCall {
            continue;
        }
        let result = (call + 1..events.len()).find(|&idx| {
            !claimed[idx]
                && events[idx].event_type == EventType::ToolResult
                && names_match(event.tool_name(), events[idx].tool_name())
        });
        if let Some(idx) = result {
            claimed[idx] = true;
        }
        exchanges.push(ToolExchange { call, result });
    }
    exchanges
}

fn names_match(call: Option<&str>, result: Option<&str>) -> bool {
    match (call, result) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Index of the first `message_out` at or after `from`.
pub(crate) fn next_message_out(chain: &ConversationChain, from: usize) -> Option<usize> {
    (from..chain.events.len()).find(|&idx| chain.events[idx].event_type == EventType::MessageOut)
}

pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::Value;
    use trace_events::{ConversationChain, NormalizedEvent};

    pub fn chain(session: &str, events: Vec<NormalizedEvent>) -> ConversationChain {
        ConversationChain {
            session_id: session.to_string(),
            agent_id: "main".to_string(),
            chain_id: format!("{session}:main:0"),
            events,
        }
    }

    /// Events with timestamps `0, 1000, 2000, ...` built from `(kind, a, b)` triples.
    pub fn events(session: &str, steps: &[(&str, &str, &str)]) -> Vec<NormalizedEvent> {
        steps
            .iter()
            .enumerate()
            .map(|(idx, (kind, a, b))| {
                let ts = idx as i64 * 1000;
                match *kind {
                    "in" => NormalizedEvent::message_in(ts, session, a),
                    "out" => NormalizedEvent::message_out(ts, session, a),
                    "call" => {
                        let params: Value = serde_json::from_str(b).unwrap_or(Value::Null);
                        NormalizedEvent::tool_call(ts, session, a, params)
                    }
                    "err" => NormalizedEvent::tool_error(ts, session, a, b),
                    "ok" => NormalizedEvent::tool_success(ts, session, a, b),
                    other => panic!("unknown step kind {other}"),
                }
            })
            .collect()
    }
}
