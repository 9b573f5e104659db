use trace_events::ConversationChain;

use super::{next_message_out, preview, tool_exchanges, SignalDetector, ToolExchange};
use crate::signal::{EventRange, FailureSignal, Severity, SignalKind};
use crate::similarity::param_similarity;

const ERROR_EVIDENCE_CHARS: usize = 200;

/// Flags failed tool calls the agent replied past without a successful recovery attempt.
#[derive(Debug, Clone)]
pub struct ToolFailDetector {
    similarity_threshold: f64,
}

impl ToolFailDetector {
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
        }
    }

    /// A recovery is a different call (another tool, or the same tool with parameters no more
    /// similar than the threshold) that starts after the failure and succeeds before `reply`.
    fn recovered(
        &self,
        chain: &ConversationChain,
        failed: &ToolExchange,
        candidates: &[ToolExchange],
        reply: usize,
    ) -> bool {
        let failed_call = failed.call_event(chain);
        candidates.iter().any(|attempt| {
            let Some(result) = attempt.result else {
                return false;
            };
            if attempt.call <= failed.last_index() || result >= reply || !attempt.succeeded(chain) {
                return false;
            }
            let call = attempt.call_event(chain);
            if call.tool_name() != failed_call.tool_name() {
                return true;
            }
            param_similarity(call.params(), failed_call.params()) <= self.similarity_threshold
        })
    }
}

impl SignalDetector for ToolFailDetector {
    fn kind(&self) -> SignalKind {
        SignalKind::ToolFail
    }

    fn detect(&self, chain: &ConversationChain) -> Vec<FailureSignal> {
        let exchanges = tool_exchanges(chain);
        let mut signals = Vec::new();

        for exchange in exchanges.iter().filter(|ex| ex.failed(chain)) {
            let Some(reply) = next_message_out(chain, exchange.last_index() + 1) else {
                continue;
            };
            if self.recovered(chain, exchange, &exchanges, reply) {
                continue;
            }

            let call = exchange.call_event(chain);
            let tool = call.tool_name().unwrap_or("unknown");
            let error = exchange
                .result_event(chain)
                .and_then(|ev| ev.error())
                .map(|err| preview(err, ERROR_EVIDENCE_CHARS))
                .unwrap_or_else(|| "success=false".to_string());

            signals.push(
                FailureSignal::new(
                    SignalKind::ToolFail,
                    Severity::Low,
                    EventRange::spanning(exchange.call, reply),
                    format!("tool `{tool}` failed and the reply did not address it"),
                )
                .with_evidence("tool", tool)
                .with_evidence("error", error),
            );
        }
        signals
    }
}
